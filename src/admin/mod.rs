//! Back-office: entity editors, sales viewer, dashboard and admin session

pub mod dashboard;
pub mod editor;
pub mod entity;
pub mod sales;
pub mod service;
pub mod session;

pub use dashboard::{DashboardSummary, MonthlySales};
pub use editor::{EditTarget, EditorState, EntityEditor};
pub use entity::{AdminEntity, CategoryForm, FormFields, FormMode, ProductForm, TestimonialForm};
pub use sales::SalesViewer;
pub use service::{product_counts, EntityService, ImageUpload};
pub use session::{AdminCredentials, AdminSession, AdminSessions};
