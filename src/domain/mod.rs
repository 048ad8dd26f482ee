//! Domain layer: storefront records and the cart aggregate
pub mod aggregates;
pub mod value_objects;
