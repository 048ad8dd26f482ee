//! Sale record
//!
//! Sales are written by an out-of-band process; this crate only reads and
//! deletes them. Missing fields fall back to the defaults the back-office
//! has always shown.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::value_objects::Money;
use super::timestamp;

pub const STATUS_COMPLETED: &str = "Completado";
pub const STATUS_PENDING: &str = "Pendiente";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "fecha", default = "Utc::now", with = "timestamp")]
    pub date: DateTime<Utc>,
    #[serde(rename = "cliente", default = "default_customer")]
    pub customer: String,
    #[serde(default)]
    pub total: Money,
    #[serde(rename = "productos", default)]
    pub lines: Vec<SaleLine>,
    /// Free text; in practice `Completado` or `Pendiente`.
    #[serde(rename = "estado", default = "default_status")]
    pub status: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
    #[serde(rename = "id")]
    pub product_id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "precio")]
    pub unit_price: Money,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
    pub subtotal: Money,
}

fn default_customer() -> String { "Cliente".to_string() }
fn default_status() -> String { STATUS_COMPLETED.to_string() }

impl Sale {
    pub fn is_completed(&self) -> bool { self.status == STATUS_COMPLETED }

    /// Short reference shown in listings: the first six characters of the id.
    pub fn reference(&self) -> &str {
        match self.id.char_indices().nth(6) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }

    /// Case-insensitive match on customer, sale id or any line item name.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.customer.to_lowercase().contains(&term)
            || self.id.to_lowercase().contains(&term)
            || self.lines.iter().any(|l| l.name.to_lowercase().contains(&term))
    }
}
