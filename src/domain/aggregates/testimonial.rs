//! Testimonial record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::timestamp;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "nombre")]
    pub author: String,
    #[serde(rename = "comentario")]
    pub comment: String,
    #[serde(rename = "imagen", default)]
    pub image: String,
    /// Assigned when the testimonial is created; edits keep it.
    #[serde(rename = "fecha", default = "Utc::now", with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Testimonial {
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.author.to_lowercase().contains(&term) || self.comment.to_lowercase().contains(&term)
    }
}
