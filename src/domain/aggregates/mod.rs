//! Aggregates module
pub mod cart;
pub mod category;
pub mod product;
pub mod sale;
pub mod testimonial;

pub use cart::{Cart, CartItem};
pub use category::Category;
pub use product::Product;
pub use sale::{Sale, SaleLine};
pub use testimonial::Testimonial;

/// Document timestamps are written as RFC 3339 text; records exported from
/// the hosted store carry `{seconds, nanoseconds}` objects instead, and both
/// are accepted on read.
pub(crate) mod timestamp {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(DateTime<Utc>),
        Seconds { seconds: i64, #[serde(default)] nanoseconds: u32 },
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Text(dt) => Ok(dt),
            Repr::Seconds { seconds, nanoseconds } => Utc
                .timestamp_opt(seconds, nanoseconds)
                .single()
                .ok_or_else(|| de::Error::custom("timestamp out of range")),
        }
    }
}
