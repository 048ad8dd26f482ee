//! Product record

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use crate::domain::value_objects::Money;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "precio")]
    pub price: Money,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "imagen", default)]
    pub image: String,
    /// Availability flag, not a unit count.
    #[serde(default = "in_stock_default")]
    pub stock: bool,
    /// Category ids. Entries may dangle after a category is deleted.
    #[serde(rename = "categorias", default)]
    pub categories: Vec<String>,
}

fn in_stock_default() -> bool { true }

impl Product {
    pub fn is_in_stock(&self) -> bool { self.stock }

    /// True when no category is selected or the product carries any of them.
    pub fn matches_categories(&self, selected: &HashSet<String>) -> bool {
        selected.is_empty() || self.categories.iter().any(|c| selected.contains(c))
    }

    /// Case-insensitive substring match on name or description.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term) || self.description.to_lowercase().contains(&term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(categories: &[&str]) -> Product {
        Product {
            id: "P1".into(), name: "Vestido Floral".into(), price: Money::from_units(4500),
            description: "Vestido largo de verano".into(), image: String::new(), stock: true,
            categories: categories.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_matches_categories_is_any_of() {
        let p = product(&["A", "B"]);
        assert!(p.matches_categories(&HashSet::new()));
        assert!(p.matches_categories(&["B".to_string()].into_iter().collect()));
        assert!(!p.matches_categories(&["C".to_string()].into_iter().collect()));
        assert!(!product(&[]).matches_categories(&["A".to_string()].into_iter().collect()));
    }

    #[test]
    fn test_matches_search_ignores_case() {
        let p = product(&[]);
        assert!(p.matches_search("FLORAL"));
        assert!(p.matches_search("verano"));
        assert!(p.matches_search(""));
        assert!(!p.matches_search("pantalón"));
    }

    #[test]
    fn test_wire_names() {
        let doc = serde_json::json!({"nombre": "Remera", "precio": 1200, "categorias": ["A"]});
        let p: Product = serde_json::from_value(doc).unwrap();
        assert_eq!(p.name, "Remera");
        assert_eq!(p.price, Money::from_units(1200));
        assert!(p.stock);
        assert_eq!(p.description, "");
    }
}
