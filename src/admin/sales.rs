//! Sales viewer: list, search, detail and delete. Sales are never written here.

use std::sync::Arc;
use tracing::info;

use crate::store::{get_as, list_as, Collection, DocumentStore};
use crate::{Result, Sale, StorefrontError};

#[derive(Clone)]
pub struct SalesViewer {
    documents: Arc<dyn DocumentStore>,
}

impl SalesViewer {
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self { Self { documents } }

    /// Newest first.
    pub async fn list(&self) -> Result<Vec<Sale>> {
        let mut sales: Vec<Sale> = list_as(self.documents.as_ref(), Collection::Sales).await?;
        sort_newest_first(&mut sales);
        Ok(sales)
    }

    pub async fn search(&self, term: &str) -> Result<Vec<Sale>> {
        Ok(filter(self.list().await?, term))
    }

    pub async fn detail(&self, id: &str) -> Result<Sale> {
        get_as(self.documents.as_ref(), Collection::Sales, id)
            .await?
            .ok_or_else(|| StorefrontError::NotFound(format!("Sale {}", id)))
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.documents.delete(Collection::Sales, id).await?;
        info!("Deleted sale {}", id);
        Ok(())
    }
}

pub fn sort_newest_first(sales: &mut [Sale]) { sales.sort_by(|a, b| b.date.cmp(&a.date)); }

/// Blank terms keep everything.
pub fn filter(sales: Vec<Sale>, term: &str) -> Vec<Sale> {
    let term = term.trim();
    if term.is_empty() {
        return sales;
    }
    sales.into_iter().filter(|s| s.matches_search(term)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{to_fields, MemoryDocumentStore};
    use crate::{Money, SaleLine};
    use chrono::{Duration, Utc};

    fn sale(customer: &str, days_ago: i64, item: &str) -> Sale {
        Sale {
            id: String::new(),
            date: Utc::now() - Duration::days(days_ago),
            customer: customer.into(),
            total: Money::from_units(4500),
            lines: vec![SaleLine {
                product_id: "p1".into(), name: item.into(), unit_price: Money::from_units(4500), quantity: 1,
                subtotal: Money::from_units(4500),
            }],
            status: "Completado".into(),
        }
    }

    async fn seeded() -> (Arc<MemoryDocumentStore>, SalesViewer) {
        let store = Arc::new(MemoryDocumentStore::new());
        for s in [sale("Lucía", 5, "Vestido"), sale("Martín", 1, "Remera"), sale("Carla", 3, "Pollera")] {
            store.add(Collection::Sales, to_fields(&s).unwrap()).await.unwrap();
        }
        let viewer = SalesViewer::new(store.clone());
        (store, viewer)
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let (_, viewer) = seeded().await;
        let names: Vec<String> = viewer.list().await.unwrap().into_iter().map(|s| s.customer).collect();
        assert_eq!(names, vec!["Martín", "Carla", "Lucía"]);
    }

    #[tokio::test]
    async fn test_search_matches_customer_item_or_id() {
        let (_, viewer) = seeded().await;
        assert_eq!(viewer.search("lucía").await.unwrap().len(), 1);
        assert_eq!(viewer.search("REMERA").await.unwrap()[0].customer, "Martín");
        let id = viewer.list().await.unwrap()[2].id.clone();
        assert_eq!(viewer.search(&id[..4]).await.unwrap().iter().filter(|s| s.id == id).count(), 1);
        assert_eq!(viewer.search("  ").await.unwrap().len(), 3);
        assert!(viewer.search("zapatos").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_detail_and_delete() {
        let (store, viewer) = seeded().await;
        let id = viewer.list().await.unwrap()[0].id.clone();
        assert_eq!(viewer.detail(&id).await.unwrap().customer, "Martín");
        viewer.delete(&id).await.unwrap();
        assert!(matches!(viewer.detail(&id).await, Err(StorefrontError::NotFound(_))));
        assert_eq!(store.list(Collection::Sales).await.unwrap().len(), 2);
    }
}
