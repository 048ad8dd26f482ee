//! Back-office dashboard figures

use chrono::Datelike;
use serde::Serialize;
use std::sync::Arc;

use super::sales::sort_newest_first;
use crate::store::{list_as, Collection, DocumentStore};
use crate::{Category, Money, Product, Result, Sale};

pub const MONTHS: [&str; 12] = [
    "Enero", "Febrero", "Marzo", "Abril", "Mayo", "Junio",
    "Julio", "Agosto", "Septiembre", "Octubre", "Noviembre", "Diciembre",
];

pub const RECENT_SALES: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthlySales {
    pub month: &'static str,
    pub count: usize,
    pub revenue: Money,
}

#[derive(Clone, Debug, Serialize)]
pub struct DashboardSummary {
    pub products: usize,
    pub categories: usize,
    pub sales: usize,
    pub revenue: Money,
    pub recent_sales: Vec<Sale>,
    /// One bucket per calendar month, January first. Years are folded together.
    pub monthly: Vec<MonthlySales>,
}

pub fn summarize(products: &[Product], categories: &[Category], mut sales: Vec<Sale>) -> DashboardSummary {
    let mut monthly: Vec<MonthlySales> =
        MONTHS.iter().map(|&month| MonthlySales { month, count: 0, revenue: Money::zero() }).collect();
    for sale in &sales {
        let bucket = &mut monthly[sale.date.month0() as usize];
        bucket.count += 1;
        bucket.revenue = bucket.revenue.add(&sale.total);
    }
    let revenue: Money = sales.iter().map(|s| s.total).sum();
    let count = sales.len();
    sort_newest_first(&mut sales);
    sales.truncate(RECENT_SALES);
    DashboardSummary {
        products: products.len(),
        categories: categories.len(),
        sales: count,
        revenue,
        recent_sales: sales,
        monthly,
    }
}

pub async fn load(documents: Arc<dyn DocumentStore>) -> Result<DashboardSummary> {
    let store = documents.as_ref();
    let products: Vec<Product> = list_as(store, Collection::Products).await?;
    let categories: Vec<Category> = list_as(store, Collection::Categories).await?;
    let sales: Vec<Sale> = list_as(store, Collection::Sales).await?;
    Ok(summarize(&products, &categories, sales))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sale(id: &str, year: i32, month: u32, total: i64) -> Sale {
        Sale {
            id: id.into(),
            date: Utc.with_ymd_and_hms(year, month, 10, 12, 0, 0).unwrap(),
            customer: "Cliente".into(),
            total: Money::from_units(total),
            lines: vec![],
            status: "Completado".into(),
        }
    }

    #[test]
    fn test_monthly_histogram_and_totals() {
        let sales = vec![
            sale("a", 2024, 1, 1000), sale("b", 2024, 1, 500), sale("c", 2024, 3, 2000), sale("d", 2023, 12, 700),
        ];
        let summary = summarize(&[], &[], sales);
        assert_eq!(summary.sales, 4);
        assert_eq!(summary.revenue, Money::from_units(4200));
        assert_eq!(summary.monthly.len(), 12);
        assert_eq!(summary.monthly[0], MonthlySales { month: "Enero", count: 2, revenue: Money::from_units(1500) });
        assert_eq!(summary.monthly[2].count, 1);
        assert_eq!(summary.monthly[11].month, "Diciembre");
        assert_eq!(summary.monthly[11].revenue, Money::from_units(700));
    }

    #[test]
    fn test_recent_sales_capped_and_newest_first() {
        let sales: Vec<Sale> = (1..=8).map(|m| sale(&format!("s{m}"), 2024, m, 100)).collect();
        let summary = summarize(&[], &[], sales);
        let ids: Vec<&str> = summary.recent_sales.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s8", "s7", "s6", "s5", "s4"]);
        assert_eq!(summary.sales, 8);
    }

    #[tokio::test]
    async fn test_load_counts_collections() {
        use crate::store::{to_fields, MemoryDocumentStore};
        let store = Arc::new(MemoryDocumentStore::new());
        let c = Category { id: String::new(), name: "Vestidos".into(), image: String::new() };
        store.add(Collection::Categories, to_fields(&c).unwrap()).await.unwrap();
        store.add(Collection::Sales, to_fields(&sale("", 2024, 5, 300)).unwrap()).await.unwrap();
        let summary = load(store).await.unwrap();
        assert_eq!((summary.products, summary.categories, summary.sales), (0, 1, 1));
        assert_eq!(summary.monthly[4].count, 1);
    }
}
