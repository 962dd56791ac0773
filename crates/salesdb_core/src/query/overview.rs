use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::aggregate::{AggregateState, DistinctCountState, SumState};
use crate::cleaner::CleanedDataset;
use crate::table::{ScalarValue, TableRow};

/// Summary of a cleaned dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetOverview {
    pub total_sales: i64,
    pub unique_customers: i64,
    /// Distinct categories, sorted.
    pub categories: Vec<String>,
    pub first_sale: Option<NaiveDate>,
    pub last_sale: Option<NaiveDate>,
    /// Sums are null for an empty dataset or when they overflow.
    pub total_revenue: Option<Decimal>,
    pub total_cogs: Option<Decimal>,
    pub gross_profit: Option<Decimal>,
}

impl DatasetOverview {
    pub fn compute(dataset: &CleanedDataset) -> Self {
        let mut customers = DistinctCountState::<i64>::default();
        let mut revenue = SumState::<Decimal>::default();
        let mut cogs = SumState::<Decimal>::default();
        let mut categories = BTreeSet::new();
        let mut first_sale: Option<NaiveDate> = None;
        let mut last_sale: Option<NaiveDate> = None;

        for sale in dataset.sales() {
            customers.update(sale.customer_id);
            revenue.update(sale.total_sale);
            cogs.update(sale.cogs);
            if !categories.contains(&sale.category) {
                categories.insert(sale.category.clone());
            }
            first_sale = Some(first_sale.map_or(sale.sale_date, |d| d.min(sale.sale_date)));
            last_sale = Some(last_sale.map_or(sale.sale_date, |d| d.max(sale.sale_date)));
        }

        let total_revenue = revenue.finalize();
        let total_cogs = cogs.finalize();
        let gross_profit = match (total_revenue, total_cogs) {
            (Some(revenue), Some(cogs)) => revenue.checked_sub(cogs),
            _ => None,
        };

        DatasetOverview {
            total_sales: dataset.len() as i64,
            unique_customers: customers.finalize().unwrap_or_default(),
            categories: categories.into_iter().collect(),
            first_sale,
            last_sale,
            total_revenue,
            total_cogs,
            gross_profit,
        }
    }

    /// Overview as `metric`/`value` rows.
    pub fn metrics(&self) -> Vec<OverviewMetric> {
        let metric = |name: &'static str, value: ScalarValue| OverviewMetric { name, value };
        vec![
            metric("total_sales", self.total_sales.into()),
            metric("unique_customers", self.unique_customers.into()),
            metric("categories", self.categories.join(", ").into()),
            metric("first_sale", self.first_sale.into()),
            metric("last_sale", self.last_sale.into()),
            metric("total_revenue", self.total_revenue.into()),
            metric("total_cogs", self.total_cogs.into()),
            metric("gross_profit", self.gross_profit.into()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewMetric {
    pub name: &'static str,
    pub value: ScalarValue,
}

impl TableRow for OverviewMetric {
    const COLUMNS: &'static [&'static str] = &["metric", "value"];

    fn into_values(self) -> Vec<ScalarValue> {
        vec![self.name.into(), self.value]
    }
}
