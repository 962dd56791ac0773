use rust_decimal::Decimal;

use crate::aggregate::{SumState, aggregate_groups};
use crate::cleaner::CleanedDataset;
use crate::table::{ScalarValue, TableRow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerTotal {
    pub customer_id: i64,
    /// Null if the sum overflows.
    pub total_sales: Option<Decimal>,
}

impl TableRow for CustomerTotal {
    const COLUMNS: &'static [&'static str] = &["customer_id", "total_sales"];

    fn into_values(self) -> Vec<ScalarValue> {
        vec![self.customer_id.into(), self.total_sales.into()]
    }
}

/// Customers with the highest summed sales, descending.
///
/// Customers with equal totals are ordered by ascending id. Customers whose
/// total overflowed rank after every other customer. Sales without a customer
/// id are ignored.
pub fn top_customers(dataset: &CleanedDataset, limit: usize) -> Vec<CustomerTotal> {
    // Output is ordered by customer id, the stable sort below keeps that order
    // for ties.
    let mut totals: Vec<_> = aggregate_groups(dataset.sales(), SumState::<Decimal>::default, |sale| {
        sale.customer_id.map(|id| (id, sale.total_sale))
    })
    .into_iter()
    .map(|(customer_id, total_sales)| CustomerTotal {
        customer_id,
        total_sales,
    })
    .collect();

    totals.sort_by(|a, b| b.total_sales.cmp(&a.total_sales));
    totals.truncate(limit);
    totals
}
