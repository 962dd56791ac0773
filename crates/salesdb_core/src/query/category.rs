use rust_decimal::{Decimal, RoundingStrategy};

use super::matches_category;
use crate::aggregate::{
    AvgState,
    CountState,
    DistinctCountState,
    SumState,
    aggregate_groups,
};
use crate::cleaner::CleanedDataset;
use crate::table::{ScalarValue, TableRow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryQuantity {
    pub category: String,
    /// Null if the sum overflows.
    pub total_quantity: Option<i64>,
}

impl TableRow for CategoryQuantity {
    const COLUMNS: &'static [&'static str] = &["category", "total_quantity"];

    fn into_values(self) -> Vec<ScalarValue> {
        vec![self.category.into(), self.total_quantity.into()]
    }
}

/// Total quantity sold for `category`.
pub fn category_quantity(dataset: &CleanedDataset, category: &str) -> Vec<CategoryQuantity> {
    aggregate_groups(dataset.sales(), SumState::<i64>::default, |sale| {
        matches_category(sale, category).then(|| (sale.category.clone(), sale.quantity))
    })
    .into_iter()
    .map(|(category, total_quantity)| CategoryQuantity {
        category,
        total_quantity,
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotals {
    pub category: String,
    /// Null if the sum overflows.
    pub net_sale: Option<Decimal>,
    pub total_orders: i64,
}

impl TableRow for CategoryTotals {
    const COLUMNS: &'static [&'static str] = &["category", "net_sale", "total_orders"];

    fn into_values(self) -> Vec<ScalarValue> {
        vec![
            self.category.into(),
            self.net_sale.into(),
            self.total_orders.into(),
        ]
    }
}

/// Net sales and number of orders for each category.
pub fn category_totals(dataset: &CleanedDataset) -> Vec<CategoryTotals> {
    aggregate_groups(
        dataset.sales(),
        || (SumState::<Decimal>::default(), CountState::default()),
        |sale| Some((sale.category.clone(), (sale.total_sale, ()))),
    )
    .into_iter()
    .filter_map(|(category, totals)| {
        let (net_sale, total_orders) = totals?;
        Some(CategoryTotals {
            category,
            net_sale,
            total_orders: total_orders.unwrap_or_default(),
        })
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AverageAge {
    pub category: String,
    /// Average age rounded to two decimal places. Null if no sale in the
    /// category has an age.
    pub avg_age: Option<Decimal>,
}

impl TableRow for AverageAge {
    const COLUMNS: &'static [&'static str] = &["category", "avg_age"];

    fn into_values(self) -> Vec<ScalarValue> {
        vec![self.category.into(), self.avg_age.into()]
    }
}

/// Average customer age for `category`. Sales without an age are ignored.
pub fn average_age(dataset: &CleanedDataset, category: &str) -> AverageAge {
    let avg = aggregate_groups(dataset.sales(), AvgState::default, |sale| {
        match sale.age {
            Some(age) if matches_category(sale, category) => Some(((), Decimal::from(age))),
            _ => None,
        }
    })
    .into_iter()
    .next()
    .and_then(|(_, avg)| avg);

    AverageAge {
        category: category.to_string(),
        avg_age: avg.map(|avg| round_dp(avg, 2)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGenderCount {
    pub category: String,
    pub gender: String,
    pub total_transactions: i64,
}

impl TableRow for CategoryGenderCount {
    const COLUMNS: &'static [&'static str] = &["category", "gender", "total_transactions"];

    fn into_values(self) -> Vec<ScalarValue> {
        vec![
            self.category.into(),
            self.gender.into(),
            self.total_transactions.into(),
        ]
    }
}

/// Number of transactions for each category and gender pair.
pub fn category_gender_counts(dataset: &CleanedDataset) -> Vec<CategoryGenderCount> {
    aggregate_groups(dataset.sales(), CountState::default, |sale| {
        Some(((sale.category.clone(), sale.gender.clone()), ()))
    })
    .into_iter()
    .map(|((category, gender), count)| CategoryGenderCount {
        category,
        gender,
        total_transactions: count.unwrap_or_default(),
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCustomers {
    pub category: String,
    pub unique_customers: i64,
}

impl TableRow for CategoryCustomers {
    const COLUMNS: &'static [&'static str] = &["category", "unique_customers"];

    fn into_values(self) -> Vec<ScalarValue> {
        vec![self.category.into(), self.unique_customers.into()]
    }
}

/// Number of distinct customers that bought from each category.
pub fn unique_customers_per_category(dataset: &CleanedDataset) -> Vec<CategoryCustomers> {
    aggregate_groups(dataset.sales(), DistinctCountState::default, |sale| {
        Some((sale.category.clone(), sale.customer_id))
    })
    .into_iter()
    .map(|(category, count)| CategoryCustomers {
        category,
        unique_customers: count.unwrap_or_default(),
    })
    .collect()
}

/// Round half away from zero, always keeping `dp` decimal places.
pub(crate) fn round_dp(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}
