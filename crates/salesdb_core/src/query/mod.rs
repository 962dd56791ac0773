//! The fixed set of analytical queries over a cleaned dataset.

pub mod category;
pub mod customers;
pub mod overview;
pub mod sales;
pub mod time;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use salesdb_error::{DbError, Result};

use crate::cleaner::CleanedDataset;
use crate::record::ValidSale;
use crate::table::ResultTable;

pub use category::*;
pub use customers::*;
pub use overview::*;
pub use sales::*;
pub use time::*;

/// Case-insensitive category match.
pub(crate) fn matches_category(sale: &ValidSale, category: &str) -> bool {
    sale.category.eq_ignore_ascii_case(category)
}

/// Parameters for the parameterized queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pub sale_date: NaiveDate,
    pub quantity_category: String,
    pub age_category: String,
    pub high_value_threshold: Decimal,
    pub top_customers: usize,
}

impl Default for QueryParams {
    fn default() -> Self {
        QueryParams {
            sale_date: NaiveDate::from_ymd_opt(2022, 11, 5).unwrap_or_default(),
            quantity_category: "Clothing".to_string(),
            age_category: "Beauty".to_string(),
            high_value_threshold: Decimal::from(1000),
            top_customers: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    SalesOnDate,
    CategoryQuantity,
    CategoryTotals,
    AverageAge,
    HighValueSales,
    CategoryGenderCounts,
    BestMonthPerYear,
    TopCustomers,
    UniqueCustomers,
    ShiftCounts,
    Overview,
}

impl Query {
    /// The ten analysis queries, in report order.
    pub const ANALYSES: [Query; 10] = [
        Query::SalesOnDate,
        Query::CategoryQuantity,
        Query::CategoryTotals,
        Query::AverageAge,
        Query::HighValueSales,
        Query::CategoryGenderCounts,
        Query::BestMonthPerYear,
        Query::TopCustomers,
        Query::UniqueCustomers,
        Query::ShiftCounts,
    ];

    pub const ALL: [Query; 11] = [
        Query::SalesOnDate,
        Query::CategoryQuantity,
        Query::CategoryTotals,
        Query::AverageAge,
        Query::HighValueSales,
        Query::CategoryGenderCounts,
        Query::BestMonthPerYear,
        Query::TopCustomers,
        Query::UniqueCustomers,
        Query::ShiftCounts,
        Query::Overview,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            Query::SalesOnDate => "sales_on_date",
            Query::CategoryQuantity => "category_quantity",
            Query::CategoryTotals => "category_totals",
            Query::AverageAge => "average_age",
            Query::HighValueSales => "high_value_sales",
            Query::CategoryGenderCounts => "category_gender_counts",
            Query::BestMonthPerYear => "best_month_per_year",
            Query::TopCustomers => "top_customers",
            Query::UniqueCustomers => "unique_customers",
            Query::ShiftCounts => "shift_counts",
            Query::Overview => "overview",
        }
    }

    pub const fn description(&self) -> &'static str {
        match self {
            Query::SalesOnDate => "Sales made on a given date",
            Query::CategoryQuantity => "Total quantity sold for a category",
            Query::CategoryTotals => "Net sales and order count per category",
            Query::AverageAge => "Average customer age for a category",
            Query::HighValueSales => "Sales with a total above a threshold",
            Query::CategoryGenderCounts => "Transactions per category and gender",
            Query::BestMonthPerYear => "Month with the highest average sale in each year",
            Query::TopCustomers => "Customers with the highest total sales",
            Query::UniqueCustomers => "Distinct customers per category",
            Query::ShiftCounts => "Orders per shift (morning, afternoon, evening)",
            Query::Overview => "Summary of the cleaned dataset",
        }
    }

    /// Position in the report, 1 through 10. The overview has no number.
    pub fn number(&self) -> Option<usize> {
        Self::ANALYSES.iter().position(|q| q == self).map(|idx| idx + 1)
    }

    fn title(&self, params: &QueryParams) -> String {
        let title = match self {
            Query::SalesOnDate => format!("Sales on {}", params.sale_date.format("%Y-%m-%d")),
            Query::CategoryQuantity => {
                format!("Quantity sold for '{}'", params.quantity_category)
            }
            Query::AverageAge => format!("Average age for '{}'", params.age_category),
            Query::HighValueSales => {
                format!("Sales with total above {}", params.high_value_threshold)
            }
            Query::TopCustomers => format!("Top {} customers", params.top_customers),
            other => other.description().to_string(),
        };

        match self.number() {
            Some(n) => format!("{n}. {title}"),
            None => title,
        }
    }

    pub fn execute(&self, dataset: &CleanedDataset, params: &QueryParams) -> ResultTable {
        let title = self.title(params);
        match self {
            Query::SalesOnDate => {
                ResultTable::from_rows(title, sales_on_date(dataset, params.sale_date))
            }
            Query::CategoryQuantity => ResultTable::from_rows(
                title,
                category_quantity(dataset, &params.quantity_category),
            ),
            Query::CategoryTotals => ResultTable::from_rows(title, category_totals(dataset)),
            Query::AverageAge => {
                ResultTable::from_rows(title, [average_age(dataset, &params.age_category)])
            }
            Query::HighValueSales => ResultTable::from_rows(
                title,
                high_value_sales(dataset, params.high_value_threshold),
            ),
            Query::CategoryGenderCounts => {
                ResultTable::from_rows(title, category_gender_counts(dataset))
            }
            Query::BestMonthPerYear => {
                ResultTable::from_rows(title, best_month_per_year(dataset))
            }
            Query::TopCustomers => {
                ResultTable::from_rows(title, top_customers(dataset, params.top_customers))
            }
            Query::UniqueCustomers => {
                ResultTable::from_rows(title, unique_customers_per_category(dataset))
            }
            Query::ShiftCounts => ResultTable::from_rows(title, shift_counts(dataset)),
            Query::Overview => {
                ResultTable::from_rows(title, DatasetOverview::compute(dataset).metrics())
            }
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Query {
    type Err = DbError;

    /// Parse a query from its name or its report number.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(n) = s.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(|idx| Self::ANALYSES.get(idx))
                .copied()
                .ok_or_else(|| {
                    DbError::invalid_input("Query number out of range")
                        .with_field("number", n)
                        .with_field("max", Self::ANALYSES.len())
                });
        }

        Self::ALL
            .iter()
            .find(|q| q.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| DbError::invalid_input("Unknown query").with_field("query", s))
    }
}
