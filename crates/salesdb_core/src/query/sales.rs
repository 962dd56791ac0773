use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::cleaner::CleanedDataset;
use crate::record::{Column, ValidSale};
use crate::table::{ScalarValue, TableRow};

/// Every sale made on `date`, in dataset order.
pub fn sales_on_date(dataset: &CleanedDataset, date: NaiveDate) -> Vec<ValidSale> {
    dataset
        .sales()
        .iter()
        .filter(|sale| sale.sale_date == date)
        .cloned()
        .collect()
}

/// Every sale with a total strictly greater than `threshold`, in dataset
/// order.
pub fn high_value_sales(dataset: &CleanedDataset, threshold: Decimal) -> Vec<ValidSale> {
    dataset
        .sales()
        .iter()
        .filter(|sale| sale.total_sale > threshold)
        .cloned()
        .collect()
}

impl TableRow for ValidSale {
    const COLUMNS: &'static [&'static str] = &[
        Column::TransactionId.name(),
        Column::SaleDate.name(),
        Column::SaleTime.name(),
        Column::CustomerId.name(),
        Column::Gender.name(),
        Column::Age.name(),
        Column::Category.name(),
        Column::Quantity.name(),
        Column::PricePerUnit.name(),
        Column::Cogs.name(),
        Column::TotalSale.name(),
    ];

    fn into_values(self) -> Vec<ScalarValue> {
        vec![
            self.transaction_id.into(),
            self.sale_date.into(),
            self.sale_time.into(),
            self.customer_id.into(),
            self.gender.into(),
            self.age.into(),
            self.category.into(),
            self.quantity.into(),
            self.price_per_unit.into(),
            self.cogs.into(),
            self.total_sale.into(),
        ]
    }
}
