use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use rust_decimal::Decimal;

/// Columns of the sales schema, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    TransactionId,
    SaleDate,
    SaleTime,
    CustomerId,
    Gender,
    Age,
    Category,
    Quantity,
    PricePerUnit,
    Cogs,
    TotalSale,
}

impl Column {
    pub const ALL: [Column; 11] = [
        Column::TransactionId,
        Column::SaleDate,
        Column::SaleTime,
        Column::CustomerId,
        Column::Gender,
        Column::Age,
        Column::Category,
        Column::Quantity,
        Column::PricePerUnit,
        Column::Cogs,
        Column::TotalSale,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::TransactionId => "transaction_id",
            Self::SaleDate => "sale_date",
            Self::SaleTime => "sale_time",
            Self::CustomerId => "customer_id",
            Self::Gender => "gender",
            Self::Age => "age",
            Self::Category => "category",
            Self::Quantity => "quantity",
            Self::PricePerUnit => "price_per_unit",
            Self::Cogs => "cogs",
            Self::TotalSale => "total_sale",
        }
    }

    /// Header name used by the published retail sales dataset.
    ///
    /// Two columns are spelled differently there, everything else matches
    /// `name`.
    pub const fn published_name(&self) -> &'static str {
        match self {
            Self::TransactionId => "transactions_id",
            Self::Quantity => "quantiy",
            other => other.name(),
        }
    }

    /// Resolve a header field to a column. Case and surrounding whitespace are
    /// ignored.
    pub fn from_header(header: &str) -> Option<Column> {
        let header = header.trim();
        Self::ALL.into_iter().find(|col| {
            header.eq_ignore_ascii_case(col.name())
                || header.eq_ignore_ascii_case(col.published_name())
        })
    }

    /// Position of the column in a headerless file.
    pub const fn position(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single transaction as loaded. Any field may be null.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleRecord {
    pub transaction_id: Option<i64>,
    pub sale_date: Option<NaiveDate>,
    pub sale_time: Option<NaiveTime>,
    pub customer_id: Option<i64>,
    pub gender: Option<String>,
    pub age: Option<i64>,
    pub category: Option<String>,
    pub quantity: Option<i64>,
    pub price_per_unit: Option<Decimal>,
    pub cogs: Option<Decimal>,
    pub total_sale: Option<Decimal>,
}

impl SaleRecord {
    pub fn is_null(&self, column: Column) -> bool {
        match column {
            Column::TransactionId => self.transaction_id.is_none(),
            Column::SaleDate => self.sale_date.is_none(),
            Column::SaleTime => self.sale_time.is_none(),
            Column::CustomerId => self.customer_id.is_none(),
            Column::Gender => self.gender.is_none(),
            Column::Age => self.age.is_none(),
            Column::Category => self.category.is_none(),
            Column::Quantity => self.quantity.is_none(),
            Column::PricePerUnit => self.price_per_unit.is_none(),
            Column::Cogs => self.cogs.is_none(),
            Column::TotalSale => self.total_sale.is_none(),
        }
    }

    /// Set a column to null.
    pub fn clear(&mut self, column: Column) {
        match column {
            Column::TransactionId => self.transaction_id = None,
            Column::SaleDate => self.sale_date = None,
            Column::SaleTime => self.sale_time = None,
            Column::CustomerId => self.customer_id = None,
            Column::Gender => self.gender = None,
            Column::Age => self.age = None,
            Column::Category => self.category = None,
            Column::Quantity => self.quantity = None,
            Column::PricePerUnit => self.price_per_unit = None,
            Column::Cogs => self.cogs = None,
            Column::TotalSale => self.total_sale = None,
        }
    }

    /// Render a column the way it's written to a csv file. Nulls are empty.
    pub fn format_column(&self, column: Column) -> String {
        fn fmt_opt<T: ToString>(v: &Option<T>) -> String {
            v.as_ref().map(|v| v.to_string()).unwrap_or_default()
        }

        match column {
            Column::TransactionId => fmt_opt(&self.transaction_id),
            Column::SaleDate => fmt_opt(&self.sale_date),
            Column::SaleTime => self
                .sale_time
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_default(),
            Column::CustomerId => fmt_opt(&self.customer_id),
            Column::Gender => fmt_opt(&self.gender),
            Column::Age => fmt_opt(&self.age),
            Column::Category => fmt_opt(&self.category),
            Column::Quantity => fmt_opt(&self.quantity),
            Column::PricePerUnit => fmt_opt(&self.price_per_unit),
            Column::Cogs => fmt_opt(&self.cogs),
            Column::TotalSale => fmt_opt(&self.total_sale),
        }
    }
}

/// A record that survived cleaning.
///
/// Fields the cleaner requires are no longer optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSale {
    pub transaction_id: i64,
    pub sale_date: NaiveDate,
    pub sale_time: NaiveTime,
    pub customer_id: Option<i64>,
    pub gender: String,
    pub age: Option<i64>,
    pub category: String,
    pub quantity: i64,
    pub price_per_unit: Option<Decimal>,
    pub cogs: Decimal,
    pub total_sale: Decimal,
}

impl ValidSale {
    pub fn shift(&self) -> Shift {
        Shift::from_time(self.sale_time)
    }

    pub fn year(&self) -> i32 {
        self.sale_date.year()
    }

    pub fn month(&self) -> u32 {
        self.sale_date.month()
    }
}

impl From<&ValidSale> for SaleRecord {
    fn from(sale: &ValidSale) -> Self {
        SaleRecord {
            transaction_id: Some(sale.transaction_id),
            sale_date: Some(sale.sale_date),
            sale_time: Some(sale.sale_time),
            customer_id: sale.customer_id,
            gender: Some(sale.gender.clone()),
            age: sale.age,
            category: Some(sale.category.clone()),
            quantity: Some(sale.quantity),
            price_per_unit: sale.price_per_unit,
            cogs: Some(sale.cogs),
            total_sale: Some(sale.total_sale),
        }
    }
}

/// Coarse part of the day a sale happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Shift {
    Morning,
    Afternoon,
    Evening,
}

impl Shift {
    pub const ALL: [Shift; 3] = [Shift::Morning, Shift::Afternoon, Shift::Evening];

    pub fn from_hour(hour: u32) -> Shift {
        match hour {
            0..12 => Shift::Morning,
            12..=17 => Shift::Afternoon,
            _ => Shift::Evening,
        }
    }

    pub fn from_time(time: NaiveTime) -> Shift {
        Self::from_hour(time.hour())
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
