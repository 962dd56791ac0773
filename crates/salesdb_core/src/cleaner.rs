//! Null filtering of loaded records.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::record::{Column, SaleRecord, ValidSale};

/// Columns that must be present for a record to be analysed.
pub const REQUIRED_COLUMNS: [Column; 8] = [
    Column::TransactionId,
    Column::SaleDate,
    Column::SaleTime,
    Column::Gender,
    Column::Category,
    Column::Quantity,
    Column::Cogs,
    Column::TotalSale,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CleaningPolicy {
    /// Only the required columns are checked. Nulls in age and price per unit
    /// are kept.
    #[default]
    Lenient,
    /// Age and price per unit must also be present.
    Strict,
}

impl CleaningPolicy {
    pub fn checked_columns(&self) -> &'static [Column] {
        const STRICT: [Column; 10] = [
            Column::TransactionId,
            Column::SaleDate,
            Column::SaleTime,
            Column::Gender,
            Column::Age,
            Column::Category,
            Column::Quantity,
            Column::PricePerUnit,
            Column::Cogs,
            Column::TotalSale,
        ];

        match self {
            Self::Lenient => &REQUIRED_COLUMNS,
            Self::Strict => &STRICT,
        }
    }
}

/// A record rejected by the cleaner, with the required columns that were
/// null. Not an error: the record is dropped and counted in the
/// `CleanReport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingRequiredField(pub Vec<Column>);

impl ValidSale {
    /// Convert a loaded record, failing with the missing columns if any
    /// column checked by `policy` is null.
    pub fn try_from_record(
        record: &SaleRecord,
        policy: CleaningPolicy,
    ) -> Result<ValidSale, MissingRequiredField> {
        let missing: Vec<_> = policy
            .checked_columns()
            .iter()
            .copied()
            .filter(|col| record.is_null(*col))
            .collect();

        // `missing` is empty only if every field matched here is Some.
        match (
            record.transaction_id,
            record.sale_date,
            record.sale_time,
            &record.gender,
            &record.category,
            record.quantity,
            record.cogs,
            record.total_sale,
        ) {
            (
                Some(transaction_id),
                Some(sale_date),
                Some(sale_time),
                Some(gender),
                Some(category),
                Some(quantity),
                Some(cogs),
                Some(total_sale),
            ) if missing.is_empty() => Ok(ValidSale {
                transaction_id,
                sale_date,
                sale_time,
                customer_id: record.customer_id,
                gender: gender.clone(),
                age: record.age,
                category: category.clone(),
                quantity,
                price_per_unit: record.price_per_unit,
                cogs,
                total_sale,
            }),
            _ => Err(MissingRequiredField(missing)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// Number of records given to the cleaner.
    pub input_rows: usize,
    /// Number of records kept.
    pub kept_rows: usize,
    /// Number of records dropped for a null in each column. A record with
    /// multiple nulls is counted once per column.
    pub missing_by_column: BTreeMap<Column, usize>,
}

impl CleanReport {
    pub fn dropped_rows(&self) -> usize {
        self.input_rows - self.kept_rows
    }
}

/// The read-only set of records used for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedDataset {
    sales: Vec<ValidSale>,
    policy: CleaningPolicy,
    report: CleanReport,
}

impl CleanedDataset {
    /// Create a dataset from sales that are already known to be valid.
    pub fn from_sales(sales: Vec<ValidSale>) -> Self {
        let report = CleanReport {
            input_rows: sales.len(),
            kept_rows: sales.len(),
            missing_by_column: BTreeMap::new(),
        };
        CleanedDataset {
            sales,
            policy: CleaningPolicy::Lenient,
            report,
        }
    }

    pub fn sales(&self) -> &[ValidSale] {
        &self.sales
    }

    pub fn len(&self) -> usize {
        self.sales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }

    pub fn policy(&self) -> CleaningPolicy {
        self.policy
    }

    pub fn report(&self) -> &CleanReport {
        &self.report
    }

    /// Convert back into loaded records.
    pub fn to_records(&self) -> Vec<SaleRecord> {
        self.sales.iter().map(SaleRecord::from).collect()
    }
}

/// Drop every record with a null in a column checked by `policy`.
///
/// Record order is preserved.
pub fn clean(records: &[SaleRecord], policy: CleaningPolicy) -> CleanedDataset {
    let mut report = CleanReport {
        input_rows: records.len(),
        ..Default::default()
    };

    let mut sales = Vec::with_capacity(records.len());
    for record in records {
        match ValidSale::try_from_record(record, policy) {
            Ok(sale) => sales.push(sale),
            Err(MissingRequiredField(missing)) => {
                debug!(transaction_id = ?record.transaction_id, ?missing, "dropping record");
                for col in missing {
                    *report.missing_by_column.entry(col).or_insert(0) += 1;
                }
            }
        }
    }
    report.kept_rows = sales.len();

    info!(
        input = report.input_rows,
        kept = report.kept_rows,
        dropped = report.dropped_rows(),
        ?policy,
        "cleaned sales records"
    );

    CleanedDataset {
        sales,
        policy,
        report,
    }
}
