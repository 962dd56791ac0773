//! Synthetic retail sales data.

use std::io::Write;

use chrono::{Days, NaiveDate, NaiveTime};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use salesdb_error::{DbError, OptionExt, Result};
use tracing::debug;

use crate::record::{Column, SaleRecord};

const CATEGORIES: &[&str] = &["Clothing", "Beauty", "Electronics"];
const GENDERS: &[&str] = &["Male", "Female"];
/// Unit prices found in the published dataset.
const PRICES: &[i64] = &[25, 30, 50, 300, 500];
/// Number of days sales are spread over, starting at 2022-01-01.
const DATE_SPAN_DAYS: u64 = 730;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateOptions {
    pub rows: usize,
    pub seed: u64,
    /// Probability a row has one of its columns nulled out.
    pub null_rate: f64,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            rows: 2000,
            seed: 0,
            null_rate: 0.0,
        }
    }
}

/// Generate `opts.rows` records. The same options always produce the same
/// records.
pub fn generate_records(opts: &GenerateOptions) -> Result<Vec<SaleRecord>> {
    // Also rejects NaN.
    if !(0.0..=1.0).contains(&opts.null_rate) {
        return Err(DbError::invalid_input("Null rate must be between 0 and 1")
            .with_field("null_rate", opts.null_rate));
    }

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let start = NaiveDate::from_ymd_opt(2022, 1, 1).required("start date")?;
    let num_customers = (opts.rows / 8).max(1) as i64;

    let mut records = Vec::with_capacity(opts.rows);
    for idx in 0..opts.rows {
        let sale_date = start
            .checked_add_days(Days::new(rng.random_range(0..DATE_SPAN_DAYS)))
            .required("sale date")?;
        let sale_time = NaiveTime::from_hms_opt(
            rng.random_range(6..23),
            rng.random_range(0..60),
            rng.random_range(0..60),
        )
        .required("sale time")?;

        let price = Decimal::from(*PRICES.choose(&mut rng).required("price")?);
        let quantity: i64 = rng.random_range(1..=4);
        // Cost per unit is 10-45% of the price.
        let cogs = price * Decimal::new(rng.random_range(10..=45), 2);

        let mut record = SaleRecord {
            transaction_id: Some(idx as i64 + 1),
            sale_date: Some(sale_date),
            sale_time: Some(sale_time),
            customer_id: Some(rng.random_range(1..=num_customers)),
            gender: Some(GENDERS.choose(&mut rng).required("gender")?.to_string()),
            age: Some(rng.random_range(18..=64)),
            category: Some(CATEGORIES.choose(&mut rng).required("category")?.to_string()),
            quantity: Some(quantity),
            price_per_unit: Some(price),
            cogs: Some(cogs),
            total_sale: Some(price * Decimal::from(quantity)),
        };

        if rng.random_bool(opts.null_rate) {
            // Transaction id stays set, it's the key.
            let col = *Column::ALL[1..].choose(&mut rng).required("column")?;
            record.clear(col);
        }

        records.push(record);
    }

    debug!(rows = records.len(), seed = opts.seed, "generated records");

    Ok(records)
}

/// Write records as csv using the published header names.
pub fn write_csv<W: Write>(writer: W, records: &[SaleRecord]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(Column::ALL.iter().map(|c| c.published_name()))?;
    for record in records {
        csv_writer.write_record(Column::ALL.iter().map(|c| record.format_column(*c)))?;
    }
    csv_writer.flush()?;

    Ok(())
}
