//! Loading sales records from delimited text.

pub mod dialect;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use dialect::DialectOptions;
use hashbrown::HashSet;
use rust_decimal::Decimal;
use salesdb_error::{DbError, ErrorKind, Result, ResultExt};
use tracing::{debug, info, warn};

use crate::record::{Column, SaleRecord};

/// Number of bytes looked at when inferring the csv dialect.
const DIALECT_SAMPLE_SIZE: usize = 16 * 1024;

/// What to do with rows that can't be parsed into the sales schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Fail the load on the first malformed row.
    #[default]
    Abort,
    /// Drop the row and keep going.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Dialect to use. Inferred from the input if not set.
    pub dialect: Option<DialectOptions>,
    /// If the first row is a header.
    pub has_header: bool,
    pub malformed: MalformedPolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            dialect: None,
            has_header: true,
            malformed: MalformedPolicy::Abort,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Dialect that was used to read the input.
    pub dialect: DialectOptions,
    /// Number of data rows read, not including the header.
    pub rows_read: usize,
    /// Number of rows skipped as malformed.
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub records: Vec<SaleRecord>,
    pub report: LoadReport,
}

pub fn load_path(path: impl AsRef<Path>, opts: &LoadOptions) -> Result<LoadedDataset> {
    let path = path.as_ref();
    let file =
        File::open(path).context_fn(|| format!("Failed to open '{}'", path.display()))?;
    debug!(path = %path.display(), "loading sales");
    load_reader(BufReader::new(file), opts)
}

pub fn load_reader(mut reader: impl Read, opts: &LoadOptions) -> Result<LoadedDataset> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .context("Failed to read sales input")?;
    load_bytes(&buf, opts)
}

pub fn load_bytes(bytes: &[u8], opts: &LoadOptions) -> Result<LoadedDataset> {
    let dialect = match opts.dialect {
        Some(dialect) => dialect,
        None => {
            let sample = &bytes[..bytes.len().min(DIALECT_SAMPLE_SIZE)];
            match DialectOptions::infer_from_sample(sample) {
                Some(dialect) => {
                    debug!(?dialect, "inferred csv dialect");
                    dialect
                }
                None => {
                    debug!("unable to infer csv dialect, using default");
                    DialectOptions::default()
                }
            }
        }
    };

    let mut builder = dialect.reader_builder();
    builder.has_headers(opts.has_header);
    let mut reader = builder.from_reader(bytes);

    let layout = if opts.has_header {
        ColumnLayout::try_from_headers(reader.headers()?)?
    } else {
        ColumnLayout::positional()
    };

    let mut report = LoadReport {
        dialect,
        ..Default::default()
    };
    let mut records = Vec::new();
    let mut seen_ids = HashSet::new();

    for row in reader.records() {
        report.rows_read += 1;

        let parsed = row
            .map_err(DbError::from)
            .and_then(|row| layout.parse_row(&row));

        let parsed = parsed.and_then(|(line, record)| match record.transaction_id {
            Some(id) if !seen_ids.insert(id) => Err(DbError::malformed_record(
                "Duplicate transaction id",
            )
            .with_field("line", line)
            .with_field("transaction_id", id)),
            _ => Ok(record),
        });

        match parsed {
            Ok(record) => records.push(record),
            Err(err)
                if err.kind() == ErrorKind::MalformedRecord
                    && opts.malformed == MalformedPolicy::Skip =>
            {
                warn!(%err, "skipping malformed record");
                report.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    info!(
        rows = report.rows_read,
        loaded = records.len(),
        skipped = report.skipped,
        "loaded sales records"
    );

    Ok(LoadedDataset { records, report })
}

/// Maps schema columns to field positions within a row.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnLayout {
    /// Field index for each column, indexed by column position.
    indices: [usize; 11],
    /// Expected number of fields in every row.
    num_fields: usize,
}

impl ColumnLayout {
    fn positional() -> Self {
        ColumnLayout {
            indices: std::array::from_fn(|idx| idx),
            num_fields: Column::ALL.len(),
        }
    }

    fn try_from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let mut indices: [Option<usize>; 11] = [None; 11];

        for (field_idx, header) in headers.iter().enumerate() {
            let col = match Column::from_header(header) {
                Some(col) => col,
                None => {
                    debug!(%header, "ignoring unknown column");
                    continue;
                }
            };

            let slot = &mut indices[col.position()];
            if slot.is_some() {
                return Err(DbError::invalid_input("Column appears more than once in header")
                    .with_field("column", col));
            }
            *slot = Some(field_idx);
        }

        let missing: Vec<_> = Column::ALL
            .iter()
            .filter(|col| indices[col.position()].is_none())
            .map(|col| col.name())
            .collect();
        if !missing.is_empty() {
            return Err(DbError::invalid_input("Header is missing required columns")
                .with_field("missing", missing.join(", ")));
        }

        Ok(ColumnLayout {
            indices: indices.map(|idx| idx.unwrap_or_default()),
            num_fields: headers.len(),
        })
    }

    /// Parse a row into a record, returning the line the row started on
    /// alongside it.
    fn parse_row(&self, row: &csv::StringRecord) -> Result<(u64, SaleRecord)> {
        let line = row.position().map(|pos| pos.line()).unwrap_or_default();

        if row.len() != self.num_fields {
            return Err(
                DbError::malformed_record("Record has the wrong number of fields")
                    .with_field("line", line)
                    .with_field("expected", self.num_fields)
                    .with_field("found", row.len()),
            );
        }

        let field = move |col: Column| FieldRef {
            line,
            column: col,
            raw: row.get(self.indices[col.position()]).unwrap_or_default(),
        };

        let record = SaleRecord {
            transaction_id: field(Column::TransactionId).parse_with(|s| i64::from_str(s).ok())?,
            sale_date: field(Column::SaleDate).parse_with(parse_date)?,
            sale_time: field(Column::SaleTime).parse_with(parse_time)?,
            customer_id: field(Column::CustomerId).parse_with(|s| i64::from_str(s).ok())?,
            gender: field(Column::Gender).parse_with(|s| Some(s.to_string()))?,
            age: field(Column::Age).parse_with(|s| i64::from_str(s).ok())?,
            category: field(Column::Category).parse_with(|s| Some(s.to_string()))?,
            quantity: field(Column::Quantity).parse_with(|s| i64::from_str(s).ok())?,
            price_per_unit: field(Column::PricePerUnit).parse_with(parse_decimal)?,
            cogs: field(Column::Cogs).parse_with(parse_decimal)?,
            total_sale: field(Column::TotalSale).parse_with(parse_decimal)?,
        };

        Ok((line, record))
    }
}

/// A single raw field within a row.
#[derive(Debug, Clone, Copy)]
struct FieldRef<'a> {
    line: u64,
    column: Column,
    raw: &'a str,
}

impl FieldRef<'_> {
    /// Parse the field. Empty fields and a literal NULL are treated as null.
    fn parse_with<T>(&self, parse: impl FnOnce(&str) -> Option<T>) -> Result<Option<T>> {
        if self.raw.is_empty() || self.raw.eq_ignore_ascii_case("null") {
            return Ok(None);
        }

        match parse(self.raw) {
            Some(v) => Ok(Some(v)),
            None => Err(DbError::malformed_record("Failed to parse field")
                .with_field("line", self.line)
                .with_field("column", self.column)
                .with_field("value", self.raw)),
        }
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    const HEADER: &str = "transactions_id,sale_date,sale_time,customer_id,gender,age,category,quantiy,price_per_unit,cogs,total_sale\n";

    fn load(body: &str, opts: &LoadOptions) -> Result<LoadedDataset> {
        let input = format!("{HEADER}{body}");
        load_reader(input.as_bytes(), opts)
    }

    #[test]
    fn load_published_header() {
        let loaded = load(
            "180,2022-11-05,10:47:00,117,Male,41,Clothing,3,300,129,900\n",
            &LoadOptions::default(),
        )
        .unwrap();

        assert_eq!(1, loaded.records.len());
        assert_eq!(DialectOptions::default(), loaded.report.dialect);

        let rec = &loaded.records[0];
        assert_eq!(Some(180), rec.transaction_id);
        assert_eq!(NaiveDate::from_ymd_opt(2022, 11, 5), rec.sale_date);
        assert_eq!(NaiveTime::from_hms_opt(10, 47, 0), rec.sale_time);
        assert_eq!(Some(117), rec.customer_id);
        assert_eq!(Some("Male"), rec.gender.as_deref());
        assert_eq!(Some(41), rec.age);
        assert_eq!(Some("Clothing"), rec.category.as_deref());
        assert_eq!(Some(3), rec.quantity);
        assert_eq!(Some(dec!(300)), rec.price_per_unit);
        assert_eq!(Some(dec!(129)), rec.cogs);
        assert_eq!(Some(dec!(900)), rec.total_sale);
    }

    #[test]
    fn empty_and_null_fields_are_null() {
        let loaded = load(
            "1,2022-11-05,10:47:00,117,Male,,Clothing,3,NULL,129,900\n",
            &LoadOptions::default(),
        )
        .unwrap();

        let rec = &loaded.records[0];
        assert_eq!(None, rec.age);
        assert_eq!(None, rec.price_per_unit);
        assert_eq!(Some(dec!(129)), rec.cogs);
    }

    #[test]
    fn reordered_and_extra_columns() {
        let input = "category,total_sale,Transaction_Id,note,sale_date,sale_time,customer_id,gender,age,quantity,price_per_unit,cogs\n\
                     Beauty,50,9,hello,2023-01-02,08:00,5,Female,30,2,25,10.5\n";
        let loaded = load_reader(input.as_bytes(), &LoadOptions::default()).unwrap();

        let rec = &loaded.records[0];
        assert_eq!(Some(9), rec.transaction_id);
        assert_eq!(Some("Beauty"), rec.category.as_deref());
        assert_eq!(NaiveTime::from_hms_opt(8, 0, 0), rec.sale_time);
        assert_eq!(Some(dec!(10.5)), rec.cogs);
        assert_eq!(Some(dec!(50)), rec.total_sale);
    }

    #[test]
    fn headerless_positional() {
        let opts = LoadOptions {
            has_header: false,
            ..Default::default()
        };
        let loaded = load_reader(
            "1;2022-11-05;10:47:00;117;Male;41;Clothing;3;300;129;900\n2;2022-11-06;11:00:00;118;Female;22;Beauty;1;50;20;50\n"
                .as_bytes(),
            &opts,
        )
        .unwrap();

        assert_eq!(b';', loaded.report.dialect.delimiter);
        assert_eq!(2, loaded.records.len());
        assert_eq!(Some(2), loaded.records[1].transaction_id);
    }

    #[test]
    fn missing_column_in_header() {
        let input = "transactions_id,sale_date\n1,2022-11-05\n";
        let err = load_reader(input.as_bytes(), &LoadOptions::default()).unwrap_err();

        assert_eq!(ErrorKind::InvalidInput, err.kind());
        assert!(err.field("missing").unwrap().contains("total_sale"));
    }

    #[test]
    fn malformed_value_aborts() {
        let err = load(
            "1,2022-11-05,10:47:00,117,Male,41,Clothing,3,300,129,900\n\
             2,2022-13-45,10:47:00,117,Male,41,Clothing,3,300,129,900\n",
            &LoadOptions::default(),
        )
        .unwrap_err();

        assert_eq!(ErrorKind::MalformedRecord, err.kind());
        assert_eq!(Some("3"), err.field("line"));
        assert_eq!(Some("sale_date"), err.field("column"));
        assert_eq!(Some("2022-13-45"), err.field("value"));
    }

    #[test]
    fn malformed_rows_skipped() {
        let opts = LoadOptions {
            malformed: MalformedPolicy::Skip,
            ..Default::default()
        };
        let loaded = load(
            "1,2022-11-05,10:47:00,117,Male,41,Clothing,3,300,129,900\n\
             2,2022-11-05,10:47:00,117,Male,forty,Clothing,3,300,129,900\n\
             3,2022-11-05,10:47:00\n\
             1,2022-11-06,10:47:00,117,Male,41,Clothing,3,300,129,900\n\
             4,2022-11-07,10:47:00,117,Male,41,Clothing,3,300,129,900\n",
            &opts,
        )
        .unwrap();

        assert_eq!(5, loaded.report.rows_read);
        assert_eq!(3, loaded.report.skipped);
        let ids: Vec<_> = loaded.records.iter().map(|r| r.transaction_id).collect();
        assert_eq!(vec![Some(1), Some(4)], ids);
    }

    #[test]
    fn duplicate_transaction_id_aborts() {
        let err = load(
            "1,2022-11-05,10:47:00,117,Male,41,Clothing,3,300,129,900\n\
             1,2022-11-06,10:47:00,117,Male,41,Clothing,3,300,129,900\n",
            &LoadOptions::default(),
        )
        .unwrap_err();

        assert_eq!(ErrorKind::MalformedRecord, err.kind());
        assert_eq!(Some("1"), err.field("transaction_id"));
    }
}
