//! Tabular query results.

pub mod format;
pub mod pretty;

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// A single value in a result table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarValue {
    Null,
    Int64(i64),
    Decimal(Decimal),
    Utf8(String),
    Date(NaiveDate),
    Time(NaiveTime),
}

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ScalarValue::Int64(_) | ScalarValue::Decimal(_))
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Utf8(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Self::Time(v) => write!(f, "{}", v.format("%H:%M:%S")),
        }
    }
}

impl Serialize for ScalarValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Int64(v) => serializer.serialize_i64(*v),
            Self::Decimal(v) => match serde_json::Number::from_str(&v.to_string()) {
                Ok(n) => n.serialize(serializer),
                Err(_) => serializer.collect_str(v),
            },
            Self::Utf8(v) => serializer.serialize_str(v),
            Self::Date(_) | Self::Time(_) => serializer.collect_str(self),
        }
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int64(value)
    }
}

impl From<Decimal> for ScalarValue {
    fn from(value: Decimal) -> Self {
        ScalarValue::Decimal(value)
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Utf8(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Utf8(value.to_string())
    }
}

impl From<NaiveDate> for ScalarValue {
    fn from(value: NaiveDate) -> Self {
        ScalarValue::Date(value)
    }
}

impl From<NaiveTime> for ScalarValue {
    fn from(value: NaiveTime) -> Self {
        ScalarValue::Time(value)
    }
}

impl<T: Into<ScalarValue>> From<Option<T>> for ScalarValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => ScalarValue::Null,
        }
    }
}

/// A typed result row that can be rendered as a table row.
pub trait TableRow {
    /// Column names, in the order values are produced.
    const COLUMNS: &'static [&'static str];

    fn into_values(self) -> Vec<ScalarValue>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTable {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<ScalarValue>>,
}

impl ResultTable {
    pub fn from_rows<R: TableRow>(
        title: impl Into<String>,
        rows: impl IntoIterator<Item = R>,
    ) -> Self {
        let rows: Vec<_> = rows.into_iter().map(TableRow::into_values).collect();
        debug_assert!(rows.iter().all(|row| row.len() == R::COLUMNS.len()));

        ResultTable {
            title: title.into(),
            columns: R::COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Get a value by row index and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&ScalarValue> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col)
    }

    /// Iterate over a single column.
    pub fn column_values<'a>(
        &'a self,
        column: &str,
    ) -> Option<impl Iterator<Item = &'a ScalarValue> + 'a> {
        let col = self.column_index(column)?;
        Some(self.rows.iter().filter_map(move |row| row.get(col)))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    struct Pair {
        name: &'static str,
        amount: Option<Decimal>,
    }

    impl TableRow for Pair {
        const COLUMNS: &'static [&'static str] = &["name", "amount"];

        fn into_values(self) -> Vec<ScalarValue> {
            vec![self.name.into(), self.amount.into()]
        }
    }

    #[test]
    fn from_rows_and_lookup() {
        let table = ResultTable::from_rows(
            "pairs",
            [
                Pair {
                    name: "a",
                    amount: Some(dec!(1.50)),
                },
                Pair {
                    name: "b",
                    amount: None,
                },
            ],
        );

        assert_eq!(2, table.num_rows());
        assert_eq!(2, table.num_columns());
        assert_eq!(Some(&ScalarValue::Utf8("b".to_string())), table.value(1, "name"));
        assert_eq!(Some(&ScalarValue::Null), table.value(1, "amount"));
        assert_eq!(None, table.value(0, "missing"));
        assert_eq!(None, table.value(5, "name"));

        let amounts: Vec<_> = table.column_values("amount").unwrap().cloned().collect();
        assert_eq!(vec![ScalarValue::Decimal(dec!(1.50)), ScalarValue::Null], amounts);
    }

    #[test]
    fn display_values() {
        assert_eq!("NULL", ScalarValue::Null.to_string());
        assert_eq!("1.50", ScalarValue::Decimal(dec!(1.50)).to_string());
        assert_eq!(
            "2022-11-05",
            ScalarValue::from(NaiveDate::from_ymd_opt(2022, 11, 5).unwrap()).to_string()
        );
        assert_eq!(
            "07:05:00",
            ScalarValue::from(NaiveTime::from_hms_opt(7, 5, 0).unwrap()).to_string()
        );
    }

    #[test]
    fn serialize_json() {
        let values = vec![
            ScalarValue::Null,
            ScalarValue::Int64(3),
            ScalarValue::Decimal(dec!(15.5)),
            ScalarValue::Decimal(dec!(1490)),
            ScalarValue::from("Beauty"),
            ScalarValue::from(NaiveDate::from_ymd_opt(2023, 3, 8).unwrap()),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(r#"[null,3,15.5,1490,"Beauty","2023-03-08"]"#, json);
    }

    #[test]
    fn serialize_json_keeps_decimal_digits() {
        let values = vec![
            ScalarValue::Decimal(dec!(35.00)),
            ScalarValue::Decimal(dec!(12345678901234567890.12)),
            ScalarValue::Decimal(dec!(-0.10)),
            ScalarValue::Decimal(Decimal::MAX),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(
            "[35.00,12345678901234567890.12,-0.10,79228162514264337593543950335]",
            json
        );
    }
}
