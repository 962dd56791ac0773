use std::io::Write;

use salesdb_error::{Result, ResultExt};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use super::pretty::pretty_format_table;
use super::{ResultTable, ScalarValue};

/// How results are written out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Boxed table, one per query, preceded by its title.
    #[default]
    Table,
    /// A json array of row objects per query.
    Json,
    /// One json object per row.
    Ndjson,
    /// Csv with a header row per query.
    Csv,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    pub mode: OutputMode,
    /// Max width of a pretty table.
    pub max_width: Option<usize>,
    /// Max number of rows in a pretty table.
    pub max_rows: Option<usize>,
}

/// Write a single result table.
pub fn write_table<W: Write>(
    writer: &mut W,
    table: &ResultTable,
    opts: &DisplayOptions,
) -> Result<()> {
    match opts.mode {
        OutputMode::Table => {
            writeln!(writer, "{}", table.title)?;
            writeln!(
                writer,
                "{}",
                pretty_format_table(table, opts.max_width, opts.max_rows)
            )?;
        }
        OutputMode::Json => {
            serde_json::to_writer(&mut *writer, &JsonRows(table))
                .context("Failed to write json")?;
            writeln!(writer)?;
        }
        OutputMode::Ndjson => {
            for row in &table.rows {
                serde_json::to_writer(
                    &mut *writer,
                    &JsonRow {
                        columns: &table.columns,
                        values: row,
                    },
                )
                .context("Failed to write json")?;
                writeln!(writer)?;
            }
        }
        OutputMode::Csv => {
            let mut csv_writer = csv::Writer::from_writer(&mut *writer);
            csv_writer.write_record(&table.columns)?;
            for row in &table.rows {
                csv_writer.write_record(row.iter().map(|v| match v {
                    ScalarValue::Null => String::new(),
                    v => v.to_string(),
                }))?;
            }
            csv_writer.flush()?;
        }
    }

    Ok(())
}

struct JsonRows<'a>(&'a ResultTable);

impl Serialize for JsonRows<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.rows.len()))?;
        for row in &self.0.rows {
            seq.serialize_element(&JsonRow {
                columns: &self.0.columns,
                values: row,
            })?;
        }
        seq.end()
    }
}

struct JsonRow<'a> {
    columns: &'a [String],
    values: &'a [ScalarValue],
}

impl Serialize for JsonRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (col, value) in self.columns.iter().zip(self.values) {
            map.serialize_entry(col, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn category_totals() -> ResultTable {
        ResultTable {
            title: "category totals".to_string(),
            columns: vec!["category".to_string(), "net_sale".to_string()],
            rows: vec![
                vec![ScalarValue::from("Beauty"), ScalarValue::Decimal(dec!(1850))],
                vec![ScalarValue::from("Clothing"), ScalarValue::Null],
            ],
        }
    }

    fn render(mode: OutputMode) -> String {
        let mut buf = Vec::new();
        let opts = DisplayOptions {
            mode,
            ..Default::default()
        };
        write_table(&mut buf, &category_totals(), &opts).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn json_mode() {
        assert_eq!(
            "[{\"category\":\"Beauty\",\"net_sale\":1850},{\"category\":\"Clothing\",\"net_sale\":null}]\n",
            render(OutputMode::Json)
        );
    }

    #[test]
    fn json_keeps_rounded_scale() {
        let table = ResultTable {
            title: "average age".to_string(),
            columns: vec!["category".to_string(), "avg_age".to_string()],
            rows: vec![vec![ScalarValue::from("Clothing"), ScalarValue::Decimal(dec!(35.00))]],
        };
        let mut buf = Vec::new();
        let opts = DisplayOptions {
            mode: OutputMode::Json,
            ..Default::default()
        };
        write_table(&mut buf, &table, &opts).unwrap();
        assert_eq!(
            "[{\"category\":\"Clothing\",\"avg_age\":35.00}]\n",
            String::from_utf8(buf).unwrap()
        );
    }

    #[test]
    fn ndjson_mode() {
        assert_eq!(
            "{\"category\":\"Beauty\",\"net_sale\":1850}\n{\"category\":\"Clothing\",\"net_sale\":null}\n",
            render(OutputMode::Ndjson)
        );
    }

    #[test]
    fn csv_mode() {
        assert_eq!(
            "category,net_sale\nBeauty,1850\nClothing,\n",
            render(OutputMode::Csv)
        );
    }

    #[test]
    fn table_mode_has_title() {
        let out = render(OutputMode::Table);
        assert!(out.starts_with("category totals\n"));
        assert!(out.contains("Beauty"));
        assert!(out.contains("1850"));
    }
}
