use std::io::{self, IsTerminal};
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use salesdb_core::{
    CleaningPolicy,
    DialectOptions,
    DisplayOptions,
    LoadOptions,
    MalformedPolicy,
    QueryParams,
};
use salesdb_error::{DbError, Result};

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputMode {
    #[default]
    Table,
    Json,
    Ndjson,
    Csv,
}

impl From<OutputMode> for salesdb_core::OutputMode {
    fn from(mode: OutputMode) -> Self {
        match mode {
            OutputMode::Table => salesdb_core::OutputMode::Table,
            OutputMode::Json => salesdb_core::OutputMode::Json,
            OutputMode::Ndjson => salesdb_core::OutputMode::Ndjson,
            OutputMode::Csv => salesdb_core::OutputMode::Csv,
        }
    }
}

#[derive(Debug, Clone, Parser)]
pub struct AnalyzeArgs {
    /// Path to the sales file.
    pub file: PathBuf,

    /// Query to run, by name or number. May be repeated.
    ///
    /// Runs all ten analysis queries if not provided. See `salesdb list`.
    #[clap(short, long = "query")]
    pub queries: Vec<String>,

    #[clap(flatten)]
    pub params: QueryArgs,

    #[clap(flatten)]
    pub load: LoadArgs,

    #[clap(flatten)]
    pub display: DisplayArgs,
}

#[derive(Debug, Clone, Parser)]
pub struct ExploreArgs {
    /// Path to the sales file.
    pub file: PathBuf,

    #[clap(flatten)]
    pub load: LoadArgs,

    #[clap(flatten)]
    pub display: DisplayArgs,
}

#[derive(Debug, Clone, Parser)]
pub struct GenerateArgs {
    /// Number of rows to generate.
    #[clap(long, default_value_t = 2000)]
    pub rows: usize,

    /// Seed for the random number generator.
    #[clap(long, default_value_t = 0)]
    pub seed: u64,

    /// Fraction of rows that get one column nulled out, between 0 and 1.
    #[clap(long, default_value_t = 0.0)]
    pub null_rate: f64,

    /// File to write to. Writes to stdout if not provided.
    #[clap(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Parser)]
pub struct ListArgs {
    #[clap(flatten)]
    pub display: DisplayArgs,
}

/// Parameters for the parameterized queries.
#[derive(Debug, Clone, Parser)]
pub struct QueryArgs {
    /// Date to list sales for (YYYY-MM-DD).
    #[clap(long)]
    pub date: Option<NaiveDate>,

    /// Category to sum quantities for.
    #[clap(long)]
    pub category_quantity: Option<String>,

    /// Category to average customer age for.
    #[clap(long)]
    pub category_age: Option<String>,

    /// Sales with a total above this are high value.
    #[clap(long)]
    pub threshold: Option<Decimal>,

    /// Number of top customers to show.
    #[clap(long)]
    pub top: Option<usize>,
}

impl QueryArgs {
    pub fn query_params(&self) -> QueryParams {
        let defaults = QueryParams::default();
        QueryParams {
            sale_date: self.date.unwrap_or(defaults.sale_date),
            quantity_category: self
                .category_quantity
                .clone()
                .unwrap_or(defaults.quantity_category),
            age_category: self.category_age.clone().unwrap_or(defaults.age_category),
            high_value_threshold: self.threshold.unwrap_or(defaults.high_value_threshold),
            top_customers: self.top.unwrap_or(defaults.top_customers),
        }
    }
}

#[derive(Debug, Clone, Parser)]
pub struct LoadArgs {
    /// Also drop rows missing an age or a unit price.
    #[clap(long, env = "SALESDB_STRICT")]
    pub strict: bool,

    /// Skip rows that can't be parsed instead of failing.
    #[clap(long)]
    pub skip_malformed: bool,

    /// Field delimiter. Inferred from the file if not provided.
    #[clap(long)]
    pub delimiter: Option<char>,

    /// The file has no header row, columns are in schema order.
    #[clap(long)]
    pub no_header: bool,
}

impl LoadArgs {
    pub fn load_options(&self) -> Result<LoadOptions> {
        let dialect = match self.delimiter {
            Some(c) if c.is_ascii() => Some(DialectOptions {
                delimiter: c as u8,
                ..Default::default()
            }),
            Some(c) => {
                return Err(DbError::invalid_input("Delimiter must be an ascii character")
                    .with_field("delimiter", c));
            }
            None => None,
        };

        Ok(LoadOptions {
            dialect,
            has_header: !self.no_header,
            malformed: if self.skip_malformed {
                MalformedPolicy::Skip
            } else {
                MalformedPolicy::Abort
            },
        })
    }

    pub fn cleaning_policy(&self) -> CleaningPolicy {
        if self.strict {
            CleaningPolicy::Strict
        } else {
            CleaningPolicy::Lenient
        }
    }
}

#[derive(Debug, Clone, Parser)]
pub struct DisplayArgs {
    /// Display output mode.
    #[clap(long, value_enum, env = "SALESDB_MODE", default_value_t = OutputMode::Table)]
    pub mode: OutputMode,

    /// Max width for tables to display. Defaults to the terminal width.
    #[clap(long)]
    pub max_width: Option<usize>,

    /// Max number of rows to display per table, 0 for all.
    #[clap(long, env = "SALESDB_MAX_ROWS")]
    pub max_rows: Option<usize>,
}

impl DisplayArgs {
    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            mode: self.mode.into(),
            max_width: self.max_width.or_else(terminal_width),
            max_rows: self.max_rows,
        }
    }
}

fn terminal_width() -> Option<usize> {
    if !io::stdout().is_terminal() {
        return None;
    }
    crossterm::terminal::size()
        .ok()
        .map(|(cols, _rows)| cols as usize)
}
