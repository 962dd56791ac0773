use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use clap::Subcommand;
use rayon::prelude::*;
use salesdb_core::generate::{GenerateOptions, generate_records, write_csv};
use salesdb_core::table::ScalarValue;
use salesdb_core::{
    CleanedDataset,
    DisplayOptions,
    LoadOptions,
    OutputMode,
    Query,
    ResultTable,
    clean,
    load_path,
    write_table,
};
use salesdb_error::{DbError, ResultExt};
use tracing::{debug, info, warn};

use crate::args::{AnalyzeArgs, ExploreArgs, GenerateArgs, ListArgs, LoadArgs};

#[derive(Subcommand)]
pub enum Commands {
    /// Load, clean and run analysis queries over a sales file.
    Analyze(AnalyzeArgs),
    /// Show load and cleaning reports with a summary of a sales file.
    Explore(ExploreArgs),
    /// Write a synthetic sales file.
    Generate(GenerateArgs),
    /// List the available queries.
    List(ListArgs),
}

impl Commands {
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Analyze(analyze) => analyze.run(),
            Commands::Explore(explore) => explore.run(),
            Commands::Generate(generate) => generate.run(),
            Commands::List(list) => list.run(),
        }
    }
}

trait RunCommand {
    fn run(self) -> Result<()>;
}

impl RunCommand for AnalyzeArgs {
    fn run(self) -> Result<()> {
        let queries = if self.queries.is_empty() {
            Query::ANALYSES.to_vec()
        } else {
            self.queries
                .iter()
                .map(|q| q.parse::<Query>())
                .collect::<Result<Vec<_>, DbError>>()?
        };

        let params = self.params.query_params();
        let dataset = load_and_clean(&self.file, &self.load)?;

        let tables: Vec<ResultTable> = queries
            .par_iter()
            .map(|query| {
                let start = Instant::now();
                let table = query.execute(&dataset, &params);
                debug!(%query, rows = table.num_rows(), elapsed = ?start.elapsed(), "executed query");
                table
            })
            .collect();

        write_tables(&tables, &self.display.display_options())
    }
}

impl RunCommand for ExploreArgs {
    fn run(self) -> Result<()> {
        let opts = self.load.load_options()?;
        let loaded = load_path(&self.file, &opts)?;
        let dataset = clean(&loaded.records, self.load.cleaning_policy());

        let load_report = &loaded.report;
        let load_table = metrics_table(
            "Load report",
            vec![
                (
                    "delimiter".to_string(),
                    (load_report.dialect.delimiter as char).to_string().into(),
                ),
                ("rows_read".to_string(), count(load_report.rows_read)),
                ("rows_loaded".to_string(), count(loaded.records.len())),
                ("rows_skipped".to_string(), count(load_report.skipped)),
            ],
        );

        let clean_report = dataset.report();
        let mut clean_rows = vec![
            (
                "policy".to_string(),
                format!("{:?}", dataset.policy()).to_lowercase().into(),
            ),
            ("input_rows".to_string(), count(clean_report.input_rows)),
            ("kept_rows".to_string(), count(clean_report.kept_rows)),
            ("dropped_rows".to_string(), count(clean_report.dropped_rows())),
        ];
        clean_rows.extend(
            clean_report
                .missing_by_column
                .iter()
                .map(|(col, n)| (format!("missing_{col}"), count(*n))),
        );
        let clean_table = metrics_table("Cleaning report", clean_rows);

        let overview = Query::Overview.execute(&dataset, &Default::default());

        write_tables(
            &[load_table, clean_table, overview],
            &self.display.display_options(),
        )
    }
}

impl RunCommand for GenerateArgs {
    fn run(self) -> Result<()> {
        let records = generate_records(&GenerateOptions {
            rows: self.rows,
            seed: self.seed,
            null_rate: self.null_rate,
        })?;

        match &self.output {
            Some(path) => {
                let file = File::create(path)
                    .context_fn(|| format!("Failed to create '{}'", path.display()))?;
                write_csv(BufWriter::new(file), &records)?;
                info!(rows = records.len(), path = %path.display(), "wrote sales");
            }
            None => write_csv(io::stdout().lock(), &records)?,
        }

        Ok(())
    }
}

impl RunCommand for ListArgs {
    fn run(self) -> Result<()> {
        let table = ResultTable {
            title: "Queries".to_string(),
            columns: vec![
                "number".to_string(),
                "name".to_string(),
                "description".to_string(),
            ],
            rows: Query::ALL
                .iter()
                .map(|q| {
                    vec![
                        q.number().map(|n| n as i64).into(),
                        q.name().into(),
                        q.description().into(),
                    ]
                })
                .collect(),
        };

        write_tables(&[table], &self.display.display_options())
    }
}

fn load_and_clean(path: &Path, args: &LoadArgs) -> Result<CleanedDataset> {
    let opts: LoadOptions = args.load_options()?;
    let loaded = load_path(path, &opts)?;
    let dataset = clean(&loaded.records, args.cleaning_policy());
    if dataset.is_empty() {
        warn!(path = %path.display(), "no valid sales after cleaning");
    }
    Ok(dataset)
}

fn count(n: usize) -> ScalarValue {
    ScalarValue::Int64(n as i64)
}

fn metrics_table(title: &str, rows: Vec<(String, ScalarValue)>) -> ResultTable {
    ResultTable {
        title: title.to_string(),
        columns: vec!["metric".to_string(), "value".to_string()],
        rows: rows
            .into_iter()
            .map(|(name, value)| vec![name.into(), value])
            .collect(),
    }
}

fn write_tables(tables: &[ResultTable], opts: &DisplayOptions) -> Result<()> {
    let mut stdout = BufWriter::new(io::stdout().lock());
    for (idx, table) in tables.iter().enumerate() {
        if idx > 0 && opts.mode == OutputMode::Table {
            writeln!(stdout)?;
        }
        write_table(&mut stdout, table, opts)?;
    }
    stdout.flush()?;

    Ok(())
}
