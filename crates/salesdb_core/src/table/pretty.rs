use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use super::ResultTable;

const DEFAULT_PRESET: &str = "││──╞═╪╡│    ┬┴┌┐└┘";
const DEFAULT_MAX_ROWS: usize = 40;

/// Pretty format a result table.
///
/// If the table has more rows than `max_rows`, rows are taken evenly from the
/// start and end of the table with a placeholder row in the middle. A
/// `max_rows` of zero displays everything.
pub fn pretty_format_table(
    table: &ResultTable,
    width: Option<usize>,
    max_rows: Option<usize>,
) -> Table {
    let mut out = default_table();
    if let Some(width) = width {
        out.set_width(width.min(u16::MAX as usize) as u16);
    }

    if table.columns.is_empty() {
        return out;
    }

    out.set_header(table.columns.iter().map(Cell::new));

    let total_rows = table.num_rows();
    let mut max_rows = max_rows.unwrap_or(DEFAULT_MAX_ROWS);
    if max_rows == 0 || max_rows > total_rows {
        max_rows = total_rows;
    }

    let (n_head, n_tail) = if max_rows >= total_rows {
        (total_rows, 0)
    } else {
        (max_rows.div_ceil(2), max_rows / 2)
    };

    for row in &table.rows[..n_head] {
        out.add_row(row.iter().map(|v| Cell::new(v.to_string())));
    }

    if n_head + n_tail < total_rows {
        out.add_row(table.columns.iter().map(|_| Cell::new("…")));
    }

    for row in &table.rows[(total_rows - n_tail)..] {
        out.add_row(row.iter().map(|v| Cell::new(v.to_string())));
    }

    // Right align columns holding numbers.
    let numeric: Vec<bool> = (0..table.num_columns())
        .map(|col| {
            table
                .rows
                .iter()
                .filter_map(|row| row.get(col))
                .find(|v| !v.is_null())
                .is_some_and(|v| v.is_numeric())
        })
        .collect();

    for (column, is_numeric) in out.column_iter_mut().zip(numeric) {
        if is_numeric {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }

    out
}

fn default_table() -> Table {
    let mut table = Table::new();
    table.load_preset(DEFAULT_PRESET);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}
