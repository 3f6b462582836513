use arrow::{
    array::RecordBatch,
    util::display::{ArrayFormatter, FormatOptions},
};
use snafu::ResultExt;
use tabled::{
    builder::Builder,
    settings::{Style, object::Rows, style::LineText, width::MinWidth},
};
use vo_catalog_core::{Table, metadata::FieldMetadata};

use crate::error::{CliResult, FormatSnafu};

/// Render rows under a header with rounded borders and an optional label on
/// the top border.
pub fn render_table(columns: &[String], rows: &[Vec<String>], label: Option<&str>) -> String {
    if columns.is_empty() {
        return String::new();
    }

    let mut builder = Builder::default();
    builder.push_record(columns);
    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::rounded());

    if let Some(label) = label {
        const LABEL_OFFSET: usize = 6;
        let min_width = LABEL_OFFSET + label.len() + 4;
        table.with(MinWidth::new(min_width));
        table.with(LineText::new(label, Rows::first()).offset(LABEL_OFFSET));
        // LineText re-estimates dimensions, so re-apply MinWidth afterwards.
        table.with(MinWidth::new(min_width));
    }
    table.to_string()
}

fn health(table: &Table) -> &'static str {
    if table.is_healthy() { "ok" } else { "degraded" }
}

/// One summary line per table: where it lives and what it is.
pub fn render_table_list(tables: &[Table]) -> String {
    let columns = ["path", "name", "title", "rows", "health"].map(String::from);
    let rows: Vec<Vec<String>> = tables
        .iter()
        .map(|t| {
            vec![
                t.path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                t.name().to_string(),
                t.title().to_string(),
                t.num_rows().to_string(),
                health(t).to_string(),
            ]
        })
        .collect();
    render_table(&columns, &rows, None)
}

pub fn render_fields(fields: &[FieldMetadata]) -> String {
    let columns = ["name", "datatype", "unit", "ucd", "description"].map(String::from);
    let rows: Vec<Vec<String>> = fields
        .iter()
        .map(|f| {
            vec![
                f.name.clone(),
                f.datatype.to_string(),
                f.unit.as_ref().map(|u| u.to_string()).unwrap_or_default(),
                f.ucd.clone(),
                f.description.clone(),
            ]
        })
        .collect();
    render_table(&columns, &rows, Some("Fields"))
}

/// The first `max_rows` rows of `batch`, formatted as text.
pub fn preview_rows(batch: &RecordBatch, max_rows: usize) -> CliResult<Vec<Vec<String>>> {
    let options = FormatOptions::default().with_null("null");
    let formatters = batch
        .columns()
        .iter()
        .map(|c| ArrayFormatter::try_new(c.as_ref(), &options))
        .collect::<Result<Vec<_>, _>>()
        .context(FormatSnafu)?;

    let shown = batch.num_rows().min(max_rows);
    Ok((0..shown)
        .map(|row| formatters.iter().map(|f| f.value(row).to_string()).collect())
        .collect())
}

pub fn render_preview(batch: &RecordBatch, max_rows: usize) -> CliResult<Option<String>> {
    if batch.num_columns() == 0 {
        return Ok(None);
    }
    let columns: Vec<String> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let rows = preview_rows(batch, max_rows)?;
    Ok(Some(render_table(&columns, &rows, Some("Preview output"))))
}

pub fn preview_message(batch: &RecordBatch, max_rows: usize) -> Option<String> {
    if batch.num_rows() == 0 {
        return Some("(no rows)".to_string());
    }
    if max_rows == 0 {
        return Some("(preview suppressed; use --max-rows > 0)".to_string());
    }
    if batch.num_rows() > max_rows {
        return Some(format!("({} of {} rows shown)", max_rows, batch.num_rows()));
    }
    None
}
