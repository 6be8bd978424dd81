//! CSV rendering of the visible columns of a view

use csv::{QuoteStyle, Terminator, WriterBuilder};
use thiserror::Error;

use super::{ColumnSet, ReportRow};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer flush failed: {0}")]
    Flush(String),

    #[error("CSV output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Header of visible labels, then one line per row, in the given order.
///
/// Lines are joined with `\n` and there is no trailing newline. Fields holding
/// a comma, quote or line break are quoted; nothing else is.
pub fn export_csv<'a, T, I>(columns: &ColumnSet<T::Column>, rows: I) -> Result<String, ExportError>
where
    T: ReportRow + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let visible: Vec<_> = columns.visible().collect();

    let mut lines = vec![csv_line(visible.iter().map(|c| c.label.clone()).collect())?];
    for row in rows {
        lines.push(csv_line(visible.iter().map(|c| row.cell(c.key).to_text()).collect())?);
    }
    Ok(lines.join("\n"))
}

/// One record without its terminator
fn csv_line(fields: Vec<String>) -> Result<String, ExportError> {
    // The writer quotes a lone empty field and cannot write a record with no
    // fields; both are an empty line here
    if fields.iter().all(String::is_empty) && fields.len() <= 1 {
        return Ok(String::new());
    }

    let mut writer = WriterBuilder::new()
        .delimiter(b',')
        .terminator(Terminator::Any(b'\n'))
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());
    writer.write_record(&fields)?;

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.error().to_string()))?;
    let mut line = String::from_utf8(bytes)?;
    if line.ends_with('\n') {
        line.pop();
    }
    Ok(line)
}
