use super::executor::RunReport;
use crate::utils::fmt_opt;
use std::io::Write;

/// Print the column mapping, a confirmation line and the first `rows` rows.
///
/// # Errors
///
/// Propagates write errors from `out`.
pub fn write_preview<W: Write>(out: &mut W, report: &RunReport, rows: usize) -> std::io::Result<()> {
    let names: Vec<&str> = report
        .columns
        .iter()
        .map(|c| c.normalized.as_str())
        .collect();
    writeln!(out, "Columns after cleaning: {names:?}")?;

    for rename in report.columns.iter().filter(|c| c.is_changed()) {
        writeln!(out, "  {:?} -> {:?}", rename.raw, rename.normalized)?;
    }
    for shadow in &report.shadowed {
        writeln!(
            out,
            "  {:?} dropped (shadowed by {:?})",
            shadow.raw, shadow.shadowed_by
        )?;
    }
    for imputation in &report.imputations {
        writeln!(
            out,
            "  {}: {} missing value(s) filled with {} = {}",
            imputation.column,
            imputation.cells,
            imputation.strategy.as_str(),
            fmt_opt(Some(imputation.value))
        )?;
    }

    match &report.output_path {
        Some(path) => writeln!(
            out,
            "Cleaning complete. {} row(s) written to {}. First few rows:",
            report.rows_after,
            path.display()
        )?,
        None => writeln!(
            out,
            "Cleaning complete. {} row(s). First few rows:",
            report.rows_after
        )?,
    }
    writeln!(out, "{}", report.frame.head(Some(rows)))?;
    Ok(())
}
