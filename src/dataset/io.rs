use crate::error::{CleanError, Result, ResultExt as _};
use polars::prelude::*;
use std::path::Path;

/// Mode of a newly created output file, before the umask applies.
#[cfg(unix)]
const OUTPUT_FILE_MODE: u32 = 0o644;

/// Read a delimited file with a header row.
///
/// Column types are inferred from every row, so a stray value far down a
/// numeric column turns that column into text instead of failing the load.
/// Rows with fewer fields than the header are padded with nulls.
///
/// # Errors
///
/// [`CleanError::NotFound`] if `path` is not an existing file,
/// [`CleanError::Parse`] if the content is not valid delimited data.
pub fn load_csv(path: &Path, delimiter: u8) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(CleanError::NotFound(path.to_path_buf()));
    }

    let parse_err = |e: PolarsError| CleanError::Parse(format!("{}: {e}", path.display()));

    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_separator(delimiter)
        .with_infer_schema_length(None)
        .finish()
        .map_err(parse_err)?
        .collect()
        .map_err(parse_err)?;

    tracing::debug!(
        "Loaded {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Write `df` as a delimited file with a header row.
///
/// The destination directory is created if absent. Data goes to a temporary
/// file next to `path` first and is renamed into place, so a failed write
/// never leaves a partial file behind. An existing destination keeps its
/// permissions; a new one gets the usual `0644` (less the umask).
///
/// # Errors
///
/// [`CleanError::Config`] if `path` exists and `overwrite` is false,
/// [`CleanError::Io`] / [`CleanError::DataProcessing`] if writing fails.
pub fn save_csv(df: &mut DataFrame, path: &Path, delimiter: u8, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        return Err(CleanError::Config(format!(
            "Output file already exists and overwrite is false: {}",
            path.display()
        )));
    }

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create output directory {}", parent.display()))?;

    let mut builder = tempfile::Builder::new();
    builder.prefix(".salesclean-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        builder.permissions(std::fs::Permissions::from_mode(OUTPUT_FILE_MODE));
    }
    let mut tmp = builder.tempfile_in(parent)?;
    if let Ok(existing) = std::fs::metadata(path) {
        tmp.as_file().set_permissions(existing.permissions())?;
    }
    CsvWriter::new(tmp.as_file_mut())
        .include_header(true)
        .with_separator(delimiter)
        .finish(df)?;
    tmp.persist(path)?;

    tracing::debug!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}
