use chrono::Local;
use std::path::{Path, PathBuf};

/// Default location of the raw sales file, relative to the base directory.
pub const DATA_RAW_FILE: &str = "data/raw/sales_data_raw.csv";

/// Default location of the cleaned sales file, relative to the base directory.
pub const DATA_PROCESSED_FILE: &str = "data/processed/sales_data_clean.csv";

/// Formats an optional f64 to 4 decimal places, or returns "—" if None or non-finite.
pub fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => format!("{x:.4}"),
        _ => "—".to_owned(),
    }
}

/// Expand path template variables (currently only `{date}`, as `%Y-%m-%d`).
pub fn expand_path_template(template: &str) -> PathBuf {
    let today = Local::now().format("%Y-%m-%d").to_string();
    PathBuf::from(template.replace("{date}", &today))
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
