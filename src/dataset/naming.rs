use crate::error::Result;
use polars::prelude::*;
use std::collections::HashMap;

/// A raw header and the name it is written out under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRename {
    pub raw: String,
    pub normalized: String,
}

impl ColumnRename {
    pub fn is_changed(&self) -> bool {
        self.raw != self.normalized
    }
}

/// A raw column dropped because a later column normalized to the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowedColumn {
    pub raw: String,
    pub normalized: String,
    /// Raw name of the column that took its place.
    pub shadowed_by: String,
}

/// Outcome of normalizing a header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamePlan {
    /// Surviving columns, in output order.
    pub columns: Vec<ColumnRename>,
    pub shadowed: Vec<ShadowedColumn>,
}

/// Trim, lowercase, and replace every internal space with `_`.
///
/// Only the space character is replaced; other internal whitespace such as a
/// tab is kept as is.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Normalize a header row, resolving collisions last-write-wins.
///
/// When several raw names normalize to the same name, the right-most one
/// survives at its own position; the others are reported as shadowed.
pub fn plan_column_names<S: AsRef<str>>(raw: &[S]) -> NamePlan {
    let normalized: Vec<String> = raw
        .iter()
        .map(|name| normalize_column_name(name.as_ref()))
        .collect();

    let mut last_index: HashMap<&str, usize> = HashMap::new();
    for (idx, name) in normalized.iter().enumerate() {
        last_index.insert(name.as_str(), idx);
    }

    let mut plan = NamePlan::default();
    for (idx, (raw_name, clean)) in raw.iter().zip(&normalized).enumerate() {
        let winner = last_index.get(clean.as_str()).copied().unwrap_or(idx);
        if winner == idx {
            plan.columns.push(ColumnRename {
                raw: raw_name.as_ref().to_owned(),
                normalized: clean.clone(),
            });
        } else {
            let shadowed_by = raw
                .get(winner)
                .map(|s| s.as_ref().to_owned())
                .unwrap_or_default();
            plan.shadowed.push(ShadowedColumn {
                raw: raw_name.as_ref().to_owned(),
                normalized: clean.clone(),
                shadowed_by,
            });
        }
    }
    plan
}

/// Apply [`plan_column_names`] to a frame.
pub fn normalize_column_names(df: DataFrame) -> Result<(DataFrame, NamePlan)> {
    let raw: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let plan = plan_column_names(&raw);

    for shadow in &plan.shadowed {
        tracing::warn!(
            "Column '{}' shadowed by '{}' (both normalize to '{}')",
            shadow.raw,
            shadow.shadowed_by,
            shadow.normalized
        );
    }

    let exprs: Vec<Expr> = plan
        .columns
        .iter()
        .map(|c| col(c.raw.as_str()).alias(c.normalized.as_str()))
        .collect();
    let df = df.lazy().select(exprs).collect()?;

    Ok((df, plan))
}
