use crate::error::Result;
use crate::pipeline::spec::{ColumnKind, ImputeStrategy, MissingPolicy, ResolvedField};
use polars::prelude::*;

/// Cells in one column that could not be read as the declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coercion {
    pub column: String,
    pub cells: usize,
}

/// Missing cells filled in one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Imputation {
    pub column: String,
    pub strategy: ImputeStrategy,
    pub value: f64,
    pub cells: usize,
}

/// Rows removed because one column held a value out of range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    pub column: String,
    pub rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissingOutcome {
    pub imputations: Vec<Imputation>,
    pub rows_dropped: usize,
    pub warnings: Vec<String>,
}

/// Strip leading/trailing whitespace from every `String` column.
pub fn trim_text_columns(df: DataFrame) -> Result<DataFrame> {
    let exprs: Vec<Expr> = df
        .get_columns()
        .iter()
        .map(|c| {
            let name = c.name().as_str();
            if c.dtype() == &DataType::String {
                col(name).str().strip_chars(lit(NULL)).alias(name)
            } else {
                col(name)
            }
        })
        .collect();

    Ok(df.lazy().select(exprs).collect()?)
}

/// Cast each resolved field to its declared type.
///
/// Numeric fields become `Float64`; text that does not parse (and `NaN`)
/// becomes null. Text fields become `String`. Returns one [`Coercion`] per
/// column that gained nulls.
pub fn coerce_columns(
    df: DataFrame,
    fields: &[ResolvedField<'_>],
) -> Result<(DataFrame, Vec<Coercion>)> {
    let mut exprs = Vec::with_capacity(fields.len());
    let mut nulls_before = Vec::with_capacity(fields.len());

    for field in fields {
        let name = field.column.as_str();
        nulls_before.push(df.column(name)?.null_count());
        let expr = match field.spec.kind {
            ColumnKind::Numeric => col(name).cast(DataType::Float64).fill_nan(lit(NULL)),
            ColumnKind::Text => col(name).cast(DataType::String),
        };
        exprs.push(expr.alias(name));
    }

    if exprs.is_empty() {
        return Ok((df, Vec::new()));
    }

    let df = df.lazy().with_columns(exprs).collect()?;

    let mut coercions = Vec::new();
    for (field, before) in fields.iter().zip(nulls_before) {
        let after = df.column(field.column.as_str())?.null_count();
        let cells = after.saturating_sub(before);
        if cells > 0 {
            tracing::warn!(
                "{cells} value(s) in '{}' could not be read as {} and are now missing",
                field.column,
                field.spec.kind.as_str()
            );
            coercions.push(Coercion {
                column: field.column.clone(),
                cells,
            });
        }
    }

    Ok((df, coercions))
}

/// Apply the missing-value policy to the numeric fields.
///
/// `Impute` fills each numeric field that declares a strategy; statistics are
/// taken over the non-missing values as they stand now. `Drop` removes every
/// row with a missing value in any numeric field.
pub fn handle_missing(
    df: DataFrame,
    fields: &[ResolvedField<'_>],
    policy: MissingPolicy,
) -> Result<(DataFrame, MissingOutcome)> {
    let numeric: Vec<&ResolvedField<'_>> = fields
        .iter()
        .filter(|f| f.spec.kind == ColumnKind::Numeric)
        .collect();

    match policy {
        MissingPolicy::Impute => impute_missing(df, &numeric),
        MissingPolicy::Drop => drop_missing(df, &numeric),
    }
}

fn impute_missing(
    df: DataFrame,
    fields: &[&ResolvedField<'_>],
) -> Result<(DataFrame, MissingOutcome)> {
    let mut outcome = MissingOutcome::default();
    let mut exprs = Vec::new();

    for field in fields {
        let Some(strategy) = field.spec.impute else {
            continue;
        };
        let name = field.column.as_str();
        let series = df.column(name)?.as_materialized_series();
        let cells = series.null_count();
        if cells == 0 {
            continue;
        }

        let value = match strategy {
            ImputeStrategy::Zero => Some(0.0),
            ImputeStrategy::Median => series.median(),
            ImputeStrategy::Mean => series.mean(),
        };

        let Some(value) = value else {
            let warning = format!(
                "'{name}' has no observed values; {cells} missing cell(s) cannot be imputed"
            );
            tracing::warn!("{warning}");
            outcome.warnings.push(warning);
            continue;
        };

        tracing::info!(
            "Filling {cells} missing value(s) in '{name}' with {} ({value})",
            strategy.as_str()
        );
        exprs.push(col(name).fill_null(lit(value)).alias(name));
        outcome.imputations.push(Imputation {
            column: name.to_owned(),
            strategy,
            value,
            cells,
        });
    }

    if exprs.is_empty() {
        return Ok((df, outcome));
    }

    let df = df.lazy().with_columns(exprs).collect()?;
    Ok((df, outcome))
}

fn drop_missing(
    df: DataFrame,
    fields: &[&ResolvedField<'_>],
) -> Result<(DataFrame, MissingOutcome)> {
    let mut outcome = MissingOutcome::default();

    let Some(predicate) = fields
        .iter()
        .map(|f| col(f.column.as_str()).is_not_null())
        .reduce(|acc, e| acc.and(e))
    else {
        return Ok((df, outcome));
    };

    let before = df.height();
    let df = df.lazy().filter(predicate).collect()?;
    outcome.rows_dropped = before - df.height();

    if outcome.rows_dropped > 0 {
        tracing::info!(
            "Dropped {} row(s) with missing numeric values",
            outcome.rows_dropped
        );
    }
    Ok((df, outcome))
}

/// Remove rows holding a negative value in any `non_negative` numeric field.
///
/// Each field is checked on its own, in schema order. A value that is still
/// missing fails the check as well.
pub fn filter_invalid_rows(
    df: DataFrame,
    fields: &[ResolvedField<'_>],
) -> Result<(DataFrame, Vec<RowFilter>)> {
    let mut df = df;
    let mut filters = Vec::new();

    for field in fields
        .iter()
        .filter(|f| f.spec.kind == ColumnKind::Numeric && f.spec.non_negative)
    {
        let name = field.column.as_str();
        let before = df.height();
        df = df.lazy().filter(col(name).gt_eq(lit(0.0))).collect()?;
        let rows = before - df.height();
        if rows > 0 {
            tracing::info!("Dropped {rows} row(s) with negative or missing '{name}'");
            filters.push(RowFilter {
                column: name.to_owned(),
                rows,
            });
        }
    }

    Ok((df, filters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::spec::FieldSpec;

    fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
        Ok(df
            .column(name)?
            .as_materialized_series()
            .f64()?
            .into_iter()
            .collect())
    }

    fn resolved<'a>(spec: &'a FieldSpec, column: &str) -> ResolvedField<'a> {
        ResolvedField {
            spec,
            column: column.to_owned(),
        }
    }

    #[test]
    fn test_trim_text_columns() -> Result<()> {
        let df = df!(
            "category" => &["  Toys ", "Books\t", "Games"],
            "price" => &[1.0, 2.0, 3.0]
        )?;

        let df = trim_text_columns(df)?;
        let cats: Vec<Option<&str>> = df
            .column("category")?
            .as_materialized_series()
            .str()?
            .into_iter()
            .collect();
        assert_eq!(cats, vec![Some("Toys"), Some("Books"), Some("Games")]);
        assert_eq!(f64_values(&df, "price")?, vec![Some(1.0), Some(2.0), Some(3.0)]);
        Ok(())
    }

    #[test]
    fn test_coerce_counts_unparsable_cells() -> Result<()> {
        let df = df!(
            "price" => &[Some("5"), Some("abc"), None, Some("NaN"), Some("2.5")],
            "sku" => &[1i64, 2, 3, 4, 5]
        )?;
        let price = FieldSpec::numeric("price");
        let sku = FieldSpec::text("sku");
        let fields = vec![resolved(&price, "price"), resolved(&sku, "sku")];

        let (df, coercions) = coerce_columns(df, &fields)?;

        assert_eq!(
            f64_values(&df, "price")?,
            vec![Some(5.0), None, None, None, Some(2.5)]
        );
        assert_eq!(df.column("sku")?.dtype(), &DataType::String);
        assert_eq!(
            coercions,
            vec![Coercion {
                column: "price".to_owned(),
                cells: 2
            }]
        );
        Ok(())
    }

    #[test]
    fn test_impute_zero_and_median() -> Result<()> {
        let df = df!(
            "quantity" => &[Some(1.0), None, Some(3.0), Some(-2.0)],
            "price" => &[Some(10.0), Some(4.0), None, Some(7.0)]
        )?;
        let quantity = FieldSpec::numeric("quantity").impute(ImputeStrategy::Zero);
        let price = FieldSpec::numeric("price").impute(ImputeStrategy::Median);
        let fields = vec![resolved(&quantity, "quantity"), resolved(&price, "price")];

        let (df, outcome) = handle_missing(df, &fields, MissingPolicy::Impute)?;

        assert_eq!(df.height(), 4);
        assert_eq!(
            f64_values(&df, "quantity")?,
            vec![Some(1.0), Some(0.0), Some(3.0), Some(-2.0)]
        );
        // median of 10, 4, 7
        assert_eq!(
            f64_values(&df, "price")?,
            vec![Some(10.0), Some(4.0), Some(7.0), Some(7.0)]
        );
        assert_eq!(outcome.imputations.len(), 2);
        assert_eq!(outcome.rows_dropped, 0);
        Ok(())
    }

    #[test]
    fn test_impute_without_observations_warns() -> Result<()> {
        let df = df!("price" => &[None::<f64>, None])?;
        let price = FieldSpec::numeric("price").impute(ImputeStrategy::Median);
        let fields = vec![resolved(&price, "price")];

        let (df, outcome) = handle_missing(df, &fields, MissingPolicy::Impute)?;

        assert_eq!(df.column("price")?.null_count(), 2);
        assert!(outcome.imputations.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
        Ok(())
    }

    #[test]
    fn test_drop_missing_rows() -> Result<()> {
        let df = df!(
            "category" => &[Some("a"), None, Some("c"), Some("d")],
            "quantity" => &[Some(1.0), Some(2.0), None, Some(4.0)],
            "price" => &[Some(1.0), Some(2.0), Some(3.0), None]
        )?;
        let quantity = FieldSpec::numeric("quantity").impute(ImputeStrategy::Zero);
        let price = FieldSpec::numeric("price").impute(ImputeStrategy::Median);
        let category = FieldSpec::text("category");
        let fields = vec![
            resolved(&category, "category"),
            resolved(&quantity, "quantity"),
            resolved(&price, "price"),
        ];

        let (df, outcome) = handle_missing(df, &fields, MissingPolicy::Drop)?;

        // a missing text cell does not drop the row
        assert_eq!(df.height(), 2);
        assert_eq!(outcome.rows_dropped, 2);
        assert!(outcome.imputations.is_empty());
        Ok(())
    }

    #[test]
    fn test_filter_invalid_rows_per_column() -> Result<()> {
        let df = df!(
            "quantity" => &[Some(1.0), Some(-1.0), Some(2.0), Some(3.0)],
            "price" => &[Some(5.0), Some(5.0), Some(-0.5), None]
        )?;
        let quantity = FieldSpec::numeric("quantity").non_negative();
        let price = FieldSpec::numeric("price").non_negative();
        let fields = vec![resolved(&quantity, "quantity"), resolved(&price, "price")];

        let (df, filters) = filter_invalid_rows(df, &fields)?;

        assert_eq!(df.height(), 1);
        assert_eq!(f64_values(&df, "quantity")?, vec![Some(1.0)]);
        assert_eq!(
            filters,
            vec![
                RowFilter {
                    column: "quantity".to_owned(),
                    rows: 1
                },
                RowFilter {
                    column: "price".to_owned(),
                    rows: 2
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn test_zero_is_valid() -> Result<()> {
        let df = df!("quantity" => &[0.0, 1.0])?;
        let quantity = FieldSpec::numeric("quantity").non_negative();
        let fields = vec![resolved(&quantity, "quantity")];

        let (df, filters) = filter_invalid_rows(df, &fields)?;
        assert_eq!(df.height(), 2);
        assert!(filters.is_empty());
        Ok(())
    }
}
