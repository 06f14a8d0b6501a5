//! Pipeline specification validation.
//!
//! Two passes: [`validate_spec`] checks the spec on its own before any input
//! is read; [`validate_columns`] checks the resolved schema against the
//! normalized header row (strict mode only).

use super::spec::{
    ColumnKind, PipelineSpec, Resolution, SPEC_VERSION, SchemaMatchMode, parse_delimiter,
};
use crate::dataset::naming::normalize_column_name;
use std::collections::HashMap;

/// Validation error with helpful context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The schema field concerned, if any
    pub field: Option<String>,
    pub message: String,
}

impl ValidationError {
    fn new(field: Option<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    fn field(field: &str, message: impl Into<String>) -> Self {
        Self::new(Some(field.to_owned()), message)
    }

    fn spec(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(field) = &self.field {
            write!(f, "Field '{field}': {}", self.message)
        } else {
            write!(f, "Spec: {}", self.message)
        }
    }
}

/// Join errors into one message, one per line.
pub fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check a spec for internal consistency.
pub fn validate_spec(spec: &PipelineSpec) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if spec.version != SPEC_VERSION {
        errors.push(ValidationError::spec(format!(
            "Unsupported spec version '{}', expected '{SPEC_VERSION}'",
            spec.version
        )));
    }

    if parse_delimiter(&spec.input.delimiter).is_none() {
        errors.push(ValidationError::spec(format!(
            "Input delimiter must be a single ASCII character, got {:?}",
            spec.input.delimiter
        )));
    }
    if parse_delimiter(&spec.output.delimiter).is_none() {
        errors.push(ValidationError::spec(format!(
            "Output delimiter must be a single ASCII character, got {:?}",
            spec.output.delimiter
        )));
    }

    // name or alias -> field that claimed it first
    let mut claimed: HashMap<&str, &str> = HashMap::new();

    for field in &spec.schema.fields {
        for candidate in field.candidates() {
            if normalize_column_name(candidate) != candidate {
                errors.push(ValidationError::field(
                    &field.name,
                    format!(
                        "'{candidate}' is not a normalized column name (expected '{}')",
                        normalize_column_name(candidate)
                    ),
                ));
            }

            if let Some(owner) = claimed.insert(candidate, field.name.as_str()) {
                errors.push(ValidationError::field(
                    &field.name,
                    format!("'{candidate}' is already claimed by field '{owner}'"),
                ));
            }
        }

        if field.kind == ColumnKind::Text {
            if field.impute.is_some() {
                errors.push(ValidationError::field(
                    &field.name,
                    "impute only applies to numeric fields",
                ));
            }
            if field.non_negative {
                errors.push(ValidationError::field(
                    &field.name,
                    "non_negative only applies to numeric fields",
                ));
            }
        }
    }

    errors
}

/// In strict mode, report every required field that matched no column.
pub fn validate_columns(spec: &PipelineSpec, resolution: &Resolution<'_>) -> Vec<ValidationError> {
    if spec.schema.match_mode != SchemaMatchMode::Strict {
        return Vec::new();
    }

    resolution
        .missing
        .iter()
        .filter(|field| field.required)
        .map(|field| {
            let names: Vec<&str> = field.candidates().collect();
            ValidationError::field(
                &field.name,
                format!("required column not found (looked for {names:?})"),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::spec::{FieldSpec, ImputeStrategy};

    #[test]
    fn test_default_spec_is_valid() {
        let errors = validate_spec(&PipelineSpec::default_sales());
        assert!(errors.is_empty(), "{}", describe(&errors));
    }

    #[test]
    fn test_validate_version_and_delimiter() {
        let mut spec = PipelineSpec::default_sales();
        spec.version = "9.9".to_owned();
        spec.input.delimiter = ";;".to_owned();

        let errors = validate_spec(&spec);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.field.is_none()));
        assert!(describe(&errors).contains("9.9"));
    }

    #[test]
    fn test_validate_unnormalized_and_duplicate_names() {
        let mut spec = PipelineSpec::new("test");
        spec.schema.fields = vec![
            FieldSpec::numeric("Unit Price"),
            FieldSpec::numeric("qty"),
            FieldSpec::numeric("quantity").alias("qty"),
        ];

        let errors = validate_spec(&spec);
        assert_eq!(errors.len(), 2, "{}", describe(&errors));
        assert!(errors.iter().any(|e| e.message.contains("unit_price")));
        assert!(
            errors
                .iter()
                .any(|e| e.field.as_deref() == Some("quantity")
                    && e.message.contains("already claimed"))
        );
    }

    #[test]
    fn test_validate_numeric_options_on_text() {
        let mut spec = PipelineSpec::new("test");
        let mut field = FieldSpec::text("category").impute(ImputeStrategy::Zero);
        field.non_negative = true;
        spec.schema.fields = vec![field];

        let errors = validate_spec(&spec);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_validate_columns_strict_only() {
        let mut spec = PipelineSpec::default_sales();
        let columns = ["category", "qty"];

        let resolution = spec.schema.resolve(&columns);
        assert!(validate_columns(&spec, &resolution).is_empty());

        spec.schema.match_mode = SchemaMatchMode::Strict;
        let resolution = spec.schema.resolve(&columns);
        let errors = validate_columns(&spec, &resolution);

        // product is optional, price is required
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.first().and_then(|e| e.field.as_deref()),
            Some("price")
        );
    }
}
