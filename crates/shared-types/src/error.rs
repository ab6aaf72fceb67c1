use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Categorization of engine errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppErrorKind {
    /// The holiday feed could not be fetched or parsed, or lacked the division.
    HolidaySourceUnavailable,
    /// Configuration failed validation at load time.
    ConfigurationError,
    InternalError,
}

impl fmt::Display for AppErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppErrorKind::HolidaySourceUnavailable => write!(f, "HolidaySourceUnavailable"),
            AppErrorKind::ConfigurationError => write!(f, "ConfigurationError"),
            AppErrorKind::InternalError => write!(f, "InternalError"),
        }
    }
}

/// Structured error returned by every fallible engine operation.
///
/// Serializable so the surrounding web layer can pass it through unchanged;
/// `status_code` gives that layer the HTTP status to use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: AppErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub field_errors: HashMap<String, String>,
}

impl AppError {
    pub fn holiday_source_unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: AppErrorKind::HolidaySourceUnavailable,
            message: message.into(),
            field_errors: HashMap::new(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self {
            kind: AppErrorKind::ConfigurationError,
            message: message.into(),
            field_errors: HashMap::new(),
        }
    }

    /// Configuration error carrying one message per offending config path.
    pub fn invalid_configuration(
        message: impl Into<String>,
        field_errors: HashMap<String, String>,
    ) -> Self {
        Self {
            kind: AppErrorKind::ConfigurationError,
            message: message.into(),
            field_errors,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: AppErrorKind::InternalError,
            message: message.into(),
            field_errors: HashMap::new(),
        }
    }

    pub fn is_holiday_source_unavailable(&self) -> bool {
        self.kind == AppErrorKind::HolidaySourceUnavailable
    }

    /// HTTP status the web layer should translate this error into.
    pub fn status_code(&self) -> u16 {
        match self.kind {
            AppErrorKind::HolidaySourceUnavailable => 503,
            AppErrorKind::ConfigurationError => 500,
            AppErrorKind::InternalError => 500,
        }
    }

    /// Merge another error's field errors into this one, prefixing each path.
    pub fn with_prefixed_fields(mut self, prefix: &str, other: AppError) -> Self {
        for (field, msg) in other.field_errors {
            self.field_errors.insert(format!("{prefix}.{field}"), msg);
        }
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(feature = "validation")]
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut field_errors = HashMap::new();
        collect_validation_errors("", &errors, &mut field_errors);
        AppError::invalid_configuration("Configuration validation failed", field_errors)
    }
}

/// Flatten nested validator errors into `path.to.field -> message` entries.
#[cfg(feature = "validation")]
fn collect_validation_errors(
    prefix: &str,
    errors: &validator::ValidationErrors,
    out: &mut HashMap<String, String>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                if let Some(first) = errs.first() {
                    let msg = first
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", path));
                    out.insert(path, msg);
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_validation_errors(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect_validation_errors(&format!("{path}[{idx}]"), inner, out);
                }
            }
        }
    }
}
