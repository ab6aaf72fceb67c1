use shared_types::AppError;

/// Convert a reqwest::Error from the holiday feed into an AppError.
///
/// Every transport, status, and decode failure is a holiday source
/// failure; callers must never read it as "no holidays".
pub fn reqwest_to_app_error(err: reqwest::Error) -> AppError {
    let reason = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "connection failed"
    } else if err.is_decode() {
        "response could not be parsed"
    } else if err.is_status() {
        "unexpected response status"
    } else {
        "request failed"
    };
    AppError::holiday_source_unavailable(format!("Holiday feed {}: {}", reason, err))
}

/// Extension trait providing `.into_app_error()` on reqwest::Error.
pub trait ReqwestErrorExt {
    fn into_app_error(self) -> AppError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_app_error(self) -> AppError {
        reqwest_to_app_error(self)
    }
}

/// Trait for validating configuration sections before the engine starts.
pub trait ValidateConfig {
    fn validate_config(&self) -> Result<(), AppError>;
}

impl<T: validator::Validate> ValidateConfig for T {
    fn validate_config(&self) -> Result<(), AppError> {
        self.validate().map_err(AppError::from)
    }
}
