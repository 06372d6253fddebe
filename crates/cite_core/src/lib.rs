pub mod a11y;
pub mod config;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod text;

#[cfg(test)]
mod tests {
    use super::error::AppError;

    #[test]
    fn app_error_is_structured() {
        let err = AppError::new("CITE_TEST", "group failed").with_retryable(false);
        assert_eq!(err.code, "CITE_TEST");
        assert_eq!(err.message, "group failed");
        assert!(!err.retryable);
        assert_eq!(err.to_string(), "[CITE_TEST] group failed");
    }

    #[test]
    fn app_error_display_omits_details() {
        let err = AppError::new("CITE_TEST", "group failed").with_details("index=3");
        assert_eq!(err.to_string(), "[CITE_TEST] group failed");
        assert_eq!(err.details.as_deref(), Some("index=3"));
    }
}
