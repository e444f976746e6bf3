//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - console output with a configurable level
//! - optional JSON log files with daily or hourly rotation
//!
//! Person names and other detected values are plaintext PII. They are only
//! ever logged at `trace` level; everything above that logs offsets, kinds
//! and counts.
//!
//! # Example
//!
//! ```no_run
//! use piitag::logging::init_logging;
//! use piitag::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of processing for one document
///
/// # Example
///
/// ```no_run
/// use piitag::log_document_start;
///
/// log_document_start!("resume.txt", 2048);
/// ```
#[macro_export]
macro_rules! log_document_start {
    ($source:expr, $len:expr) => {
        tracing::info!(source = %$source, bytes = $len, "Processing document");
    };
}

/// Log the completion of one document
///
/// # Example
///
/// ```no_run
/// use piitag::log_document_complete;
/// use std::time::Duration;
///
/// log_document_complete!("resume.txt", 7, Duration::from_millis(12));
/// ```
#[macro_export]
macro_rules! log_document_complete {
    ($source:expr, $entities:expr, $duration:expr) => {
        tracing::info!(
            source = %$source,
            entities = $entities,
            duration_ms = $duration.as_millis() as u64,
            "Document redacted"
        );
    };
}

/// Log a rejected PERSON candidate
///
/// The candidate text is only emitted at `trace` level.
///
/// # Example
///
/// ```no_run
/// use piitag::log_rejection;
///
/// log_rejection!("Senior Engineer", "[0, 15)", "job_title");
/// ```
#[macro_export]
macro_rules! log_rejection {
    ($text:expr, $span:expr, $reason:expr) => {
        tracing::debug!(span = %$span, reason = %$reason, "Rejected person candidate");
        tracing::trace!(text = %$text, reason = %$reason, "Rejected candidate text");
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use piitag::log_error_with_context;
/// use piitag::domain::PiitagError;
///
/// let error = PiitagError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
