//! Result type alias for piitag

use super::errors::PiitagError;

/// Result type alias for piitag operations
///
/// # Examples
///
/// ```
/// use piitag::domain::result::Result;
/// use piitag::domain::errors::PiitagError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(PiitagError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, PiitagError>;
