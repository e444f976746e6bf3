//! Domain types shared across piitag.
//!
//! # Error Handling
//!
//! Fallible library operations return [`Result<T, PiitagError>`]:
//!
//! ```rust
//! use piitag::domain::{PiitagError, Result};
//! use piitag::redaction::models::Mapping;
//!
//! fn example(json: &str) -> Result<Mapping> {
//!     // Errors are automatically converted using the ? operator
//!     let mapping = Mapping::from_json(json)?;
//!     Ok(mapping)
//! }
//! ```

pub mod errors;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{DetectionInputError, PiitagError, RestorationError};
pub use result::Result;
