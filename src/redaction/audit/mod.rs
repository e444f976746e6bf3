//! Audit logging module
//!
//! Provides structured audit logging for redaction runs. Entries carry
//! counts, kinds, offsets and SHA-256 hashes; never plaintext values.

pub mod logger;

pub use logger::AuditLogger;
