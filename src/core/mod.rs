//! Material store and its validation rules.

/// Authoritative material store over a pluggable backend.
pub mod store;
/// Field-level validation rules.
pub mod validate;
