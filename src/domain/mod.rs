// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core business logic and types.
//!
//! This module contains the error type and the field-map representation used to
//! compare records. It is independent of any I/O and defines the fundamental
//! concepts used throughout the library.

pub mod errors;
pub mod field_map;

// Re-export commonly used types
pub use errors::{ConfigError, Result};
pub use field_map::{diff_fields, flatten_fields, flatten_value, FieldMap};
