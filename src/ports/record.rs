// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record trait definition.
//!
//! A record is the decoded configuration value. The library never inspects its
//! concrete shape; it only needs to create an empty sibling to decode into and to
//! view the record as a flat [`FieldMap`] for comparison.

use crate::domain::{flatten_value, FieldMap, Result};

/// A decoded configuration value that can be compared field by field.
///
/// Most implementations are two lines long when the type derives `Serialize` and
/// `Default`:
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use streamcfg::domain::{flatten_fields, FieldMap, Result};
/// use streamcfg::ports::Record;
///
/// #[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// struct Settings {
///     listen: String,
///     workers: u32,
/// }
///
/// impl Record for Settings {
///     fn zero_like(&self) -> Self {
///         Settings::default()
///     }
///
///     fn to_fields(&self) -> Result<FieldMap> {
///         flatten_fields(self)
///     }
/// }
/// ```
pub trait Record: Sized + Send + 'static {
    /// Returns an empty record of the same shape as `self`.
    fn zero_like(&self) -> Self;

    /// Returns the flat field view of this record.
    fn to_fields(&self) -> Result<FieldMap>;
}

impl Record for serde_json::Value {
    fn zero_like(&self) -> Self {
        serde_json::Value::Null
    }

    fn to_fields(&self) -> Result<FieldMap> {
        flatten_value(self)
    }
}

/// Returns the fields of `new` that differ from `old`.
///
/// Both records are flattened and compared with
/// [`diff_fields`](crate::domain::diff_fields). An empty map means nothing changed.
pub fn diff_records<R: Record>(old: &R, new: &R) -> Result<FieldMap> {
    let old_fields = old.to_fields()?;
    let new_fields = new.to_fields()?;
    Ok(crate::domain::diff_fields(&old_fields, &new_fields))
}
