// SPDX-License-Identifier: MIT OR Apache-2.0

//! Merge policy trait definition.
//!
//! Loading a configuration decodes into a scratch record first. How that scratch
//! record is folded into the destination is a policy decision kept behind this
//! trait so it can be swapped without touching the loading logic.

use crate::domain::Result;

/// Folds a freshly decoded record into the destination record.
///
/// # Examples
///
/// ```rust
/// use streamcfg::domain::Result;
/// use streamcfg::ports::MergePolicy;
///
/// struct Append;
///
/// impl MergePolicy<Vec<u32>> for Append {
///     fn merge(&self, dst: &mut Vec<u32>, src: Vec<u32>) -> Result<()> {
///         dst.extend(src);
///         Ok(())
///     }
/// }
///
/// let mut dst = vec![1];
/// Append.merge(&mut dst, vec![2, 3]).unwrap();
/// assert_eq!(dst, vec![1, 2, 3]);
/// ```
pub trait MergePolicy<R>: Send + Sync {
    /// Merges `src` into `dst`.
    fn merge(&self, dst: &mut R, src: R) -> Result<()>;
}

/// A merge policy that replaces the destination with the decoded record.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceMerge;

impl<R> MergePolicy<R> for ReplaceMerge {
    fn merge(&self, dst: &mut R, src: R) -> Result<()> {
        *dst = src;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_merge() {
        let mut dst = "old".to_string();
        ReplaceMerge.merge(&mut dst, "new".to_string()).unwrap();
        assert_eq!(dst, "new");
    }
}
