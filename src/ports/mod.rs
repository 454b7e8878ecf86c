// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! This module contains the trait definitions (ports) that define the interfaces
//! to the collaborators of the core: where bytes come from, how they are decoded,
//! how placeholder keys are resolved, how records are compared and merged, and how
//! changes are delivered. These traits are implemented by adapters in the adapters
//! layer or by callers.

pub mod codec;
pub mod lookup;
pub mod merge;
pub mod record;
pub mod source;
pub mod watcher;

// Re-export commonly used types
pub use codec::ConfigCodec;
pub use lookup::KeyLookup;
pub use merge::{MergePolicy, ReplaceMerge};
pub use record::{diff_records, Record};
pub use source::ByteSource;
pub use watcher::ConfigWatcher;
