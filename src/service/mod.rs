// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer containing the file-backed configuration.
//!
//! This module ties the ports and adapters together: a [`FileConfig`] streams a
//! file through the substitution transformer, decodes it into a record and can
//! hand out polling watchers on the same file.

pub mod file_config;

pub use file_config::{FileConfig, FileConfigBuilder, Hook};
