// SPDX-License-Identifier: MIT OR Apache-2.0

//! File-backed configuration.
//!
//! This module provides [`FileConfig`], which loads a record from a file or a
//! reader, optionally substituting placeholders while the bytes stream in, saves
//! the record back, and starts polling watchers on the same file.

use crate::adapters::file_source::read_limited;
use crate::adapters::{FileSource, PollingWatcher, WatchOptions};
use crate::domain::{ConfigError, Result};
use crate::ports::{ConfigCodec, MergePolicy, Record, ReplaceMerge};
use crate::transform::{ChunkTransformer, CompiledPattern, TransformReader};
use directories::ProjectDirs;
use std::fmt;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A lifecycle hook run before or after loading and saving.
pub type Hook<R> = Arc<dyn Fn(&FileConfig<R>) -> Result<()> + Send + Sync>;

enum Location {
    Path(PathBuf),
    Reader(Box<dyn Read + Send>),
}

struct Hooks<R> {
    before_load: Vec<Hook<R>>,
    after_load: Vec<Hook<R>>,
    before_save: Vec<Hook<R>>,
    after_save: Vec<Hook<R>>,
}

/// Configuration record backed by a file or a reader.
///
/// # Examples
///
/// ```rust,no_run
/// use serde::{Deserialize, Serialize};
/// use streamcfg::adapters::JsonCodec;
/// use streamcfg::domain::{flatten_fields, FieldMap, Result};
/// use streamcfg::ports::Record;
/// use streamcfg::service::FileConfig;
///
/// #[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// struct Settings {
///     key: String,
///     pass: String,
/// }
///
/// impl Record for Settings {
///     fn zero_like(&self) -> Self {
///         Settings::default()
///     }
///     fn to_fields(&self) -> Result<FieldMap> {
///         flatten_fields(self)
///     }
/// }
///
/// # fn main() -> Result<()> {
/// let mut config = FileConfig::builder(Settings::default())
///     .path("/etc/myapp/config.json")
///     .codec(JsonCodec::new())
///     .env_placeholders()
///     .build()?;
///
/// config.load()?;
/// println!("pass = {}", config.record().pass);
/// # Ok(())
/// # }
/// ```
pub struct FileConfig<R> {
    name: String,
    location: Location,
    codec: Arc<dyn ConfigCodec<R>>,
    record: R,
    pattern: Option<Arc<CompiledPattern>>,
    merge: Box<dyn MergePolicy<R>>,
    allow_fail: bool,
    hooks: Hooks<R>,
}

impl<R: Record> FileConfig<R> {
    /// Creates a builder whose destination record starts as `record`.
    pub fn builder(record: R) -> FileConfigBuilder<R> {
        FileConfigBuilder::new(record)
    }

    /// Returns the configured name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the file path, or `None` for a reader-backed configuration.
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::Path(path) => Some(path),
            Location::Reader(_) => None,
        }
    }

    /// Returns the destination record.
    pub fn record(&self) -> &R {
        &self.record
    }

    /// Returns the destination record for modification, e.g. before `save`.
    pub fn record_mut(&mut self) -> &mut R {
        &mut self.record
    }

    /// Consumes the configuration and returns the destination record.
    pub fn into_record(self) -> R {
        self.record
    }

    /// Loads the source into the destination record.
    ///
    /// The bytes are read (at most [`MAX_SOURCE_SIZE`](crate::adapters::MAX_SOURCE_SIZE)),
    /// streamed through the substitution pattern if one is configured, decoded
    /// into an empty record and merged into the destination. With `allow_fail`,
    /// read, decode, merge and hook failures are logged and skipped.
    pub fn load(&mut self) -> Result<()> {
        self.run_hooks("before-load", &self.hooks.before_load)?;

        let loaded = self
            .read_and_decode()
            .and_then(|scratch| self.merge.merge(&mut self.record, scratch));
        match loaded {
            Ok(()) => tracing::debug!("Loaded configuration '{}'", self.name),
            Err(err) if self.allow_fail => {
                tracing::warn!("Ignoring failed load of '{}': {}", self.name, err)
            }
            Err(err) => return Err(err),
        }

        self.run_hooks("after-load", &self.hooks.after_load)
    }

    /// Encodes the destination record and writes it back to the file.
    ///
    /// Reader-backed configurations cannot be saved.
    pub fn save(&self) -> Result<()> {
        self.run_hooks("before-save", &self.hooks.before_save)?;

        match self.write_back() {
            Ok(()) => tracing::debug!("Saved configuration '{}'", self.name),
            Err(err) if self.allow_fail => {
                tracing::warn!("Ignoring failed save of '{}': {}", self.name, err)
            }
            Err(err) => return Err(err),
        }

        self.run_hooks("after-save", &self.hooks.after_save)
    }

    /// Starts a polling watcher on the configuration file.
    ///
    /// The watcher compares against a copy of the current destination record
    /// and applies the same substitution pattern as `load`.
    pub fn watch(&self, options: WatchOptions) -> Result<PollingWatcher>
    where
        R: Clone,
    {
        let path = match &self.location {
            Location::Path(path) => path.clone(),
            Location::Reader(_) => {
                return Err(ConfigError::WatcherError {
                    message: "watching requires a file path".to_string(),
                    source: None,
                })
            }
        };

        let mut source = FileSource::new(path);
        if let Some(pattern) = &self.pattern {
            source = source.with_pattern(Arc::clone(pattern));
        }

        PollingWatcher::watch(source, Arc::clone(&self.codec), self.record.clone(), options)
    }

    fn read_and_decode(&mut self) -> Result<R> {
        let pattern = self.pattern.as_ref();
        let bytes = match &mut self.location {
            Location::Path(path) => {
                let file = File::open(&*path).map_err(|e| {
                    ConfigError::source_io(
                        self.name.as_str(),
                        format!("failed to open: {}", path.display()),
                        e,
                    )
                })?;
                read_through(file, pattern, &self.name)?
            }
            Location::Reader(reader) => read_through(reader, pattern, &self.name)?,
        };

        let mut scratch = self.record.zero_like();
        self.codec.decode(&bytes, &mut scratch)?;
        Ok(scratch)
    }

    fn write_back(&self) -> Result<()> {
        let path = match &self.location {
            Location::Path(path) => path,
            Location::Reader(_) => {
                return Err(ConfigError::SourceUnavailable {
                    source_name: self.name.clone(),
                    message: "reader-backed configuration cannot be saved".to_string(),
                    source: None,
                })
            }
        };

        let bytes = self.codec.encode(&self.record)?;
        fs::write(path, bytes).map_err(|e| {
            ConfigError::source_io(
                self.name.as_str(),
                format!("failed to write: {}", path.display()),
                e,
            )
        })
    }

    fn run_hooks(&self, stage: &'static str, hooks: &[Hook<R>]) -> Result<()> {
        for hook in hooks {
            if let Err(err) = hook(self) {
                if !self.allow_fail {
                    return Err(err);
                }
                tracing::warn!("Ignoring failed {} hook of '{}': {}", stage, self.name, err);
            }
        }
        Ok(())
    }
}

impl<R> fmt::Display for FileConfig<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("file")
    }
}

fn read_through<Rd: Read>(
    reader: Rd,
    pattern: Option<&Arc<CompiledPattern>>,
    source_name: &str,
) -> Result<Vec<u8>> {
    match pattern {
        Some(pattern) => {
            let transformer = ChunkTransformer::new(Arc::clone(pattern));
            read_limited(TransformReader::new(reader, transformer), source_name)
        }
        None => read_limited(reader, source_name),
    }
}

/// Builder for [`FileConfig`].
pub struct FileConfigBuilder<R> {
    name: String,
    location: Option<Location>,
    codec: Option<Arc<dyn ConfigCodec<R>>>,
    record: R,
    pattern: Option<Arc<CompiledPattern>>,
    merge: Box<dyn MergePolicy<R>>,
    allow_fail: bool,
    hooks: Hooks<R>,
}

impl<R: Record> FileConfigBuilder<R> {
    /// Creates a builder whose destination record starts as `record`.
    pub fn new(record: R) -> Self {
        Self {
            name: "file".to_string(),
            location: None,
            codec: None,
            record,
            pattern: None,
            merge: Box::new(ReplaceMerge),
            allow_fail: false,
            hooks: Hooks {
                before_load: Vec::new(),
                after_load: Vec::new(),
                before_save: Vec::new(),
                after_save: Vec::new(),
            },
        }
    }

    /// Sets the name used in logs and errors.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Reads the configuration from `path`.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.location = Some(Location::Path(path.as_ref().to_path_buf()));
        self
    }

    /// Reads the configuration from `reader` instead of a file.
    pub fn reader(mut self, reader: impl Read + Send + 'static) -> Self {
        self.location = Some(Location::Reader(Box::new(reader)));
        self
    }

    /// Reads the configuration from `file_name` in the OS-appropriate
    /// configuration directory of the application.
    ///
    /// # Arguments
    ///
    /// * `app_name` - The application name (e.g., "myapp")
    /// * `qualifier` - The organization/qualifier (e.g., "com.example")
    /// * `file_name` - The configuration file name (e.g., "config.json")
    pub fn default_location(self, app_name: &str, qualifier: &str, file_name: &str) -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from(qualifier, "", app_name).ok_or_else(|| ConfigError::SourceUnavailable {
                source_name: self.name.clone(),
                message: "Failed to determine project directories".to_string(),
                source: None,
            })?;

        let config_file = proj_dirs.config_dir().join(file_name);
        Ok(self.path(config_file))
    }

    /// Sets the codec used to decode and encode the record.
    pub fn codec<C>(mut self, codec: C) -> Self
    where
        C: ConfigCodec<R> + 'static,
    {
        self.codec = Some(Arc::new(codec));
        self
    }

    /// Substitutes matches of `pattern` while reading.
    pub fn pattern(mut self, pattern: impl Into<Arc<CompiledPattern>>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Substitutes `${KEY}` placeholders from the process environment while reading.
    #[cfg(feature = "env")]
    pub fn env_placeholders(self) -> Self {
        self.pattern(CompiledPattern::placeholders(crate::adapters::EnvVarLookup::new()))
    }

    /// Sets how decoded records are merged into the destination.
    pub fn merge_policy(mut self, merge: impl MergePolicy<R> + 'static) -> Self {
        self.merge = Box::new(merge);
        self
    }

    /// Logs and skips failures in `load` and `save` instead of returning them.
    pub fn allow_fail(mut self, allow_fail: bool) -> Self {
        self.allow_fail = allow_fail;
        self
    }

    /// Adds a hook run before loading.
    pub fn before_load<F>(mut self, hook: F) -> Self
    where
        F: Fn(&FileConfig<R>) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.before_load.push(Arc::new(hook));
        self
    }

    /// Adds a hook run after loading.
    pub fn after_load<F>(mut self, hook: F) -> Self
    where
        F: Fn(&FileConfig<R>) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.after_load.push(Arc::new(hook));
        self
    }

    /// Adds a hook run before saving.
    pub fn before_save<F>(mut self, hook: F) -> Self
    where
        F: Fn(&FileConfig<R>) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.before_save.push(Arc::new(hook));
        self
    }

    /// Adds a hook run after saving.
    pub fn after_save<F>(mut self, hook: F) -> Self
    where
        F: Fn(&FileConfig<R>) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.after_save.push(Arc::new(hook));
        self
    }

    /// Builds the configuration.
    ///
    /// Fails with `PathNotExist` when neither a path nor a reader was set, and
    /// with `InvalidOptions` when no codec was set.
    pub fn build(self) -> Result<FileConfig<R>> {
        let location = self.location.ok_or(ConfigError::PathNotExist)?;
        let codec = self.codec.ok_or_else(|| ConfigError::InvalidOptions {
            message: "no codec configured".to_string(),
        })?;

        Ok(FileConfig {
            name: self.name,
            location,
            codec,
            record: self.record,
            pattern: self.pattern,
            merge: self.merge,
            allow_fail: self.allow_fail,
            hooks: self.hooks,
        })
    }
}
