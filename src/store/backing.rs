use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

/// Errors raised by a [`KeyValueBacking`]
#[derive(Error, Debug)]
pub enum BackingError {
    /// The write would exceed the configured storage quota
    #[error("storage capacity exceeded ({needed} bytes needed, {capacity} available)")]
    CapacityExceeded { needed: usize, capacity: usize },

    /// The underlying file could not be read or written
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Durable blob storage keyed by string, in the manner of browser local
/// storage. Reads and writes are synchronous and immediately visible.
pub trait KeyValueBacking: Send {
    fn read(&self, key: &str) -> Result<Option<String>, BackingError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), BackingError>;
}

impl<T: KeyValueBacking + ?Sized> KeyValueBacking for Box<T> {
    fn read(&self, key: &str) -> Result<Option<String>, BackingError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), BackingError> {
        (**self).write(key, value)
    }
}

fn check_capacity(needed: usize, capacity: Option<usize>) -> Result<(), BackingError> {
    match capacity {
        Some(capacity) if needed > capacity => {
            Err(BackingError::CapacityExceeded { needed, capacity })
        }
        _ => Ok(()),
    }
}

/// In-process backing, optionally limited to a total number of bytes
/// across all keys and values.
#[derive(Debug, Default, Clone)]
pub struct MemoryBacking {
    entries: HashMap<String, String>,
    capacity: Option<usize>,
}

impl MemoryBacking {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: Some(capacity),
        }
    }

    fn used_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueBacking for MemoryBacking {
    fn read(&self, key: &str) -> Result<Option<String>, BackingError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), BackingError> {
        let needed = self.used_without(key) + key.len() + value.len();
        check_capacity(needed, self.capacity)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Backing that keeps each key in its own file under a directory.
///
/// Writes land in a temporary sibling first and are renamed over the
/// target, so a failed write leaves the previous blob intact.
#[derive(Debug, Clone)]
pub struct FileBacking {
    dir: PathBuf,
    capacity: Option<usize>,
}

impl FileBacking {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            capacity: None,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the blob for `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_stem: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", file_stem))
    }
}

impl KeyValueBacking for FileBacking {
    fn read(&self, key: &str) -> Result<Option<String>, BackingError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), BackingError> {
        check_capacity(value.len(), self.capacity)?;

        fs::create_dir_all(&self.dir)?;
        let target = self.path_for(key);
        let tmp = target.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &target)?;
        debug!("Wrote {} bytes to {}", value.len(), target.display());
        Ok(())
    }
}
