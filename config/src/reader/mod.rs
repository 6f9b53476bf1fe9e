//! File format readers.
//!
//! A reader turns one file into a [`Tree`]. The loader asks every registered
//! reader whether it handles a file name and merges what each one returns.

mod ini;
mod json;
mod toml;
mod xml;
mod yaml;

pub use self::ini::IniReader;
pub use self::json::JsonReader;
pub use self::toml::TomlReader;
pub use self::xml::XmlReader;
pub use self::yaml::YamlReader;

use crate::error::{ConfigError, Result};
use crate::value::{Tree, Value};
use fd_lock::RwLock;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub trait Reader: Send + Sync {
    /// Extensions handled by this reader, without the leading dot.
    fn extensions(&self) -> &[&str];

    fn can_read(&self, filename: &str) -> bool {
        self.extensions().iter().any(|ext| {
            filename
                .strip_suffix(ext)
                .is_some_and(|stem| stem.ends_with('.'))
        })
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::ReadFile`] when the file cannot be opened or
    /// locked, and [`ConfigError::Parse`] when its content is malformed.
    fn read(&self, path: &Path) -> Result<Tree>;
}

impl std::fmt::Debug for dyn Reader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("extensions", &self.extensions())
            .finish_non_exhaustive()
    }
}

/// Reads the whole file while holding a shared lock on it.
///
/// # Errors
///
/// Returns [`ConfigError::ReadFile`] on any I/O failure.
pub fn read_locked(path: &Path) -> Result<String> {
    let io_err = |source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let lock = RwLock::new(file);
    let guard = lock.read().map_err(io_err)?;
    let mut content = String::new();
    (&*guard).read_to_string(&mut content).map_err(io_err)?;
    drop(guard);
    Ok(content)
}

/// Converts a decoded document into a tree. An empty document is an empty
/// tree; any other scalar root is rejected.
pub(crate) fn document_root(format: &'static str, path: &Path, value: Value) -> Result<Tree> {
    match value {
        Value::Node(tree) => Ok(tree),
        Value::Null => Ok(Tree::new()),
        other => Err(ConfigError::parse(
            format,
            path,
            format!("expected a mapping at the document root, found `{other}`"),
        )),
    }
}
