use super::{document_root, read_locked, Reader};
use crate::error::{ConfigError, Result};
use crate::value::Tree;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct TomlReader;

impl TomlReader {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reader for TomlReader {
    fn extensions(&self) -> &[&str] {
        &["toml"]
    }

    fn read(&self, path: &Path) -> Result<Tree> {
        let content = read_locked(path)?;
        let table: toml::Table =
            toml::from_str(&content).map_err(|e| ConfigError::parse("toml", path, e))?;
        document_root("toml", path, toml::Value::Table(table).into())
    }
}
