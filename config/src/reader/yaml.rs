use super::{document_root, read_locked, Reader};
use crate::error::{ConfigError, Result};
use crate::value::Tree;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlReader;

impl YamlReader {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reader for YamlReader {
    fn extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }

    fn read(&self, path: &Path) -> Result<Tree> {
        let content = read_locked(path)?;
        if content.trim().is_empty() {
            return Ok(Tree::new());
        }
        let value: serde_yaml::Value =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::parse("yaml", path, e))?;
        document_root("yaml", path, value.into())
    }
}
