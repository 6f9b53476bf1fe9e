use super::{document_root, read_locked, Reader};
use crate::error::{ConfigError, Result};
use crate::value::Tree;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReader;

impl JsonReader {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reader for JsonReader {
    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn read(&self, path: &Path) -> Result<Tree> {
        let content = read_locked(path)?;
        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| ConfigError::parse("json", path, e))?;
        document_root("json", path, value.into())
    }
}
