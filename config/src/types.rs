use crate::chain::ChainConfig;
use crate::error::{ConfigError, Result};
use crate::ordered_group::DEFAULT_GROUP;
use crate::reader::{IniReader, JsonReader, Reader, TomlReader, XmlReader, YamlReader};
use crate::value::{Tree, Value};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Declarative description of a [`ChainConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSettings {
    pub paths: Vec<PathSettings>,
    pub group_order: Vec<GroupOrderSettings>,
    pub readers: Vec<ReaderKind>,
    /// Initial configuration, served before anything is read from disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_yaml::Value>,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            group_order: Vec::new(),
            readers: ReaderKind::ALL.to_vec(),
            data: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSettings {
    pub path: String,
    #[serde(default = "default_group")]
    pub group: String,
    #[serde(default)]
    pub prepend: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupOrderSettings {
    pub group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReaderKind {
    Ini,
    Json,
    Yaml,
    Xml,
    Toml,
}

impl ReaderKind {
    pub const ALL: [Self; 5] = [Self::Ini, Self::Json, Self::Yaml, Self::Xml, Self::Toml];

    #[must_use]
    pub fn reader(self) -> Arc<dyn Reader> {
        match self {
            Self::Ini => Arc::new(IniReader),
            Self::Json => Arc::new(JsonReader),
            Self::Yaml => Arc::new(YamlReader),
            Self::Xml => Arc::new(XmlReader),
            Self::Toml => Arc::new(TomlReader),
        }
    }
}

fn default_group() -> String {
    DEFAULT_GROUP.to_string()
}

impl ChainSettings {
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseSettings`] on malformed YAML.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::ReadFile`] when the file cannot be read and
    /// [`ConfigError::ParseSettings`] on malformed YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Builds the orchestrator: initial data, readers in listed order, paths
    /// (a leading `~` expands to the home directory), then group order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidArgument`] when `data` is not a mapping
    /// or a group order entry names no target or the same target twice.
    pub fn build(&self) -> Result<ChainConfig> {
        let mut config = ChainConfig::with_data(self.initial_data()?);

        for kind in &self.readers {
            config.append_shared_reader(kind.reader());
        }

        for entry in &self.paths {
            let path = PathBuf::from(shellexpand::tilde(&entry.path).into_owned());
            if entry.prepend {
                config.prepend_path_in(path, &entry.group);
            } else {
                config.append_path_in(path, &entry.group);
            }
        }

        for order in &self.group_order {
            config.order_group_path(&order.group, order.before.as_deref(), order.after.as_deref())?;
        }

        Ok(config)
    }

    fn initial_data(&self) -> Result<Tree> {
        match self.data.clone().map(Value::from) {
            None | Some(Value::Null) => Ok(Tree::new()),
            Some(Value::Node(tree)) => Ok(tree),
            Some(other) => Err(ConfigError::invalid_argument(format!(
                "settings `data` must be a mapping, found `{other}`"
            ))),
        }
    }
}

impl ChainConfig {
    /// # Errors
    ///
    /// See [`ChainSettings::build`].
    pub fn from_settings(settings: &ChainSettings) -> Result<Self> {
        settings.build()
    }
}
