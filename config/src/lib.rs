//! Chainconf: layered configuration loading.
//!
//! Configuration values are addressed by dotted keys (`app.db.type`). The
//! first segment of a key is its namespace and names the files that hold it:
//! `app.ini`, `app.json`, `app.yaml`, ... in any of the search directories.
//! A namespace is loaded the first time a key inside it is missing.
//!
//! # Precedence
//!
//! Values merge first-writer-wins:
//!
//! 1. Initial data passed to [`ChainConfig::with_data`]
//! 2. Earlier search paths (after group ordering) over later ones
//! 3. Within a directory, earlier registered readers over later ones
//!
//! A `name.dist` file is read in place of `name` when `name` is absent.
//!
//! # Example
//!
//! ```no_run
//! use chainconf::{ChainConfig, IniReader, JsonReader};
//!
//! let mut config = ChainConfig::new();
//! config
//!     .append_path("/etc/app")
//!     .append_path_in("./config", "local")
//!     .append_reader(JsonReader)
//!     .append_reader(IniReader);
//! config.order_group_path("local", Some("__main__"), None)?;
//!
//! let db_type = config.get_or("app.db.type", "sqlite")?;
//! # Ok::<(), chainconf::ConfigError>(())
//! ```

#![allow(missing_docs)]

mod callback;
mod chain;
mod error;
mod loader;
mod ordered_group;
pub mod reader;
mod store;
mod types;
mod value;

pub use callback::resolve_placeholders;
pub use chain::{ChainConfig, KeyCallback, ValueCallback};
pub use error::{ConfigError, Result};
pub use loader::{scan_namespace, Candidate, DIST_SUFFIX};
pub use ordered_group::{GroupPosition, OrderedGroup, DEFAULT_GROUP};
pub use reader::{IniReader, JsonReader, Reader, TomlReader, XmlReader, YamlReader};
pub use store::{FlatMap, KeyStore, DEFAULT_SEPARATOR};
pub use types::*;
pub use value::{Tree, Value};

/// Load an orchestrator described by a YAML settings file.
///
/// # Errors
///
/// See [`ChainSettings::from_file`] and [`ChainSettings::build`].
pub fn from_settings_file(path: impl AsRef<std::path::Path>) -> Result<ChainConfig> {
    ChainSettings::from_file(path)?.build()
}
