//! The configuration orchestrator.
//!
//! [`ChainConfig`] answers dotted-key lookups from a [`KeyStore`] that it
//! fills lazily: the first lookup whose key is missing loads every file named
//! after the key's first segment (its namespace) from the search paths.
//!
//! Precedence is first-writer-wins: earlier search paths beat later ones,
//! and within one directory files are taken in reader registration order.

use crate::error::{ConfigError, Result};
use crate::loader::scan_namespace;
use crate::ordered_group::{OrderedGroup, DEFAULT_GROUP};
use crate::reader::Reader;
use crate::store::{FlatMap, KeyStore};
use crate::value::{Tree, Value};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Rewrites a key before lookup. Receives the orchestrator so a callback can
/// resolve parts of the key from other configuration values.
pub type KeyCallback = Arc<dyn Fn(&mut ChainConfig, &str) -> Result<String> + Send + Sync>;

/// Transforms a looked-up value (`None` when the key is unset).
pub type ValueCallback = Arc<dyn Fn(&str, Option<Value>) -> Option<Value> + Send + Sync>;

#[derive(Default)]
pub struct ChainConfig {
    data: KeyStore,
    paths: OrderedGroup<PathBuf>,
    readers: Vec<Arc<dyn Reader>>,
    key_callbacks: Vec<KeyCallback>,
    value_callbacks: Vec<ValueCallback>,
    loaded: HashSet<String>,
}

impl std::fmt::Debug for ChainConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainConfig")
            .field("data", &self.data)
            .field("paths", &self.paths)
            .field("readers", &self.readers)
            .field("key_callbacks", &self.key_callbacks.len())
            .field("value_callbacks", &self.value_callbacks.len())
            .field("loaded", &self.loaded)
            .finish()
    }
}

impl ChainConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from `data`. Namespaces already present in it are never loaded
    /// from disk for keys they already contain.
    #[must_use]
    pub fn with_data(data: Tree) -> Self {
        Self {
            data: KeyStore::new(data),
            ..Self::default()
        }
    }

    /// Looks up `key`, returning `None` when it is set nowhere.
    ///
    /// # Errors
    ///
    /// Propagates key callback failures and reader errors raised while the
    /// key's namespace is loaded.
    pub fn get(&mut self, key: &str) -> Result<Option<Value>> {
        self.get_with(key, None, false)
    }

    /// Looks up `key`, falling back to `default` without storing it.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn get_or(&mut self, key: &str, default: impl Into<Value>) -> Result<Option<Value>> {
        self.get_with(key, Some(default.into()), false)
    }

    /// Looks up `key`, storing `default` at that key when it is missing so
    /// later lookups see it.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn get_or_persist(
        &mut self,
        key: &str,
        default: impl Into<Value>,
    ) -> Result<Option<Value>> {
        self.get_with(key, Some(default.into()), true)
    }

    /// Full lookup pipeline: key callbacks, lazy namespace load, default
    /// handling, then value callbacks.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn get_with(
        &mut self,
        key: &str,
        default: Option<Value>,
        persist_default: bool,
    ) -> Result<Option<Value>> {
        let key = self.apply_key_callbacks(key)?;

        if !self.data.has_key(&key) {
            let namespace = key
                .split(self.data.separator())
                .next()
                .unwrap_or_default()
                .to_string();
            self.load_namespace(&namespace)?;
        }

        let value = if self.data.has_key(&key) {
            self.data.get(&key).cloned()
        } else {
            if persist_default {
                self.data
                    .add_value(&key, default.clone().unwrap_or_default());
            }
            default
        };

        Ok(self.apply_value_callbacks(&key, value))
    }

    /// Looks up `key` and deserializes it into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Convert`] when the value does not fit `T`, plus
    /// anything [`get`](Self::get) returns.
    pub fn get_as<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>> {
        self.get(key)?
            .map(|value| {
                serde_json::from_value(value.to_json()).map_err(|source| ConfigError::Convert {
                    key: key.to_string(),
                    source,
                })
            })
            .transpose()
    }

    /// Everything loaded or persisted so far.
    #[must_use]
    pub fn current_configuration(&self) -> &Tree {
        self.data.tree()
    }

    #[must_use]
    pub fn is_loaded(&self, namespace: &str) -> bool {
        self.loaded.contains(namespace)
    }

    pub fn append_path(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.append_path_in(path, DEFAULT_GROUP)
    }

    pub fn append_path_in(&mut self, path: impl AsRef<Path>, group: &str) -> &mut Self {
        self.paths.append_value(path.as_ref().to_path_buf(), group);
        self
    }

    pub fn prepend_path(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.prepend_path_in(path, DEFAULT_GROUP)
    }

    pub fn prepend_path_in(&mut self, path: impl AsRef<Path>, group: &str) -> &mut Self {
        self.paths.prepend_value(path.as_ref().to_path_buf(), group);
        self
    }

    /// Places the path group `group` right before `before` or right after
    /// `after`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidArgument`] when neither target is given
    /// or both are the same group.
    pub fn order_group_path(
        &mut self,
        group: &str,
        before: Option<&str>,
        after: Option<&str>,
    ) -> Result<&mut Self> {
        self.paths.set_group_position(group, before, after)?;
        Ok(self)
    }

    /// Search directories in the order they are scanned.
    #[must_use]
    pub fn paths(&self) -> Vec<&Path> {
        self.paths.iter().map(PathBuf::as_path).collect()
    }

    pub fn append_reader<R: Reader + 'static>(&mut self, reader: R) -> &mut Self {
        self.append_shared_reader(Arc::new(reader))
    }

    pub fn prepend_reader<R: Reader + 'static>(&mut self, reader: R) -> &mut Self {
        self.prepend_shared_reader(Arc::new(reader))
    }

    pub fn append_shared_reader(&mut self, reader: Arc<dyn Reader>) -> &mut Self {
        self.readers.push(reader);
        self
    }

    pub fn prepend_shared_reader(&mut self, reader: Arc<dyn Reader>) -> &mut Self {
        self.readers.insert(0, reader);
        self
    }

    pub fn append_key_callback<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&mut Self, &str) -> Result<String> + Send + Sync + 'static,
    {
        self.key_callbacks.push(Arc::new(callback));
        self
    }

    pub fn prepend_key_callback<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&mut Self, &str) -> Result<String> + Send + Sync + 'static,
    {
        self.key_callbacks.insert(0, Arc::new(callback));
        self
    }

    pub fn append_value_callback<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&str, Option<Value>) -> Option<Value> + Send + Sync + 'static,
    {
        self.value_callbacks.push(Arc::new(callback));
        self
    }

    pub fn prepend_value_callback<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&str, Option<Value>) -> Option<Value> + Send + Sync + 'static,
    {
        self.value_callbacks.insert(0, Arc::new(callback));
        self
    }

    /// Flattened snapshot of the current configuration.
    #[must_use]
    pub fn flatten(&self) -> FlatMap {
        self.data.flatten()
    }

    #[must_use]
    pub fn iter(&self) -> indexmap::map::IntoIter<String, Value> {
        self.data.iter()
    }

    /// Number of flattened entries currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn apply_key_callbacks(&mut self, key: &str) -> Result<String> {
        // Snapshot so callbacks may run nested lookups through `self`.
        let callbacks = self.key_callbacks.clone();
        let mut key = key.to_string();
        for callback in &callbacks {
            let rewritten = callback(self, &key)?;
            if rewritten != key {
                trace!(from = %key, to = %rewritten, "key rewritten");
            }
            key = rewritten;
        }
        Ok(key)
    }

    fn apply_value_callbacks(&self, key: &str, value: Option<Value>) -> Option<Value> {
        self.value_callbacks
            .iter()
            .fold(value, |value, callback| callback(key, value))
    }

    /// Extensions of all readers, in registration order.
    fn extensions(&self) -> Vec<String> {
        self.readers
            .iter()
            .flat_map(|reader| reader.extensions().iter().map(|ext| (*ext).to_string()))
            .collect()
    }

    fn load_namespace(&mut self, namespace: &str) -> Result<()> {
        if self.loaded.contains(namespace) {
            return Ok(());
        }

        let extensions = self.extensions();
        for dir in self.paths.all_values() {
            for candidate in scan_namespace(dir, namespace, &extensions) {
                for reader in self.readers.iter().filter(|r| r.can_read(&candidate.name)) {
                    let path = dir.join(&candidate.disk_name);
                    let tree = match reader.read(&path) {
                        Ok(tree) => tree,
                        Err(ConfigError::ReadFile { source, .. }) => {
                            warn!(
                                path = %path.display(),
                                error = %source,
                                "cannot read config file, skipping"
                            );
                            continue;
                        }
                        Err(e) => return Err(e),
                    };
                    debug!(
                        namespace,
                        path = %path.display(),
                        entries = tree.len(),
                        "merging config file"
                    );
                    self.data.add_tree(&tree, namespace, false);
                }
            }
        }

        debug!(namespace, "namespace loaded");
        self.loaded.insert(namespace.to_string());
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ChainConfig {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
