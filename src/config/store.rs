use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use bigdecimal::BigDecimal;
use tracing::warn;

use crate::path::ResourceContext;

use super::key::ConfigKey;
use super::{props, ConfigError};

/// One logical `key=value` configuration file.
///
/// A store resolves its file through the [`ResourceContext`], loads it
/// lazily on first access, answers typed queries with default-value and
/// prefix semantics, and rewrites the whole backing file on mutation.
///
/// Load resolution order:
/// 1. in packaged mode, an operator override: the first non-archive
///    search-path entry holding a same-named file next to the archive,
/// 2. the resolved on-disk location,
/// 3. the embedded resource bundled in the archive,
/// 4. otherwise the store is empty.
///
/// A store loaded only from an embedded resource has no on-disk path
/// and refuses persistence with [`ConfigError::NotPersistent`].
///
/// All interior state sits behind one mutex, so concurrent mutations
/// against the same store serialize instead of interleaving their
/// read-modify-rewrite cycles.
pub struct PropertyStore {
    ctx: Arc<ResourceContext>,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    logical_id: Option<String>,
    file_path: Option<PathBuf>,
    map: Option<HashMap<String, String>>,
}

impl std::fmt::Debug for PropertyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("PropertyStore")
            .field("logical_id", &inner.logical_id)
            .field("file_path", &inner.file_path)
            .field("loaded", &inner.map.is_some())
            .finish()
    }
}

impl PropertyStore {
    /// Creates an empty, uninitialized store.
    pub fn new(ctx: Arc<ResourceContext>) -> Self {
        Self {
            ctx,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Resolves and (re)loads the file behind `logical_id`.
    ///
    /// Re-callable: calling it again forces a reload from the backing
    /// file. Read failures degrade to an empty store; startup never
    /// aborts over an unreadable config.
    pub fn initialize(&self, logical_id: &str) {
        let mut inner = self.lock();
        inner.logical_id = Some(logical_id.to_string());
        inner.file_path = self.ctx.resolve(logical_id);
        inner.map = Some(self.load(&inner));
    }

    /// The logical id this store was initialized with.
    pub fn logical_id(&self) -> Option<String> {
        self.lock().logical_id.clone()
    }

    /// The resolved on-disk location, or `None` for an embedded-only store.
    pub fn file_path(&self) -> Option<PathBuf> {
        self.lock().file_path.clone()
    }

    /// Returns the configured value for `key`, or the key's declared
    /// default, or `None`.
    pub fn get(&self, key: &ConfigKey) -> Option<String> {
        let mut inner = self.lock();
        self.ensure_loaded(&mut inner);
        lookup(&inner, key.name(), key)
    }

    /// [`get`](Self::get) looking up `prefix + key.name()`. The default
    /// fallback still consults the key's own declared default.
    pub fn get_prefixed(&self, prefix: &str, key: &ConfigKey) -> Option<String> {
        let mut inner = self.lock();
        self.ensure_loaded(&mut inner);
        lookup(&inner, &format!("{}{}", prefix, key.name()), key)
    }

    /// Whether the value for `key` is the literal `"true"`, case
    /// insensitively. Absence and any other value are `false`.
    pub fn is_true(&self, key: &ConfigKey) -> bool {
        matches!(self.get(key), Some(value) if value.eq_ignore_ascii_case("true"))
    }

    pub fn is_true_prefixed(&self, prefix: &str, key: &ConfigKey) -> bool {
        matches!(self.get_prefixed(prefix, key), Some(value) if value.eq_ignore_ascii_case("true"))
    }

    /// Parses the value for `key` as an arbitrary-precision decimal.
    ///
    /// Absence is `Ok(None)`; a malformed numeric string is the one
    /// validation failure this subsystem surfaces to the caller.
    pub fn decimal(&self, key: &ConfigKey) -> Result<Option<BigDecimal>, ConfigError> {
        parse_decimal(key.name(), self.get(key))
    }

    pub fn decimal_prefixed(
        &self,
        prefix: &str,
        key: &ConfigKey,
    ) -> Result<Option<BigDecimal>, ConfigError> {
        parse_decimal(key.name(), self.get_prefixed(prefix, key))
    }

    /// Sets one value and rewrites the backing file.
    pub fn set(&self, key: &ConfigKey, value: &str) -> Result<(), ConfigError> {
        self.store_entries(|map| {
            map.insert(key.name().to_string(), value.to_string());
        })
    }

    /// [`set`](Self::set) under `prefix + key.name()`.
    pub fn set_prefixed(&self, prefix: &str, key: &ConfigKey, value: &str) -> Result<(), ConfigError> {
        self.store_entries(|map| {
            map.insert(format!("{}{}", prefix, key.name()), value.to_string());
        })
    }

    /// Applies a batch of updates, then rewrites the backing file once.
    /// Entries with a `None` value are skipped, not removed.
    pub fn set_many(&self, entries: &[(ConfigKey, Option<String>)]) -> Result<(), ConfigError> {
        self.store_entries(|map| {
            for (key, value) in entries {
                if let Some(value) = value {
                    map.insert(key.name().to_string(), value.clone());
                }
            }
        })
    }

    fn store_entries(
        &self,
        apply: impl FnOnce(&mut HashMap<String, String>),
    ) -> Result<(), ConfigError> {
        let mut inner = self.lock();
        self.ensure_loaded(&mut inner);
        if inner.file_path.is_none() {
            let logical_id = inner.logical_id.clone().unwrap_or_default();
            warn!(
                config = %logical_id,
                "config is not backed by a file, maybe just an embedded resource; cannot persist"
            );
            return Err(ConfigError::NotPersistent { logical_id });
        }
        if let Some(map) = inner.map.as_mut() {
            apply(map);
        }
        self.persist(&inner)
    }

    fn persist(&self, inner: &Inner) -> Result<(), ConfigError> {
        let path = match inner.file_path.as_ref() {
            Some(path) => path,
            None => {
                return Err(ConfigError::NotPersistent {
                    logical_id: inner.logical_id.clone().unwrap_or_default(),
                })
            }
        };
        let empty = HashMap::new();
        props::write_file(path, inner.map.as_ref().unwrap_or(&empty))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // Every read or write path funnels through here, so the file loads
    // exactly once until the next initialize().
    fn ensure_loaded(&self, inner: &mut Inner) {
        if inner.map.is_none() {
            inner.map = Some(self.load(inner));
        }
    }

    fn load(&self, inner: &Inner) -> HashMap<String, String> {
        let logical_id = match inner.logical_id.as_deref() {
            Some(id) => id,
            None => return HashMap::new(),
        };

        // Packaged runs honor an operator override placed on a
        // non-archive search-path entry alongside the archive.
        if self.ctx.is_packaged() {
            if let Some(map) = self.load_packaged_override(logical_id) {
                return map;
            }
        }

        if let Some(path) = inner.file_path.as_ref() {
            return match props::read_file(path) {
                Ok(map) => map,
                Err(err) => {
                    warn!(config = %logical_id, error = %err, "failed to load config file");
                    HashMap::new()
                }
            };
        }

        if let Some(reader) = self.ctx.open_embedded(logical_id) {
            return match props::read(reader) {
                Ok(map) => map,
                Err(err) => {
                    warn!(config = %logical_id, error = %err, "failed to load embedded config");
                    HashMap::new()
                }
            };
        }

        HashMap::new()
    }

    fn load_packaged_override(&self, logical_id: &str) -> Option<HashMap<String, String>> {
        let archive_dir = self.ctx.archive_dir()?;
        for entry in self.ctx.non_archive_search_paths() {
            let entry_path = Path::new(&entry);
            let base = if entry_path.is_absolute() {
                entry_path.to_path_buf()
            } else {
                archive_dir.join(entry_path)
            };
            let candidate = base.join(logical_id);
            if candidate.is_file() {
                // First hit ends the scan, even if it fails to read.
                return Some(match props::read_file(&candidate) {
                    Ok(map) => map,
                    Err(err) => {
                        warn!(config = %logical_id, error = %err, "failed to load override config");
                        HashMap::new()
                    }
                });
            }
        }
        None
    }
}

fn lookup(inner: &Inner, name: &str, key: &ConfigKey) -> Option<String> {
    inner
        .map
        .as_ref()
        .and_then(|map| map.get(name).cloned())
        .or_else(|| key.default_value().map(str::to_string))
}

fn parse_decimal(
    name: &str,
    value: Option<String>,
) -> Result<Option<BigDecimal>, ConfigError> {
    match value {
        Some(value) => BigDecimal::from_str(&value)
            .map(Some)
            .map_err(|source| ConfigError::MalformedDecimal {
                key: name.to_string(),
                value,
                source,
            }),
        None => Ok(None),
    }
}
