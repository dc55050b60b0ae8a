use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use bigdecimal::BigDecimal;

use crate::path::ResourceContext;

use super::key::ConfigKey;
use super::store::PropertyStore;
use super::ConfigError;

/// Default logical path of the system (product) config file.
pub const DEFAULT_SYSTEM_CONFIG_PATH: &str = "config/config.properties";
/// Default logical path of the debug config file.
pub const DEFAULT_DEBUG_CONFIG_PATH: &str = "config/self.properties";

struct WellKnown {
    logical_id: String,
    store: Arc<PropertyStore>,
}

/// Named table of [`PropertyStore`]s: the public query/mutate surface.
///
/// Two well-known stores are always present — "system"
/// ([`DEFAULT_SYSTEM_CONFIG_PATH`]) and "debug"
/// ([`DEFAULT_DEBUG_CONFIG_PATH`]) — plus an open table of
/// caller-registered stores keyed by logical path.
///
/// The self-config surface is deliberately asymmetric: reads on an
/// unregistered logical path auto-provision a fresh (possibly empty)
/// store and answer from it, while writes on an unregistered path are
/// silent no-ops. Callers that want writes to land must
/// [`register`](Self::register) first.
pub struct ConfigRegistry {
    ctx: Arc<ResourceContext>,
    system: RwLock<WellKnown>,
    debug: RwLock<WellKnown>,
    others: RwLock<HashMap<String, Arc<PropertyStore>>>,
}

impl ConfigRegistry {
    /// Creates a registry and loads the two well-known stores from
    /// their default logical paths.
    pub fn new(ctx: Arc<ResourceContext>) -> Self {
        let system = Self::well_known(&ctx, DEFAULT_SYSTEM_CONFIG_PATH);
        let debug = Self::well_known(&ctx, DEFAULT_DEBUG_CONFIG_PATH);
        Self {
            ctx,
            system: RwLock::new(system),
            debug: RwLock::new(debug),
            others: RwLock::new(HashMap::new()),
        }
    }

    fn well_known(ctx: &Arc<ResourceContext>, logical_id: &str) -> WellKnown {
        let store = Arc::new(PropertyStore::new(Arc::clone(ctx)));
        store.initialize(logical_id);
        WellKnown {
            logical_id: logical_id.to_string(),
            store,
        }
    }

    // ---- system config ----

    pub fn get_system(&self, key: &ConfigKey) -> Option<String> {
        self.system_store().get(key)
    }

    pub fn get_system_prefixed(&self, prefix: &str, key: &ConfigKey) -> Option<String> {
        self.system_store().get_prefixed(prefix, key)
    }

    pub fn is_system_true(&self, key: &ConfigKey) -> bool {
        self.system_store().is_true(key)
    }

    pub fn is_system_true_prefixed(&self, prefix: &str, key: &ConfigKey) -> bool {
        self.system_store().is_true_prefixed(prefix, key)
    }

    pub fn system_decimal(&self, key: &ConfigKey) -> Result<Option<BigDecimal>, ConfigError> {
        self.system_store().decimal(key)
    }

    pub fn system_decimal_prefixed(
        &self,
        prefix: &str,
        key: &ConfigKey,
    ) -> Result<Option<BigDecimal>, ConfigError> {
        self.system_store().decimal_prefixed(prefix, key)
    }

    pub fn set_system(&self, key: &ConfigKey, value: &str) -> Result<(), ConfigError> {
        self.system_store().set(key, value)
    }

    pub fn set_system_prefixed(
        &self,
        prefix: &str,
        key: &ConfigKey,
        value: &str,
    ) -> Result<(), ConfigError> {
        self.system_store().set_prefixed(prefix, key, value)
    }

    pub fn set_system_many(
        &self,
        entries: &[(ConfigKey, Option<String>)],
    ) -> Result<(), ConfigError> {
        self.system_store().set_many(entries)
    }

    /// Swaps the system store's backing logical path and/or its store
    /// implementation. Passing either argument re-initializes the
    /// (possibly replaced) store; passing both `None` does nothing.
    pub fn set_system_source(
        &self,
        logical_id: Option<&str>,
        store: Option<PropertyStore>,
    ) -> Result<(), ConfigError> {
        Self::swap_source(&self.system, logical_id, store);
        Ok(())
    }

    // ---- debug config ----

    pub fn get_debug(&self, key: &ConfigKey) -> Option<String> {
        self.debug_store().get(key)
    }

    pub fn get_debug_prefixed(&self, prefix: &str, key: &ConfigKey) -> Option<String> {
        self.debug_store().get_prefixed(prefix, key)
    }

    pub fn is_debug_true(&self, key: &ConfigKey) -> bool {
        self.debug_store().is_true(key)
    }

    pub fn is_debug_true_prefixed(&self, prefix: &str, key: &ConfigKey) -> bool {
        self.debug_store().is_true_prefixed(prefix, key)
    }

    pub fn debug_decimal(&self, key: &ConfigKey) -> Result<Option<BigDecimal>, ConfigError> {
        self.debug_store().decimal(key)
    }

    pub fn debug_decimal_prefixed(
        &self,
        prefix: &str,
        key: &ConfigKey,
    ) -> Result<Option<BigDecimal>, ConfigError> {
        self.debug_store().decimal_prefixed(prefix, key)
    }

    pub fn set_debug(&self, key: &ConfigKey, value: &str) -> Result<(), ConfigError> {
        self.debug_store().set(key, value)
    }

    pub fn set_debug_prefixed(
        &self,
        prefix: &str,
        key: &ConfigKey,
        value: &str,
    ) -> Result<(), ConfigError> {
        self.debug_store().set_prefixed(prefix, key, value)
    }

    pub fn set_debug_many(
        &self,
        entries: &[(ConfigKey, Option<String>)],
    ) -> Result<(), ConfigError> {
        self.debug_store().set_many(entries)
    }

    /// Debug-store counterpart of [`set_system_source`](Self::set_system_source).
    pub fn set_debug_source(
        &self,
        logical_id: Option<&str>,
        store: Option<PropertyStore>,
    ) -> Result<(), ConfigError> {
        Self::swap_source(&self.debug, logical_id, store);
        Ok(())
    }

    // ---- self (caller-registered) configs ----

    pub fn get_self(&self, logical_id: &str, key: &ConfigKey) -> Option<String> {
        self.self_store(logical_id).get(key)
    }

    pub fn get_self_prefixed(
        &self,
        logical_id: &str,
        prefix: &str,
        key: &ConfigKey,
    ) -> Option<String> {
        self.self_store(logical_id).get_prefixed(prefix, key)
    }

    pub fn is_self_true(&self, logical_id: &str, key: &ConfigKey) -> bool {
        self.self_store(logical_id).is_true(key)
    }

    pub fn is_self_true_prefixed(&self, logical_id: &str, prefix: &str, key: &ConfigKey) -> bool {
        self.self_store(logical_id).is_true_prefixed(prefix, key)
    }

    pub fn self_decimal(
        &self,
        logical_id: &str,
        key: &ConfigKey,
    ) -> Result<Option<BigDecimal>, ConfigError> {
        self.self_store(logical_id).decimal(key)
    }

    pub fn self_decimal_prefixed(
        &self,
        logical_id: &str,
        prefix: &str,
        key: &ConfigKey,
    ) -> Result<Option<BigDecimal>, ConfigError> {
        self.self_store(logical_id).decimal_prefixed(prefix, key)
    }

    /// Writes to a registered self config. Unregistered logical ids are
    /// a silent no-op; reads auto-provision, writes do not.
    pub fn set_self(&self, logical_id: &str, key: &ConfigKey, value: &str) -> Result<(), ConfigError> {
        match self.registered(logical_id) {
            Some(store) => store.set(key, value),
            None => Ok(()),
        }
    }

    pub fn set_self_prefixed(
        &self,
        logical_id: &str,
        prefix: &str,
        key: &ConfigKey,
        value: &str,
    ) -> Result<(), ConfigError> {
        match self.registered(logical_id) {
            Some(store) => store.set_prefixed(prefix, key, value),
            None => Ok(()),
        }
    }

    pub fn set_self_many(
        &self,
        logical_id: &str,
        entries: &[(ConfigKey, Option<String>)],
    ) -> Result<(), ConfigError> {
        match self.registered(logical_id) {
            Some(store) => store.set_many(entries),
            None => Ok(()),
        }
    }

    /// Installs a self config under `logical_id`, replacing any
    /// previous entry for the same id.
    ///
    /// With `store` given, that store is installed; otherwise the
    /// existing store is reused (or a fresh one created). Either way
    /// the installed store is (re)initialized against `logical_id`.
    pub fn register(&self, logical_id: &str, store: Option<PropertyStore>) {
        let store = match store {
            Some(store) => Arc::new(store),
            None => match self.registered(logical_id) {
                Some(existing) => existing,
                None => Arc::new(PropertyStore::new(Arc::clone(&self.ctx))),
            },
        };
        store.initialize(logical_id);
        self.write_others().insert(logical_id.to_string(), store);
    }

    // ---- homed keys ----

    /// Reads a key pinned to its own config file. Keys without a home
    /// yield the absent-value result.
    pub fn get_homed(&self, key: &ConfigKey) -> Option<String> {
        self.get_self(key.home()?, key)
    }

    pub fn is_homed_true(&self, key: &ConfigKey) -> bool {
        match key.home() {
            Some(home) => self.is_self_true(home, key),
            None => false,
        }
    }

    pub fn homed_decimal(&self, key: &ConfigKey) -> Result<Option<BigDecimal>, ConfigError> {
        match key.home() {
            Some(home) => self.self_decimal(home, key),
            None => Ok(None),
        }
    }

    /// Writes a key pinned to its own config file; a key without a home
    /// (or with an unregistered home) is a silent no-op.
    pub fn set_homed(&self, key: &ConfigKey, value: &str) -> Result<(), ConfigError> {
        match key.home() {
            Some(home) => self.set_self(home, key, value),
            None => Ok(()),
        }
    }

    // ---- internals ----

    fn system_store(&self) -> Arc<PropertyStore> {
        let slot = self.system.read().unwrap_or_else(|p| p.into_inner());
        Arc::clone(&slot.store)
    }

    fn debug_store(&self) -> Arc<PropertyStore> {
        let slot = self.debug.read().unwrap_or_else(|p| p.into_inner());
        Arc::clone(&slot.store)
    }

    fn registered(&self, logical_id: &str) -> Option<Arc<PropertyStore>> {
        self.others
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .get(logical_id)
            .map(Arc::clone)
    }

    fn write_others(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<PropertyStore>>> {
        self.others.write().unwrap_or_else(|p| p.into_inner())
    }

    /// Reads auto-provision: an unregistered id gets a fresh store,
    /// initialized and installed, before the query runs.
    fn self_store(&self, logical_id: &str) -> Arc<PropertyStore> {
        if let Some(store) = self.registered(logical_id) {
            return store;
        }
        self.register(logical_id, None);
        // A concurrent register may have installed another store in
        // between; whatever the table holds now wins.
        self.registered(logical_id)
            .unwrap_or_else(|| Arc::new(PropertyStore::new(Arc::clone(&self.ctx))))
    }

    fn swap_source(
        slot: &RwLock<WellKnown>,
        logical_id: Option<&str>,
        store: Option<PropertyStore>,
    ) {
        let replacing_store = store.is_some();
        let mut slot = slot.write().unwrap_or_else(|p| p.into_inner());
        if let Some(store) = store {
            slot.store = Arc::new(store);
        }
        if let Some(logical_id) = logical_id {
            slot.logical_id = logical_id.to_string();
            slot.store.initialize(&slot.logical_id);
        } else if replacing_store {
            slot.store.initialize(&slot.logical_id);
        }
    }
}
