/// A caller-defined configuration key.
///
/// Keys are opaque capabilities: the name is the lookup string in the
/// property file, an optional default is returned when the file holds
/// no value, and an optional home pins the key to one logical config
/// file so registry lookups need no explicit path.
///
/// ```
/// use resconf::ConfigKey;
///
/// let plain = ConfigKey::new("cache.size");
/// let with_default = ConfigKey::with_default("cache.size", "128");
/// let homed = ConfigKey::new("cache.size").homed("config/cache.properties");
/// # let _ = (plain, with_default, homed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigKey {
    name: String,
    default: Option<String>,
    home: Option<String>,
}

impl ConfigKey {
    /// Creates a key with no default value.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            home: None,
        }
    }

    /// Creates a key that falls back to `default` when unset.
    pub fn with_default(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
            home: None,
        }
    }

    /// Pins the key to the config file with the given logical path.
    pub fn homed(mut self, logical_id: impl Into<String>) -> Self {
        self.home = Some(logical_id.into());
        self
    }

    /// The lookup string in the property file.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared default value, if any.
    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// The logical path of the file this key lives in, if pinned.
    pub fn home(&self) -> Option<&str> {
        self.home.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_key_has_no_default_or_home() {
        let key = ConfigKey::new("a.b");
        assert_eq!(key.name(), "a.b");
        assert_eq!(key.default_value(), None);
        assert_eq!(key.home(), None);
    }

    #[test]
    fn test_default_and_home_are_carried() {
        let key = ConfigKey::with_default("a", "1").homed("config/x.properties");
        assert_eq!(key.default_value(), Some("1"));
        assert_eq!(key.home(), Some("config/x.properties"));
    }
}
