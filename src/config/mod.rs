//! Layered property-file configuration: loading, querying, persistence.

mod error;
mod key;
mod props;
mod registry;
mod store;

pub use error::ConfigError;
pub use key::ConfigKey;
pub use registry::{ConfigRegistry, DEFAULT_DEBUG_CONFIG_PATH, DEFAULT_SYSTEM_CONFIG_PATH};
pub use store::PropertyStore;
