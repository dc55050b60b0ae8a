pub mod config;
pub mod path;
mod error;

pub use config::{ConfigError, ConfigKey, ConfigRegistry, PropertyStore};
pub use error::Error;
pub use path::{
    EmbeddedResources, NoEmbeddedResources, PathEnvironment, ResourceContext, RunMode,
    StaticResources,
};
