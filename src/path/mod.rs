//! Run-mode detection and resource path resolution.

mod context;
mod env;
mod manifest;

pub use context::{
    EmbeddedResources, NoEmbeddedResources, ResourceContext, RunMode, StaticResources,
    MANIFEST_RESOURCE,
};
pub use env::PathEnvironment;
