//! CLI command implementations.

pub(crate) mod migrate;
pub(crate) mod render;
pub(crate) mod serve;

pub(crate) use migrate::MigrateArgs;
pub(crate) use render::RenderArgs;
pub(crate) use serve::ServeArgs;
