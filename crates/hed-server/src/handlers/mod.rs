//! HTTP request handlers.

pub(crate) mod config;
pub(crate) mod login;
pub(crate) mod posts;
pub(crate) mod render;
pub(crate) mod upload;
