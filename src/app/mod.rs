//! Application runtime composition modules.

pub(crate) mod config_runtime;
pub(crate) mod progress;
pub(crate) mod runtime;
pub(crate) mod terminal;
