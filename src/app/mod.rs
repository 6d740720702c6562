//! Application orchestration — state, startup, loading, event loop glue and
//! input handling.

pub mod boot;
pub mod event;
pub mod handler;
pub mod loader;
pub mod settings;
pub mod state;
