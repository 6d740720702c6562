//! Core reading engine – document model, flattening, cursor sync and snapping.
//!
//! Nothing in this module depends on any TUI or rendering crate.  Layout is
//! reached only through the [`surface::Surface`] trait and persistence only
//! through [`crate::store::KeyValueStore`], so the whole engine runs under
//! test with synthetic instants.

pub mod context;
pub mod convert;
pub mod document;
pub mod flatten;
pub mod location;
pub mod navigation;
pub mod position;
pub mod reactor;
pub mod search;
pub mod session;
pub mod snap;
pub mod surface;
pub mod timer;
pub mod tracker;
