//! UI / rendering layer — everything that touches Ratatui widgets.
//!
//! This layer takes the *core* data structures and turns them into cells on
//! the terminal.  The column layout also acts as the scroll surface the
//! reading session measures.

pub mod column;
pub mod layout;
pub mod popup;
pub mod reader_widget;
pub mod smooth_scroll;
pub mod spinner;
pub mod theme;
