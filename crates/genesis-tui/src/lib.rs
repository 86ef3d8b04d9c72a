//! genesis-tui: Terminal widgets for the Genesis chat client
//!
//! Widgets render the display models produced by `genesis-core`; none of them
//! hold conversation state of their own.

pub mod input;
pub mod theme;
pub mod widgets;

pub use theme::Theme;
