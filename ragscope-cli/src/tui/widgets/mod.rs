//! TUI widget modules.

pub mod controls;
pub mod header;
pub mod panels;
pub mod status_bar;
