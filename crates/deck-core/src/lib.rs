pub mod actions;
pub mod branch_picker;
pub mod conductor;
pub mod config;
pub mod cursor;
pub mod dashboard;
pub mod detail;
pub mod feature_linker;
pub mod focus;
pub mod graph;
pub mod input;
pub mod keys;
pub mod list;
pub mod overlay;
pub mod project_manager;
pub mod reducer;
pub mod source;
pub mod state;
pub mod text;
pub mod theme;
pub mod tier;
pub mod views;

pub use actions::*;
pub use reducer::*;
pub use state::*;
