pub mod config;
pub mod doctor;
pub mod effects;
pub mod logging;
pub mod menu;
pub mod resources;
pub mod screen;
pub mod surface;
pub mod terminal_restore;
pub mod theme;

pub use logging::{init_logging, log_file_path};
pub use menu::{MenuExit, MenuSession, MenuState, StopHandle, ZoneValues};
