//! Type definitions for the AySA configuration file

mod config_types;
mod stage;

pub use config_types::*;
pub use stage::Stage;
