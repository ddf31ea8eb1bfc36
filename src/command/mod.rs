mod clear_key;
mod common;
mod config;
mod contexts;
mod preview;
mod send;
mod set_key;
mod start;
mod status;

pub use clear_key::run_clear_key;
pub use common::context_selection;
pub use config::{run_config_set, run_config_show};
pub use contexts::run_contexts;
pub use preview::run_preview;
pub use send::run_send;
pub use set_key::run_set_key;
pub use start::{run_start, StartOptions};
pub use status::run_status;
