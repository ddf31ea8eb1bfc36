//! MCP tool implementations.
//!
//! Each tool is implemented in its own module for better organization.

mod common;
mod contexts;
mod prepare;
mod status;
mod submit;

pub use contexts::list_contexts;
pub use prepare::prepare_handoff;
pub use status::handoff_status;
pub use submit::submit_handoff;
