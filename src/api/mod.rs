//! Client for the remote agent's sessions API.
//!
//! `client` owns the reqwest client and request headers, `http` maps
//! transport failures, `types` holds the wire format and `sessions` the
//! create-session call plus the dashboard URL checks.

mod client;
mod http;
mod sessions;
mod types;

pub use client::ApiClient;
pub use sessions::validate_external_url;
pub use types::CreateSessionRequest;
