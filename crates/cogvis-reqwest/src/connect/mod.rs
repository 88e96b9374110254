//! Client construction, configuration and response handling.

mod client;
mod config;
mod response;

pub use client::ReqwestClient;
pub(crate) use client::OPERATION_LOCATION_HEADER;
pub use config::{DEFAULT_API_ROOT_TEMPLATE, DEFAULT_REGION, DEFAULT_TIMEOUT_SECS, ReqwestConfig};
pub(crate) use response::read_json;
