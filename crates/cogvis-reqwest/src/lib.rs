#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod connect;
mod error;
mod service;

pub use crate::connect::{
    DEFAULT_API_ROOT_TEMPLATE, DEFAULT_REGION, DEFAULT_TIMEOUT_SECS, ReqwestClient, ReqwestConfig,
};
pub use crate::error::{Error, Result};

/// Tracing target for client construction and configuration.
pub const TRACING_TARGET: &str = "cogvis_reqwest::client";

/// Tracing target for HTTP requests and responses.
pub const TRACING_TARGET_HTTP: &str = "cogvis_reqwest::http";
