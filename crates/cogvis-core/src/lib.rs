#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
mod health;

pub mod contract;
pub mod operation;
pub mod provider;
pub mod service;

pub use error::{BoxedError, Error, ErrorKind, Result};
pub use health::{ServiceHealth, ServiceStatus};
pub use operation::{OperationQuery, PollError, PollPolicy};
pub use provider::{AUTO_DETECT_LANGUAGE, VisionProvider};
pub use service::{RecognitionHandle, VisionService};
