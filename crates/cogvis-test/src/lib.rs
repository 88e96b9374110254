#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod mock;

pub use mock::{
    MOCK_API_ROOT, MockVisionConfig, MockVisionProvider, ScriptedOperationProvider,
    create_mock_service,
};
