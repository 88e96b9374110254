//! Mock implementations of the vision provider for testing.
//!
//! These mocks return sensible defaults without touching the network and are
//! useful for unit and integration testing of code built on
//! [`VisionService`].

mod scripted;
mod vision;

use cogvis_core::VisionService;
pub use scripted::ScriptedOperationProvider;
pub use vision::{MOCK_API_ROOT, MockVisionConfig, MockVisionProvider};

/// Creates a vision service backed by a default [`MockVisionProvider`].
pub fn create_mock_service() -> VisionService {
    VisionService::new(MockVisionProvider::default())
}
