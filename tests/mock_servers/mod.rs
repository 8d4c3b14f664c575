//! Mock servers for backend integration testing
//!
//! Simulates the external catering REST API so `HttpBackend` can be
//! exercised end to end without a real backend.

pub mod catering;

pub use catering::MockCateringApi;
