//! Integration and unit tests for the AgentDeck backend.
//!
//! ## Test Modules
//!
//! - **support**: Temporary config directory, app fixture and request helpers
//! - **api_tests**: Agent and skill endpoints
//! - **system_api_tests**: IDE connections, usage stats and SDK settings
//! - **health_api_tests**: Health, metrics, version and the middleware stack
//! - **config_tests**: Configuration defaults, loading and validation
//! - **error_tests**: Error envelope and validation helpers
//! - **scanner_tests**: Skill discovery on disk
//!
//! Individual test modules can be run with:
//! ```bash
//! cargo test scanner_tests
//! ```

pub mod api_tests;
pub mod support;
pub mod system_api_tests;
