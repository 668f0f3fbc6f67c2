pub mod http;
pub mod traits;

pub use http::HttpTransport;
pub use traits::{HttpReply, Method, ProbeError, RegistryTransport};

/// Registry endpoints exercised by the harness
pub const HEALTH_PATH: &str = "/health";
pub const REGISTER_PATH: &str = "/api/services/register";
pub const DISCOVER_PATH: &str = "/api/services/discover";
pub const LIST_PATH: &str = "/api/services/list";
