pub mod error;
pub mod types;

pub use error::{ProxyError, Result};
pub use types::{DEFAULT_SLOW_THRESHOLD, PARAM_SLOW_THRESHOLD, ParametersMap, parse_duration};
