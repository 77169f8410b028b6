//! Health checker adapters.

mod http;
mod static_checker;

pub use http::HttpHealthChecker;
pub use static_checker::StaticHealthChecker;
