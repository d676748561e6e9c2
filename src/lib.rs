//! CORS Proxy Library
//!
//! Relays `?<encoded-target-url>` requests from allow-listed browser origins
//! and attaches the CORS headers the browser needs to read the response.

pub mod config;
pub mod cors;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::ProxyConfig;
pub use cors::CorsPolicy;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
