//! CORS policy subsystem.
//!
//! # Data Flow
//! ```text
//! Origin header
//!     → origin.rs (parse, hostname, exact allow-list match)
//!     → policy.rs (allow-list + redirect target, shared immutably)
//!     → preflight.rs (OPTIONS answers)
//!     → headers.rs (Access-Control-* / Vary on forwarded responses)
//! ```
//!
//! # Design Decisions
//! - Exact hostname equality; no wildcards or subdomains
//! - Disallowed origins never see CORS headers
//! - The allowed origin is echoed back verbatim, never `*`

pub mod headers;
pub mod origin;
pub mod policy;
pub mod preflight;

pub use headers::{decorate, is_forwardable, ALLOWED_METHODS};
pub use origin::{AllowList, AllowedOrigin};
pub use policy::{CorsPolicy, RedirectTarget};
