//! Security subsystem.
//!
//! # Components
//! - `headers`: hop-by-hop stripping on relayed requests and responses
//!
//! Origin enforcement lives in `cors`; the inbound body limit is applied by
//! the forwarder from `SecurityConfig::max_body_size`.

pub mod headers;
