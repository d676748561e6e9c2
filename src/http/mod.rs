//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, dispatcher)
//!     → request.rs (request ID)
//!     → cors (origin check, preflight)
//!     → target.rs (double-decoded target URL from the query)
//!     → forward.rs (outbound fetch via reqwest)
//!     → response.rs (errors, redirect) / cors::decorate
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;
pub mod target;

pub use forward::Forwarder;
pub use request::{MakeRequestUuid, RequestIdExt, X_REQUEST_ID};
pub use response::ForwardError;
pub use server::{AppState, HttpServer, ServerError};
