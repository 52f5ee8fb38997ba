//! HTTP middleware stack.
//!
//! Request-id assignment and propagation come from `tower-http`; this module
//! adds request logging ([`trace`]) and the CORS policy ([`cors`]).

pub mod cors;
pub mod trace;

pub use trace::REQUEST_ID_HEADER;
