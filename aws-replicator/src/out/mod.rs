//! Transport bridge between the operator's machine and the local instance.
//!
//! [`http::HttpBridge`] posts envelopes; [`server::build_router`] is the
//! receiving endpoint mounted inside the local instance.

pub mod http;
pub mod server;

pub use http::HttpBridge;
pub use server::{build_router, InjectionState};
