//! HTTP transport used by the data collector.
//!
//! The collector only needs one capability from the network: an
//! authenticated GET that yields a status code and a body. That capability is
//! the [`Transport`] trait; [`ReqwestTransport`] is the production
//! implementation.

mod client;
mod error;

pub use client::{HttpResponse, ReqwestTransport, Transport, USER_AGENT};
pub use error::TransportError;

#[cfg(test)]
pub use client::MockTransport;
