//! HTTP outbound adapters.
//!
//! A thin reqwest implementation of the `RestTransport` port.

mod reqwest_transport;

pub use reqwest_transport::ReqwestTransport;
