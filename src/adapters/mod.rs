//! Adapters Layer
//!
//! Inbound adapters expose the service over HTTP; outbound adapters
//! implement the domain ports against concrete infrastructure.

pub mod inbound;
pub mod outbound;
