//! API clients for the drama backend
//!
//! - client: HTTP transport and catalog endpoints
//! - normalize: shape-tolerant conversion of upstream JSON
//! - resolver: two-step media location handshake

pub mod client;
pub mod normalize;
pub mod resolver;

pub use client::{ApiError, DramaClient};
pub use resolver::{MediaResolver, Resolve, ResolutionFailure};
