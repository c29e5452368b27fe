//! Tower middleware for fronde transports.
//!
//! Middleware composes as tower layers over a service of fronde requests;
//! wrap the resulting stack with [`crate::ServiceTransport`] to inject it
//! as a builder's transport.
//!
//! # Example
//!
//! ```ignore
//! use tower::ServiceBuilder;
//!
//! let service = ServiceBuilder::new()
//!     .layer(LoggingLayer::new())
//!     .service(HyperTransport::new());
//! let fronde = Fronde::with_transport(ServiceTransport::new(service));
//! ```

mod logging;

pub use logging::{Logging, LoggingLayer};
