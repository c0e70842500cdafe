//! The request pipeline.
//!
//! ```text
//! subscribe / poll
//!     → builder.rs     (RequestConfig → TransportOptions)
//!     → coordinator.rs (transport call raced against the timeout)
//!     → classify.rs    (failure → RequestError)
//!     → coordinator.rs (401 → clear session cookie, retry once)
//!     → stream.rs      (one value or one error to the subscriber)
//! ```

pub mod builder;
pub mod classify;
mod config;
mod coordinator;
mod params;
mod stream;

pub use config::{Parser, RequestConfig};
pub use params::{ParamValue, Params};
pub use stream::{observer_fn, FnObserver, Notification, Observer, Request, ResponseStream, Subscription};
