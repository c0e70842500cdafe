//! Courier - reactive JSON/XML request facade.
//!
//! Requests are cold, single-outcome streams. A request either yields one
//! parsed value or fails with one classified [`RequestError`]:
//!
//! - `AjaxError`: no response reached the client
//! - `TimeoutError`: the client-side deadline elapsed first
//! - `HttpError`: the server answered with a failure status
//! - `ParseError`: the body, or the caller's parser, was unusable
//!
//! A 401 answer clears the configured session cookie and is retried once.
//!
//! # Example
//!
//! ```rust,ignore
//! use courier::{Params, RequestClient, RequestConfig};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> courier::Result<()> {
//!     let client = RequestClient::new()?;
//!     let request = client.json(
//!         RequestConfig::new("https://ci.example.com/api/json")
//!             .with_data(Params::new().with("tree", "jobs[name,color]"))
//!             .with_auth_cookie("JSESSIONID"),
//!     );
//!
//!     let mut outcomes = request.stream();
//!     while let Some(outcome) = outcomes.next().await {
//!         match outcome {
//!             Ok(raw) => println!("{:?}", raw.body),
//!             Err(e) => eprintln!("{}: {:?}", e.name(), e.description()),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod network;
pub mod request;

mod api;

pub use api::{RequestClient, RequestClientBuilder};
pub use error::{CourierError, RequestError, Result};
pub use network::{
    CookieDetails, CookieError, CookieStore, DataType, ErrorThrown, MemoryCookieStore, RawResponse,
    ReqwestTransport, ResponseBody, Scheduler, TextStatus, TokioScheduler, Transport,
    TransportFailure, TransportOptions, VirtualScheduler,
};
pub use request::{
    observer_fn, Notification, Observer, ParamValue, Params, Request, RequestConfig,
    ResponseStream, Subscription,
};
