//! Collaborators the request pipeline depends on.
//!
//! This module provides:
//! - The transport contract and a reqwest-backed transport
//! - The cookie store contract and an in-memory store
//! - Schedulers for client-side timeouts, including a virtual clock for tests

mod client;
mod cookies;
mod scheduler;
mod transport;

pub use client::{decode_body, ReqwestTransport};
pub use cookies::{cookie_domain, CookieDetails, CookieError, CookieStore, DynCookieStore, MemoryCookieStore};
pub use scheduler::{DynScheduler, Scheduler, TokioScheduler, VirtualScheduler};
pub use transport::{
    DataType, DynTransport, ErrorThrown, RawResponse, ResponseBody, TextStatus, Transport,
    TransportFailure, TransportOptions,
};
