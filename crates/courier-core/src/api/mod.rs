//! Public entry points.

mod builder;

pub use builder::RequestClientBuilder;

use crate::error::Result;
use crate::network::{DataType, DynCookieStore, DynScheduler, DynTransport};
use crate::request::{Request, RequestConfig};
use std::sync::Arc;

/// Issues JSON and XML requests through injected collaborators.
///
/// Cloning is cheap; clones share the transport, cookie store and scheduler.
#[derive(Clone)]
pub struct RequestClient {
    pub(crate) transport: DynTransport,
    pub(crate) cookies: DynCookieStore,
    pub(crate) scheduler: DynScheduler,
}

impl RequestClient {
    /// Client with the default reqwest transport, in-memory cookies and the
    /// tokio clock.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Builder for injecting collaborators.
    pub fn builder() -> RequestClientBuilder {
        RequestClientBuilder::new()
    }

    /// Cold request expecting a JSON body.
    pub fn json<T: Send + 'static>(&self, config: RequestConfig<T>) -> Request<T> {
        self.request(config, DataType::Json)
    }

    /// Cold request expecting an XML document.
    pub fn xml<T: Send + 'static>(&self, config: RequestConfig<T>) -> Request<T> {
        self.request(config, DataType::Xml)
    }

    fn request<T: Send + 'static>(&self, config: RequestConfig<T>, data_type: DataType) -> Request<T> {
        let scheduler = config
            .scheduler()
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.scheduler));
        Request::new(
            config,
            data_type,
            Arc::clone(&self.transport),
            Arc::clone(&self.cookies),
            scheduler,
        )
    }
}

impl std::fmt::Debug for RequestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestClient").finish_non_exhaustive()
    }
}
