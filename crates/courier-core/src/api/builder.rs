//! Builder for configuring a RequestClient.

use std::sync::Arc;

use crate::api::RequestClient;
use crate::error::Result;
use crate::network::{
    CookieStore, MemoryCookieStore, ReqwestTransport, Scheduler, TokioScheduler, Transport,
};

/// Builder for configuring a [`RequestClient`].
///
/// Collaborators left unset fall back to the reqwest transport, a fresh
/// in-memory cookie store and the tokio clock. When both the transport and
/// the cookie store are left unset, the transport sends and records cookies
/// through that same store.
///
/// # Example
///
/// ```rust,ignore
/// use courier::{RequestClient, VirtualScheduler};
/// use std::sync::Arc;
///
/// let scheduler = Arc::new(VirtualScheduler::new());
/// let client = RequestClient::builder()
///     .transport(Arc::new(my_transport))
///     .scheduler(scheduler.clone())
///     .build()?;
/// ```
#[derive(Default)]
pub struct RequestClientBuilder {
    transport: Option<Arc<dyn Transport>>,
    cookies: Option<Arc<dyn CookieStore>>,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl RequestClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport used for every request.
    ///
    /// Default: [`ReqwestTransport`]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Cookie store cleared on authentication failures.
    ///
    /// Default: a new [`MemoryCookieStore`]
    pub fn cookie_store(mut self, cookies: Arc<dyn CookieStore>) -> Self {
        self.cookies = Some(cookies);
        self
    }

    /// Scheduler for requests that do not bring their own.
    ///
    /// Default: [`TokioScheduler`]
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Build the client, creating default collaborators where unset.
    pub fn build(self) -> Result<RequestClient> {
        let (transport, cookies) = match (self.transport, self.cookies) {
            (Some(transport), Some(cookies)) => (transport, cookies),
            (Some(transport), None) => {
                (transport, Arc::new(MemoryCookieStore::new()) as Arc<dyn CookieStore>)
            }
            (None, Some(cookies)) => {
                (Arc::new(ReqwestTransport::new()?) as Arc<dyn Transport>, cookies)
            }
            (None, None) => {
                let jar = Arc::new(MemoryCookieStore::new());
                let transport = ReqwestTransport::new()?.with_cookie_store(Arc::clone(&jar));
                (Arc::new(transport) as Arc<dyn Transport>, jar as Arc<dyn CookieStore>)
            }
        };

        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Arc::new(TokioScheduler::new()));

        Ok(RequestClient {
            transport,
            cookies,
            scheduler,
        })
    }
}
