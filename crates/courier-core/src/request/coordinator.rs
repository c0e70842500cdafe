//! Request execution: timeout guard, session retry and parsing.
//!
//! Each attempt races the transport call against a scheduler timer started
//! when the attempt is issued. A 401 clears the session cookie and is retried
//! once; the retried attempt gets a fresh deadline. Everything else settles
//! the request.

use super::builder::build;
use super::classify::{classify, timeout_error, unrecognized_response};
use super::config::RequestConfig;
use crate::config::RequestDefaults;
use crate::error::RequestError;
use crate::network::{
    CookieDetails, DataType, DynCookieStore, DynScheduler, DynTransport, RawResponse,
    TransportFailure, TransportOptions,
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthState {
    Initial,
    Retried,
}

enum Attempt {
    Settled(Result<RawResponse, TransportFailure>),
    TimedOut,
}

/// Everything one request needs, shared by all of its subscriptions.
pub(crate) struct Coordinator<T> {
    pub(crate) config: RequestConfig<T>,
    pub(crate) data_type: DataType,
    pub(crate) transport: DynTransport,
    pub(crate) cookies: DynCookieStore,
    pub(crate) scheduler: DynScheduler,
}

impl<T> Coordinator<T> {
    /// Run the request to completion. Every call issues fresh transport calls.
    pub(crate) async fn execute(&self) -> Result<T, RequestError> {
        let options = build(&self.config, self.data_type);
        let mut state = AuthState::Initial;

        for attempt in 1..=RequestDefaults::AUTH_ATTEMPTS {
            debug!(
                "{} {} ({}, attempt {}/{})",
                options.method,
                options.url,
                options.data_type,
                attempt,
                RequestDefaults::AUTH_ATTEMPTS
            );

            let failure = match self.attempt(&options).await {
                Attempt::Settled(Ok(raw)) => return self.parse(raw, &options),
                Attempt::Settled(Err(failure)) => failure,
                Attempt::TimedOut => {
                    warn!(
                        "Request to {} timed out after {:?}",
                        self.config.url(),
                        self.config.timeout()
                    );
                    return Err(timeout_error(self.config.url(), self.config.timeout()));
                }
            };

            if failure.status == RequestDefaults::AUTH_FAILURE_STATUS {
                self.clear_session();
                if state == AuthState::Initial {
                    info!("Session rejected by {}, retrying once", self.config.url());
                    state = AuthState::Retried;
                    continue;
                }
                warn!("Session still rejected by {} after retry", self.config.url());
            }

            let error = classify(&failure, &self.config, &options);
            debug!("Request to {} failed: {}", self.config.url(), error);
            return Err(error);
        }

        unreachable!("the final attempt always settles the request")
    }

    /// One transport call raced against the deadline. The loser is dropped.
    async fn attempt(&self, options: &TransportOptions) -> Attempt {
        let deadline = self.scheduler.sleep(self.config.timeout());
        let call = self.transport.send(options.clone());

        tokio::select! {
            biased;
            outcome = call => Attempt::Settled(outcome),
            _ = deadline => Attempt::TimedOut,
        }
    }

    fn parse(&self, raw: RawResponse, options: &TransportOptions) -> Result<T, RequestError> {
        let parser = self.config.parser();
        match catch_unwind(AssertUnwindSafe(|| parser(raw))) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!("Unrecognized response from {}: {:#}", self.config.url(), e);
                Err(unrecognized_response(self.config.url(), options))
            }
            Err(_) => {
                warn!("Response parser panicked for {}", self.config.url());
                Err(unrecognized_response(self.config.url(), options))
            }
        }
    }

    /// Start removing the session cookie. Completion is not awaited.
    fn clear_session(&self) {
        let Some(name) = self.config.auth_cookie() else {
            debug!("No auth cookie configured for {}", self.config.url());
            return;
        };

        let removal = self
            .cookies
            .remove(CookieDetails::new(self.config.url(), name));

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let url = self.config.url().to_string();
                handle.spawn(async move {
                    if let Err(e) = removal.await {
                        warn!("Failed to clear session cookie for {}: {}", url, e);
                    }
                });
            }
            Err(_) => debug!("No runtime to observe cookie removal for {}", self.config.url()),
        }
    }
}
