//! Shared test collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use courier::{
    CookieDetails, CookieError, CookieStore, RawResponse, RequestClient, Scheduler, Transport,
    TransportFailure, TransportOptions,
};
use futures::future::{self, BoxFuture};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted transport behaviour for one call.
#[derive(Debug, Clone)]
pub enum Reply {
    Success(RawResponse),
    Failure(TransportFailure),
    /// Fail once `delay` has elapsed on the mock's scheduler.
    FailAfter(Duration, TransportFailure),
    /// Never settle.
    Hang,
}

/// Transport replaying scripted replies; the last reply repeats.
pub struct MockTransport {
    replies: Vec<Reply>,
    calls: Mutex<Vec<TransportOptions>>,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl MockTransport {
    pub fn sequence(replies: Vec<Reply>) -> Self {
        assert!(!replies.is_empty(), "at least one reply is required");
        Self {
            replies,
            calls: Mutex::new(Vec::new()),
            scheduler: None,
        }
    }

    pub fn succeed(raw: RawResponse) -> Self {
        Self::sequence(vec![Reply::Success(raw)])
    }

    pub fn fail(failure: TransportFailure) -> Self {
        Self::sequence(vec![Reply::Failure(failure)])
    }

    pub fn hang() -> Self {
        Self::sequence(vec![Reply::Hang])
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn calls(&self) -> Vec<TransportOptions> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, options: TransportOptions) -> Result<RawResponse, TransportFailure> {
        let reply = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(options);
            let index = (calls.len() - 1).min(self.replies.len() - 1);
            self.replies[index].clone()
        };

        match reply {
            Reply::Success(raw) => Ok(raw),
            Reply::Failure(failure) => Err(failure),
            Reply::FailAfter(delay, failure) => {
                let scheduler = self
                    .scheduler
                    .as_ref()
                    .expect("FailAfter requires a scheduler");
                scheduler.sleep(delay).await;
                Err(failure)
            }
            Reply::Hang => future::pending().await,
        }
    }
}

/// Cookie store recording every removal.
#[derive(Default)]
pub struct RecordingCookieStore {
    removed: Mutex<Vec<CookieDetails>>,
}

impl RecordingCookieStore {
    pub fn removed(&self) -> Vec<CookieDetails> {
        self.removed.lock().unwrap().clone()
    }

    pub fn removal_count(&self) -> usize {
        self.removed.lock().unwrap().len()
    }
}

impl CookieStore for RecordingCookieStore {
    fn remove(&self, details: CookieDetails) -> BoxFuture<'static, Result<(), CookieError>> {
        self.removed.lock().unwrap().push(details);
        Box::pin(future::ready(Ok(())))
    }
}

pub fn client(transport: Arc<MockTransport>, cookies: Arc<RecordingCookieStore>) -> RequestClient {
    RequestClient::builder()
        .transport(transport)
        .cookie_store(cookies)
        .build()
        .expect("client with injected collaborators")
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
