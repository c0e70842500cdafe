//! Stream adapter for requests.
//!
//! A [`Request`] is cold: nothing is sent until it is consumed, and every
//! consumption sends a fresh request. It can be consumed three ways:
//!
//! - [`Request::stream`] returns a [`ResponseStream`] yielding at most one
//!   item, composable with `futures::StreamExt` combinators
//! - [`Request::send`] awaits the single outcome directly
//! - [`Request::subscribe`] runs the request on the tokio runtime and
//!   delivers the outcome to an [`Observer`]
//!
//! Dropping a stream, or calling [`Subscription::unsubscribe`], drops the
//! pending timer and the in-flight transport future.

use super::config::RequestConfig;
use super::coordinator::Coordinator;
use crate::error::RequestError;
use crate::network::{DataType, DynCookieStore, DynScheduler, DynTransport};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Receives the outcome of a subscribed request.
///
/// Either `on_next` followed by `on_completed`, or `on_error`. Nothing is
/// delivered after the subscription is cancelled.
pub trait Observer<T>: Send + 'static {
    fn on_next(&mut self, value: T);

    fn on_error(&mut self, error: RequestError);

    fn on_completed(&mut self) {}
}

/// A single delivery to an observer.
#[derive(Debug)]
pub enum Notification<T> {
    Next(T),
    Error(RequestError),
    Completed,
}

/// Forward every notification into a channel.
impl<T: Send + 'static> Observer<T> for mpsc::UnboundedSender<Notification<T>> {
    fn on_next(&mut self, value: T) {
        let _ = self.send(Notification::Next(value));
    }

    fn on_error(&mut self, error: RequestError) {
        let _ = self.send(Notification::Error(error));
    }

    fn on_completed(&mut self) {
        let _ = self.send(Notification::Completed);
    }
}

/// Observer built from a pair of closures.
pub struct FnObserver<N, E> {
    next: N,
    error: E,
}

/// Build an observer from `on_next` and `on_error` closures.
pub fn observer_fn<T, N, E>(next: N, error: E) -> FnObserver<N, E>
where
    N: FnMut(T) + Send + 'static,
    E: FnMut(RequestError) + Send + 'static,
{
    FnObserver { next, error }
}

impl<T, N, E> Observer<T> for FnObserver<N, E>
where
    N: FnMut(T) + Send + 'static,
    E: FnMut(RequestError) + Send + 'static,
{
    fn on_next(&mut self, value: T) {
        (self.next)(value)
    }

    fn on_error(&mut self, error: RequestError) {
        (self.error)(error)
    }
}

/// Handle to a running subscription.
///
/// Dropping the handle does not cancel the request; call
/// [`Subscription::unsubscribe`].
pub struct Subscription {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Stop the request. The pending timer is released and no further
    /// notifications are delivered.
    pub fn unsubscribe(&self) {
        self.token.cancel();
    }

    /// Whether the subscription was cancelled or has delivered its outcome.
    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled() || self.handle.is_finished()
    }

    /// Wait until the subscription has finished, including cleanup after
    /// cancellation.
    pub async fn closed(self) {
        if let Err(e) = self.handle.await {
            debug!("Subscription task ended abnormally: {}", e);
        }
    }
}

/// Cold, re-subscribable request producing at most one value.
pub struct Request<T> {
    inner: Arc<Coordinator<T>>,
}

impl<T> Clone for Request<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Request<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("config", &self.inner.config)
            .field("data_type", &self.inner.data_type)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Request<T> {
    pub(crate) fn new(
        config: RequestConfig<T>,
        data_type: DataType,
        transport: DynTransport,
        cookies: DynCookieStore,
        scheduler: DynScheduler,
    ) -> Self {
        Self {
            inner: Arc::new(Coordinator {
                config,
                data_type,
                transport,
                cookies,
                scheduler,
            }),
        }
    }

    /// Configuration this request was built from.
    pub fn config(&self) -> &RequestConfig<T> {
        &self.inner.config
    }

    /// Expected response body type.
    pub fn data_type(&self) -> DataType {
        self.inner.data_type
    }

    /// Fresh stream for one subscription. Nothing is sent until polled.
    pub fn stream(&self) -> ResponseStream<T> {
        let inner = Arc::clone(&self.inner);
        ResponseStream {
            inner: stream::once(async move { inner.execute().await }).boxed(),
        }
    }

    /// Send the request and wait for its single outcome.
    pub async fn send(&self) -> Result<T, RequestError> {
        self.inner.execute().await
    }

    /// Run the request in the background and deliver the outcome to
    /// `observer`. Must be called within a tokio runtime.
    pub fn subscribe<O>(&self, mut observer: O) -> Subscription
    where
        O: Observer<T>,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let inner = Arc::clone(&self.inner);

        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {
                    debug!("Subscription to {} cancelled", inner.config.url());
                }
                outcome = inner.execute() => {
                    if cancelled.is_cancelled() {
                        return;
                    }
                    match outcome {
                        Ok(value) => {
                            observer.on_next(value);
                            observer.on_completed();
                        }
                        Err(error) => observer.on_error(error),
                    }
                }
            }
        });

        Subscription { token, handle }
    }
}

/// Stream of at most one request outcome.
pub struct ResponseStream<T> {
    inner: BoxStream<'static, Result<T, RequestError>>,
}

impl<T> Stream for ResponseStream<T> {
    type Item = Result<T, RequestError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
