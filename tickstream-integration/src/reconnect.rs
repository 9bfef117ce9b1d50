use crate::backoff::Backoff;
use crate::channel::Tx;
use futures::{Stream, StreamExt, future};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, future::Future, pin::Pin};
use tracing::{error, info, warn};

/// Event emitted by a [`ReconnectingStream`], communicating either a `Stream::Item`, or that the
/// inner `Stream` has disconnected and reconnection is underway.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum Event<Origin, T> {
    Reconnecting(Origin),
    Item(T),
}

impl<Origin, T> From<T> for Event<Origin, T> {
    fn from(value: T) -> Self {
        Self::Item(value)
    }
}

impl<Origin, T> Event<Origin, T> {
    pub fn map<F, O>(self, op: F) -> Event<Origin, O>
    where
        F: FnOnce(T) -> O,
    {
        match self {
            Event::Reconnecting(origin) => Event::Reconnecting(origin),
            Event::Item(item) => Event::Item(op(item)),
        }
    }
}

impl<Origin, T, E> Event<Origin, Result<T, E>> {
    pub fn map_ok<F, O>(self, op: F) -> Event<Origin, Result<O, E>>
    where
        F: FnOnce(T) -> O,
    {
        match self {
            Event::Reconnecting(origin) => Event::Reconnecting(origin),
            Event::Item(result) => Event::Item(result.map(op)),
        }
    }

    pub fn map_err<F, O>(self, op: F) -> Event<Origin, Result<T, O>>
    where
        F: FnOnce(E) -> O,
    {
        match self {
            Event::Reconnecting(origin) => Event::Reconnecting(origin),
            Event::Item(result) => Event::Item(result.map_err(op)),
        }
    }
}

/// Utilities for a continually reconnecting [`Stream`] initialised via
/// [`init_reconnecting_stream`].
pub trait ReconnectingStream
where
    Self: Stream + Sized,
{
    /// Add a [`Backoff`] policy to an initialised [`ReconnectingStream`]. Each failed
    /// re-initialisation sleeps for the next jittered delay before retrying; once the
    /// [`Backoff`] is exhausted the outer `Stream` ends.
    fn with_reconnect_backoff<St, InitError>(
        self,
        backoff: Backoff,
        stream_key: impl Debug + Clone + Send + 'static,
    ) -> impl Stream<Item = St>
    where
        Self: Stream<Item = Result<St, InitError>>,
        St: Stream,
        InitError: Debug,
    {
        self.enumerate()
            .scan(backoff, move |backoff, (attempt, result)| {
                let stream_key = stream_key.clone();

                match result {
                    Ok(stream) => {
                        info!(attempt, ?stream_key, "successfully initialised Stream");
                        backoff.reset();
                        future::Either::Left(future::ready(Some(Some(stream))))
                    }
                    Err(error) => match backoff.next_delay() {
                        Some(delay) => future::Either::Right(Box::pin(async move {
                            warn!(
                                attempt,
                                ?stream_key,
                                ?error,
                                ?delay,
                                "failed to re-initialise Stream, retrying after backoff"
                            );
                            tokio::time::sleep(delay).await;
                            Some(None)
                        })
                            as Pin<Box<dyn Future<Output = Option<Option<St>>> + Send>>),
                        None => {
                            error!(
                                attempt,
                                ?stream_key,
                                ?error,
                                "exhausted reconnection attempts, terminating Stream"
                            );
                            future::Either::Right(Box::pin(future::ready(None))
                                as Pin<Box<dyn Future<Output = Option<Option<St>>> + Send>>)
                        }
                    },
                }
            })
            .filter_map(future::ready)
    }

    /// Terminates the inner `Stream` once the encountered error is determined unrecoverable by
    /// the provided closure, causing the outer [`ReconnectingStream`] to re-initialise it.
    fn with_termination_on_error<St, T, E, FnIsTerminal>(
        self,
        is_terminal: FnIsTerminal,
        stream_key: impl Debug + Clone + 'static,
    ) -> impl Stream<Item = impl Stream<Item = Result<T, E>>>
    where
        Self: Stream<Item = St>,
        St: Stream<Item = Result<T, E>>,
        FnIsTerminal: Fn(&E) -> bool + Copy,
    {
        self.map(move |stream| {
            let stream_key = stream_key.clone();
            tokio_stream::StreamExt::map_while(stream, move |result| match result {
                Ok(item) => Some(Ok(item)),
                Err(error) if is_terminal(&error) => {
                    error!(
                        ?stream_key,
                        "Stream encountered terminal error that requires reconnecting"
                    );
                    None
                }
                Err(error) => Some(Err(error)),
            })
        })
    }

    /// Maps every `Stream::Item` into an [`Event::Item`], chaining an [`Event::Reconnecting`]
    /// whenever the inner `Stream` ends (ie/ on disconnect).
    fn with_reconnection_events<St, Origin>(self, origin: Origin) -> impl Stream<Item = Event<Origin, St::Item>>
    where
        Self: Stream<Item = St>,
        St: Stream,
        Origin: Clone + 'static,
    {
        self.map(move |stream| {
            stream
                .map(Event::Item)
                .chain(futures::stream::once(future::ready(Event::Reconnecting(
                    origin.clone(),
                ))))
        })
        .flatten()
    }

    /// Handles all encountered errors with the provided closure before filtering them out.
    fn with_error_handler<FnOnErr, Origin, T, E>(self, op: FnOnErr) -> impl Stream<Item = Event<Origin, T>>
    where
        Self: Stream<Item = Event<Origin, Result<T, E>>>,
        FnOnErr: Fn(E) + 'static,
    {
        self.filter_map(move |event| {
            std::future::ready(match event {
                Event::Reconnecting(origin) => Some(Event::Reconnecting(origin)),
                Event::Item(Ok(item)) => Some(Event::Item(item)),
                Event::Item(Err(error)) => {
                    op(error);
                    None
                }
            })
        })
    }

    /// Forward every item of `Self` to the provided channel [`Tx`] until it stops accepting.
    fn forward_to<Transmitter>(self, tx: Transmitter) -> impl Future<Output = ()> + Send
    where
        Self: Stream + Sized + Send,
        Self::Item: Into<Transmitter::Item>,
        Transmitter: Tx + Send + 'static,
    {
        tokio_stream::StreamExt::map_while(self, move |event| tx.send(event.into()).ok()).collect()
    }
}

impl<T> ReconnectingStream for T where T: Stream {}

/// Initialise a [`ReconnectingStream`] using the provided initialisation closure. The returned
/// `Stream` yields a `Result` for every (re)connection attempt, starting with the first.
pub async fn init_reconnecting_stream<FnInit, St, FnInitError, FnInitFut>(
    init_stream: FnInit,
) -> Result<impl Stream<Item = Result<St, FnInitError>>, FnInitError>
where
    FnInit: Fn() -> FnInitFut,
    FnInitFut: Future<Output = Result<St, FnInitError>>,
{
    let initial = init_stream().await?;
    let reconnections = futures::stream::repeat_with(init_stream).then(std::convert::identity);

    Ok(futures::stream::once(future::ready(Ok(initial))).chain(reconnections))
}
