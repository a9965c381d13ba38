//! Latest-wins throttling for snapshot streams

use futures::{Stream, ready};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};

use crate::types::Snapshot;

/// Extension trait to add throttling to a snapshot stream
pub trait ThrottleExt: Stream<Item = Snapshot> {
    /// Emit at most once per `duration`.
    ///
    /// Snapshots arriving within one interval collapse to the newest, and a
    /// snapshot whose sequence has not advanced past the last emitted one is
    /// never re-emitted.
    fn throttle(self, duration: Duration) -> Throttle<Self>
    where
        Self: Sized,
    {
        Throttle::new(self, duration)
    }
}

impl<T: Stream<Item = Snapshot>> ThrottleExt for T {}

pin_project! {
    /// A stream combinator that throttles snapshot emission
    pub struct Throttle<S> {
        #[pin]
        stream: S,
        interval: Interval,
        pending: Option<Snapshot>,
        last_sequence: Option<u64>,
        finished: bool,
    }
}

impl<S: Stream<Item = Snapshot>> Throttle<S> {
    pub fn new(stream: S, duration: Duration) -> Self {
        let mut interval = interval(duration);
        // Delay rather than burst after a slow consumer
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self { stream, interval, pending: None, last_sequence: None, finished: false }
    }
}

impl<S: Stream<Item = Snapshot>> Stream for Throttle<S> {
    type Item = Snapshot;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if *this.finished {
            return Poll::Ready(this.pending.take());
        }

        // Drain everything available so the newest snapshot is held
        loop {
            match this.stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(snapshot)) => {
                    let stale = this.last_sequence.is_some_and(|last| snapshot.sequence <= last);
                    if !stale {
                        *this.pending = Some(snapshot);
                    }
                }
                Poll::Ready(None) => {
                    *this.finished = true;
                    break;
                }
                Poll::Pending => break,
            }
        }

        if this.pending.is_none() {
            return if *this.finished { Poll::Ready(None) } else { Poll::Pending };
        }

        ready!(this.interval.poll_tick(cx));

        let snapshot = this.pending.take();
        *this.last_sequence = snapshot.as_ref().map(|s| s.sequence);
        Poll::Ready(snapshot)
    }
}
