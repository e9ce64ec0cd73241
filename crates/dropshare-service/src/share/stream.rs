//! Byte stream that keeps a share's read lock until it is done.

use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures::Stream;
use pin_project_lite::pin_project;
use tokio::sync::OwnedRwLockReadGuard;

pin_project! {
    /// Wraps a payload stream and releases the share's read lock when the
    /// stream ends or is dropped.
    pub struct GuardedStream<S> {
        #[pin]
        inner: S,
        guard: Option<OwnedRwLockReadGuard<()>>,
    }
}

impl<S> GuardedStream<S> {
    /// Tie `guard` to the lifetime of `inner`.
    pub fn new(inner: S, guard: OwnedRwLockReadGuard<()>) -> Self {
        Self {
            inner,
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    fn holds_lock(&self) -> bool {
        self.guard.is_some()
    }
}

impl<S: Stream> Stream for GuardedStream<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        let item = ready!(this.inner.poll_next(cx));
        if item.is_none() {
            this.guard.take();
        }
        Poll::Ready(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    #[tokio::test]
    async fn test_guard_released_at_end_of_stream() {
        let lock = Arc::new(RwLock::new(()));
        let guard = Arc::clone(&lock).read_owned().await;
        let mut stream = GuardedStream::new(futures::stream::iter(vec![1, 2]), guard);

        assert!(lock.try_write().is_err());
        assert_eq!(stream.next().await, Some(1));
        assert_eq!(stream.next().await, Some(2));
        assert!(stream.holds_lock());
        assert_eq!(stream.next().await, None);
        assert!(!stream.holds_lock());
        assert!(lock.try_write().is_ok());
    }

    #[tokio::test]
    async fn test_guard_released_on_drop() {
        let lock = Arc::new(RwLock::new(()));
        let guard = Arc::clone(&lock).read_owned().await;
        let stream = GuardedStream::new(futures::stream::iter(vec![1]), guard);
        drop(stream);
        assert!(lock.try_write().is_ok());
    }
}
