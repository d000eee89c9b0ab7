//! Stream adapter that runs an [`Injector`] over a byte stream.
//!
//! Pull-driven: a chunk is only read from the inner stream when the consumer
//! (ultimately the socket) polls for more, so backpressure propagates to the
//! file reads and a dropped response stops them.

use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use bytes::Bytes;
use futures_util::Stream;

use crate::transform::injector::Injector;
use crate::transform::snippet::Snippet;

/// An HTML byte stream with the live reload snippet spliced in.
#[derive(Debug)]
pub struct InjectingStream<S> {
    inner: S,
    injector: Injector,
    done: bool,
}

impl<S> InjectingStream<S> {
    pub fn new(inner: S, snippet: &Snippet, high_water_mark: usize) -> Self {
        Self {
            inner,
            injector: Injector::new(snippet, high_water_mark),
            done: false,
        }
    }
}

impl<S> Stream for InjectingStream<S>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
{
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if this.done {
                return Poll::Ready(None);
            }

            match ready!(Pin::new(&mut this.inner).poll_next(cx)) {
                Some(Ok(chunk)) => {
                    if let Some(out) = this.injector.push(chunk) {
                        return Poll::Ready(Some(Ok(out)));
                    }
                    // Everything is still buffered; read more.
                }
                Some(Err(err)) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(err)));
                }
                None => {
                    this.done = true;
                    let tail = this.injector.finish();
                    if tail.is_empty() {
                        return Poll::Ready(None);
                    }
                    return Poll::Ready(Some(Ok(tail)));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{stream, StreamExt, TryStreamExt};

    fn snippet() -> Snippet {
        Snippet::for_endpoint("/__livereload")
    }

    fn chunks(parts: &[&'static str]) -> impl Stream<Item = io::Result<Bytes>> + Unpin {
        stream::iter(
            parts
                .iter()
                .map(|p| Ok(Bytes::from_static(p.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    async fn collect<S>(stream: S) -> io::Result<Vec<u8>>
    where
        S: Stream<Item = io::Result<Bytes>> + Unpin,
    {
        let parts: Vec<Bytes> = stream.try_collect().await?;
        Ok(parts.concat())
    }

    #[tokio::test]
    async fn test_marker_split_across_chunks() {
        let stream = InjectingStream::new(
            chunks(&["<html><body>Hi</bo", "dy></html>"]),
            &snippet(),
            1024,
        );
        let out = String::from_utf8(collect(stream).await.unwrap()).unwrap();

        let expected = format!(
            "<html><body>Hi{}\n</body></html>",
            std::str::from_utf8(snippet().as_bytes()).unwrap()
        );
        assert_eq!(out, expected);
    }

    #[tokio::test]
    async fn test_empty_stream_yields_snippet() {
        let stream = InjectingStream::new(chunks(&[]), &snippet(), 1024);
        let out = collect(stream).await.unwrap();
        assert_eq!(out, snippet().as_bytes());
    }

    #[tokio::test]
    async fn test_error_ends_stream() {
        let inner = stream::iter(vec![
            Ok(Bytes::from_static(b"<html>")),
            Err(io::Error::new(io::ErrorKind::Other, "disk gone")),
            Ok(Bytes::from_static(b"</body>")),
        ]);
        let mut stream = InjectingStream::new(inner, &snippet(), 1024);

        let first = stream.next().await.unwrap();
        assert!(first.is_err());
        assert!(stream.next().await.is_none());
    }
}
