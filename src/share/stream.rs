//! Chunked file streaming
//!
//! A response body that reads a byte window of an open file one bounded
//! chunk at a time. Chunks are only read when the transport polls for the
//! next frame, so a connection holds at most one chunk in memory and
//! transport backpressure throttles disk reads. The file handle is owned
//! by the body; every exit path (completion, client disconnect, error)
//! releases it by dropping the body.

use futures_util::Stream;
use hyper::body::{Body, Bytes, Frame, SizeHint};
use std::io::{self, SeekFrom};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, Take};
use tokio_util::io::ReaderStream;

/// Records when a connection last made progress.
///
/// The streaming body touches the gauge per delivered chunk and the
/// request handler touches it per request, so the connection watchdog can
/// tell a stalled peer from a slow but moving download.
#[derive(Debug)]
pub struct Activity {
    base: Instant,
    last_millis: AtomicU64,
}

impl Activity {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            last_millis: AtomicU64::new(0),
        }
    }

    /// Mark progress now.
    pub fn touch(&self) {
        self.last_millis
            .store(self.elapsed_millis(), Ordering::Relaxed);
    }

    /// Time since the last recorded progress.
    #[must_use]
    pub fn idle_for(&self) -> Duration {
        let idle = self
            .elapsed_millis()
            .saturating_sub(self.last_millis.load(Ordering::Relaxed));
        Duration::from_millis(idle)
    }

    fn elapsed_millis(&self) -> u64 {
        u64::try_from(self.base.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for Activity {
    fn default() -> Self {
        Self::new()
    }
}

/// Streaming body over a byte window `[start, start + len)` of a file.
pub struct FileRangeBody {
    reader: ReaderStream<Take<File>>,
    remaining: u64,
    activity: std::sync::Arc<Activity>,
}

impl FileRangeBody {
    /// Take ownership of `file` and stream `len` bytes starting at `start`.
    ///
    /// `chunk_size` bounds the size of every emitted frame.
    pub async fn open(
        mut file: File,
        start: u64,
        len: u64,
        chunk_size: usize,
        activity: std::sync::Arc<Activity>,
    ) -> io::Result<Self> {
        if start > 0 {
            file.seek(SeekFrom::Start(start)).await?;
        }
        let reader = ReaderStream::with_capacity(file.take(len), chunk_size);
        Ok(Self {
            reader,
            remaining: len,
            activity,
        })
    }
}

impl Body for FileRangeBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        match Pin::new(&mut this.reader).poll_next(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(chunk))) => {
                this.remaining = this.remaining.saturating_sub(chunk.len() as u64);
                this.activity.touch();
                Poll::Ready(Some(Ok(Frame::data(chunk))))
            }
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(e))),
            Poll::Ready(None) => {
                if this.remaining == 0 {
                    Poll::Ready(None)
                } else {
                    // The file ended short of the promised window, which
                    // means it shrank mid-transfer. Erroring here tears the
                    // connection down instead of under-delivering against
                    // the Content-Length already sent.
                    let missing = this.remaining;
                    this.remaining = 0;
                    Poll::Ready(Some(Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("source ended {missing} bytes short of the promised range"),
                    ))))
                }
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.remaining == 0
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.remaining)
    }
}
