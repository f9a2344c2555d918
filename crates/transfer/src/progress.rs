use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

/// Cumulative progress of one byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub transferred: i64,
    pub total: i64,
}

/// Callback invoked after every successful read.
pub type ProgressCallback = Arc<dyn Fn(TransferProgress) + Send + Sync>;

// ---------------------------------------------------------------------------
// ProgressReader
// ---------------------------------------------------------------------------

/// `AsyncRead` adapter that reports cumulative bytes read against a total.
pub struct ProgressReader<R> {
    inner: R,
    transferred: i64,
    total: i64,
    callback: ProgressCallback,
}

impl<R> ProgressReader<R> {
    pub fn new(inner: R, total: i64, callback: ProgressCallback) -> Self {
        Self {
            inner,
            transferred: 0,
            total,
            callback,
        }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ProgressReader<R> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let before = buf.filled().len();
        let poll = Pin::new(&mut self.inner).poll_read(cx, buf);

        if let Poll::Ready(Ok(())) = &poll {
            let n = buf.filled().len() - before;
            if n > 0 {
                self.transferred += n as i64;
                (self.callback)(TransferProgress {
                    transferred: self.transferred,
                    total: self.total,
                });
            }
        }
        poll
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::io::AsyncReadExt;

    fn recording() -> (ProgressCallback, Arc<Mutex<Vec<TransferProgress>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let cb: ProgressCallback = Arc::new(move |p| s.lock().unwrap().push(p));
        (cb, seen)
    }

    #[tokio::test]
    async fn progress_reader_reports_cumulative_bytes() {
        let data = vec![1u8; 10_000];
        let (cb, seen) = recording();
        let mut reader = ProgressReader::new(&data[..], 10_000, cb);

        let mut buf = [0u8; 4096];
        while reader.read(&mut buf).await.unwrap() > 0 {}

        let seen = seen.lock().unwrap();
        assert!(!seen.is_empty());
        assert!(seen.windows(2).all(|w| w[0].transferred < w[1].transferred));
        assert_eq!(
            *seen.last().unwrap(),
            TransferProgress {
                transferred: 10_000,
                total: 10_000
            }
        );
    }

    #[tokio::test]
    async fn progress_reader_silent_at_eof() {
        let data: Vec<u8> = Vec::new();
        let (cb, seen) = recording();
        let mut reader = ProgressReader::new(&data[..], 0, cb);
        let mut out = Vec::new();
        reader.read_to_end(&mut out).await.unwrap();
        assert!(seen.lock().unwrap().is_empty());
    }
}
