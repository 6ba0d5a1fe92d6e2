//! Log streaming for job instances.
//!
//! [`stream_logs`] resolves which container to read, picks the read timeout
//! for this one call and asks a [`LogTransport`] for the byte stream. The
//! timeout travels with the request; nothing on the transport is mutated,
//! so concurrent calls against one transport do not interfere.
//!
//! The returned [`LogStream`] yields raw chunks. Line splitting, if needed,
//! is up to the caller.

pub mod kube;
mod transport;

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::error::LogsError;

pub use transport::{InstanceDescriptor, LogRequest, LogTransport, RawLogResponse, TransportFuture};

/// Result type alias for log operations.
pub type LogsResult<T> = std::result::Result<T, LogsError>;

/// Namespace and name of the pod to read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceRef {
    /// Pod namespace.
    pub namespace: String,
    /// Pod name.
    pub name: String,
}

impl InstanceRef {
    /// Create a reference.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for InstanceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// What to read from an instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// Keep the stream open for new output.
    pub follow: bool,
    /// Longest wait for new output while following.
    pub follow_timeout: Option<Duration>,
    /// Container to read. The first container when unset.
    pub container: Option<String>,
    /// Only output newer than this many seconds.
    pub since_seconds: Option<i64>,
    /// Only the last this many lines.
    pub tail_lines: Option<i64>,
    /// Prefix every line with its timestamp.
    pub timestamps: bool,
}

impl LogOptions {
    /// Options reading the whole log once.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the stream open.
    #[must_use]
    pub fn follow(mut self, follow: bool) -> Self {
        self.follow = follow;
        self
    }

    /// Wait up to `timeout` for new output while following.
    #[must_use]
    pub fn follow_timeout(mut self, timeout: Duration) -> Self {
        self.follow_timeout = Some(timeout);
        self
    }

    /// Read `container` instead of the first one.
    #[must_use]
    pub fn container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    /// Only output from the last `seconds`.
    #[must_use]
    pub fn since_seconds(mut self, seconds: i64) -> Self {
        self.since_seconds = Some(seconds);
        self
    }

    /// Only the last `lines` lines.
    #[must_use]
    pub fn tail_lines(mut self, lines: i64) -> Self {
        self.tail_lines = Some(lines);
        self
    }

    /// Prefix lines with timestamps.
    #[must_use]
    pub fn timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Read timeout for one call, given the transport's default.
    ///
    /// Following with a follow timeout widens the default to at least that
    /// timeout. Anything else uses the default as is.
    #[must_use]
    pub fn read_timeout(&self, default: Duration) -> Duration {
        match self.follow_timeout {
            Some(timeout) if self.follow => timeout.max(default),
            _ => default,
        }
    }
}

type BoxedChunks = Pin<Box<dyn Stream<Item = LogsResult<Bytes>> + Send>>;

/// An open log stream.
///
/// Dropping it closes the underlying connection.
pub struct LogStream {
    inner: BoxedChunks,
}

impl LogStream {
    /// Wrap a chunk stream.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = LogsResult<Bytes>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// Wrap a chunk stream, failing it if no chunk arrives within `read_timeout`.
    ///
    /// The stream ends after the first error.
    pub fn with_read_timeout<S, E>(stream: S, read_timeout: Duration) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let chunks = futures::stream::unfold(Some(Box::pin(stream)), move |state| async move {
            let mut stream = state?;
            match tokio::time::timeout(read_timeout, stream.next()).await {
                Ok(Some(Ok(chunk))) => Some((Ok(chunk), Some(stream))),
                Ok(Some(Err(e))) => Some((Err(LogsError::read(e.to_string())), None)),
                Ok(None) => None,
                Err(_) => Some((
                    Err(LogsError::read(format!(
                        "no data received within {read_timeout:?}"
                    ))),
                    None,
                )),
            }
        });
        Self::new(chunks)
    }

    /// A stream with no data.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(futures::stream::empty())
    }

    /// Read the stream to its end as UTF-8, replacing invalid sequences.
    ///
    /// # Errors
    ///
    /// Returns the first error the stream yields.
    pub async fn read_to_string(mut self) -> LogsResult<String> {
        let mut buf = Vec::new();
        while let Some(chunk) = self.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl fmt::Debug for LogStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogStream").finish_non_exhaustive()
    }
}

impl Stream for LogStream {
    type Item = LogsResult<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Open a log stream for `instance`.
///
/// # Errors
///
/// Returns [`LogsError::NoContainers`] if the instance lists no containers,
/// [`LogsError::Status`] if the transport answers with a non-success
/// status, and any error the transport reports.
pub async fn stream_logs(
    transport: &dyn LogTransport,
    instance: &InstanceRef,
    options: &LogOptions,
) -> LogsResult<LogStream> {
    let descriptor = transport
        .describe_instance(&instance.namespace, &instance.name)
        .await?;

    let Some(first) = descriptor.containers.first() else {
        return Err(LogsError::NoContainers {
            namespace: instance.namespace.clone(),
            instance: instance.name.clone(),
        });
    };
    let container = options.container.clone().unwrap_or_else(|| first.clone());

    let read_timeout = options.read_timeout(transport.default_read_timeout());
    let request = LogRequest::new(instance, container, options);
    debug!(
        %instance,
        container = %request.container,
        follow = request.follow,
        ?read_timeout,
        "opening log stream"
    );

    let response = transport.open_log_stream(&request, read_timeout).await?;
    if !(200..300).contains(&response.status) {
        warn!(%instance, status = response.status, "log request rejected");
        return Err(LogsError::Status {
            status: response.status,
        });
    }

    Ok(response.stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct FakeTransport {
        containers: Vec<String>,
        status: u16,
        body: &'static str,
        seen: Mutex<Vec<(LogRequest, Duration)>>,
    }

    impl FakeTransport {
        fn new(containers: &[&str], status: u16) -> Self {
            Self {
                containers: containers.iter().map(ToString::to_string).collect(),
                status,
                body: "line 1\nline 2\n",
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<(LogRequest, Duration)> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl LogTransport for FakeTransport {
        fn describe_instance<'a>(
            &'a self,
            namespace: &'a str,
            name: &'a str,
        ) -> TransportFuture<'a, InstanceDescriptor> {
            Box::pin(async move {
                Ok(InstanceDescriptor {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                    containers: self.containers.clone(),
                })
            })
        }

        fn open_log_stream<'a>(
            &'a self,
            request: &'a LogRequest,
            read_timeout: Duration,
        ) -> TransportFuture<'a, RawLogResponse> {
            Box::pin(async move {
                self.seen
                    .lock()
                    .unwrap()
                    .push((request.clone(), read_timeout));
                let chunk: LogsResult<Bytes> = Ok(Bytes::from_static(self.body.as_bytes()));
                Ok(RawLogResponse {
                    status: self.status,
                    stream: LogStream::new(futures::stream::iter(vec![chunk])),
                })
            })
        }

        fn default_read_timeout(&self) -> Duration {
            Duration::from_secs(10)
        }
    }

    fn target() -> InstanceRef {
        InstanceRef::new("default", "tf-dist-worker-0")
    }

    #[test]
    fn test_read_timeout_rules() {
        let default = Duration::from_secs(10);
        let long = Duration::from_secs(60);
        let short = Duration::from_secs(3);

        assert_eq!(LogOptions::new().read_timeout(default), default);
        assert_eq!(LogOptions::new().follow_timeout(long).read_timeout(default), default);
        assert_eq!(
            LogOptions::new().follow(true).follow_timeout(long).read_timeout(default),
            long
        );
        assert_eq!(
            LogOptions::new().follow(true).follow_timeout(short).read_timeout(default),
            default
        );
        assert_eq!(LogOptions::new().follow(true).read_timeout(default), default);
    }

    #[tokio::test]
    async fn test_stream_logs_first_container() {
        let transport = FakeTransport::new(&["tensorflow", "sidecar"], 200);
        let options = LogOptions::new().tail_lines(100).timestamps(true);
        let stream = stream_logs(&transport, &target(), &options).await.unwrap();
        assert_eq!(stream.read_to_string().await.unwrap(), "line 1\nline 2\n");

        let seen = transport.seen();
        assert_eq!(seen.len(), 1);
        let (request, timeout) = &seen[0];
        assert_eq!(request.container, "tensorflow");
        assert_eq!(request.tail_lines, Some(100));
        assert!(request.timestamps);
        assert_eq!(*timeout, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_stream_logs_container_override() {
        let transport = FakeTransport::new(&["tensorflow", "sidecar"], 200);
        let options = LogOptions::new().container("sidecar");
        stream_logs(&transport, &target(), &options).await.unwrap();
        assert_eq!(transport.seen()[0].0.container, "sidecar");
    }

    #[tokio::test]
    async fn test_stream_logs_no_containers() {
        let transport = FakeTransport::new(&[], 200);
        let err = stream_logs(&transport, &target(), &LogOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, LogsError::NoContainers { .. }));
        assert!(transport.seen().is_empty());
    }

    #[tokio::test]
    async fn test_stream_logs_rejects_status() {
        let transport = FakeTransport::new(&["main"], 404);
        let err = stream_logs(&transport, &target(), &LogOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, LogsError::Status { status: 404 }));
    }

    #[tokio::test]
    async fn test_concurrent_calls_keep_their_own_timeout() {
        let transport = FakeTransport::new(&["main"], 200);
        let following = LogOptions::new()
            .follow(true)
            .follow_timeout(Duration::from_secs(120));
        let plain = LogOptions::new();
        let instance = target();

        let (a, b) = tokio::join!(
            stream_logs(&transport, &instance, &following),
            stream_logs(&transport, &instance, &plain),
        );
        a.unwrap();
        b.unwrap();

        let mut timeouts: Vec<_> = transport.seen().into_iter().map(|(_, t)| t).collect();
        timeouts.sort();
        assert_eq!(timeouts, vec![Duration::from_secs(10), Duration::from_secs(120)]);
        assert_eq!(transport.default_read_timeout(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_timeout_ends_stream() {
        let stalled = futures::stream::pending::<Result<Bytes, std::io::Error>>();
        let mut stream = LogStream::with_read_timeout(stalled, Duration::from_secs(5));
        let first = stream.next().await.unwrap();
        assert!(matches!(first, Err(LogsError::Read { .. })));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_read_timeout_passes_chunks() {
        let chunks = futures::stream::iter(vec![
            Ok::<_, std::io::Error>(Bytes::from_static(b"a")),
            Ok(Bytes::from_static(b"b")),
        ]);
        let stream = LogStream::with_read_timeout(chunks, Duration::from_secs(5));
        assert_eq!(stream.read_to_string().await.unwrap(), "ab");
    }
}
