//! The seam between the log adapter and the cluster API.

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::{InstanceRef, LogOptions, LogStream, LogsResult};

/// Boxed future returned by [`LogTransport`] methods.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = LogsResult<T>> + Send + 'a>>;

/// What the cluster reports about a pod.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceDescriptor {
    /// Pod namespace.
    pub namespace: String,
    /// Pod name.
    pub name: String,
    /// Container names, in spec order.
    pub containers: Vec<String>,
}

/// A fully resolved log read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRequest {
    /// Pod namespace.
    pub namespace: String,
    /// Pod name.
    pub name: String,
    /// Container to read.
    pub container: String,
    /// Keep the stream open.
    pub follow: bool,
    /// Only output newer than this many seconds.
    pub since_seconds: Option<i64>,
    /// Only the last this many lines.
    pub tail_lines: Option<i64>,
    /// Prefix lines with timestamps.
    pub timestamps: bool,
}

impl LogRequest {
    pub(crate) fn new(instance: &InstanceRef, container: String, options: &LogOptions) -> Self {
        Self {
            namespace: instance.namespace.clone(),
            name: instance.name.clone(),
            container,
            follow: options.follow,
            since_seconds: options.since_seconds,
            tail_lines: options.tail_lines,
            timestamps: options.timestamps,
        }
    }
}

/// Status and body of a log request.
#[derive(Debug)]
pub struct RawLogResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub stream: LogStream,
}

/// Access to pod metadata and logs.
///
/// Implementations apply `read_timeout` to the one request they are given
/// and must not carry it over to other calls.
pub trait LogTransport: Send + Sync + Debug {
    /// Look up a pod.
    fn describe_instance<'a>(
        &'a self,
        namespace: &'a str,
        name: &'a str,
    ) -> TransportFuture<'a, InstanceDescriptor>;

    /// Start reading a container's log.
    fn open_log_stream<'a>(
        &'a self,
        request: &'a LogRequest,
        read_timeout: Duration,
    ) -> TransportFuture<'a, RawLogResponse>;

    /// Read timeout used when a call does not ask for a longer one.
    fn default_read_timeout(&self) -> Duration;
}
