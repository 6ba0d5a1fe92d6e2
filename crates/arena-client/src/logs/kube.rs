//! Kubernetes API log transport.

use std::time::Duration;

use reqwest::{Certificate, Client, Identity, Url};
use serde::Deserialize;
use tracing::debug;

use super::{InstanceDescriptor, LogRequest, LogStream, LogTransport, LogsResult, RawLogResponse, TransportFuture};
use crate::config::{ClientConfig, default_kubeconfig};
use crate::error::LogsError;
use crate::kubeconfig::KubeConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PodDocument {
    spec: PodSpec,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PodSpec {
    containers: Vec<ContainerDocument>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContainerDocument {
    name: String,
}

/// Reads pod metadata and logs straight from the API server.
#[derive(Debug, Clone)]
pub struct KubeApiTransport {
    client: Client,
    server: Url,
    token: Option<String>,
    read_timeout: Duration,
}

impl KubeApiTransport {
    /// Transport for `server` with a default HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if `server` is not a valid base URL.
    pub fn new(server: &str, read_timeout: Duration) -> LogsResult<Self> {
        Self::with_client(Client::new(), server, read_timeout)
    }

    /// Transport using a caller-supplied HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if `server` is not a valid base URL.
    pub fn with_client(client: Client, server: &str, read_timeout: Duration) -> LogsResult<Self> {
        let server = Url::parse(server)
            .map_err(|e| LogsError::config(format!("invalid server URL '{server}': {e}")))?;
        if server.cannot_be_a_base() {
            return Err(LogsError::config(format!(
                "server URL '{server}' cannot be a base"
            )));
        }
        Ok(Self {
            client,
            server,
            token: None,
            read_timeout,
        })
    }

    /// Transport built from a parsed kubeconfig.
    ///
    /// # Errors
    ///
    /// Returns an error if a certificate is invalid or the HTTP client
    /// cannot be built.
    pub fn from_kubeconfig(config: &KubeConfig, read_timeout: Duration) -> LogsResult<Self> {
        let mut builder = Client::builder().danger_accept_invalid_certs(config.insecure_skip_tls_verify);

        if let Some(ca) = &config.certificate_authority {
            let certificate = Certificate::from_pem(ca)
                .map_err(|e| LogsError::config(format!("invalid certificate authority: {e}")))?;
            builder = builder.add_root_certificate(certificate);
        }

        if let (Some(cert), Some(key)) = (&config.client_certificate, &config.client_key) {
            builder = builder.identity(client_identity(cert, key)?);
        }

        let client = builder
            .build()
            .map_err(|e| LogsError::config(format!("failed to build HTTP client: {e}")))?;

        let transport = Self::with_client(client, &config.server, read_timeout)?;
        Ok(match &config.token {
            Some(token) => transport.with_token(token.clone()),
            None => transport,
        })
    }

    /// Transport for the kubeconfig a [`ClientConfig`] points at.
    ///
    /// Falls back to `~/.kube/config` when the configuration names none.
    ///
    /// # Errors
    ///
    /// Returns an error if no kubeconfig is available or it is unusable.
    pub fn from_client_config(config: &ClientConfig) -> LogsResult<Self> {
        let path = config
            .kubeconfig
            .clone()
            .or_else(default_kubeconfig)
            .ok_or_else(|| LogsError::config("no kubeconfig available"))?;
        let kubeconfig = KubeConfig::from_file(path)?;
        Self::from_kubeconfig(&kubeconfig, config.log_read_timeout())
    }

    /// Authenticate with a bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn pod_url(&self, namespace: &str, name: &str) -> LogsResult<Url> {
        let mut url = self.server.clone();
        url.path_segments_mut()
            .map_err(|()| LogsError::config("server URL cannot be a base"))?
            .pop_if_empty()
            .extend(["api", "v1", "namespaces", namespace, "pods", name]);
        Ok(url)
    }

    fn log_url(&self, request: &LogRequest) -> LogsResult<Url> {
        let mut url = self.pod_url(&request.namespace, &request.name)?;
        url.path_segments_mut()
            .map_err(|()| LogsError::config("server URL cannot be a base"))?
            .push("log");
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("container", &request.container);
            if request.follow {
                query.append_pair("follow", "true");
            }
            if let Some(since) = request.since_seconds {
                query.append_pair("sinceSeconds", &since.to_string());
            }
            if let Some(tail) = request.tail_lines {
                query.append_pair("tailLines", &tail.to_string());
            }
            if request.timestamps {
                query.append_pair("timestamps", "true");
            }
        }
        Ok(url)
    }

    async fn get(&self, url: Url, timeout: Duration) -> LogsResult<reqwest::Response> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        tokio::time::timeout(timeout, request.send())
            .await
            .map_err(|_| LogsError::request(format!("no response within {timeout:?}")))?
            .map_err(|e| LogsError::request(e.to_string()))
    }

    async fn describe(&self, namespace: &str, name: &str) -> LogsResult<InstanceDescriptor> {
        let url = self.pod_url(namespace, name)?;
        debug!(%url, "describing pod");
        let response = self.get(url, self.read_timeout).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LogsError::Status {
                status: status.as_u16(),
            });
        }

        let pod: PodDocument = response
            .json()
            .await
            .map_err(|e| LogsError::read(format!("invalid pod document: {e}")))?;
        Ok(InstanceDescriptor {
            namespace: namespace.to_string(),
            name: name.to_string(),
            containers: pod.spec.containers.into_iter().map(|c| c.name).collect(),
        })
    }

    async fn open(&self, request: &LogRequest, read_timeout: Duration) -> LogsResult<RawLogResponse> {
        let url = self.log_url(request)?;
        let response = self.get(url, read_timeout).await?;
        let status = response.status().as_u16();
        let stream = LogStream::with_read_timeout(response.bytes_stream(), read_timeout);
        Ok(RawLogResponse { status, stream })
    }
}

/// Client identity from PEM certificate and key blocks.
///
/// The key may be PKCS#8 (`PRIVATE KEY`), PKCS#1 (`RSA PRIVATE KEY`) or SEC1
/// (`EC PRIVATE KEY`).
fn client_identity(cert: &[u8], key: &[u8]) -> LogsResult<Identity> {
    let mut pem = Vec::with_capacity(cert.len() + key.len() + 1);
    pem.extend_from_slice(cert);
    if !cert.ends_with(b"\n") {
        pem.push(b'\n');
    }
    pem.extend_from_slice(key);
    Identity::from_pem(&pem).map_err(|e| LogsError::config(format!("invalid client certificate: {e}")))
}

impl LogTransport for KubeApiTransport {
    fn describe_instance<'a>(
        &'a self,
        namespace: &'a str,
        name: &'a str,
    ) -> TransportFuture<'a, InstanceDescriptor> {
        Box::pin(self.describe(namespace, name))
    }

    fn open_log_stream<'a>(
        &'a self,
        request: &'a LogRequest,
        read_timeout: Duration,
    ) -> TransportFuture<'a, RawLogResponse> {
        Box::pin(self.open(request, read_timeout))
    }

    fn default_read_timeout(&self) -> Duration {
        self.read_timeout
    }
}
