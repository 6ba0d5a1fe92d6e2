//! Kubeconfig loading for the log transport.
//!
//! Only what an API client needs is extracted: the server of the current
//! context, how to trust it and how to authenticate. Exec plugins and auth
//! providers are not supported.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::error::LogsError;
use crate::logs::LogsResult;

/// Connection settings resolved from a kubeconfig.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct KubeConfig {
    /// API server URL.
    pub server: String,
    /// Default namespace of the current context.
    pub namespace: Option<String>,
    /// Bearer token.
    pub token: Option<String>,
    /// PEM bundle to trust for the server.
    pub certificate_authority: Option<Vec<u8>>,
    /// PEM client certificate.
    pub client_certificate: Option<Vec<u8>>,
    /// PEM client key.
    pub client_key: Option<Vec<u8>>,
    /// Skip server certificate verification.
    pub insecure_skip_tls_verify: bool,
}

impl std::fmt::Debug for KubeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeConfig")
            .field("server", &self.server)
            .field("namespace", &self.namespace)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("insecure_skip_tls_verify", &self.insecure_skip_tls_verify)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct RawKubeConfig {
    #[serde(rename = "current-context", default)]
    current_context: String,
    #[serde(default)]
    clusters: Vec<NamedCluster>,
    #[serde(default)]
    contexts: Vec<NamedContext>,
    #[serde(default)]
    users: Vec<NamedUser>,
}

#[derive(Debug, Deserialize)]
struct NamedCluster {
    name: String,
    cluster: RawCluster,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawCluster {
    server: String,
    #[serde(default)]
    certificate_authority: Option<PathBuf>,
    #[serde(default)]
    certificate_authority_data: Option<String>,
    #[serde(default)]
    insecure_skip_tls_verify: bool,
}

#[derive(Debug, Deserialize)]
struct NamedContext {
    name: String,
    context: RawContext,
}

#[derive(Debug, Deserialize)]
struct RawContext {
    cluster: String,
    #[serde(default)]
    user: String,
    #[serde(default)]
    namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedUser {
    name: String,
    #[serde(default)]
    user: RawUser,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct RawUser {
    token: Option<String>,
    client_certificate: Option<PathBuf>,
    client_certificate_data: Option<String>,
    client_key: Option<PathBuf>,
    client_key_data: Option<String>,
}

impl KubeConfig {
    /// Load a kubeconfig file.
    ///
    /// Relative certificate paths are resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not describe a
    /// usable current context.
    pub fn from_file(path: impl AsRef<Path>) -> LogsResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LogsError::config(format!(
                "failed to read kubeconfig '{}': {e}",
                path.display()
            ))
        })?;
        Self::parse(&content, path.parent())
    }

    /// Parse a kubeconfig document.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or the current context cannot
    /// be resolved.
    pub fn from_yaml(content: &str) -> LogsResult<Self> {
        Self::parse(content, None)
    }

    fn parse(content: &str, base: Option<&Path>) -> LogsResult<Self> {
        let raw: RawKubeConfig = serde_yaml::from_str(content)
            .map_err(|e| LogsError::config(format!("invalid kubeconfig: {e}")))?;

        let context = raw
            .contexts
            .iter()
            .find(|c| c.name == raw.current_context)
            .map(|c| &c.context)
            .ok_or_else(|| {
                LogsError::config(format!(
                    "current context '{}' not found",
                    raw.current_context
                ))
            })?;

        let cluster = raw
            .clusters
            .iter()
            .find(|c| c.name == context.cluster)
            .map(|c| &c.cluster)
            .ok_or_else(|| {
                LogsError::config(format!("cluster '{}' not found", context.cluster))
            })?;

        let user = raw.users.iter().find(|u| u.name == context.user).map(|u| &u.user);

        let certificate_authority = pem(
            "certificate-authority",
            cluster.certificate_authority_data.as_deref(),
            cluster.certificate_authority.as_deref(),
            base,
        )?;
        let (token, client_certificate, client_key) = match user {
            Some(user) => (
                user.token.clone(),
                pem(
                    "client-certificate",
                    user.client_certificate_data.as_deref(),
                    user.client_certificate.as_deref(),
                    base,
                )?,
                pem(
                    "client-key",
                    user.client_key_data.as_deref(),
                    user.client_key.as_deref(),
                    base,
                )?,
            ),
            None => (None, None, None),
        };

        Ok(Self {
            server: cluster.server.clone(),
            namespace: context.namespace.clone(),
            token,
            certificate_authority,
            client_certificate,
            client_key,
            insecure_skip_tls_verify: cluster.insecure_skip_tls_verify,
        })
    }
}

/// Inline base64 data wins over a file reference.
fn pem(
    what: &str,
    data: Option<&str>,
    file: Option<&Path>,
    base: Option<&Path>,
) -> LogsResult<Option<Vec<u8>>> {
    if let Some(data) = data {
        let decoded = STANDARD
            .decode(data.trim())
            .map_err(|e| LogsError::config(format!("invalid {what}-data: {e}")))?;
        return Ok(Some(decoded));
    }

    let Some(file) = file else {
        return Ok(None);
    };
    let path = match base {
        Some(base) if file.is_relative() => base.join(file),
        _ => file.to_path_buf(),
    };
    std::fs::read(&path).map(Some).map_err(|e| {
        LogsError::config(format!("failed to read {what} '{}': {e}", path.display()))
    })
}
