use std::path::Path;

use url::Url;

use crate::cmd::EnvMap;
use crate::config::Host;
use crate::error::{DeployError, DeployResult};

/// Host alias written to the generated SSH config; the docker client
/// is pointed at `ssh://<alias>`.
pub const SSH_HOST_ALIAS: &str = "remote";

/// How the docker client reaches the engine, derived from the host
/// URI scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    /// No host configured: the client's default socket.
    Local,
    /// `tcp://`, TLS-secured when requested.
    Tcp(String),
    /// `ssh://`, tunnelled through the generated host alias.
    Ssh(SshTarget),
    /// Any other scheme, handed to `DOCKER_HOST` unchanged.
    Other(String),
}

/// Remote end of an SSH tunnel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub hostname: String,
    pub user: Option<String>,
    pub port: Option<u16>,
}

impl Transport {
    pub fn parse(uri: &str) -> DeployResult<Self> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Ok(Self::Local);
        }

        if uri.starts_with("tcp://") {
            let url = parse_url(uri)?;
            require_host(&url, uri)?;
            return Ok(Self::Tcp(uri.to_string()));
        }

        if uri.starts_with("ssh://") {
            let url = parse_url(uri)?;
            let hostname = require_host(&url, uri)?;
            let user = Some(url.username())
                .filter(|u| !u.is_empty())
                .map(ToString::to_string);
            return Ok(Self::Ssh(SshTarget {
                hostname,
                user,
                port: url.port(),
            }));
        }

        Ok(Self::Other(uri.to_string()))
    }

    /// Environment handed to every docker invocation. `cert_dir` is
    /// the directory holding staged TLS material, if any.
    #[must_use]
    pub fn docker_env(&self, host: &Host, cert_dir: Option<&Path>) -> EnvMap {
        let mut env = EnvMap::new();

        match self {
            Self::Local => {}
            Self::Tcp(uri) | Self::Other(uri) => {
                env.insert("DOCKER_HOST".into(), uri.clone());
            }
            Self::Ssh(_) => {
                env.insert("DOCKER_HOST".into(), format!("ssh://{SSH_HOST_ALIAS}"));
            }
        }

        if let Some(dir) = cert_dir {
            env.insert("DOCKER_CERT_PATH".into(), dir.display().to_string());
        }

        if host.tls_verify {
            env.insert("DOCKER_TLS_VERIFY".into(), "1".into());
        } else if host.tls {
            env.insert("DOCKER_TLS".into(), "1".into());
        }

        env
    }
}

fn parse_url(uri: &str) -> DeployResult<Url> {
    Url::parse(uri)
        .map_err(|e| DeployError::Configuration(format!("invalid docker host {uri}: {e}")))
}

fn require_host(url: &Url, uri: &str) -> DeployResult<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.trim_start_matches('[').trim_end_matches(']').to_string())
        .ok_or_else(|| DeployError::Configuration(format!("docker host {uri} has no hostname")))
}
