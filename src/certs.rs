use std::path::Path;

use crate::config::{Certs, Host};
use crate::error::{DeployError, DeployResult};
use crate::files;

/// Decoded TLS material, checked and ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsMaterial {
    /// Client key and certificate, always together.
    pub client: Option<(Vec<u8>, Vec<u8>)>,
    pub ca: Option<Vec<u8>>,
}

/// Check the credential bundle against the host's TLS settings.
///
/// Returns `None` when neither TLS nor verification is requested.
/// Nothing is written; use [`TlsMaterial::write_to`] for that.
pub fn plan(certs: &Certs, host: &Host) -> DeployResult<Option<TlsMaterial>> {
    if !host.wants_tls() {
        return Ok(None);
    }

    let client = match (non_empty(certs.key.as_deref()), non_empty(certs.cert.as_deref())) {
        (Some(key), Some(cert)) => Some((files::decode_content(key), files::decode_content(cert))),
        (None, None) => None,
        (Some(_), None) => {
            return Err(DeployError::Validation(
                "the client certificate must be present".into(),
            ));
        }
        (None, Some(_)) => {
            return Err(DeployError::Validation("the client key must be present".into()));
        }
    };

    let ca = if host.tls_verify {
        let ca = non_empty(certs.ca.as_deref()).ok_or_else(|| {
            DeployError::Validation("cannot use tlsverify without a given CA".into())
        })?;
        Some(files::decode_content(ca))
    } else {
        None
    };

    Ok(Some(TlsMaterial { client, ca }))
}

impl TlsMaterial {
    /// Write `key.pem`/`cert.pem` (0600) and `ca.pem` (0644) into
    /// `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> DeployResult<()> {
        files::create_dir(dir)?;

        if let Some((key, cert)) = &self.client {
            files::write_file(&dir.join("key.pem"), key, 0o600)?;
            files::write_file(&dir.join("cert.pem"), cert, 0o600)?;
        }

        if let Some(ca) = &self.ca {
            files::write_file(&dir.join("ca.pem"), ca, 0o644)?;
        }

        Ok(())
    }
}

/// Validate and write in one step. Returns whether anything was
/// staged.
pub fn stage(certs: &Certs, host: &Host, dir: &Path) -> DeployResult<bool> {
    match plan(certs, host)? {
        Some(material) => {
            material.write_to(dir)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
