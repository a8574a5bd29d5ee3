use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{DeployError, DeployResult};
use crate::files;
use crate::host::{SSH_HOST_ALIAS, SshTarget};

/// Files written into the SSH directory for a tunnelled deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshStaging {
    pub config_path: PathBuf,
    pub key_path: Option<PathBuf>,
    pub config: String,
}

/// Refuse to touch an existing SSH client config. A config whose
/// existence cannot be determined is treated as existing.
pub fn ensure_no_config(ssh_dir: &Path) -> DeployResult<()> {
    let config = ssh_dir.join("config");
    match std::fs::symlink_metadata(&config) {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Ok(_) => Err(DeployError::Validation(format!(
            "ssh config file {} already exists",
            config.display()
        ))),
        Err(e) => Err(DeployError::Validation(format!(
            "ssh config file {} cannot be checked: {e}",
            config.display()
        ))),
    }
}

/// Render the `Host` block the docker client connects through.
#[must_use]
pub fn render_config(target: &SshTarget, identity_file: Option<&Path>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Host {SSH_HOST_ALIAS}");
    let _ = writeln!(out, "  HostName {}", target.hostname);
    if let Some(user) = &target.user {
        let _ = writeln!(out, "  User {user}");
    }
    if let Some(port) = target.port {
        let _ = writeln!(out, "  Port {port}");
    }
    if let Some(identity) = identity_file {
        let _ = writeln!(out, "  IdentityFile {}", identity.display());
    }
    out.push_str("  StrictHostKeyChecking no\n");
    out
}

/// Write the private key (if any) and a fresh SSH config into
/// `ssh_dir`.
pub fn stage(target: &SshTarget, key: Option<&str>, ssh_dir: &Path) -> DeployResult<SshStaging> {
    ensure_no_config(ssh_dir)?;
    files::create_dir(ssh_dir)?;

    let key_path = match key.filter(|k| !k.trim().is_empty()) {
        Some(key) => {
            let path = ssh_dir.join("key.pem");
            files::write_file(&path, &files::decode_content(key), 0o600)?;
            Some(path)
        }
        None => None,
    };

    let config = render_config(target, key_path.as_deref());
    let config_path = ssh_dir.join("config");
    files::write_file(&config_path, config.as_bytes(), 0o600)?;

    println!("SSH Config:\n\n{config}");

    Ok(SshStaging {
        config_path,
        key_path,
        config,
    })
}
