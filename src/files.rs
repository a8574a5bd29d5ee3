//! Helpers for writing credential material to disk.

use std::fs;
use std::io::Write;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::DeployResult;

/// Decode a credential value. Valid base64 is decoded; anything
/// else (typically raw PEM text) is returned as-is. Line breaks are
/// ignored when testing for base64 so wrapped encodings decode too.
#[must_use]
pub fn decode_content(value: &str) -> Vec<u8> {
    let compact: String = value.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
    STANDARD
        .decode(compact.as_bytes())
        .unwrap_or_else(|_| value.as_bytes().to_vec())
}

/// Create `dir` and its parents with mode 0755.
pub fn create_dir(dir: &Path) -> DeployResult<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(dir)?;
    Ok(())
}

/// Write `contents` to `path` with permission bits `mode`. New files
/// are created with `mode`; files that already existed are narrowed
/// to it afterwards.
pub fn write_file(path: &Path, contents: &[u8], mode: u32) -> DeployResult<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    let mut file = options.open(path)?;
    set_mode(path, mode)?;
    file.write_all(contents)?;
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> DeployResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn set_mode(_path: &Path, _mode: u32) -> DeployResult<()> {
    Ok(())
}
