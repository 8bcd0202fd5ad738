//! Remote image sources over ssh/scp.
//!
//! Enumeration runs `ssh <addr> ls <path>` and filters the listing to image
//! files; fetching runs `scp` into the staging directory. Connectivity is
//! probed with a short BatchMode check before listing so a dead host fails
//! fast instead of hanging the scan.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Image, is_image_file};
use crate::error::{Result, WshError};
use crate::provider::command::run_cmd;

/// A parsed `ssh://[user@]host/path` descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshUri {
    pub user: Option<String>,
    pub host: String,
    pub path: String,
}

impl SshUri {
    /// Parse an `ssh://` source descriptor.
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix(super::SSH_PREFIX)
            .ok_or_else(|| WshError::InvalidSource {
                descriptor: uri.to_string(),
            })?;

        let (authority, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };

        let (user, host) = match authority.split_once('@') {
            Some((user, host)) => (Some(user.to_string()), host.to_string()),
            None => (None, authority.to_string()),
        };

        if host.is_empty() || path.is_empty() {
            return Err(WshError::InvalidSource {
                descriptor: uri.to_string(),
            });
        }

        Ok(Self {
            user,
            host,
            path: path.to_string(),
        })
    }

    /// The `[user@]host` form used on ssh/scp command lines.
    pub fn address(&self) -> String {
        match &self.user {
            Some(user) => format!("{user}@{}", self.host),
            None => self.host.clone(),
        }
    }

    /// The original descriptor form of this URI.
    pub fn descriptor(&self) -> String {
        format!("{}{}{}", super::SSH_PREFIX, self.authority(), self.path)
    }

    fn authority(&self) -> String {
        self.address()
    }
}

/// List remote images under the URI's path.
///
/// Fingerprints are deferred until an image is actually fetched.
pub fn list_images(uri: &SshUri) -> Result<Vec<Image>> {
    check_alive(uri)?;

    let cmd = format!("ssh {} ls {}", uri.address(), escape_path(&uri.path));
    debug!(command = %cmd, "listing remote source");
    let output = run_cmd(&cmd)?;

    let base = uri.descriptor();
    let images = output
        .lines()
        .map(str::trim)
        .filter(|name| !name.is_empty() && is_image_file(Path::new(name)))
        .map(|name| Image {
            source: format!("{}/{name}", base.trim_end_matches('/')),
            path: PathBuf::new(),
            fingerprint: None,
        })
        .collect();

    Ok(images)
}

/// Copy a remote image (an `ssh://.../file` descriptor) to `dest`.
pub fn fetch(descriptor: &str, dest: &Path) -> Result<()> {
    let uri = SshUri::parse(descriptor)?;
    let cmd = format!(
        "scp {}:\"{}\" {}",
        uri.address(),
        uri.path,
        escape_path(&dest.display().to_string())
    );

    debug!(command = %cmd, "fetching remote image");
    run_cmd(&cmd)?;
    Ok(())
}

/// Probe connectivity with a short, non-interactive check.
fn check_alive(uri: &SshUri) -> Result<()> {
    let cmd = format!(
        "ssh -o BatchMode=yes -o ConnectTimeout=5 '{}' echo ok",
        uri.address()
    );
    run_cmd(&cmd).map_err(|e| WshError::SourceUnavailable {
        source_name: uri.descriptor(),
        reason: e.to_string(),
    })?;
    Ok(())
}

fn escape_path(path: &str) -> String {
    path.replace(' ', "\\ ")
}
