//! Image source resolution.
//!
//! Turns configured source descriptors into a flat pool of candidate images.
//! A descriptor is a filesystem directory (bare path or `dir://`), a manifest
//! file with one image path per line (`list://`), or a remote host
//! (`ssh://[user@]host/path`). Identity of an image is its content
//! fingerprint, never its path.

pub mod ssh;

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, error};

use crate::error::{Result, WshError};

/// File extensions recognized as images during source scans.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff"];

/// URI prefix for directory sources.
pub const DIR_PREFIX: &str = "dir://";
/// URI prefix for manifest-file sources.
pub const LIST_PREFIX: &str = "list://";
/// URI prefix for remote sources.
pub const SSH_PREFIX: &str = "ssh://";

/// A candidate wallpaper image.
///
/// `path` is empty for remote images until they are fetched; `fingerprint`
/// is filled once the content is locally available and hashed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Origin descriptor or tag (e.g. `dir://`, `ssh://host/path/img.jpg`).
    #[serde(default)]
    pub source: String,

    /// Local filesystem location, populated after any remote fetch.
    #[serde(default)]
    pub path: PathBuf,

    /// SHA-256 content hash, hex encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl Image {
    /// Build an image from a local path, computing its fingerprint.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let fingerprint = fingerprint(&path)?;
        Ok(Self {
            source: String::new(),
            path,
            fingerprint: Some(fingerprint),
        })
    }

    /// True if this image still lives on a remote host.
    pub fn is_remote(&self) -> bool {
        self.source.starts_with(SSH_PREFIX) && self.path.as_os_str().is_empty()
    }

    /// Compute and cache the fingerprint if it is not known yet.
    pub fn ensure_fingerprint(&mut self) -> Result<&str> {
        if self.fingerprint.is_none() {
            self.fingerprint = Some(fingerprint(&self.path)?);
        }
        Ok(self.fingerprint.as_deref().unwrap_or_default())
    }

    /// Whether two images are the same content.
    ///
    /// Identity is fingerprint equality; an image without a fingerprint is
    /// never the same as anything.
    pub fn same_as(&self, other: &Self) -> bool {
        match (&self.fingerprint, &other.fingerprint) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// SHA-256 of a file's content, hex encoded.
pub fn fingerprint(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// A parsed source descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// Local directory, scanned non-recursively.
    Directory(PathBuf),
    /// Text file with one image path per line.
    Manifest(PathBuf),
    /// Remote host listing, fetched on demand.
    Remote(ssh::SshUri),
}

/// Parse a source descriptor into its kind.
///
/// A bare path that exists on disk is treated as a directory source.
pub fn parse_source(descriptor: &str) -> Result<SourceKind> {
    if let Some(rest) = descriptor.strip_prefix(DIR_PREFIX) {
        return Ok(SourceKind::Directory(PathBuf::from(rest)));
    }
    if let Some(rest) = descriptor.strip_prefix(LIST_PREFIX) {
        return Ok(SourceKind::Manifest(PathBuf::from(rest)));
    }
    if descriptor.starts_with(SSH_PREFIX) {
        return Ok(SourceKind::Remote(ssh::SshUri::parse(descriptor)?));
    }
    if Path::new(descriptor).exists() {
        return Ok(SourceKind::Directory(PathBuf::from(descriptor)));
    }
    Err(WshError::InvalidSource {
        descriptor: descriptor.to_string(),
    })
}

/// Resolve all configured sources into a single candidate pool.
///
/// A source that fails to enumerate is logged and skipped; the whole batch
/// only fails with [`WshError::NoImagesFound`] when every source yields
/// nothing.
pub fn resolve_sources(sources: &[String]) -> Result<Vec<Image>> {
    let mut images = Vec::new();

    for src in sources {
        debug!(source = %src, "resolving source");
        let result = parse_source(src).and_then(|kind| match kind {
            SourceKind::Directory(dir) => scan_directory(&dir),
            SourceKind::Manifest(file) => read_manifest(&file),
            SourceKind::Remote(uri) => ssh::list_images(&uri),
        });

        match result {
            Ok(found) => {
                debug!(source = %src, count = found.len(), "source resolved");
                images.extend(found);
            }
            Err(e) => {
                error!(source = %src, error = %e, "skipping unavailable source");
            }
        }
    }

    if images.is_empty() {
        return Err(WshError::NoImagesFound);
    }

    Ok(images)
}

/// True if a filename carries a recognized image extension.
pub fn is_image_file(name: &Path) -> bool {
    name.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Enumerate image files directly inside `dir` (non-recursive).
fn scan_directory(dir: &Path) -> Result<Vec<Image>> {
    let entries = std::fs::read_dir(dir).map_err(|e| WshError::SourceUnavailable {
        source_name: dir.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut images = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && is_image_file(&path) {
            let fingerprint = fingerprint(&path)?;
            images.push(Image {
                source: DIR_PREFIX.to_string(),
                path,
                fingerprint: Some(fingerprint),
            });
        }
    }

    Ok(images)
}

/// Read a manifest file: one image path per line, each hashed.
fn read_manifest(file: &Path) -> Result<Vec<Image>> {
    let data = std::fs::read_to_string(file).map_err(|e| WshError::SourceUnavailable {
        source_name: file.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut images = Vec::new();
    for line in data.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let path = PathBuf::from(line);
        let fingerprint = fingerprint(&path)?;
        images.push(Image {
            source: LIST_PREFIX.to_string(),
            path,
            fingerprint: Some(fingerprint),
        });
    }

    Ok(images)
}

/// True if `image` appears (by fingerprint) in `list`.
pub fn in_list(image: &Image, list: &[Image]) -> bool {
    list.iter().any(|i| i.same_as(image))
}

/// Remove from `images` every image whose fingerprint appears in `exclude`.
pub fn filter_images(images: &[Image], exclude: &[Image]) -> Vec<Image> {
    images
        .iter()
        .filter(|i| !in_list(i, exclude))
        .cloned()
        .collect()
}

/// The complement of [`filter_images`]: keep only images present in `list`.
pub fn matches(images: &[Image], list: &[Image]) -> Vec<Image> {
    images
        .iter()
        .filter(|i| in_list(i, list))
        .cloned()
        .collect()
}

/// Remove a specific image (by fingerprint) from a pool in place.
pub fn remove_image(pool: &mut Vec<Image>, image: &Image) {
    pool.retain(|i| !i.same_as(image));
}

/// Pick a uniformly random image from a pool.
pub fn pick_random(pool: &[Image]) -> Option<Image> {
    if pool.is_empty() {
        return None;
    }
    let index = rand::rng().random_range(0..pool.len());
    Some(pool[index].clone())
}

/// Make an image locally usable, fetching it from its remote host if needed.
///
/// Remote images are copied into `staging_dir` and fingerprinted after the
/// transfer. Local images are returned unchanged. Fetch failures are left to
/// the caller's retry policy.
pub fn materialize(image: &Image, staging_dir: &Path) -> Result<Image> {
    if !image.is_remote() {
        return Ok(image.clone());
    }

    std::fs::create_dir_all(staging_dir)?;

    let name = image
        .source
        .rsplit('/')
        .next()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| WshError::InvalidSource {
            descriptor: image.source.clone(),
        })?;
    let dest = staging_dir.join(name);

    ssh::fetch(&image.source, &dest)?;

    let mut fetched = image.clone();
    fetched.path = dest;
    fetched.ensure_fingerprint()?;
    Ok(fetched)
}
