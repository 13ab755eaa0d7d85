//! # Identifiers and safe paths
//!
//! Notes and folders are addressed by opaque identifiers: the base64url (no padding)
//! encoding of the entry's root-relative path, with `/` as the separator.
//!
//! [`resolve`] is the only way to turn an identifier into a filesystem location. It
//! produces a [`SafePath`], and [`SafePath`] values can only be extended one validated
//! segment at a time, so every path the store touches is known to live under the root.

use crate::error::{NotesError, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::path::{Component, Path, PathBuf};

/// Encode a root-relative path as an identifier.
pub fn encode(relative: &Path) -> String {
    let normalized = relative.to_string_lossy().replace('\\', "/");
    URL_SAFE_NO_PAD.encode(normalized.as_bytes())
}

/// Decode an identifier back into a root-relative path.
///
/// Fails with `InvalidIdentifier` when the identifier is blank, not valid base64url,
/// not UTF-8, absolute, or contains a `..` segment.
pub fn decode(id: &str) -> Result<PathBuf> {
    let text = decode_text(id)?;
    if text.starts_with('/') || text.starts_with('\\') || has_prefix(&text) {
        return Err(NotesError::InvalidIdentifier(format!(
            "{} (absolute path)",
            id
        )));
    }

    let mut relative = PathBuf::new();
    for segment in text.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(NotesError::InvalidIdentifier(format!(
                    "{} (parent segment)",
                    id
                )))
            }
            other => relative.push(other),
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(NotesError::InvalidIdentifier(format!("{} (empty path)", id)));
    }
    Ok(relative)
}

/// Decode `id` and join it to `root`, refusing anything that lands outside of `root`.
///
/// `root` must already be absolute and normalized. Nothing on disk is consulted.
pub fn resolve(id: &str, root: &Path) -> Result<SafePath> {
    let text = decode_text(id)?;
    let candidate = normalize(&root.join(text.replace('\\', "/")));
    if !candidate.starts_with(root) {
        return Err(NotesError::PathEscape(text));
    }

    let relative = decode(id)?;
    Ok(SafePath {
        absolute: root.join(&relative),
        relative,
    })
}

fn decode_text(id: &str) -> Result<String> {
    if id.trim().is_empty() {
        return Err(NotesError::InvalidIdentifier("missing identifier".to_string()));
    }
    let bytes = URL_SAFE_NO_PAD
        .decode(id.trim())
        .map_err(|e| NotesError::InvalidIdentifier(format!("{}: {}", id, e)))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| NotesError::InvalidIdentifier(format!("{} (not UTF-8)", id)))?;
    if text.trim().is_empty() || text.contains('\0') {
        return Err(NotesError::InvalidIdentifier(id.to_string()));
    }
    Ok(text)
}

/// Windows drive prefixes such as `C:` make a path absolute on that platform.
fn has_prefix(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Lexical normalization: drops `.`, folds `..` into its parent.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// An absolute path known to be the store root or one of its descendants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafePath {
    absolute: PathBuf,
    relative: PathBuf,
}

impl SafePath {
    pub(crate) fn root(root: &Path) -> Self {
        Self {
            absolute: root.to_path_buf(),
            relative: PathBuf::new(),
        }
    }

    pub fn absolute(&self) -> &Path {
        &self.absolute
    }

    pub fn relative(&self) -> &Path {
        &self.relative
    }

    pub fn is_root(&self) -> bool {
        self.relative.as_os_str().is_empty()
    }

    pub fn id(&self) -> String {
        encode(&self.relative)
    }

    pub fn file_name(&self) -> String {
        self.relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Join a single path segment. Separators, `.` and `..` are refused.
    pub fn child(&self, segment: &str) -> Result<SafePath> {
        if segment.is_empty()
            || segment == "."
            || segment == ".."
            || segment.contains(['/', '\\', '\0'])
        {
            return Err(NotesError::PathEscape(format!(
                "{}/{}",
                self.relative.display(),
                segment
            )));
        }
        Ok(SafePath {
            absolute: self.absolute.join(segment),
            relative: self.relative.join(segment),
        })
    }

    /// The containing folder, or `None` for the root itself.
    pub fn parent(&self) -> Option<SafePath> {
        if self.is_root() {
            return None;
        }
        let relative = self.relative.parent()?.to_path_buf();
        let absolute = self.absolute.parent()?.to_path_buf();
        Some(SafePath { absolute, relative })
    }
}
