//! Request path resolution and confinement.
//!
//! # Responsibilities
//! - Strip query and fragment suffixes
//! - Map `/` (and any path ending in `/`) to the index document
//! - Percent-decode, falling back to the raw string on failure
//! - Join onto the served root without letting `..` climb out of it
//!
//! # Design Decisions
//! - Purely lexical: no filesystem access happens here
//! - `..` that would pop above the root is a rejection, not a clamp
//! - The final confinement check is repeated on the joined path so the
//!   segment walk is never the only line of defense

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Both separators split segments so `..\` cannot sneak past on any host.
const SEPARATORS: &[char] = &['/', '\\'];

/// Why a request path was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// A `..` segment would leave the served root.
    #[error("path escapes the served root")]
    Escape,
    /// Nothing is left once the path is normalized.
    #[error("path does not name anything inside the served root")]
    Empty,
    /// A segment cannot be used as a plain file name (NUL, drive prefix, ...).
    #[error("path contains a forbidden segment")]
    ForbiddenSegment,
}

/// Maps request paths onto files under a fixed root directory.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    index_file: String,
}

impl PathResolver {
    /// Create a resolver for `root`, which should already be absolute and
    /// canonical (see `lifecycle::startup::prepare`).
    pub fn new(root: impl Into<PathBuf>, index_file: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            index_file: index_file.into(),
        }
    }

    /// The served root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a request target (path plus optional query/fragment).
    pub fn resolve(&self, request_path: &str) -> Result<PathBuf, Rejection> {
        let path = strip_suffix(request_path);
        let decoded = decode(path);

        let mut segments: Vec<&str> = Vec::new();
        for segment in decoded.split(SEPARATORS) {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(Rejection::Escape);
                    }
                }
                other => {
                    if !is_plain_segment(other) {
                        return Err(Rejection::ForbiddenSegment);
                    }
                    segments.push(other);
                }
            }
        }

        // Directory requests (and the bare root) get the index document.
        let wants_index = decoded.is_empty() || decoded.ends_with(SEPARATORS);

        let mut relative: PathBuf = segments.iter().collect();
        if wants_index {
            relative.push(&self.index_file);
        }

        let resolved = self.root.join(&relative);
        self.check_confined(&resolved)?;
        Ok(resolved)
    }

    fn check_confined(&self, resolved: &Path) -> Result<(), Rejection> {
        let relative = resolved.strip_prefix(&self.root).map_err(|_| Rejection::Escape)?;

        match relative.components().next() {
            None => Err(Rejection::Empty),
            Some(Component::ParentDir) => Err(Rejection::Escape),
            Some(Component::RootDir | Component::Prefix(_)) => Err(Rejection::Escape),
            Some(_) if relative.is_absolute() => Err(Rejection::Escape),
            Some(_) => Ok(()),
        }
    }
}

/// Drop everything from the first `?` or `#`.
fn strip_suffix(request_path: &str) -> &str {
    match request_path.find(&['?', '#'][..]) {
        Some(end) => &request_path[..end],
        None => request_path,
    }
}

/// Percent-decode, keeping the raw string when the result is not UTF-8.
fn decode(path: &str) -> Cow<'_, str> {
    match percent_decode_str(path).decode_utf8() {
        Ok(decoded) => decoded,
        Err(_) => {
            tracing::debug!(path, "Request path is not valid UTF-8 once decoded, using raw form");
            Cow::Borrowed(path)
        }
    }
}

fn is_plain_segment(segment: &str) -> bool {
    if segment.contains('\0') {
        return false;
    }
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
