//! Discovery of the files that hold a namespace inside one search directory.

use std::path::Path;
use tracing::debug;

/// Suffix marking a fallback file, used only when the plain file is absent.
pub const DIST_SUFFIX: &str = ".dist";

/// A file in a search directory that belongs to the namespace being loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Name used for reader matching, without any `.dist` suffix.
    pub name: String,
    /// Name of the file on disk.
    pub disk_name: String,
}

impl Candidate {
    #[must_use]
    pub fn is_dist(&self) -> bool {
        self.name != self.disk_name
    }
}

/// Lists the files of `dir` that hold configuration for `namespace`.
///
/// Entries are taken in byte order of their names. A `name.dist` entry is
/// dropped when `name` is also listed and otherwise stands in for `name`.
/// Only `<namespace>.<ext>` names with a known extension are kept, sorted by
/// the rank of their extension in `extensions` (listing order breaks ties).
///
/// A missing or unreadable directory yields no candidates.
#[must_use]
pub fn scan_namespace(dir: &Path, namespace: &str, extensions: &[String]) -> Vec<Candidate> {
    if !dir.is_dir() {
        debug!(path = %dir.display(), "search path is not a directory, skipping");
        return Vec::new();
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(path = %dir.display(), error = %e, "cannot list search path, skipping");
            return Vec::new();
        }
    };

    let mut listing: Vec<String> = entries
        .filter_map(std::result::Result::ok)
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    listing.sort();

    let mut candidates = resolve_dist(&listing);
    candidates.retain(|c| extension_rank(&c.name, namespace, extensions).is_some());
    candidates.sort_by_key(|c| extension_rank(&c.name, namespace, extensions));
    candidates
}

fn resolve_dist(listing: &[String]) -> Vec<Candidate> {
    listing
        .iter()
        .filter_map(|disk_name| match disk_name.strip_suffix(DIST_SUFFIX) {
            Some(plain) if listing.iter().any(|other| other == plain) => None,
            Some(plain) => Some(Candidate {
                name: plain.to_string(),
                disk_name: disk_name.clone(),
            }),
            None => Some(Candidate {
                name: disk_name.clone(),
                disk_name: disk_name.clone(),
            }),
        })
        .collect()
}

/// Position of the extension of `file` in `extensions`, if `file` is named
/// `<namespace>.<ext>` with a known extension.
fn extension_rank(file: &str, namespace: &str, extensions: &[String]) -> Option<usize> {
    let ext = file.strip_prefix(namespace)?.strip_prefix('.')?;
    extensions.iter().position(|known| known == ext)
}
