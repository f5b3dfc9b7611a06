//! Destination path layout for the media library.
//!
//! The library tree has exactly one persisted shape:
//! `<root>/<Movies|Shows>/<title>[/S<season:02>]/<filename>`. A movie lives
//! directly under its title directory; a show additionally nests a
//! zero-padded season folder. Everything else about placement (which class
//! a file belongs to) comes from [`crate::classify`].

use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use crate::classify::MediaClass;
use crate::download::DownloadRequest;

/// Top-level directory for movies.
const MOVIES_DIR: &str = "Movies";

/// Top-level directory for shows.
const SHOWS_DIR: &str = "Shows";

/// Derives the file name for a download from the URL's last path segment.
///
/// The segment is percent-decoded so that e.g. `My%20File.mkv` lands on disk
/// as `My File.mkv`, then sanitized for filesystem safety. Returns `None`
/// for URLs with an empty path (nothing to name the file after).
#[must_use]
pub fn filename_from_url(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    if last.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(last).map_or_else(
        |e| {
            debug!(segment = %last, error = %e, "URL decoding failed, using raw segment");
            last.to_string()
        },
        |d| d.into_owned(),
    );
    let sanitized = sanitize_component(&decoded);
    (!sanitized.is_empty()).then_some(sanitized)
}

/// Computes the destination directory for a classified file.
///
/// Movies map to `<root>/Movies/<title>`, episodes to
/// `<root>/Shows/<title>/S<season:02>`.
#[must_use]
pub fn destination_dir(root: &Path, class: &MediaClass) -> PathBuf {
    match class {
        MediaClass::Movie { title, .. } => {
            root.join(MOVIES_DIR).join(sanitize_component(title))
        }
        MediaClass::Episode { title, season, .. } => root
            .join(SHOWS_DIR)
            .join(sanitize_component(title))
            .join(format!("S{season:02}")),
    }
}

/// Builds a complete [`DownloadRequest`] for one link.
///
/// Returns `None` when the URL has no usable filename or the filename cannot
/// be classified; the caller records that link as failed without touching
/// its siblings.
#[must_use]
pub fn plan_request(root: &Path, url: &Url) -> Option<DownloadRequest> {
    let file_name = filename_from_url(url)?;
    let class = crate::classify::classify(&file_name)?;
    let destination_dir = destination_dir(root, &class);
    debug!(
        url = %url,
        file = %file_name,
        dest = %destination_dir.display(),
        "planned library destination"
    );
    Some(DownloadRequest {
        url: url.clone(),
        destination_dir,
        file_name,
    })
}

/// Maps filesystem-hostile characters to underscores, collapsing runs.
///
/// Keeps alphanumerics, spaces, `-`, `_` and `.`; everything else becomes a
/// single `_`. Leading/trailing separators are trimmed.
fn sanitize_component(value: &str) -> String {
    let mut out = String::new();
    let mut prev_sep = false;
    for ch in value.chars() {
        let mapped = match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\'' => '_',
            c if c.is_control() => '_',
            c if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ') => c,
            _ => '_',
        };
        if mapped == '_' {
            if !prev_sep {
                out.push('_');
                prev_sep = true;
            }
        } else {
            out.push(mapped);
            prev_sep = false;
        }
    }
    out.trim_matches(|c| c == '_' || c == ' ').to_string()
}
