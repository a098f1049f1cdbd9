//! URI/path conversion.
//!
//! File identity is a `Uri` on the protocol side and a `PathBuf` internally.
//! The conversion must round-trip exactly: `path_to_uri(uri_to_path(u)) == u`
//! for every file URI the editor can send.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tower_lsp_server::ls_types::Uri;
use url::Url;

use crate::error::{CoreError, CoreResult};

/// Convert a protocol URI to a filesystem path.
///
/// Only `file://` URIs are accepted; everything else is an error so callers
/// can degrade to an empty result.
pub fn uri_to_path(uri: &Uri) -> CoreResult<PathBuf> {
    let url = Url::parse(uri.as_str()).map_err(|_| CoreError::invalid_uri(uri.as_str()))?;
    url.to_file_path()
        .map_err(|_| CoreError::invalid_uri(uri.as_str()))
}

/// Convert a filesystem path to a protocol URI.
pub fn path_to_uri(path: &Path) -> CoreResult<Uri> {
    let url = Url::from_file_path(path)
        .map_err(|_| CoreError::invalid_uri(path.display().to_string()))?;
    Uri::from_str(url.as_str()).map_err(|_| CoreError::invalid_uri(url.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_plain_file_uri() {
        let uri = Uri::from_str("file:///project/src/a.ts").unwrap();
        let path = uri_to_path(&uri).unwrap();
        assert_eq!(path, PathBuf::from("/project/src/a.ts"));
        assert_eq!(path_to_uri(&path).unwrap().as_str(), uri.as_str());
    }

    #[test]
    fn round_trips_percent_encoded_characters() {
        let uri = Uri::from_str("file:///project/with%20space/a.tpl").unwrap();
        let path = uri_to_path(&uri).unwrap();
        assert_eq!(path, PathBuf::from("/project/with space/a.tpl"));
        assert_eq!(path_to_uri(&path).unwrap().as_str(), uri.as_str());
    }

    #[test]
    fn rejects_non_file_scheme() {
        let uri = Uri::from_str("untitled:Untitled-1").unwrap();
        assert!(uri_to_path(&uri).is_err());
    }
}
