//! Path routing for the add-on surface.
//!
//! Routing works on raw, `/`-separated segments that are percent-decoded
//! individually, so an encoded `/` inside a config segment survives.

use percent_encoding::percent_decode_str;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Root,
    Manifest {
        config: Option<String>,
    },
    Stream {
        config: Option<String>,
        kind: String,
        id: String,
    },
}

/// Decoded, non-empty path segments.
pub fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
        .collect()
}

impl Route {
    /// Route for the segments left after the access secret. `None` is a 404.
    pub fn parse(segments: &[String]) -> Option<Route> {
        let parts: Vec<&str> = segments.iter().map(String::as_str).collect();
        match parts.as_slice() {
            [] => Some(Route::Root),
            ["manifest.json" | "manifest"] => Some(Route::Manifest { config: None }),
            [config, "manifest.json" | "manifest"] => Some(Route::Manifest { config: Some(config.to_string()) }),
            ["stream", kind, file] => Self::stream(None, kind, file),
            [config, "stream", kind, file] => Self::stream(Some(*config), kind, file),
            _ => None,
        }
    }

    fn stream(config: Option<&str>, kind: &str, file: &str) -> Option<Route> {
        let id = file.strip_suffix(".json").filter(|id| !id.is_empty())?;
        Some(Route::Stream {
            config: config.map(str::to_string),
            kind: kind.to_string(),
            id: id.to_string(),
        })
    }
}

/// Split `tt123:<config>` into the content id and an inline config blob.
/// Only the segment right after the first `:` is treated as config.
pub fn split_stream_id(id: &str) -> (&str, Option<&str>) {
    match id.split_once(':') {
        Some((content, rest)) => {
            let blob = rest.split(':').next().filter(|b| !b.is_empty());
            (content, blob)
        }
        None => (id, None),
    }
}
