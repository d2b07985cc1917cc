//! Response format negotiation.
//!
//! A `.json`, `.atom` or `.html` suffix on the last path segment wins, then
//! the `Accept` header, and HTML otherwise. The suffix is stripped before
//! routing by [`strip_format_suffix`] so route patterns never mention it.

use axum::extract::{FromRequestParts, Request};
use axum::http::header::ACCEPT;
use axum::http::request::Parts;
use axum::http::uri::PathAndQuery;
use axum::http::Uri;
use std::convert::Infallible;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Html,
    Json,
    Atom,
}

impl Format {
    pub fn from_extension(extension: &str) -> Option<Format> {
        match extension.to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(Format::Html),
            "json" => Some(Format::Json),
            "atom" => Some(Format::Atom),
            _ => None,
        }
    }

    /// First media range in the header that names a known format.
    ///
    /// Wildcards are skipped, so `*/*` alone yields `None`.
    pub fn from_accept(accept: &str) -> Option<Format> {
        accept.split(',').find_map(|range| {
            let media_type = range.split(';').next().unwrap_or_default().trim();
            match media_type.to_ascii_lowercase().as_str() {
                "text/html" | "application/xhtml+xml" => Some(Format::Html),
                "application/json" | "text/json" => Some(Format::Json),
                "application/atom+xml" => Some(Format::Atom),
                _ => None,
            }
        })
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Format::Html => "text/html; charset=utf-8",
            Format::Json => "application/json",
            Format::Atom => "application/atom+xml; charset=utf-8",
        }
    }

    pub fn negotiate(parts: &Parts) -> Format {
        if let Some(PathFormat(format)) = parts.extensions.get::<PathFormat>() {
            return *format;
        }

        parts
            .headers
            .get(ACCEPT)
            .and_then(|value| value.to_str().ok())
            .and_then(Format::from_accept)
            .unwrap_or(Format::Html)
    }
}

/// Format taken from the URL suffix, recorded before routing
#[derive(Debug, Clone, Copy)]
pub struct PathFormat(pub Format);

impl<S> FromRequestParts<S> for Format
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Format::negotiate(parts))
    }
}

/// Splits `/bugs/12.json` into `/bugs/12` and `Format::Json`
fn split_suffix(path: &str) -> Option<(&str, Format)> {
    let (stem, extension) = path.rsplit_once('.')?;

    if extension.contains('/') || stem.is_empty() || stem.ends_with('/') {
        return None;
    }

    Format::from_extension(extension).map(|format| (stem, format))
}

fn rewrite_path(uri: &Uri, path: &str) -> Option<Uri> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(parts).ok()
}

/// Request rewrite applied in front of the router
pub fn strip_format_suffix(mut request: Request) -> Request {
    let rewritten = split_suffix(request.uri().path()).and_then(|(stem, format)| {
        rewrite_path(request.uri(), stem).map(|uri| (uri, format))
    });

    if let Some((uri, format)) = rewritten {
        debug!("Format suffix {:?} stripped: {}", format, uri);
        *request.uri_mut() = uri;
        request.extensions_mut().insert(PathFormat(format));
    }

    request
}
