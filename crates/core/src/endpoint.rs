//! URL derivation relative to the hosting page's origin.
//!
//! The job-status socket always lives at `/ws` on the page's own host, with
//! the hypertext scheme upgraded to the matching socket scheme.

use url::Url;

use crate::error::CoreError;

/// Path of the job-status socket endpoint.
pub const SOCKET_PATH: &str = "/ws";

/// Parse a page origin such as `http://localhost:8080`.
pub fn parse_origin(origin: &str) -> Result<Url, CoreError> {
    let url = Url::parse(origin).map_err(|e| CoreError::InvalidOrigin {
        origin: origin.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(CoreError::InvalidOrigin {
            origin: origin.to_string(),
            reason: "origin has no host".into(),
        });
    }
    Ok(url)
}

/// Socket scheme matching a page scheme: `http` → `ws`, `https` → `wss`.
///
/// Socket schemes map to themselves so an already-upgraded origin is
/// accepted.
pub fn socket_scheme(page_scheme: &str) -> Result<&'static str, CoreError> {
    match page_scheme {
        "http" | "ws" => Ok("ws"),
        "https" | "wss" => Ok("wss"),
        other => Err(CoreError::UnsupportedScheme(other.to_string())),
    }
}

/// Build the socket URL `<upgraded-origin>/ws` for a page origin.
///
/// Any path, query, or fragment on `origin` is discarded.
pub fn socket_url(origin: &Url) -> Result<Url, CoreError> {
    let scheme = socket_scheme(origin.scheme())?;
    let mut url = origin.clone();
    url.set_scheme(scheme)
        .map_err(|()| CoreError::UnsupportedScheme(origin.scheme().to_string()))?;
    url.set_path(SOCKET_PATH);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Path under which the server publishes a finished job's image.
pub fn default_image_path(job_id: &str) -> String {
    format!("/image/sd/{job_id}.png")
}

/// Resolve an image location against the page origin.
///
/// Absolute URLs are returned unchanged; relative ones are joined onto the
/// origin the way a browser resolves an `<img src>`.
pub fn resolve_image_url(origin: &Url, location: &str) -> Result<Url, CoreError> {
    origin
        .join(location)
        .map_err(|e| CoreError::InvalidImageUrl {
            url: location.to_string(),
            reason: e.to_string(),
        })
}
