use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use shortlink_core::full_short_url;
use shortlink_resolver::Resolution;
use tracing::{debug, error};

use crate::state::AppState;

/// Prefixes of path segments owned by the API and docs surfaces.
const RESERVED_PREFIXES: [&str; 3] = ["api", "swagger", "v3"];

fn is_reserved(short_uri: &str) -> bool {
    if short_uri.eq_ignore_ascii_case("favicon.ico") {
        return true;
    }
    RESERVED_PREFIXES.iter().any(|prefix| {
        short_uri
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

fn request_host<'a>(headers: &'a HeaderMap, fallback: &'a str) -> &'a str {
    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .unwrap_or(fallback)
}

/// `GET /{short_uri}`: 302 to the origin URL, or 404.
///
/// Store failures are logged and answered with 404 like any other
/// unresolvable link.
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(short_uri): Path<String>,
    headers: HeaderMap,
) -> Response {
    if is_reserved(&short_uri) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let host = request_host(&headers, state.default_domain());
    let full_short_url = full_short_url(host, &short_uri);

    match state.resolver().resolve(&full_short_url).await {
        Ok(Resolution::Target(url)) => {
            debug!(full_short_url = %full_short_url, target = %url, "redirecting");
            (StatusCode::FOUND, [(header::LOCATION, url)]).into_response()
        }
        Ok(Resolution::Gone) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            error!(full_short_url = %full_short_url, error = %e, "failed to resolve short link");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
