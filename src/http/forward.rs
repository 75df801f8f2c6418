//! Forwarding to the upstream.
//!
//! # Responsibilities
//! - Rewrite the request URI to the upstream authority
//! - Send the already-rewritten headers through unchanged
//! - Map transport failures to 502

use axum::{
    body::Body,
    extract::State,
    http::{
        uri::{Authority, PathAndQuery, Scheme},
        Request, StatusCode, Uri, Version,
    },
    response::{IntoResponse, Response},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

/// State for the forwarding handler.
#[derive(Clone)]
pub struct Upstream {
    pub authority: Authority,
    pub client: Client<HttpConnector, Body>,
}

impl Upstream {
    pub fn new(authority: Authority) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { authority, client }
    }
}

/// Point a request at the upstream, keeping path and query.
pub fn upstream_uri(uri: &Uri, authority: &Authority) -> Result<Uri, axum::http::uri::InvalidUriParts> {
    let mut parts = uri.clone().into_parts();
    parts.scheme = Some(Scheme::HTTP);
    parts.authority = Some(authority.clone());
    if parts.path_and_query.is_none() {
        parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    Uri::from_parts(parts)
}

pub async fn forward_handler(State(upstream): State<Upstream>, request: Request<Body>) -> Response {
    let (mut parts, body) = request.into_parts();

    parts.uri = match upstream_uri(&parts.uri, &upstream.authority) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(uri = %parts.uri, error = %e, "Cannot build upstream URI");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };
    // The upstream connection is HTTP/1.1 regardless of how the client spoke to us.
    parts.version = Version::HTTP_11;

    tracing::debug!(method = %parts.method, uri = %parts.uri, "Forwarding request");

    match upstream.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(upstream = %upstream.authority, error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
