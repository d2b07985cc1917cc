//! Double-submit authenticity tokens.
//!
//! Every response carries a `csrf_token` cookie. Unsafe requests must echo it
//! back in the `X-CSRF-Token` header or the `authenticity_token` query
//! parameter. Bearer-authenticated API calls are exempt.

use crate::api::error::ApiError;
use axum::extract::{Query, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::collections::HashMap;
use tracing::warn;

pub const CSRF_COOKIE: &str = "csrf_token";
pub const CSRF_HEADER: &str = "x-csrf-token";
pub const CSRF_PARAM: &str = "authenticity_token";

/// The token valid for the current request, for embedding in forms
#[derive(Debug, Clone)]
pub struct CsrfToken(pub String);

pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Constant-time comparison
pub fn tokens_match(expected: &str, presented: &str) -> bool {
    if expected.len() != presented.len() {
        return false;
    }

    expected
        .bytes()
        .zip(presented.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

fn has_bearer(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("Bearer "))
}

fn presented_token(request: &Request) -> Option<String> {
    if let Some(value) = request.headers().get(CSRF_HEADER) {
        return value.to_str().ok().map(str::to_string);
    }

    Query::<HashMap<String, String>>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(mut params)| params.remove(CSRF_PARAM))
}

fn csrf_cookie(token: String) -> Cookie<'static> {
    Cookie::build((CSRF_COOKIE, token))
        .path("/")
        .same_site(SameSite::Strict)
        .build()
}

pub async fn csrf_protection(jar: CookieJar, mut request: Request, next: Next) -> Response {
    let existing = jar.get(CSRF_COOKIE).map(|cookie| cookie.value().to_string());

    if !is_safe(request.method()) && !has_bearer(request.headers()) {
        let verified = match (existing.as_deref(), presented_token(&request)) {
            (Some(expected), Some(presented)) => tokens_match(expected, &presented),
            _ => false,
        };

        if !verified {
            warn!(
                "Rejected {} {}: authenticity token missing or mismatched",
                request.method(),
                request.uri().path()
            );
            return ApiError::InvalidAuthenticityToken.into_response();
        }
    }

    match existing {
        Some(token) => {
            request.extensions_mut().insert(CsrfToken(token));
            next.run(request).await
        }
        None => {
            let token = generate_token();
            request.extensions_mut().insert(CsrfToken(token.clone()));
            let response = next.run(request).await;
            (jar.add(csrf_cookie(token)), response).into_response()
        }
    }
}
