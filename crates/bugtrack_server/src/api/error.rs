use crate::api::flash::flash_cookie;
use crate::api::format::Format;
use crate::api::views::{escape, layout};
use axum::extract::Request;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use bugtrack_auth::AuthError;
use bugtrack_sql::sql::pagination::PaginationError;
use bugtrack_sql::SqlError;
use bugtrack_types::{ServerErrorBody, ValidationErrors};
use thiserror::Error;
use tracing::{debug, error};

const NOT_FOUND_PAGE: &str = include_str!("../../static/404.html");

/// Everything a handler can fail with.
///
/// Handlers return `Result<_, ApiError>` and stay format agnostic. The error
/// rides out in the response extensions and [`render_errors`] turns it into
/// the status and body for the negotiated format.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("{0} not found")]
    RecordNotFound(String),

    #[error("Disallowed parameters: {}", .0.join(", "))]
    DisallowedParameters(Vec<String>),

    #[error("Validation failed: {}", .0.full_messages().join(", "))]
    ValidationFailed(ValidationErrors),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("You don't have permission to do that")]
    Unauthorized,

    #[error("Invalid authenticity token")]
    InvalidAuthenticityToken,

    #[error("Requested format is not available")]
    NotAcceptable,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ApiError::RecordNotFound(what.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::RecordNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DisallowedParameters(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized => StatusCode::FORBIDDEN,
            ApiError::InvalidAuthenticityToken => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The single dispatch from error kind and format to a response
    pub fn render(self, format: Format) -> Response {
        let status = self.status();

        match (self, format) {
            (ApiError::RecordNotFound(_), Format::Html) => {
                (status, Html(NOT_FOUND_PAGE)).into_response()
            }
            (ApiError::DisallowedParameters(fields), Format::Html) => redirect_with_flash(
                "/",
                format!("Disallowed parameters: {}", fields.join(", ")),
            ),
            (ApiError::DisallowedParameters(fields), Format::Json) => {
                (status, Json(ServerErrorBody::disallowed_parameters(&fields))).into_response()
            }
            (ApiError::ValidationFailed(errors), Format::Html) => {
                (status, Html(validation_page(&errors))).into_response()
            }
            (ApiError::ValidationFailed(errors), Format::Json) => {
                (status, Json(errors)).into_response()
            }
            (ApiError::Unauthenticated, Format::Html) => Redirect::to("/login").into_response(),
            (ApiError::Unauthenticated, Format::Json) => {
                (status, Json(ServerErrorBody::not_authenticated())).into_response()
            }
            (error @ ApiError::Unauthorized, Format::Html) => {
                redirect_with_flash("/", error.to_string())
            }
            (ApiError::Unauthorized, Format::Json) => {
                (status, Json(ServerErrorBody::permission_denied())).into_response()
            }
            (ApiError::InvalidAuthenticityToken, Format::Json) => {
                (status, Json(ServerErrorBody::invalid_authenticity_token())).into_response()
            }
            (ApiError::BadRequest(message), Format::Json) => {
                (status, Json(ServerErrorBody::bad_request(message))).into_response()
            }
            (ApiError::Internal(message), Format::Json) => {
                (status, Json(ServerErrorBody::internal(message))).into_response()
            }
            (ApiError::Internal(message), Format::Html) => {
                error!("Internal server error: {}", message);
                (status, Html(plain_page(status, "We're sorry, but something went wrong."))).into_response()
            }
            (
                error @ (ApiError::InvalidAuthenticityToken
                | ApiError::BadRequest(_)
                | ApiError::NotAcceptable),
                Format::Html,
            ) => (status, Html(plain_page(status, &error.to_string()))).into_response(),
            (ApiError::Internal(message), Format::Atom) => {
                error!("Internal server error: {}", message);
                status.into_response()
            }
            (ApiError::RecordNotFound(_) | ApiError::NotAcceptable, Format::Json) | (_, Format::Atom) => {
                status.into_response()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = self.status().into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl From<SqlError> for ApiError {
    fn from(error: SqlError) -> Self {
        match error {
            SqlError::PaginationError(e) => e.into(),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<PaginationError> for ApiError {
    fn from(error: PaginationError) -> Self {
        ApiError::BadRequest(error.to_string())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::ValidationFailed(errors)
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            e if e.is_forbidden() => ApiError::Unauthorized,
            e @ AuthError::EncodeJwtError(_) => ApiError::Internal(e.to_string()),
            e => {
                debug!("Authentication failed: {}", e);
                ApiError::Unauthenticated
            }
        }
    }
}

fn redirect_with_flash(to: &str, message: String) -> Response {
    let jar = CookieJar::new().add(flash_cookie(message));
    (jar, Redirect::to(to)).into_response()
}

fn plain_page(status: StatusCode, message: &str) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    layout(
        title,
        None,
        &format!("<h1>{}</h1>\n<p>{}</p>", escape(title), escape(message)),
    )
}

fn validation_page(errors: &ValidationErrors) -> String {
    let items: String = errors
        .full_messages()
        .iter()
        .map(|message| format!("<li>{}</li>", escape(message)))
        .collect();

    layout(
        "Unprocessable Entity",
        None,
        &format!("<h1>The request could not be saved</h1>\n<ul>{}</ul>", items),
    )
}

/// Outermost middleware: renders any [`ApiError`] for the negotiated format.
///
/// Cookies already set on the failed response are carried over.
pub async fn render_errors(format: Format, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let Some(error) = response.extensions_mut().remove::<ApiError>() else {
        return response;
    };

    debug!("Request failed ({:?}): {}", format, error);

    let cookies: Vec<_> = response.headers().get_all(SET_COOKIE).iter().cloned().collect();
    let mut rendered = error.render(format);
    for cookie in cookies {
        rendered.headers_mut().append(SET_COOKIE, cookie);
    }

    rendered
}
