use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id for one HTTP request, available to handlers as an extension.
///
/// Search handlers stamp it on their log lines and on the final NDJSON error
/// line, so a client can quote it when reporting a broken stream.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Tags every request with a [`RequestId`] and echoes it back in the
/// `x-request-id` response header.
///
/// A non-blank id supplied by the caller is reused; otherwise a fresh v4 UUID
/// is minted.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let supplied = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned);
    let id = supplied.unwrap_or_else(|| Uuid::new_v4().to_string());

    let header = HeaderValue::from_str(&id).ok();
    req.extensions_mut().insert(RequestId(id));

    let mut res = next.run(req).await;
    if let Some(header) = header {
        res.headers_mut().insert(REQUEST_ID_HEADER, header);
    }
    res
}
