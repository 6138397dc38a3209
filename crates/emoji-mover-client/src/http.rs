use emoji_mover_core::error::AppError;
use reqwest::{Client, Response};

/// User agent sent with every request.
pub(crate) const USER_AGENT: &str = concat!("emoji-mover/", env!("CARGO_PKG_VERSION"));

/// Builds the shared reqwest client, optionally with a cookie jar.
pub(crate) fn build_client(cookies: bool) -> Result<Client, AppError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .cookie_store(cookies)
        .build()
        .map_err(|e| AppError::ClientError(e.to_string()))
}

/// Maps a transport error onto `AppError`.
pub(crate) fn request_error(e: reqwest::Error) -> AppError {
    if e.is_connect() || e.is_timeout() {
        AppError::NetworkError(format!("Connection failed: {}", e))
    } else {
        AppError::ClientError(e.to_string())
    }
}

/// Turns a non-success HTTP status into an error.
pub(crate) fn check_status(resp: Response) -> Result<Response, AppError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(AppError::ClientError(format!(
            "HTTP {} from {}",
            status.as_u16(),
            resp.url()
        )))
    }
}
