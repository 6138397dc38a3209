use std::path::PathBuf;

use thiserror::Error;

/// Application-wide error types.
///
/// Setup-phase errors (config, API, sign-in, page navigation) abort the run.
/// The drivers catch everything else per item, log it, and move on.
///
/// # Examples
///
/// ```
/// use emoji_mover_core::error::AppError;
///
/// fn example() -> Result<(), AppError> {
///     Err(AppError::Generic("Something went wrong".to_string()))
/// }
/// assert!(example().is_err());
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// A required flat file does not exist or cannot be opened.
    #[error("Could not load {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// The settings file parsed, but its content is unusable.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP client request failed.
    ///
    /// Covers non-success HTTP statuses and request errors other than
    /// connection failures.
    #[error("API Client error: {0}")]
    ClientError(String),

    /// Network or connection error, including timeouts.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The emoji API answered with `"ok": false`.
    #[error("Emoji API error: {0}")]
    Api(String),

    /// The emoji API answered with JSON that lacks the expected shape.
    #[error("Malformed API response: {0}")]
    MalformedResponse(String),

    /// JSON serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The destination workspace root could not be opened.
    #[error("Could not access workspace {0}")]
    WorkspaceUnreachable(String),

    /// Sign-in was rejected or the sign-in form could not be submitted.
    #[error("Could not sign in: {0}")]
    AuthenticationFailed(String),

    /// A destination page (customize page) could not be opened.
    #[error("Could not access page {0}")]
    PageUnreachable(String),

    /// The current page has no form matching the selector.
    #[error("Form not found: {0}")]
    FormNotFound(String),

    /// The add-emoji form was submitted but no success message came back.
    #[error("Upload rejected for {0}")]
    UploadRejected(String),

    /// Local filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic application error for cases not covered by specific variants.
    #[error("Error: {0}")]
    Generic(String),
}

impl AppError {
    /// Returns a user-friendly error message suitable for CLI output.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ConfigNotFound(path) => {
                format!(
                    "Could not load {}.\n   Create it next to the binary or pass its path explicitly.",
                    path.display()
                )
            }
            AppError::InvalidConfig(msg) => {
                format!(
                    "{}\n   Expected: workspace URL, email, password, API token (one per line).",
                    msg
                )
            }
            AppError::AuthenticationFailed(_) => {
                "Could not sign in to the workspace.\n   Please check email and password.".to_string()
            }
            AppError::Api(code) if code.contains("auth") => {
                format!("The emoji API rejected the token ({}).\n   Check the API token in the config file.", code)
            }
            AppError::NetworkError(msg) => {
                format!("Network error: {}\n   Check your internet connection.", msg)
            }
            AppError::WorkspaceUnreachable(url) => {
                format!(
                    "Could not access workspace {}.\n   Check the workspace URL in the config file.",
                    url
                )
            }
            _ => self.to_string(),
        }
    }
}
