//! Flat-file configuration for emoji-mover.
//!
//! Two line-oriented files drive a run:
//!
//! - the settings file: workspace URL, email, password and API token, in that
//!   order, with `#` comments and blank lines ignored;
//! - the exclusion file: one platform-default emoji name per line.

use std::collections::HashSet;
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::error::AppError;

/// Default location of the settings file.
pub const DEFAULT_SETTINGS_FILE: &str = "./emoji_conf.txt";

/// Default location of the exclusion file.
pub const DEFAULT_EXCLUSIONS_FILE: &str = "./default_emoji.txt";

/// Number of values the settings file must provide.
const REQUIRED_SETTINGS: usize = 4;

/// Credentials and endpoints for one migration run.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    /// Destination workspace root, always ending in `/`.
    pub workspace_url: Url,
    pub email: String,
    pub password: String,
    /// Token for the source emoji API.
    pub api_token: String,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("workspace_url", &self.workspace_url.as_str())
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("api_token", &"<redacted>")
            .finish()
    }
}

/// Parses the settings file content.
///
/// Lines are trimmed; blank lines and lines starting with `#` are skipped.
/// The first four remaining lines are taken in order, anything after them
/// is ignored.
///
/// # Errors
///
/// Returns `AppError::InvalidConfig` when fewer than four usable lines exist
/// and `AppError::InvalidUrl` when the first one is not an absolute URL.
///
/// # Examples
///
/// ```
/// use emoji_mover_core::config::parse_settings;
///
/// let text = "# workspace\nhttps://team.slack.com\nme@example.com\nhunter2\nxoxp-123\n";
/// let settings = parse_settings(text).unwrap();
/// assert_eq!(settings.workspace_url.as_str(), "https://team.slack.com/");
/// assert_eq!(settings.api_token, "xoxp-123");
/// ```
pub fn parse_settings(text: &str) -> Result<Settings, AppError> {
    let values: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .take(REQUIRED_SETTINGS)
        .collect();

    let [workspace, email, password, token] = values[..] else {
        return Err(AppError::InvalidConfig(format!(
            "Config file doesn't have enough settings ({} of {})",
            values.len(),
            REQUIRED_SETTINGS
        )));
    };

    Ok(Settings {
        workspace_url: parse_workspace_url(workspace)?,
        email: email.to_string(),
        password: password.to_string(),
        api_token: token.to_string(),
    })
}

/// Reads and parses the settings file at `path`.
pub fn load_settings(path: &Path) -> Result<Settings, AppError> {
    let text = read_flat_file(path)?;
    parse_settings(&text)
}

/// Parses the exclusion file content: one trimmed name per line.
pub fn parse_exclusions(text: &str) -> HashSet<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads and parses the exclusion file at `path`.
pub fn load_exclusions(path: &Path) -> Result<HashSet<String>, AppError> {
    let text = read_flat_file(path)?;
    Ok(parse_exclusions(&text))
}

fn read_flat_file(path: &Path) -> Result<String, AppError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AppError::ConfigNotFound(path.to_path_buf()),
        _ => AppError::Io(e),
    })
}

/// Parses the workspace URL, adding a trailing slash so relative page paths
/// resolve below the workspace root.
fn parse_workspace_url(raw: &str) -> Result<Url, AppError> {
    let mut url = Url::parse(raw).map_err(|e| AppError::InvalidUrl(format!("{}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(AppError::InvalidUrl(raw.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Minimum pauses between requests to the rate-sensitive services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    /// Pause after every newly downloaded image.
    pub download_delay: Duration,
    /// Pause after every add-emoji submission, whatever its outcome.
    pub upload_delay: Duration,
}

impl PacingConfig {
    /// Pacing with no pauses at all.
    pub fn none() -> Self {
        Self {
            download_delay: Duration::ZERO,
            upload_delay: Duration::ZERO,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            download_delay: Duration::from_secs(3),
            upload_delay: Duration::from_secs(5),
        }
    }
}
