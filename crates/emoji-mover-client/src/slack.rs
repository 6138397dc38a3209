use std::collections::HashMap;

use emoji_mover_core::error::AppError;
use emoji_mover_core::models::{inventory_from_map, Inventory};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::http::{build_client, check_status, request_error};

/// Default endpoint of the emoji listing API.
pub const DEFAULT_API_BASE: &str = "https://slack.com/api/emoji.list";

/// Response of the `emoji.list` method.
///
/// Slack API reference: <https://api.slack.com/methods/emoji.list>
///
/// ```json
/// {
///     "ok": true,
///     "emoji": {
///         "bowtie": "https://emoji.slack-edge.com/T0/bowtie/f3ec6f2b.png",
///         "squirrel": "alias:shipit"
///     }
/// }
/// ```
#[derive(Deserialize, Debug)]
struct EmojiListResponse {
    #[serde(default = "default_ok")]
    ok: bool,
    error: Option<String>,
    emoji: Option<HashMap<String, String>>,
}

fn default_ok() -> bool {
    true
}

/// Parses an `emoji.list` response body into an [`Inventory`].
///
/// # Errors
///
/// - `AppError::SerializationError` if the body is not JSON or `emoji` is not
///   a string-to-string map
/// - `AppError::Api` if the API reported `"ok": false`
/// - `AppError::MalformedResponse` if the `emoji` key is missing
///
/// # Examples
///
/// ```
/// use emoji_mover_client::slack::parse_inventory;
///
/// let body = br#"{"ok": true, "emoji": {"foo": "http://x/f.png", "bar": "alias:foo"}}"#;
/// let inventory = parse_inventory(body).unwrap();
/// assert_eq!(inventory.len(), 2);
/// assert!(inventory["bar"].is_alias());
/// ```
pub fn parse_inventory(body: &[u8]) -> Result<Inventory, AppError> {
    let response: EmojiListResponse = serde_json::from_slice(body)?;

    if !response.ok {
        return Err(AppError::Api(
            response.error.unwrap_or_else(|| "unknown_error".to_string()),
        ));
    }

    let emoji = response
        .emoji
        .ok_or_else(|| AppError::MalformedResponse("missing \"emoji\" object".to_string()))?;

    Ok(inventory_from_map(emoji))
}

/// HTTP client for the source workspace's emoji API.
///
/// # Examples
///
/// ```no_run
/// use emoji_mover_client::SlackApiClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = SlackApiClient::new("https://slack.com/api/emoji.list")?;
/// let inventory = client.fetch_inventory("xoxp-token").await?;
/// println!("Found {} emoji", inventory.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SlackApiClient {
    client: Client,
    api_base: Url,
}

impl SlackApiClient {
    /// Creates a client for the given API endpoint.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidUrl` if the endpoint is malformed.
    /// Returns `AppError::ClientError` if the HTTP client cannot be built.
    pub fn new(api_base: &str) -> Result<Self, AppError> {
        let api_base = Url::parse(api_base)
            .map_err(|_| AppError::InvalidUrl(format!("Invalid API URL: {}", api_base)))?;
        let client = build_client(false)?;
        Ok(Self { client, api_base })
    }

    /// Request URL for `token`: `<base>?pretty=1&token=<token>`.
    fn list_url(&self, token: &str) -> Url {
        let mut url = self.api_base.clone();
        url.query_pairs_mut()
            .append_pair("pretty", "1")
            .append_pair("token", token);
        url
    }

    /// Fetches the whole emoji inventory. Not retried.
    pub async fn fetch_inventory(&self, token: &str) -> Result<Inventory, AppError> {
        info!("Accessing emoji API to get emoji list...");
        let resp = self
            .client
            .get(self.list_url(token))
            .send()
            .await
            .map_err(request_error)?;
        let resp = check_status(resp)?;
        let body = resp.bytes().await.map_err(request_error)?;
        debug!("Emoji API returned {} bytes", body.len());

        let inventory = parse_inventory(&body)?;
        info!("Emoji API listed {} emoji", inventory.len());
        Ok(inventory)
    }
}
