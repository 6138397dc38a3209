use emoji_mover_core::download::ImageSource;
use emoji_mover_core::error::AppError;
use reqwest::Client;

use crate::http::{build_client, check_status, request_error};

/// Fetches emoji images over plain HTTP GET.
#[derive(Clone)]
pub struct HttpImageSource {
    client: Client,
}

impl HttpImageSource {
    pub fn new() -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(false)?,
        })
    }
}

impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let resp = self.client.get(url).send().await.map_err(request_error)?;
        let resp = check_status(resp)?;
        let body = resp.bytes().await.map_err(request_error)?;
        Ok(body.to_vec())
    }
}
