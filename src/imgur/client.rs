//! Imgur upload-by-URL client.

use serde::Deserialize;
use tracing::{debug, info};

use crate::common::error::RehostError;

/// Production upload endpoint.
pub const UPLOAD_URL: &str = "https://api.imgur.com/3/image";

/// Top-level Imgur API response.
#[derive(Debug, Deserialize)]
struct ImgurResponse {
    #[serde(default)]
    data: ImageData,
    status: i64,
    success: bool,
}

/// The fields of the `data` object we use. Imgur sends more.
#[derive(Debug, Default, Deserialize)]
struct ImageData {
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    deletehash: Option<String>,
}

/// Uploaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedImage {
    pub link: String,
    pub deletehash: Option<String>,
}

impl HostedImage {
    pub fn deletion_link(&self) -> Option<String> {
        self.deletehash
            .as_ref()
            .map(|hash| format!("https://imgur.com/delete/{}", hash))
    }
}

/// Client for the Imgur image upload API.
#[derive(Debug, Clone)]
pub struct ImgurClient {
    http: reqwest::Client,
    client_id: String,
    upload_url: String,
}

impl ImgurClient {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self::with_upload_url(client_id, UPLOAD_URL)
    }

    /// Client against a different endpoint.
    pub fn with_upload_url(client_id: impl Into<String>, upload_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: client_id.into(),
            upload_url: upload_url.into(),
        }
    }

    /// Ask Imgur to fetch `image_url` and host it. Single attempt.
    pub async fn upload_by_url(&self, image_url: &str) -> Result<HostedImage, RehostError> {
        debug!(upload_url = %self.upload_url, "Uploading image to Imgur");

        let response = self
            .http
            .post(&self.upload_url)
            .header("Authorization", format!("Client-ID {}", self.client_id))
            .form(&[("image", image_url)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RehostError::Status(status));
        }

        let body = response.text().await?;
        let parsed: ImgurResponse = serde_json::from_str(&body)?;
        if !parsed.success {
            return Err(RehostError::Rejected {
                status: parsed.status,
            });
        }

        let link = parsed.data.link.ok_or(RehostError::MissingLink)?;
        let image = HostedImage {
            link,
            deletehash: parsed.data.deletehash,
        };

        info!("Image Link: {}", image.link);
        if let Some(deletion) = image.deletion_link() {
            info!("Deletion Link: {}", deletion);
        }

        Ok(image)
    }
}
