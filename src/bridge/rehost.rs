//! Moving Telegram attachments to a durable public host.

use crate::bridge::platform::DestPlatform;
use crate::common::error::RehostError;
use crate::common::Attachment;
use crate::imgur::ImgurClient;

/// Re-uploads Telegram files to Imgur.
#[derive(Debug, Clone)]
pub struct Rehoster {
    host: ImgurClient,
}

impl Rehoster {
    pub fn new(host: ImgurClient) -> Self {
        Self { host }
    }

    /// Resolve the attachment's download URL on `dest` and upload it.
    /// Returns the public link.
    pub async fn rehost<D>(&self, dest: &D, attachment: &Attachment) -> Result<String, RehostError>
    where
        D: DestPlatform + ?Sized,
    {
        let url = dest
            .resolve_file_url(&attachment.file_id)
            .await
            .map_err(RehostError::Resolve)?;
        let image = self.host.upload_by_url(&url).await?;
        Ok(image.link)
    }
}
