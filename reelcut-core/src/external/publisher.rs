// ============================================================================
// reelcut-core/src/external/publisher.rs
// ============================================================================
//
// PUBLISHER: Reel upload to a page on the Graph video endpoint
//
// One multipart POST per clip to `{api_base}/{page_id}/video_reels` carrying
// the video file, the page access token and the description. When the clip's
// slot lies in the future the request also asks the platform to hold the
// reel until `scheduled_publish_time`; a slot in the past publishes now.
//
// The access token is never logged.

use crate::error::{CoreError, CoreResult};
use crate::external::Publisher;

use chrono::{DateTime, Utc};
use log::{debug, info};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;

use std::path::Path;
use std::time::Duration;

/// Graph video endpoint used unless overridden.
pub const DEFAULT_API_BASE: &str = "https://graph-video.facebook.com/v17.0";

/// Uploads clips as reels to a single page.
pub struct ReelsPublisher {
    client: Client,
    api_base: String,
    page_id: String,
    access_token: String,
}

impl ReelsPublisher {
    pub fn new(page_id: impl Into<String>, access_token: impl Into<String>, timeout: Duration) -> CoreResult<Self> {
        let page_id = page_id.into();
        let access_token = access_token.into();
        if page_id.trim().is_empty() {
            return Err(CoreError::InvalidConfiguration("page id must not be empty".to_string()));
        }
        if access_token.trim().is_empty() {
            return Err(CoreError::InvalidConfiguration(
                "page access token must not be empty".to_string(),
            ));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            page_id,
            access_token,
        })
    }

    /// Points the publisher at a different API root (test servers, newer API versions).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/{}/video_reels", self.api_base.trim_end_matches('/'), self.page_id)
    }

    fn build_form(
        &self,
        video: &Path,
        description: &str,
        scheduled_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> CoreResult<Form> {
        let bytes = std::fs::read(video).map_err(|e| {
            CoreError::PublishFailed(format!("cannot read {}: {e}", video.display()))
        })?;
        let file_name = video
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "clip.mp4".to_string());
        let video_part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("video/mp4")?;

        let mut form = Form::new()
            .text("access_token", self.access_token.clone())
            .text("description", description.to_string());

        if let Some(at) = scheduled_at.filter(|at| *at > now) {
            debug!("Scheduling reel for {} (unix {})", at, at.timestamp());
            form = form
                .text("scheduled_publish_time", at.timestamp().to_string())
                .text("published", "false");
        }

        Ok(form.part("video_file", video_part))
    }
}

impl Publisher for ReelsPublisher {
    fn publish(
        &self,
        video: &Path,
        description: &str,
        scheduled_at: Option<DateTime<Utc>>,
    ) -> CoreResult<String> {
        let form = self.build_form(video, description, scheduled_at, Utc::now())?;
        info!("Uploading {} to page {}", video.display(), self.page_id);

        let response = self
            .client
            .post(self.endpoint())
            .multipart(form)
            .send()
            .map_err(|e| CoreError::PublishFailed(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| CoreError::PublishFailed(format!("failed to read response: {e}")))?;

        check_response(status.as_u16(), status.is_success(), body)
    }
}

/// Turns an HTTP status and body into the publish result.
///
/// The body must be JSON without an `error` member.
fn check_response(status: u16, success: bool, body: String) -> CoreResult<String> {
    if !success {
        return Err(CoreError::PublishFailed(format!("HTTP {status}: {}", body.trim())));
    }
    let value: serde_json::Value = serde_json::from_str(&body)
        .map_err(|e| CoreError::PublishFailed(format!("malformed response body: {e}")))?;
    if let Some(error) = value.get("error") {
        return Err(CoreError::PublishFailed(format!("platform error: {error}")));
    }
    Ok(body)
}
