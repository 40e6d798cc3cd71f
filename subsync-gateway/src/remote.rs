//! Remote transport — the five platform capabilities behind a trait.
//!
//! [`HttpRemote`] speaks the platform's v3 REST API over blocking HTTP.
//! Video listing resolves the channel's uploads playlist and pages through
//! it 50 items at a time; caption uploads and updates use a two-part
//! `multipart/related` body (JSON metadata + raw track bytes).
//!
//! Nothing here caches or meters — that is the [`crate::Gateway`]'s job.
//! Write calls are never retried here; retry policy, if any, belongs to the
//! engine at the action level.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use subsync_core::lang;
use subsync_core::types::{CaptionId, ChannelId, LanguageCode, RemoteEntry, SubtitleKey, VideoId, VideoRef};

use crate::auth::CredentialProvider;
use crate::error::GatewayError;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const UPLOAD_BASE: &str = "https://www.googleapis.com/upload/youtube/v3";
const PAGE_SIZE: &str = "50";
const MULTIPART_BOUNDARY: &str = "subsync_caption_body";

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// The raw remote capabilities, one method per platform call.
pub trait RemoteApi: Send + Sync {
    /// All videos on the channel, in upload-playlist order.
    fn list_videos(&self, channel: &ChannelId) -> Result<Vec<VideoRef>, GatewayError>;

    /// All caption tracks currently on a video.
    fn list_caption_tracks(&self, video: &VideoId) -> Result<Vec<RemoteEntry>, GatewayError>;

    /// Create a new caption track; returns its id.
    fn insert_caption(
        &self,
        video: &VideoId,
        language: &LanguageCode,
        content: &[u8],
    ) -> Result<CaptionId, GatewayError>;

    /// Replace the content of an existing caption track.
    fn update_caption(
        &self,
        caption: &CaptionId,
        video: &VideoId,
        content: &[u8],
    ) -> Result<(), GatewayError>;

    /// Remove a caption track.
    fn delete_caption(&self, caption: &CaptionId) -> Result<(), GatewayError>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelItem {
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemsResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    snippet: PlaylistSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistSnippet {
    title: String,
    resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct CaptionListResponse {
    #[serde(default)]
    items: Vec<CaptionItem>,
}

#[derive(Debug, Deserialize)]
struct CaptionItem {
    id: String,
    snippet: CaptionSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionSnippet {
    language: String,
    last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct CaptionInsertResponse {
    id: String,
}

// ---------------------------------------------------------------------------
// HttpRemote
// ---------------------------------------------------------------------------

/// Blocking HTTP implementation of [`RemoteApi`].
pub struct HttpRemote {
    agent: ureq::Agent,
    credentials: Box<dyn CredentialProvider>,
    api_base: String,
    upload_base: String,
}

impl HttpRemote {
    pub fn new(credentials: Box<dyn CredentialProvider>) -> Self {
        Self::with_base(credentials, API_BASE, UPLOAD_BASE)
    }

    /// Point the transport at a different base URL (tests, API mocks).
    pub fn with_base(
        credentials: Box<dyn CredentialProvider>,
        api_base: impl Into<String>,
        upload_base: impl Into<String>,
    ) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(Duration::from_secs(60))
            .timeout_write(Duration::from_secs(60))
            .build();
        Self {
            agent,
            credentials,
            api_base: api_base.into(),
            upload_base: upload_base.into(),
        }
    }

    fn bearer(&self) -> Result<String, GatewayError> {
        let credential = self.credentials.credential()?;
        Ok(format!("Bearer {}", credential.bearer_token))
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GatewayError> {
        let mut request = self
            .agent
            .get(url)
            .set("Authorization", &self.bearer()?);
        for (name, value) in query {
            request = request.query(name, value);
        }
        match request.call() {
            Ok(response) => response
                .into_json::<T>()
                .map_err(|e| GatewayError::UnexpectedResponse(e.to_string())),
            Err(err) => Err(map_ureq_error(err)),
        }
    }

    /// The channel's uploads playlist id, via `channels.list`.
    fn uploads_playlist(&self, channel: &ChannelId) -> Result<String, GatewayError> {
        let url = format!("{}/channels", self.api_base);
        let response: ChannelListResponse =
            self.get_json(&url, &[("part", "contentDetails"), ("id", &channel.0)])?;
        let item = response.items.into_iter().next().ok_or_else(|| {
            GatewayError::RemoteNotFound {
                what: format!("channel {channel}"),
            }
        })?;
        Ok(item.content_details.related_playlists.uploads)
    }
}

impl RemoteApi for HttpRemote {
    fn list_videos(&self, channel: &ChannelId) -> Result<Vec<VideoRef>, GatewayError> {
        let playlist = self.uploads_playlist(channel)?;
        let url = format!("{}/playlistItems", self.api_base);

        let mut videos = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut query: Vec<(&str, &str)> = vec![
                ("part", "snippet"),
                ("playlistId", &playlist),
                ("maxResults", PAGE_SIZE),
            ];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }
            let response: PlaylistItemsResponse = self.get_json(&url, &query)?;
            for item in response.items {
                videos.push(VideoRef {
                    id: VideoId::from(item.snippet.resource_id.video_id),
                    title: item.snippet.title,
                });
            }
            match response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(videos)
    }

    fn list_caption_tracks(&self, video: &VideoId) -> Result<Vec<RemoteEntry>, GatewayError> {
        let url = format!("{}/captions", self.api_base);
        let response: CaptionListResponse =
            self.get_json(&url, &[("part", "id,snippet"), ("videoId", &video.0)])?;
        Ok(response
            .items
            .into_iter()
            .map(|item| RemoteEntry {
                key: SubtitleKey::new(
                    video.clone(),
                    lang::normalize(&item.snippet.language),
                ),
                remote_caption_id: CaptionId::from(item.id),
                last_updated: item.snippet.last_updated,
            })
            .collect())
    }

    fn insert_caption(
        &self,
        video: &VideoId,
        language: &LanguageCode,
        content: &[u8],
    ) -> Result<CaptionId, GatewayError> {
        let metadata = serde_json::json!({
            "snippet": {
                "videoId": video.0,
                "language": language.0,
                "isDraft": false,
            }
        });
        let body = multipart_related(&metadata, content);
        let url = format!("{}/captions", self.upload_base);
        let response = self
            .agent
            .post(&url)
            .query("part", "snippet")
            .query("uploadType", "multipart")
            .set("Authorization", &self.bearer()?)
            .set(
                "Content-Type",
                &format!("multipart/related; boundary={MULTIPART_BOUNDARY}"),
            )
            .send_bytes(&body);
        match response {
            Ok(response) => {
                let parsed: CaptionInsertResponse = response
                    .into_json()
                    .map_err(|e| GatewayError::UnexpectedResponse(e.to_string()))?;
                Ok(CaptionId::from(parsed.id))
            }
            Err(err) => Err(map_ureq_error(err)),
        }
    }

    fn update_caption(
        &self,
        caption: &CaptionId,
        video: &VideoId,
        content: &[u8],
    ) -> Result<(), GatewayError> {
        let metadata = serde_json::json!({
            "id": caption.0,
            "snippet": {
                "videoId": video.0,
                "isDraft": false,
            }
        });
        let body = multipart_related(&metadata, content);
        let url = format!("{}/captions", self.upload_base);
        let response = self
            .agent
            .put(&url)
            .query("part", "snippet")
            .query("uploadType", "multipart")
            .set("Authorization", &self.bearer()?)
            .set(
                "Content-Type",
                &format!("multipart/related; boundary={MULTIPART_BOUNDARY}"),
            )
            .send_bytes(&body);
        match response {
            Ok(_) => Ok(()),
            Err(err) => Err(map_ureq_error(err)),
        }
    }

    fn delete_caption(&self, caption: &CaptionId) -> Result<(), GatewayError> {
        let url = format!("{}/captions", self.api_base);
        let response = self
            .agent
            .delete(&url)
            .query("id", &caption.0)
            .set("Authorization", &self.bearer()?)
            .call();
        match response {
            Ok(_) => Ok(()),
            Err(err) => Err(map_ureq_error(err)),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a two-part `multipart/related` body: JSON metadata, then the raw
/// caption bytes.
fn multipart_related(metadata: &serde_json::Value, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + 512);
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

fn map_ureq_error(err: ureq::Error) -> GatewayError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            map_status(status, &body)
        }
        ureq::Error::Transport(transport) => GatewayError::Network(transport.to_string()),
    }
}

/// HTTP status → error kind, per the platform's conventions: 401 means the
/// credential is bad, 403 is quota exhaustion or missing channel rights
/// (told apart by the error reason in the body), 404 is a missing video or
/// caption id.
fn map_status(status: u16, body: &str) -> GatewayError {
    match status {
        401 => GatewayError::AuthRequired("credential rejected (HTTP 401)".to_string()),
        403 if body.contains("quotaExceeded") || body.contains("dailyLimitExceeded") => {
            GatewayError::QuotaExceeded
        }
        403 => GatewayError::PermissionDenied {
            message: snippet(body),
        },
        404 => GatewayError::RemoteNotFound {
            what: snippet(body),
        },
        _ => GatewayError::Api {
            status,
            message: snippet(body),
        },
    }
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(200) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_matches_platform_conventions() {
        assert!(matches!(map_status(401, ""), GatewayError::AuthRequired(_)));
        assert!(matches!(
            map_status(403, r#"{"reason":"quotaExceeded"}"#),
            GatewayError::QuotaExceeded
        ));
        assert!(matches!(
            map_status(403, r#"{"reason":"forbidden"}"#),
            GatewayError::PermissionDenied { .. }
        ));
        assert!(matches!(
            map_status(404, "caption not found"),
            GatewayError::RemoteNotFound { .. }
        ));
        assert!(matches!(
            map_status(500, "boom"),
            GatewayError::Api { status: 500, .. }
        ));
    }

    #[test]
    fn multipart_body_has_both_parts_and_closing_boundary() {
        let metadata = serde_json::json!({"snippet": {"videoId": "abc123"}});
        let body = multipart_related(&metadata, b"1\n00:00:01,000 --> 00:00:02,000\nhi\n");
        let text = String::from_utf8_lossy(&body);
        assert!(text.starts_with(&format!("--{MULTIPART_BOUNDARY}\r\n")));
        assert!(text.contains("Content-Type: application/json"));
        assert!(text.contains("abc123"));
        assert!(text.contains("Content-Type: application/octet-stream"));
        assert!(text.ends_with(&format!("\r\n--{MULTIPART_BOUNDARY}--\r\n")));
    }

    #[test]
    fn caption_listing_parses_platform_shape() {
        let raw = r#"{
            "items": [
                {"id": "cap-1", "snippet": {"language": "en", "lastUpdated": "2024-03-01T10:00:00.000Z"}},
                {"id": "cap-2", "snippet": {"language": "pt-BR"}}
            ]
        }"#;
        let parsed: CaptionListResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[0].id, "cap-1");
        assert!(parsed.items[0].snippet.last_updated.is_some());
        assert_eq!(parsed.items[1].snippet.language, "pt-BR");
    }

    #[test]
    fn playlist_page_parses_next_token() {
        let raw = r#"{
            "items": [
                {"snippet": {"title": "Video one", "resourceId": {"videoId": "abc123"}}}
            ],
            "nextPageToken": "CAUQAA"
        }"#;
        let parsed: PlaylistItemsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.items[0].snippet.resource_id.video_id, "abc123");
        assert_eq!(parsed.next_page_token.as_deref(), Some("CAUQAA"));
    }
}
