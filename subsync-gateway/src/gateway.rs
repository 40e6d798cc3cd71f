//! The gateway façade — cache-backed reads, metered live calls.
//!
//! Charging discipline: exactly one ledger charge per live call, zero per
//! cache hit. Charges are recorded before the call is issued — the platform
//! consumes quota for failed writes too. A successful write invalidates the
//! caption listing for its video so a read inside the same session never
//! observes pre-write state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use subsync_core::types::{CaptionId, ChannelId, LanguageCode, RemoteEntry, SubtitleKey, VideoId, VideoRef};

use crate::cache::ResponseCache;
use crate::error::GatewayError;
use crate::quota::{OperationKind, QuotaLedger, QuotaSummary};
use crate::remote::RemoteApi;

/// Serialized form of a caption track inside a cache record.
#[derive(Debug, Serialize, Deserialize)]
struct CachedCaptionTrack {
    id: String,
    language: String,
    last_updated: Option<DateTime<Utc>>,
}

/// Quota-aware, cache-backed access to the remote platform.
pub struct Gateway<R: RemoteApi> {
    remote: R,
    cache: ResponseCache,
    ledger: QuotaLedger,
}

impl<R: RemoteApi> Gateway<R> {
    pub fn new(remote: R, cache: ResponseCache) -> Self {
        Self {
            remote,
            cache,
            ledger: QuotaLedger::new(),
        }
    }

    pub fn quota_summary(&self) -> QuotaSummary {
        self.ledger.summary()
    }

    /// The underlying transport.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Cache key for a channel's video listing. Channel-scoped so projects
    /// on different channels never interfere.
    fn videos_key(channel: &ChannelId) -> String {
        format!("videos_{channel}")
    }

    /// Cache key for a video's caption listing. Video ids are globally
    /// unique on the platform, so video scoping suffices.
    fn captions_key(video: &VideoId) -> String {
        format!("captions_{video}")
    }

    // -----------------------------------------------------------------------
    // Reads (cached)
    // -----------------------------------------------------------------------

    /// All videos on the channel. Charged only on a cache miss.
    pub fn list_videos(&self, channel: &ChannelId) -> Result<Vec<VideoRef>, GatewayError> {
        let key = Self::videos_key(channel);
        if let Some(videos) = self.cache.get::<Vec<VideoRef>>(&key) {
            tracing::debug!("video listing for {channel} served from cache");
            return Ok(videos);
        }
        self.ledger.record(OperationKind::ListVideos);
        let videos = self.remote.list_videos(channel)?;
        self.cache.put(&key, &videos);
        Ok(videos)
    }

    /// All caption tracks on a video. Charged only on a cache miss.
    pub fn list_caption_tracks(&self, video: &VideoId) -> Result<Vec<RemoteEntry>, GatewayError> {
        let key = Self::captions_key(video);
        if let Some(cached) = self.cache.get::<Vec<CachedCaptionTrack>>(&key) {
            tracing::debug!("caption listing for {video} served from cache");
            return Ok(cached
                .into_iter()
                .map(|track| RemoteEntry {
                    key: SubtitleKey::new(video.clone(), track.language),
                    remote_caption_id: CaptionId::from(track.id),
                    last_updated: track.last_updated,
                })
                .collect());
        }
        self.ledger.record(OperationKind::ListCaptions);
        let tracks = self.remote.list_caption_tracks(video)?;
        let cached: Vec<CachedCaptionTrack> = tracks
            .iter()
            .map(|entry| CachedCaptionTrack {
                id: entry.remote_caption_id.0.clone(),
                language: entry.key.language.0.clone(),
                last_updated: entry.last_updated,
            })
            .collect();
        self.cache.put(&key, &cached);
        Ok(tracks)
    }

    // -----------------------------------------------------------------------
    // Writes (always live)
    // -----------------------------------------------------------------------

    /// Create a new caption track. Never cached, never idempotent-skipped.
    pub fn upload_caption(
        &self,
        video: &VideoId,
        language: &LanguageCode,
        content: &[u8],
    ) -> Result<CaptionId, GatewayError> {
        self.ledger.record(OperationKind::Upload);
        let id = self.remote.insert_caption(video, language, content)?;
        self.cache.invalidate(&Self::captions_key(video));
        Ok(id)
    }

    /// Replace the content of an existing caption track.
    pub fn update_caption(
        &self,
        caption: &CaptionId,
        video: &VideoId,
        content: &[u8],
    ) -> Result<(), GatewayError> {
        self.ledger.record(OperationKind::Update);
        self.remote.update_caption(caption, video, content)?;
        self.cache.invalidate(&Self::captions_key(video));
        Ok(())
    }

    /// Delete a caption track. `video` names the listing to invalidate.
    pub fn delete_caption(
        &self,
        caption: &CaptionId,
        video: &VideoId,
    ) -> Result<(), GatewayError> {
        self.ledger.record(OperationKind::Delete);
        self.remote.delete_caption(caption)?;
        self.cache.invalidate(&Self::captions_key(video));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::write_record_at;
    use crate::quota::KindTotal;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// In-memory remote that counts live calls.
    #[derive(Default)]
    struct FakeRemote {
        list_caption_calls: Mutex<u32>,
        list_video_calls: Mutex<u32>,
        tracks: Mutex<Vec<RemoteEntry>>,
    }

    impl FakeRemote {
        fn with_track(video: &str, language: &str, caption: &str) -> Self {
            let remote = Self::default();
            remote.tracks.lock().unwrap().push(RemoteEntry {
                key: SubtitleKey::new(video, language),
                remote_caption_id: CaptionId::from(caption),
                last_updated: None,
            });
            remote
        }
    }

    impl RemoteApi for FakeRemote {
        fn list_videos(&self, _channel: &ChannelId) -> Result<Vec<VideoRef>, GatewayError> {
            *self.list_video_calls.lock().unwrap() += 1;
            Ok(vec![VideoRef {
                id: VideoId::from("abc123"),
                title: "A video".to_string(),
            }])
        }

        fn list_caption_tracks(&self, video: &VideoId) -> Result<Vec<RemoteEntry>, GatewayError> {
            *self.list_caption_calls.lock().unwrap() += 1;
            Ok(self
                .tracks
                .lock()
                .unwrap()
                .iter()
                .filter(|t| &t.key.video == video)
                .cloned()
                .collect())
        }

        fn insert_caption(
            &self,
            video: &VideoId,
            language: &LanguageCode,
            _content: &[u8],
        ) -> Result<CaptionId, GatewayError> {
            let id = CaptionId::from(format!("cap-{video}-{language}"));
            self.tracks.lock().unwrap().push(RemoteEntry {
                key: SubtitleKey::new(video.clone(), language.clone()),
                remote_caption_id: id.clone(),
                last_updated: None,
            });
            Ok(id)
        }

        fn update_caption(
            &self,
            _caption: &CaptionId,
            _video: &VideoId,
            _content: &[u8],
        ) -> Result<(), GatewayError> {
            Ok(())
        }

        fn delete_caption(&self, caption: &CaptionId) -> Result<(), GatewayError> {
            self.tracks
                .lock()
                .unwrap()
                .retain(|t| &t.remote_caption_id != caption);
            Ok(())
        }
    }

    fn gateway_in(dir: &TempDir) -> Gateway<FakeRemote> {
        Gateway::new(
            FakeRemote::with_track("abc123", "en", "cap-1"),
            ResponseCache::new(dir.path()),
        )
    }

    #[test]
    fn second_listing_within_window_is_free() {
        let tmp = TempDir::new().unwrap();
        let gateway = gateway_in(&tmp);
        let video = VideoId::from("abc123");

        gateway.list_caption_tracks(&video).unwrap();
        gateway.list_caption_tracks(&video).unwrap();

        assert_eq!(*gateway.remote.list_caption_calls.lock().unwrap(), 1);
        assert_eq!(
            gateway.quota_summary().by_kind[&OperationKind::ListCaptions],
            KindTotal { calls: 1, cost: 50 }
        );
    }

    #[test]
    fn expired_listing_charges_again() {
        let tmp = TempDir::new().unwrap();
        let gateway = gateway_in(&tmp);
        let video = VideoId::from("abc123");

        gateway.list_caption_tracks(&video).unwrap();
        // Age the record past the freshness window.
        write_record_at(
            &gateway.cache,
            &Gateway::<FakeRemote>::captions_key(&video),
            &Vec::<CachedCaptionTrack>::new(),
            Utc::now() - chrono::Duration::hours(2),
        );
        gateway.list_caption_tracks(&video).unwrap();

        assert_eq!(*gateway.remote.list_caption_calls.lock().unwrap(), 2);
        assert_eq!(gateway.quota_summary().total_cost(), 100);
    }

    #[test]
    fn upload_invalidates_caption_listing() {
        let tmp = TempDir::new().unwrap();
        let gateway = gateway_in(&tmp);
        let video = VideoId::from("abc123");

        let before = gateway.list_caption_tracks(&video).unwrap();
        assert_eq!(before.len(), 1);

        gateway
            .upload_caption(&video, &LanguageCode::from("fr-FR"), b"webvtt")
            .unwrap();

        // The listing must be re-fetched, not served from the stale cache.
        let after = gateway.list_caption_tracks(&video).unwrap();
        assert_eq!(after.len(), 2);
        assert_eq!(*gateway.remote.list_caption_calls.lock().unwrap(), 2);
    }

    #[test]
    fn delete_invalidates_and_charges() {
        let tmp = TempDir::new().unwrap();
        let gateway = gateway_in(&tmp);
        let video = VideoId::from("abc123");

        gateway.list_caption_tracks(&video).unwrap();
        gateway
            .delete_caption(&CaptionId::from("cap-1"), &video)
            .unwrap();
        let after = gateway.list_caption_tracks(&video).unwrap();

        assert!(after.is_empty());
        let summary = gateway.quota_summary();
        assert_eq!(summary.by_kind[&OperationKind::Delete].cost, 50);
        assert_eq!(summary.by_kind[&OperationKind::ListCaptions].calls, 2);
    }

    #[test]
    fn video_listing_is_cached_per_channel() {
        let tmp = TempDir::new().unwrap();
        let gateway = gateway_in(&tmp);
        let channel = ChannelId::from("UCxyz");

        gateway.list_videos(&channel).unwrap();
        gateway.list_videos(&channel).unwrap();

        assert_eq!(*gateway.remote.list_video_calls.lock().unwrap(), 1);
        assert_eq!(
            gateway.quota_summary().by_kind[&OperationKind::ListVideos],
            KindTotal { calls: 1, cost: 1 }
        );
    }

    #[test]
    fn round_trip_preserves_normalized_language_keys() {
        let tmp = TempDir::new().unwrap();
        let gateway = Gateway::new(
            FakeRemote::with_track("abc123", "pt-BR", "cap-9"),
            ResponseCache::new(tmp.path()),
        );
        let video = VideoId::from("abc123");

        let live = gateway.list_caption_tracks(&video).unwrap();
        let cached = gateway.list_caption_tracks(&video).unwrap();
        assert_eq!(live, cached);
        assert_eq!(cached[0].key.language.0, "pt-BR");
    }
}
