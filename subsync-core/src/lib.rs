//! Subsync core library — domain types, filename parsing, manifest store.
//!
//! Public API surface:
//! - [`types`] — newtypes and domain structs
//! - [`filename`] — `VIDEOID_LANGUAGE.<ext>` parsing
//! - [`lang`] — language-code normalization
//! - [`manifest`] — load / save / create of `subtitles.json`
//! - [`error`] — [`ManifestError`]

pub mod error;
pub mod filename;
pub mod lang;
pub mod manifest;
pub mod types;

pub use error::ManifestError;
pub use types::{
    CaptionId, ChannelId, LanguageCode, LocalEntry, Manifest, ManifestEntry, RemoteEntry,
    SubtitleKey, VideoId, VideoRef,
};
