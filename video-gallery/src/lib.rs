//! # Video Gallery
//!
//! A reusable video gallery library with size-gated uploads and live
//! snapshot delivery.
//!
//! This crate provides the client-side upload admission pipeline and the
//! gallery projection behind it:
//! - Size probing for local and remote media (filesystem stat / HTTP HEAD)
//! - A pure admission policy with human-readable rejection reasons
//! - Simulated progress for indeterminate-duration work
//! - An upload coordinator owning the select → check → commit lifecycle
//! - SQLite-backed record storage with live ordered snapshots
//!
//! ## Platform Separation
//!
//! This crate focuses on cross-platform gallery logic. The Android JNI
//! picker and share integrations are target-gated; other platforms get
//! stub implementations that report `PlatformNotSupported`.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use video_gallery::{
//!     MediaSizeProbe, SqliteMediaStore, SystemMediaPicker, UploadCoordinator,
//! };
//!
//! let store = SqliteMediaStore::open("/path/to/gallery.db")?;
//! let coordinator = UploadCoordinator::new(
//!     SystemMediaPicker::default(),
//!     MediaSizeProbe::new(),
//!     store,
//! );
//! ```

pub mod admission;
pub mod coordinator;
pub mod models;
pub mod picker;
pub mod probe;
pub mod progress;
pub mod schema;
pub mod share;
pub mod store;

pub use admission::{format_file_size, AdmissionPolicy, DEFAULT_MAX_UPLOAD_BYTES};
pub use coordinator::{
    CommitOutcome, SelectOutcome, UploadCoordinator, UploadState, PICKER_FAILED_MESSAGE,
    SETTLE_DELAY, SIZE_UNAVAILABLE_MESSAGE, UPLOAD_FAILED_MESSAGE,
};
pub use models::{AdmissionDecision, MediaRecord, StagedSelection};
pub use picker::{
    AndroidPickerConfig, MediaPicker, MediaQuality, MediaType, PickedAsset, PickerError,
    PickerOptions, PickerResponse, SystemMediaPicker,
};
pub use probe::{MediaSizeProbe, ProbeError, SizeProbe};
pub use progress::{ProgressHandle, ProgressSimulator};
pub use schema::init_gallery_schema;
pub use share::{share_media, ShareError, ShareRequest};
pub use store::{GalleryStore, MediaStore, SqliteMediaStore, StoreError, Subscription};
