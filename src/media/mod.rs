// SPDX-License-Identifier: MPL-2.0

//! In-memory media objects produced and consumed by the widget
//!
//! # Blobs and object URLs
//!
//! Recorder fragments are concatenated into a [`Blob`] once a recording is
//! finalized. Blobs are exposed to the view through opaque [`ObjectUrl`]s
//! handed out by the [`ObjectUrlRegistry`]. Every URL must be revoked when the
//! artifact it names is superseded or deleted; the registry's live count is
//! what the leak tests assert on.
//!
//! # Preview surface
//!
//! The [`PreviewSurface`] is the single video element of the widget. It shows
//! either the live stream of the current session or the playback of a clip.
//!
//! # Modules
//!
//! - [`blob`]: Fragments, blobs and the object URL registry
//! - [`preview`]: Preview surface binding

pub mod blob;
pub mod preview;

pub use blob::{Blob, Fragment, ObjectUrl, ObjectUrlRegistry};
pub use preview::{PreviewSource, PreviewSurface};
