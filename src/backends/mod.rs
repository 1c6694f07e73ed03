// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for camera capture and recording
//!
//! The widget never talks to a concrete platform. Everything it needs from
//! one (acquisition, recording, frame snapshots) goes through the traits in
//! [`camera`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                Widget Layer                  │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                   │
//! │  ┌──────────────────────────────────────┐   │
//! │  │ Camera (CaptureBackend, MediaRecorder)│   │
//! │  └──────────────────────────────────────┘   │
//! │  ┌──────────────────────────────────────┐   │
//! │  │ Virtual Camera (synthetic frames)     │   │
//! │  └──────────────────────────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`camera`]: Backend traits, stream types and the session manager
//! - [`virtual_camera`]: Deterministic in-process implementation

pub mod camera;
pub mod virtual_camera;
