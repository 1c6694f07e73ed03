// SPDX-License-Identifier: MPL-2.0

//! Capture pipelines for photos and video clips
//!
//! # Pipeline Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Camera Frame │ ──▶ │  Photo Pipeline   │ ──▶ │  PNG data:   │
//! │   (RGBA)     │     │  - Draw to canvas │     │     URL      │
//! │              │     │  - PNG encoding   │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//!
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Live stream  │ ──▶ │ Recording control │ ──▶ │  Blob + URL  │
//! │              │     │  - Fragment buffer│     │              │
//! │              │     │  - Finalization   │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`photo`]: Frame snapshot and PNG encoding
//! - [`video`]: Recording state machine and clip assembly

pub mod photo;
pub mod video;
