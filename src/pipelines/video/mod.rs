// SPDX-License-Identifier: MPL-2.0

//! Video clip recording
//!
//! This module provides the recording state machine that:
//! - Starts a platform recorder against the live session
//! - Buffers data fragments in delivery order
//! - Assembles one playable clip once the recorder reports completion
//! - Releases the clip's object URL when it is discarded

pub mod recorder;

pub use recorder::{Clip, RecorderPhase, RecordingController};
