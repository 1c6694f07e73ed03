// SPDX-License-Identifier: MPL-2.0

//! Preview surface binding

use super::ObjectUrl;
use tracing::debug;

/// What the preview surface is currently showing
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PreviewSource {
    /// Nothing bound
    #[default]
    Empty,
    /// Live stream of the current session
    Live { stream_id: String },
    /// Playback of a finalized clip
    Playback { url: ObjectUrl },
}

/// The widget's video element
#[derive(Debug, Clone)]
pub struct PreviewSurface {
    pub width: u32,
    pub height: u32,
    /// Muted unless audio is enabled
    pub muted: bool,
    source: PreviewSource,
}

impl PreviewSurface {
    pub fn new(width: u32, height: u32, enable_audio: bool) -> Self {
        Self {
            width,
            height,
            muted: !enable_audio,
            source: PreviewSource::Empty,
        }
    }

    pub fn source(&self) -> &PreviewSource {
        &self.source
    }

    pub fn bind_live(&mut self, stream_id: &str) {
        debug!(stream = %stream_id, "Binding live stream to preview");
        self.source = PreviewSource::Live {
            stream_id: stream_id.to_string(),
        };
    }

    pub fn bind_playback(&mut self, url: &ObjectUrl) {
        debug!(url = %url, "Binding playback to preview");
        self.source = PreviewSource::Playback { url: url.clone() };
    }

    pub fn clear(&mut self) {
        self.source = PreviewSource::Empty;
    }

    pub fn is_live(&self) -> bool {
        matches!(self.source, PreviewSource::Live { .. })
    }

    pub fn is_playback(&self) -> bool {
        matches!(self.source, PreviewSource::Playback { .. })
    }
}
