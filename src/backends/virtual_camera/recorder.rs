// SPDX-License-Identifier: GPL-3.0-only

//! Virtual media recorder
//!
//! Events come from two sources: a [`RecorderFeed`] that tests (or the CLI)
//! push fragments into, and an optional timer that encodes the current
//! test-pattern frame as a JPEG fragment every timeslice.

use super::Shared;
use crate::backends::camera::types::{
    BackendError, BackendResult, MediaStream, RecorderEvent, RecorderEvents,
};
use crate::backends::camera::MediaRecorder;
use crate::constants::virtual_camera::FRAGMENT_JPEG_QUALITY;
use crate::media::Fragment;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Handle for injecting recorder events
///
/// Does not keep the channel open: once the recorder is dropped its event
/// stream ends and sends return false.
#[derive(Debug, Clone)]
pub struct RecorderFeed {
    sender: mpsc::WeakUnboundedSender<RecorderEvent>,
    mime_type: String,
}

impl RecorderFeed {
    /// Deliver a data fragment (empty fragments are delivered too)
    pub fn push(&self, data: impl Into<Vec<u8>>) -> bool {
        let fragment = Fragment::new(data.into(), self.mime_type.clone());
        self.send(RecorderEvent::DataAvailable(fragment))
    }

    /// Deliver a raw event
    pub fn send(&self, event: RecorderEvent) -> bool {
        self.sender
            .upgrade()
            .is_some_and(|sender| sender.send(event).is_ok())
    }
}

/// Recorder bound to one virtual stream
pub struct VirtualRecorder {
    shared: Shared,
    stream: MediaStream,
    sender: mpsc::UnboundedSender<RecorderEvent>,
    receiver: Option<mpsc::UnboundedReceiver<RecorderEvent>>,
    mime_type: String,
    timeslice: Option<Duration>,
    complete_on_stop: bool,
    stopped: bool,
}

impl VirtualRecorder {
    pub(super) fn new(
        shared: Shared,
        stream: MediaStream,
        mime_type: String,
        timeslice: Option<Duration>,
        complete_on_stop: bool,
    ) -> (Self, RecorderFeed) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let feed = RecorderFeed {
            sender: sender.downgrade(),
            mime_type: mime_type.clone(),
        };
        let recorder = Self {
            shared,
            stream,
            sender,
            receiver: Some(receiver),
            mime_type,
            timeslice,
            complete_on_stop,
            stopped: false,
        };
        (recorder, feed)
    }
}

impl MediaRecorder for VirtualRecorder {
    fn start(&mut self) -> BackendResult<RecorderEvents> {
        let Some(mut receiver) = self.receiver.take() else {
            return Err(BackendError::RecordingInProgress);
        };

        debug!(stream = %self.stream.id, timeslice = ?self.timeslice, "Virtual recorder started");

        let shared = self.shared.clone();
        let stream = self.stream.clone();
        let mime_type = self.mime_type.clone();
        let timeslice = self.timeslice;

        let events = async_stream::stream! {
            let mut ticker = timeslice.map(|period| {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                interval
            });

            loop {
                let event = match ticker.as_mut() {
                    Some(ticker) => tokio::select! {
                        biased;
                        event = receiver.recv() => event,
                        _ = ticker.tick() => {
                            match encode_fragment(&shared, &stream, &mime_type) {
                                Some(fragment) => Some(RecorderEvent::DataAvailable(fragment)),
                                None => continue,
                            }
                        }
                    },
                    None => receiver.recv().await,
                };

                let Some(event) = event else {
                    break;
                };
                let last = matches!(event, RecorderEvent::Stopped | RecorderEvent::Error(_));
                yield event;
                if last {
                    break;
                }
            }
        };

        Ok(Box::pin(events))
    }

    fn stop(&mut self) -> BackendResult<()> {
        if self.receiver.is_some() || self.stopped {
            return Err(BackendError::NoRecordingInProgress);
        }
        self.stopped = true;

        if self.complete_on_stop {
            let _ = self.sender.send(RecorderEvent::Stopped);
        } else {
            warn!(stream = %self.stream.id, "Virtual recorder configured to never complete");
        }
        Ok(())
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

fn encode_fragment(shared: &Shared, stream: &MediaStream, mime_type: &str) -> Option<Fragment> {
    let frame = super::next_frame(shared, stream)?;
    let rgb: Vec<u8> = frame
        .to_rgba()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();

    let mut jpeg = Vec::new();
    {
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, FRAGMENT_JPEG_QUALITY);
        if let Err(e) =
            encoder.encode(&rgb, frame.width, frame.height, image::ExtendedColorType::Rgb8)
        {
            warn!(error = %e, "Failed to encode virtual recorder fragment");
            return None;
        }
    }

    Some(Fragment::new(jpeg, mime_type))
}
