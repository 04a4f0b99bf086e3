// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Status notifications from the core toward the UI layer.
//!
//! Every command on the session surface emits a `StatusEvent` on
//! completion or failure. Events carry the short user-visible messages;
//! none of them is an invitation to retry automatically.

use std::fmt;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Status notification surfaced to the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    /// Idle and ready for the next command
    Ready,
    /// A unit started playing
    Playing { source: String },
    /// A practice run completed all stages
    Done,
    /// A practice run observed cancellation
    Stopped,
    /// A practice run aborted on a playback failure
    RunFailed { message: String },
    /// The set runner switched the active verse
    VerseChanged { index: usize, title: String },
    /// One verse of a practice set failed; the set continues
    VerseFailed { index: usize, message: String },
    /// A practice set was applied
    SetApplied { count: usize },
    /// The practice set was cleared
    SetCleared,
    /// The selector text did not parse; the previous set is unchanged
    SetInvalid { message: String },
    /// A tapped segment has no audio
    AudioMissing { segment: String },
    /// Recording began for the resolved segment key
    RecordingStarted { key: String },
    /// A take was finalized and stored
    TakeSaved { key: String },
    /// A stored take was deleted
    TakeCleared { key: String },
    /// No take exists for the resolved segment key
    NoTake { key: String },
    /// No reference audio exists for the resolved segment key
    NoReference { key: String },
    /// Microphone access could not be granted
    MicUnavailable { message: String },
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::Ready => write!(f, "Ready."),
            StatusEvent::Playing { source } => write!(f, "Playing: {}", source),
            StatusEvent::Done => write!(f, "Done."),
            StatusEvent::Stopped => write!(f, "Stopped."),
            StatusEvent::RunFailed { message } => {
                write!(f, "Could not play audio. ({})", message)
            }
            StatusEvent::VerseChanged { index, title } => {
                write!(f, "Verse {}: {}", index + 1, title)
            }
            StatusEvent::VerseFailed { index, message } => {
                write!(f, "Verse {} failed, continuing. ({})", index + 1, message)
            }
            StatusEvent::SetApplied { count } => {
                write!(f, "Practice set applied: {} verses.", count)
            }
            StatusEvent::SetCleared => write!(f, "Practice set cleared."),
            StatusEvent::SetInvalid { message } => write!(f, "Bad set selector: {}", message),
            StatusEvent::AudioMissing { segment } => {
                write!(f, "Audio missing for {}.", segment)
            }
            StatusEvent::RecordingStarted { key } => write!(f, "Recording {}…", key),
            StatusEvent::TakeSaved { key } => write!(f, "Take saved: {}", key),
            StatusEvent::TakeCleared { key } => write!(f, "Take cleared: {}", key),
            StatusEvent::NoTake { key } => {
                write!(f, "No take recorded for {} yet.", key)
            }
            StatusEvent::NoReference { key } => {
                write!(f, "No reference audio for {}.", key)
            }
            StatusEvent::MicUnavailable { message } => {
                write!(f, "Microphone unavailable. ({})", message)
            }
        }
    }
}

/// Cloneable sender half of the status channel.
///
/// Emitting never blocks and never fails; events sent after the receiver
/// is gone are dropped.
#[derive(Debug, Clone)]
pub struct StatusSink {
    tx: UnboundedSender<StatusEvent>,
}

impl StatusSink {
    /// Create a sink together with its receiving end
    pub fn channel() -> (Self, UnboundedReceiver<StatusEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Sink with no receiver, for callers that only want the logs
    pub fn disconnected() -> Self {
        let (sink, _rx) = Self::channel();
        sink
    }

    /// Emit a status event
    pub fn emit(&self, event: StatusEvent) {
        debug!(status = %event, "status");
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_and_receive() {
        let (sink, mut rx) = StatusSink::channel();
        sink.emit(StatusEvent::Ready);
        sink.emit(StatusEvent::Done);

        assert_eq!(rx.try_recv().unwrap(), StatusEvent::Ready);
        assert_eq!(rx.try_recv().unwrap(), StatusEvent::Done);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_disconnected_sink_is_silent() {
        let sink = StatusSink::disconnected();
        sink.emit(StatusEvent::Stopped); // must not panic
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(StatusEvent::Ready.to_string(), "Ready.");
        assert_eq!(StatusEvent::Stopped.to_string(), "Stopped.");
        assert_eq!(
            StatusEvent::VerseChanged {
                index: 2,
                title: "Verse 3".to_string()
            }
            .to_string(),
            "Verse 3: Verse 3"
        );
        assert_eq!(
            StatusEvent::AudioMissing {
                segment: "p2".to_string()
            }
            .to_string(),
            "Audio missing for p2."
        );
    }
}
