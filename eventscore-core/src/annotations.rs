//! Ground-truth and detection records built from SubRip entries.
//!
//! Ground-truth labels follow the annotation convention
//! `eventName1 [eventName2...][: comment]`, for example:
//!
//! ```text
//! intrusion
//! intrusion: this is a normal intrusion with a dummy comment
//! intrusion ambiguous
//! foobar: this is not an intrusion
//! ```
//!
//! Detection labels are free text; the detector writes a JSON document whose
//! `external.files.globalImage` entry names a snapshot of the event.

use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::{EventAnchor, MatchingPolicy};
use crate::matcher::MatchWindow;
use crate::subrip::{self, Subtitle};
use crate::time::Timestamp;

/// Identifier of a truth (subtitle number) or an event (begin in ms).
pub type IntervalId = i64;

/// Directory, relative to a run's analysis directory, holding event snapshots.
pub const EVENT_IMAGE_DIR: &str = "../events_img";

/// Decides from a label whether an annotation is the evaluated event class
/// and whether it is ambiguous. Matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFilter {
    event_name: String,
    ambiguous_name: String,
}

impl LabelFilter {
    pub fn new(event_name: &str, ambiguous_name: &str) -> Self {
        Self {
            event_name: event_name.to_lowercase(),
            ambiguous_name: ambiguous_name.to_lowercase(),
        }
    }

    /// Only the event names before the first `:` are considered.
    pub fn is_valid(&self, text: &str) -> bool {
        let names = text.split(':').next().unwrap_or_default();
        names.to_lowercase().contains(&self.event_name)
    }

    pub fn is_ambiguous(&self, text: &str) -> bool {
        !self.ambiguous_name.is_empty() && text.to_lowercase().contains(&self.ambiguous_name)
    }
}

/// A ground-truth interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Truth {
    pub id: IntervalId,
    pub begin: Timestamp,
    pub end: Timestamp,
    /// Matching window derived at load time. When absent the matcher derives
    /// it from its own policy.
    pub window: Option<MatchWindow>,
    pub is_valid: bool,
    pub is_ambiguous: bool,
    pub text: String,
}

impl Truth {
    /// A valid, non-ambiguous truth without a precomputed window.
    pub fn new(id: IntervalId, begin: Timestamp, end: Timestamp) -> Self {
        Self {
            id,
            begin,
            end,
            window: None,
            is_valid: true,
            is_ambiguous: false,
            text: String::new(),
        }
    }

    #[must_use]
    pub fn ambiguous(mut self) -> Self {
        self.is_ambiguous = true;
        self
    }

    #[must_use]
    pub fn with_window(mut self, policy: &MatchingPolicy) -> Self {
        self.window = Some(MatchWindow::derive(self.begin, self.end, policy));
        self
    }
}

/// A detection reported by the analysed pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: IntervalId,
    pub begin: Timestamp,
    pub end: Timestamp,
    /// Snapshot of the detection, not used for matching.
    pub image_ref: Option<String>,
}

impl Event {
    /// An event whose id is its begin time, as the loaders assign it.
    pub fn new(begin: Timestamp, end: Timestamp) -> Self {
        Self {
            id: begin.as_millis(),
            begin,
            end,
            image_ref: None,
        }
    }

    /// The single instant compared against truth windows.
    pub fn representative_time(&self, anchor: EventAnchor) -> Timestamp {
        match anchor {
            EventAnchor::Begin => self.begin,
            EventAnchor::Midpoint => self.begin.midpoint(self.end),
        }
    }
}

/// Keeps the entries of the evaluated class and derives their windows.
pub fn truths_from_subtitles(
    subtitles: &[Subtitle],
    filter: &LabelFilter,
    policy: &MatchingPolicy,
) -> Vec<Truth> {
    subtitles
        .iter()
        .filter(|entry| filter.is_valid(&entry.text))
        .map(|entry| Truth {
            id: i64::from(entry.number),
            begin: entry.begin,
            end: entry.end,
            window: Some(MatchWindow::derive(entry.begin, entry.end, policy)),
            is_valid: true,
            is_ambiguous: filter.is_ambiguous(&entry.text),
            text: entry.text.trim().to_string(),
        })
        .collect()
}

/// Converts detector entries, shifting them by `start_offset`.
pub fn events_from_subtitles(subtitles: &[Subtitle], start_offset: Timestamp) -> Vec<Event> {
    subtitles
        .iter()
        .map(|entry| {
            let begin = entry.begin - start_offset;
            let end = entry.end - start_offset;
            let image_ref = image_ref_from_label(&entry.text);
            if image_ref.is_none() {
                debug!("Cannot find image for event at {begin}");
            }
            Event {
                id: begin.as_millis(),
                begin,
                end,
                image_ref,
            }
        })
        .collect()
}

/// Extracts `external.files.globalImage` from a JSON detection label.
pub fn image_ref_from_label(text: &str) -> Option<String> {
    let detail: serde_json::Value = serde_json::from_str(text).ok()?;
    let image = detail
        .pointer("/external/files/globalImage")?
        .as_str()?;
    let file_name = Path::new(image).file_name()?.to_string_lossy();
    Some(format!("{EVENT_IMAGE_DIR}/{file_name}"))
}

/// Reads the ground truth. Unreadable or malformed files yield no truths.
pub fn load_truths(path: &Path, filter: &LabelFilter, policy: &MatchingPolicy) -> Vec<Truth> {
    match subrip::read_file(path) {
        Ok(subtitles) => truths_from_subtitles(&subtitles, filter, policy),
        Err(e) => {
            warn!("Ignoring ground truth {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Reads the detections. Unreadable or malformed files yield no events.
pub fn load_events(path: &Path, start_offset: Timestamp) -> Vec<Event> {
    match subrip::read_file(path) {
        Ok(subtitles) => events_from_subtitles(&subtitles, start_offset),
        Err(e) => {
            warn!("Ignoring events {}: {}", path.display(), e);
            Vec::new()
        }
    }
}
