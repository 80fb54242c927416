//! The native media picker seam.
//!
//! The picker UI is an external collaborator: [`MediaPicker::launch`] starts a
//! selection and returns immediately; the selected paths come back later
//! through [`on_picker_result`] tagged with the same [`RequestId`].
//!
//! [`on_picker_result`]: crate::plugin::MediaPickerPlugin::on_picker_result

use crate::bridge::RequestId;
use std::path::Path;
use std::sync::Mutex;

/// Extensions treated as video when sorting a selection.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "m4v", "mov", "3gp", "3g2", "mkv", "webm", "avi"];

/// What the picker should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickRequest {
    /// `None` lets the picker use its own limit.
    pub max_count: Option<u32>,
    pub images: bool,
    pub videos: bool,
}

impl PickRequest {
    /// Images, plus videos when `with_video`. Non-positive quantities mean no limit.
    pub fn images(quantity: i64, with_video: bool) -> Self {
        Self {
            max_count: max_count(quantity),
            images: true,
            videos: with_video,
        }
    }

    pub fn videos(quantity: i64) -> Self {
        Self {
            max_count: max_count(quantity),
            images: false,
            videos: true,
        }
    }

    /// Whether a selected path is of a kind this request offers.
    pub fn accepts(&self, path: &str) -> bool {
        if is_video_path(path) {
            self.videos
        } else {
            self.images
        }
    }
}

fn max_count(quantity: i64) -> Option<u32> {
    (quantity > 0).then(|| u32::try_from(quantity).unwrap_or(u32::MAX))
}

/// Classify a path by extension. Anything not recognised as video counts as an image.
pub fn is_video_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| VIDEO_EXTENSIONS.iter().any(|v| v.eq_ignore_ascii_case(ext)))
}

pub trait MediaPicker {
    fn launch(&self, id: RequestId, request: &PickRequest);
}

/// Picker that "selects" a preset list of paths.
///
/// Launches are recorded; the host drains them with
/// [`PresetPicker::take_launched`] and delivers [`PresetPicker::selection_for`]
/// back to the plugin.
#[derive(Debug, Default)]
pub struct PresetPicker {
    selection: Vec<String>,
    launched: Mutex<Vec<(RequestId, PickRequest)>>,
}

impl PresetPicker {
    pub fn new(selection: Vec<String>) -> Self {
        Self {
            selection,
            launched: Mutex::new(Vec::new()),
        }
    }

    /// Drain the launches seen so far.
    pub fn take_launched(&self) -> Vec<(RequestId, PickRequest)> {
        std::mem::take(&mut *self.launched.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// The preset paths this request would have let the user pick, in order,
    /// capped at its max count.
    pub fn selection_for(&self, request: &PickRequest) -> Vec<String> {
        let limit = request.max_count.map_or(usize::MAX, |n| n as usize);
        self.selection
            .iter()
            .filter(|p| request.accepts(p))
            .take(limit)
            .cloned()
            .collect()
    }
}

impl MediaPicker for PresetPicker {
    fn launch(&self, id: RequestId, request: &PickRequest) {
        self.launched
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, *request));
    }
}
