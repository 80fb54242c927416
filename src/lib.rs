//! # Medias Picker
//!
//! The native half of a media-picking plugin. A host application calls in
//! over a method channel to pick images and videos, to shrink images to a
//! bounding box before upload, to reclaim the temp files that shrinking
//! leaves behind, and to check or request storage and camera permissions.
//!
//! # Architecture
//!
//! ```text
//! host ──MethodCall──▶ plugin ──▶ imaging ──▶ workdir (new artifact)
//!                        │
//!                        ├──▶ picker      (async, replies on callback)
//!                        └──▶ permission  (sync check / async prompt)
//! ```
//!
//! Everything platform-specific (the picker UI, the permission prompt, the
//! transport) sits behind a trait. The crate ships a preset implementation of
//! each so the whole dispatch path runs headless, in tests and from the CLI.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`bridge`] | Method names, typed arguments, the [`bridge::Responder`] reply handle |
//! | [`plugin`] | Dispatch and per-request tracking of asynchronous replies |
//! | [`imaging`] | Bounded resize with EXIF orientation, pure Rust |
//! | [`workdir`] | The artifact directory: unique names, bulk removal |
//! | [`picker`] | Picker seam and the preset picker |
//! | [`permission`] | Permission seam, the gate over it, and static permissions |
//! | [`config`] | `config.toml` loading, validation and merging over stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Fall Back, Don't Fail
//!
//! Compressing an image is an optimization. If it cannot be done (unreadable
//! file, no pixels, decode too large, no space for the artifact) the caller
//! gets the original path back and a warning is logged. The typed
//! [`imaging::normalize`] still reports the reason for callers that want it;
//! [`imaging::normalize_or_original`] is what the bridge uses.
//!
//! ## Sources Are Never Touched
//!
//! Every successful compression writes a fresh, uniquely named file in the
//! [`workdir::WorkDir`]. Nothing under it is reused or overwritten, and the
//! only way files leave it is `deleteAllTempFiles`.
//!
//! ## One Id Per Pending Request
//!
//! Picks and permission prompts reply from a later platform callback. Each is
//! parked under its own [`bridge::RequestId`], so overlapping requests cannot
//! steal each other's reply.

pub mod bridge;
pub mod config;
pub mod imaging;
pub mod output;
pub mod permission;
pub mod picker;
pub mod plugin;
pub mod workdir;

#[cfg(test)]
pub(crate) mod test_helpers;
