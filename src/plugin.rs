//! Method dispatch and asynchronous request tracking.
//!
//! [`MediaPickerPlugin`] owns the collaborators (image backend, picker,
//! permission provider) and the [`WorkDir`]. Synchronous methods reply before
//! `on_method_call` returns. `pickImages`, `pickVideos` and
//! `requestPermission` instead park their responder under a fresh
//! [`RequestId`] and reply when the platform callback carrying that id
//! arrives. Any number of such requests may be in flight at once.
//!
//! ```text
//! host ──call──▶ on_method_call ──launch(id)──▶ picker UI
//!                     │ park responder[id]            │
//!                     ▼                               ▼
//!              Some(id) returned        on_picker_result(id, paths)
//!                                                     │
//!                                   responder[id].success(paths) ──▶ host
//! ```

use crate::bridge::{
    CHANNEL_NAME, CompressImagesArgs, Method, MethodCall, PickImagesArgs, PickVideosArgs,
    RequestId, Responder,
};
use crate::config::PluginConfig;
use crate::imaging::{
    CompressionRequest, ImageBackend, NormalizeOptions, compress_all, normalize_or_original,
};
use crate::permission::{Grant, PermissionGate, PermissionProvider, outcome};
use crate::picker::{MediaPicker, PickRequest, is_video_path};
use crate::workdir::WorkDir;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Constraints a `pickImages` call carries for compress-on-delivery.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PickConstraints {
    max_width: u32,
    max_height: u32,
    quality: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PendingKind {
    Pick(Option<PickConstraints>),
    Permission,
}

struct PendingRequest {
    kind: PendingKind,
    responder: Box<dyn Responder>,
}

pub struct MediaPickerPlugin<B, P, Q> {
    backend: B,
    picker: P,
    permissions: PermissionGate<Q>,
    work_dir: WorkDir,
    options: NormalizeOptions,
    compress_picked: bool,
    pending: HashMap<RequestId, PendingRequest>,
    next_id: u64,
}

impl<B, P, Q> MediaPickerPlugin<B, P, Q>
where
    B: ImageBackend,
    P: MediaPicker,
    Q: PermissionProvider,
{
    pub fn new(backend: B, picker: P, permissions: Q, work_dir: WorkDir) -> Self {
        Self {
            backend,
            picker,
            permissions: PermissionGate::new(permissions),
            work_dir,
            options: NormalizeOptions::default(),
            compress_picked: false,
            pending: HashMap::new(),
            next_id: 0,
        }
    }

    /// Build a plugin whose work directory and normalizer knobs come from
    /// `config`.
    pub fn from_config(backend: B, picker: P, permissions: Q, config: &PluginConfig) -> Self {
        let mut plugin = Self::new(backend, picker, permissions, config.work_dir());
        plugin.options = config.normalize_options();
        plugin.compress_picked = config.compression.compress_picked;
        plugin
    }

    pub fn work_dir(&self) -> &WorkDir {
        &self.work_dir
    }

    pub fn picker(&self) -> &P {
        &self.picker
    }

    pub fn permissions(&self) -> &Q {
        self.permissions.provider()
    }

    /// Number of asynchronous requests still waiting for their callback.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Handle one call. Returns the request id when the reply is deferred to
    /// a platform callback.
    pub fn on_method_call(
        &mut self,
        call: &MethodCall,
        responder: Box<dyn Responder>,
    ) -> Option<RequestId> {
        debug!(channel = CHANNEL_NAME, method = %call.method, "method call");
        let Some(method) = Method::from_name(&call.method) else {
            debug!(method = %call.method, "not implemented");
            responder.not_implemented();
            return None;
        };

        match method {
            Method::PickImages => {
                let (args, responder): (PickImagesArgs, _) = decode_or_reply(call, responder)?;
                let request = PickRequest::images(args.quantity, args.with_video);
                let constraints = PickConstraints {
                    max_width: args.max_width,
                    max_height: args.max_height,
                    quality: args.quality,
                };
                let id = self.park(PendingKind::Pick(Some(constraints)), responder);
                self.picker.launch(id, &request);
                Some(id)
            }
            Method::PickVideos => {
                let (args, responder): (PickVideosArgs, _) = decode_or_reply(call, responder)?;
                let request = PickRequest::videos(args.quantity);
                let id = self.park(PendingKind::Pick(None), responder);
                self.picker.launch(id, &request);
                Some(id)
            }
            Method::CompressImages => {
                let (args, responder): (CompressImagesArgs, _) = decode_or_reply(call, responder)?;
                let paths = compress_all(
                    &self.backend,
                    &self.work_dir,
                    &args.img_paths,
                    (args.max_width, args.max_height),
                    args.quality,
                    &self.options,
                );
                responder.success(json!(paths));
                None
            }
            Method::DeleteAllTempFiles => {
                responder.success(json!(self.work_dir.clear()));
                None
            }
            Method::CheckPermission => {
                responder.success(json!(self.permissions.check_granted()));
                None
            }
            Method::RequestPermission => {
                let id = self.park(PendingKind::Permission, responder);
                self.permissions.request_grant(id);
                Some(id)
            }
        }
    }

    /// Deliver a picker outcome. `None` means the picker returned no payload
    /// (cancelled), which resolves to an empty list.
    ///
    /// Returns `false` if `id` is not a pending pick.
    pub fn on_picker_result(&mut self, id: RequestId, paths: Option<Vec<String>>) -> bool {
        let Some(PendingKind::Pick(constraints)) = self.pending.get(&id).map(|p| p.kind) else {
            warn!(%id, "picker result for unknown request");
            return false;
        };
        let Some(pending) = self.pending.remove(&id) else {
            return false;
        };

        let mut paths = paths.unwrap_or_default();
        if let (true, Some(c)) = (self.compress_picked, constraints) {
            paths = self.compress_picked_images(paths, c);
        }
        pending.responder.success(json!(paths));
        true
    }

    /// Deliver a permission prompt outcome, one grant per requested
    /// capability.
    ///
    /// Returns `false` if `id` is not a pending permission request.
    pub fn on_permissions_result(&mut self, id: RequestId, grants: &[Grant]) -> bool {
        if !matches!(self.pending.get(&id).map(|p| p.kind), Some(PendingKind::Permission)) {
            warn!(%id, "permission result for unknown request");
            return false;
        }
        let Some(pending) = self.pending.remove(&id) else {
            return false;
        };

        pending.responder.success(json!(outcome(grants)));
        true
    }

    fn park(&mut self, kind: PendingKind, responder: Box<dyn Responder>) -> RequestId {
        self.next_id += 1;
        let id = RequestId(self.next_id);
        self.pending.insert(id, PendingRequest { kind, responder });
        id
    }

    fn compress_picked_images(&self, paths: Vec<String>, c: PickConstraints) -> Vec<String> {
        paths
            .into_iter()
            .map(|path| {
                if is_video_path(&path) {
                    return path;
                }
                let request = CompressionRequest::new(&path, c.max_width, c.max_height, c.quality);
                normalize_or_original(&self.backend, &self.work_dir, &request, &self.options)
                    .to_string_lossy()
                    .into_owned()
            })
            .filter(|path| !path.is_empty())
            .collect()
    }
}

/// Decode arguments, or fail the call through `responder`.
///
/// The responder is handed back on success; on failure it has been consumed
/// by the error reply.
fn decode_or_reply<T: DeserializeOwned>(
    call: &MethodCall,
    responder: Box<dyn Responder>,
) -> Option<(T, Box<dyn Responder>)> {
    match call.args() {
        Ok(args) => Some((args, responder)),
        Err(e) => {
            warn!("{e}");
            responder.error(e.code(), &e.to_string(), Some(json!({"method": call.method})));
            None
        }
    }
}
