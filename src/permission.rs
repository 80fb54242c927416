//! Storage and camera permission gate.
//!
//! The platform permission API is an external collaborator behind
//! [`PermissionProvider`]: it answers "is this capability granted right now"
//! and can be asked to prompt. Prompt outcomes arrive later, one [`Grant`]
//! per requested capability, through [`on_permissions_result`].
//!
//! [`on_permissions_result`]: crate::plugin::MediaPickerPlugin::on_permissions_result

use crate::bridge::RequestId;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    StorageWrite,
    Camera,
}

/// Everything the plugin needs before it can pick and write media.
pub const REQUIRED_CAPABILITIES: [Capability; 2] = [Capability::StorageWrite, Capability::Camera];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    Granted,
    Denied,
}

pub trait PermissionProvider {
    fn is_granted(&self, capability: Capability) -> bool;

    /// Ask the platform to prompt. The answer is delivered asynchronously,
    /// tagged with `id`.
    fn request(&self, id: RequestId, capabilities: &[Capability]);
}

/// Gate over a provider for the fixed capability set.
pub struct PermissionGate<P> {
    provider: P,
}

impl<P: PermissionProvider> PermissionGate<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// True only if every required capability is granted.
    pub fn check_granted(&self) -> bool {
        REQUIRED_CAPABILITIES
            .iter()
            .all(|&c| self.provider.is_granted(c))
    }

    pub fn request_grant(&self, id: RequestId) {
        self.provider.request(id, &REQUIRED_CAPABILITIES);
    }
}

/// Collapse a prompt outcome. An empty list means the prompt was dismissed.
pub fn outcome(grants: &[Grant]) -> bool {
    !grants.is_empty() && grants.iter().all(|&g| g == Grant::Granted)
}

/// Provider with fixed answers that records prompt requests.
///
/// Hosts without a permission model (desktop, tests) use this and resolve
/// the recorded requests themselves with [`StaticPermissions::grants_for`].
#[derive(Debug, Default)]
pub struct StaticPermissions {
    storage_write: bool,
    camera: bool,
    requested: Mutex<Vec<(RequestId, Vec<Capability>)>>,
}

impl StaticPermissions {
    pub fn new(storage_write: bool, camera: bool) -> Self {
        Self {
            storage_write,
            camera,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn granted_all() -> Self {
        Self::new(true, true)
    }

    /// Drain the prompt requests seen so far.
    pub fn take_requests(&self) -> Vec<(RequestId, Vec<Capability>)> {
        std::mem::take(&mut *self.requested.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// What a prompt for `capabilities` would answer.
    pub fn grants_for(&self, capabilities: &[Capability]) -> Vec<Grant> {
        capabilities
            .iter()
            .map(|&c| {
                if self.is_granted(c) {
                    Grant::Granted
                } else {
                    Grant::Denied
                }
            })
            .collect()
    }
}

impl PermissionProvider for StaticPermissions {
    fn is_granted(&self, capability: Capability) -> bool {
        match capability {
            Capability::StorageWrite => self.storage_write,
            Capability::Camera => self.camera,
        }
    }

    fn request(&self, id: RequestId, capabilities: &[Capability]) {
        self.requested
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, capabilities.to_vec()));
    }
}
