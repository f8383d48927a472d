use super::interface::{PermissionChecker, PermissionKind};
use crate::config::Permissions;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Permission grants held in memory, seeded from config and adjustable at runtime.
#[derive(Debug)]
pub struct GrantedPermissions {
    fine_location: AtomicBool,
    coarse_location: AtomicBool,
    mock_location: AtomicBool,
}

impl GrantedPermissions {
    pub fn new(cfg: &Permissions) -> Self {
        Self {
            fine_location: AtomicBool::new(cfg.fine_location),
            // fine access implies coarse access
            coarse_location: AtomicBool::new(cfg.fine_location || cfg.coarse_location),
            mock_location: AtomicBool::new(cfg.mock_location),
        }
    }

    fn flag(&self, kind: PermissionKind) -> &AtomicBool {
        match kind {
            PermissionKind::FineLocation => &self.fine_location,
            PermissionKind::CoarseLocation => &self.coarse_location,
            PermissionKind::MockLocation => &self.mock_location,
        }
    }

    pub fn set(&self, kind: PermissionKind, granted: bool) {
        self.flag(kind).store(granted, Ordering::SeqCst);
        info!(permission = %kind, granted, "Permission changed.");
    }
}

impl PermissionChecker for GrantedPermissions {
    fn has_permission(&self, kind: PermissionKind) -> bool {
        self.flag(kind).load(Ordering::SeqCst)
    }
}
