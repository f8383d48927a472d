use crate::{
    error::AppError,
    location::interface::{
        Fix, LocationSubsystem, PermissionChecker, PermissionKind, ProviderHandle, ProviderProperties,
    },
};
use mockall::mock;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};
use tracing::trace;

mock! {
    pub LocationSubsystem {}

    impl LocationSubsystem for LocationSubsystem {
        fn register_synthetic_source(&self, name: &str, properties: &ProviderProperties) -> Result<ProviderHandle, AppError>;
        fn set_enabled(&self, handle: &ProviderHandle, enabled: bool) -> Result<(), AppError>;
        fn unregister(&self, handle: &ProviderHandle) -> Result<(), AppError>;
        fn push_fix(&self, handle: &ProviderHandle, fix: &Fix) -> Result<(), AppError>;
    }
}

mock! {
    pub PermissionChecker {}

    impl PermissionChecker for PermissionChecker {
        fn has_permission(&self, kind: PermissionKind) -> bool;
    }
}

/// What the accepting subsystem mock saw.
#[derive(Debug, Default)]
pub struct SubsystemLog {
    pub registered: AtomicUsize,
    pub unregistered: AtomicUsize,
    pub enabled: AtomicBool,
    pub fixes: Mutex<Vec<Fix>>,
}

impl SubsystemLog {
    pub fn fix_count(&self) -> usize {
        self.fixes.lock().unwrap().len()
    }

    pub fn registered(&self) -> usize {
        self.registered.load(Ordering::SeqCst)
    }

    pub fn unregistered(&self) -> usize {
        self.unregistered.load(Ordering::SeqCst)
    }
}

/// Subsystem that accepts everything and records it into `log`.
pub fn set_location_subsystem0(log: Arc<SubsystemLog>) -> MockLocationSubsystem {
    let mut mock = MockLocationSubsystem::new();
    let l = log.clone();
    mock.expect_register_synthetic_source().times(0..).returning(move |name, _props| {
        let id = l.registered.fetch_add(1, Ordering::SeqCst) as u32 + 1;
        trace!("Mocked registration of {} as {}", name, id);
        Ok(ProviderHandle::new(id, name))
    });
    let l = log.clone();
    mock.expect_set_enabled().times(0..).returning(move |_handle, enabled| {
        l.enabled.store(enabled, Ordering::SeqCst);
        Ok(())
    });
    let l = log.clone();
    mock.expect_unregister().times(0..).returning(move |_handle| {
        l.unregistered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    mock.expect_push_fix().times(0..).returning(move |_handle, fix| {
        log.fixes.lock().unwrap().push(fix.clone());
        Ok(())
    });
    mock
}

/// Subsystem that refuses to register any source.
pub fn set_location_subsystem_rejecting() -> MockLocationSubsystem {
    let mut mock = MockLocationSubsystem::new();
    mock.expect_register_synthetic_source()
        .times(0..)
        .returning(|name, _props| Err(AppError::ProviderUnavailable(format!("{} rejected", name))));
    mock.expect_set_enabled().times(0);
    mock.expect_push_fix().times(0);
    mock
}

/// Permission mock backed by a shared flag, so tests can revoke mid-run.
pub fn set_permissions(granted: Arc<AtomicBool>) -> MockPermissionChecker {
    let mut mock = MockPermissionChecker::new();
    mock.expect_has_permission().times(0..).returning(move |_kind| granted.load(Ordering::SeqCst));
    mock
}

pub fn set_permissions_granted() -> MockPermissionChecker {
    set_permissions(Arc::new(AtomicBool::new(true)))
}
