pub mod mock_location;
pub mod mock_time;

use crate::{
    config::Emitter,
    location::{
        controller::MockLocationController,
        coordinate::MockCoordinate,
        interface::{LocationSubsystem, PermissionChecker},
    },
};
use mock_location::{set_location_subsystem0, set_permissions, SubsystemLog};
use mock_time::MockTimeProvider;
use std::sync::{atomic::AtomicBool, Arc};

pub struct ControllerFixture {
    pub controller: Arc<MockLocationController>,
    pub log: Arc<SubsystemLog>,
    pub granted: Arc<AtomicBool>,
    pub time_provider: Arc<MockTimeProvider>,
}

pub fn set_controller(
    subsystem: impl LocationSubsystem + 'static, permissions: impl PermissionChecker + 'static,
    time_provider: Arc<MockTimeProvider>,
) -> Arc<MockLocationController> {
    Arc::new(MockLocationController::new(
        Arc::new(subsystem),
        Arc::new(permissions),
        time_provider,
        MockCoordinate::default(),
        Emitter::default(),
    ))
}

/// Controller over an accepting subsystem, permissions granted, clock at `start_time`.
pub fn set_controller0(start_time: i64) -> ControllerFixture {
    let log = Arc::new(SubsystemLog::default());
    let granted = Arc::new(AtomicBool::new(true));
    let time_provider = Arc::new(MockTimeProvider::new(start_time));
    let controller =
        set_controller(set_location_subsystem0(log.clone()), set_permissions(granted.clone()), time_provider.clone());
    ControllerFixture { controller, log, granted, time_provider }
}
