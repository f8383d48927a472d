use axum_server::Handle;
use geomock::{
    api::{router, AppState},
    config::{run_options::get_args, Config},
    location::{controller::MockLocationController, permissions::GrantedPermissions, udp_sink::UdpNmeaSink},
    schedule::trigger::{run_schedule_trigger, ScheduleTrigger},
    time::RealTimeProvider,
    utils::start_log,
};
use std::{error::Error, net::SocketAddr, sync::Arc, time::Duration};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    start_log::<RealTimeProvider>(None);

    let Some(args) = get_args() else {
        return Ok(());
    };
    let cfg = Config::load(&args)?;
    info!(config = %args.cfg_file.display(), "Starting application...");

    let window = cfg.schedule.window()?;
    let time_provider = Arc::new(RealTimeProvider::new());
    let permissions = Arc::new(GrantedPermissions::new(&cfg.permissions));
    let sink = Arc::new(UdpNmeaSink::new(&cfg.sink.target));
    let controller = Arc::new(MockLocationController::new(
        sink,
        permissions,
        time_provider.clone(),
        cfg.location.coordinate()?,
        cfg.emitter.clone(),
    ));

    let trigger = Arc::new(ScheduleTrigger::new(
        window,
        controller.clone(),
        time_provider.clone(),
        cfg.schedule.policy,
        cfg.schedule.check_interval()?,
    ));
    let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);
    let trigger_task = tokio::spawn(run_schedule_trigger(trigger, stop_rx, None));

    let app = router(Arc::new(AppState { controller: controller.clone(), window, time_provider }));
    let addr: SocketAddr = cfg.web_server.address.parse()?;

    let handle = Handle::new();
    tokio::spawn({
        let handle = handle.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal.");
            }
            info!("Shutdown requested.");
            _ = stop_tx.send(true);
            handle.graceful_shutdown(Some(Duration::from_secs(5)));
        }
    });

    info!("Starting HTTP server on http://{}", addr);
    axum_server::bind(addr).handle(handle).serve(app.into_make_service()).await?;

    if let Err(e) = trigger_task.await {
        error!(error = %e, "Schedule trigger ended abnormally.");
    }
    controller.stop().await;
    info!("Bye.");
    Ok(())
}
