use std::sync::Arc;
use std::time::Duration;

use altaz_scan_control::config::Config;
use altaz_scan_control::scans::{self, ScanPath};
use altaz_scan_control::telescope_control::{
    Catalog, Mount, SimCommand, SimulatedLink, TrackTarget,
};
use altaz_scan_control::*;
use chrono::Utc;
#[macro_use]
extern crate assert_float_eq;

fn create_mount(config: Option<Config>) -> (Mount, Arc<SimulatedLink>) {
    let config = config.unwrap_or_else(|| confy::load_path("tests/test_config.toml").unwrap());
    let sim = Arc::new(SimulatedLink::new(&config));
    let mount = Mount::new(&config, sim.clone()).unwrap();
    (mount, sim)
}

#[tokio::test]
async fn test_config_file() {
    let (mount, _sim) = create_mount(None);
    let config = mount.config().await;
    assert_eq!(config.observation_location.latitude, 40.);
    assert_eq!(config.encoders.azimuth_counts_per_revolution, 360_000.);
    assert_eq!(config.control.read_tries, 3);
}

#[tokio::test(start_paused = true)]
async fn test_sync_then_goto() {
    let (mount, sim) = create_mount(None);
    mount.sync(AngularPosition::new(350., 10.)).await.unwrap();

    let job = mount.goto(AngularPosition::new(5., 20.)).await.unwrap();
    assert_eq!(job.await, AbortResult::Completed(Ok(())));

    // through north, not the long way round
    assert!(sim
        .commands()
        .contains(&SimCommand::MoveAbsolute(Axis::Primary, 365_000)));
    let pos = mount.current_position().await.unwrap();
    assert_float_absolute_eq!(pos.primary, 5., 1E-3);
    assert_float_absolute_eq!(pos.secondary, 20., 1E-3);
}

#[tokio::test(start_paused = true)]
async fn test_rectangular_scan_with_repeats() {
    let (mount, sim) = create_mount(None);
    let points = scans::rectangular(AngularPosition::new(180., 30.), 4., 2).unwrap();
    let n = points.len();

    let job = mount
        .scan(ScanPath::horizontal(points), Repeat::cycles(2))
        .await
        .unwrap();
    assert_eq!(job.await, AbortResult::Completed(Ok(())));
    assert_eq!(
        sim.count_commands(|c| *c == SimCommand::BeginMotion),
        4 * n
    );
    assert_eq!(sim.count_commands(|c| *c == SimCommand::StopAll), 0);
    assert_eq!(mount.motion_state().await, MotionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_track_catalog_object_then_stop() {
    let (mount, sim) = create_mount(None);
    let converter = mount.converter().await;
    let overhead = converter.horizontal_to_equatorial(AngularPosition::new(10., 5.), Utc::now());
    let mount = mount.with_celestial_source(Arc::new(Catalog::new().with_entry(
        "Test Star",
        overhead.primary,
        overhead.secondary,
    )));

    let job = mount
        .track(TrackTarget::Object("test star".to_string()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(mount.motion_state().await, MotionState::Tracking);

    let pos = mount.current_position().await.unwrap();
    assert_float_absolute_eq!(pos.primary, 10., 0.5);
    assert_float_absolute_eq!(pos.secondary, 5., 0.5);

    mount.stop().await.unwrap();
    assert!(job.await.is_aborted());
    assert_eq!(sim.count_commands(|c| *c == SimCommand::StopAll), 1);
    assert!(!mount.is_busy().await);
}

#[tokio::test(start_paused = true)]
async fn test_scan_replaces_track() {
    let (mount, sim) = create_mount(None);
    let track = mount
        .track(TrackTarget::Fixed(AngularPosition::new(0., 89.)))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    let points = scans::linear(AngularPosition::new(90., 45.), 10.).unwrap();
    let scan = mount
        .scan(ScanPath::horizontal(points), Repeat::Once)
        .await
        .unwrap();
    assert!(track.await.is_aborted());
    assert_eq!(scan.await, AbortResult::Completed(Ok(())));
    assert_eq!(sim.count_commands(|c| *c == SimCommand::StopAll), 1);
}

#[test]
fn test_preview_path_is_deterministic() {
    let a = scans::spiral(AngularPosition::new(30., 60.), 3.).unwrap();
    let b = scans::spiral(AngularPosition::new(30., 60.), 3.).unwrap();
    assert_eq!(a, b);

    let preview = ScanPath::horizontal(a).densified(1.);
    for pair in preview.points.windows(2) {
        assert!(astro_math::great_circle::distance(pair[0], pair[1]) <= 1. + 1E-6);
    }
}
