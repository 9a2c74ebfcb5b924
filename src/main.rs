use std::sync::Arc;

use altaz_scan_control::config::Config;
use altaz_scan_control::scans::{self, ScanPath};
use altaz_scan_control::telescope_control::{Mount, SimulatedLink};
use altaz_scan_control::Repeat;
use eyre::WrapErr;
use tracing::{error, info};

/// Runs the simulated mount through a graticule scan until it finishes or Ctrl-C
#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt::init();

    let config: Config =
        confy::load_path("config.toml").wrap_err("Couldn't parse configuration")?;
    config.validate()?;

    let sim = Arc::new(SimulatedLink::new(&config));
    let mount = Mount::new(&config, sim)?;

    let points = scans::graticule(10., 190., 10., 80., 5)?;
    info!("Scanning a graticule of {} points", points.len());
    let job = mount.scan(ScanPath::horizontal(points), Repeat::Once).await?;

    tokio::select! {
        result = job => result.into_inner()?,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping mount");
            if let Err(e) = mount.stop().await {
                error!("Error stopping mount: {}", e);
            }
        }
    }

    let pos = mount.current_position().await?;
    info!("Finished at az {:.3}, alt {:.3}", pos.primary, pos.secondary);
    Ok(())
}
