use std::sync::Arc;

use super::{Mount, SimulatedLink};
use crate::config::Config;

pub(in crate::telescope_control) fn test_config() -> Config {
    let mut config = Config::default();
    config.encoders.azimuth_counts_per_revolution = 360_000.;
    config.encoders.elevation_counts_per_revolution = 360_000.;
    config
}

pub(in crate::telescope_control) fn create_mount(
    config: Option<Config>,
) -> (Mount, Arc<SimulatedLink>) {
    let config = config.unwrap_or_else(test_config);
    let sim = Arc::new(SimulatedLink::new(&config));
    let mount = Mount::new(&config, sim.clone()).unwrap();
    (mount, sim)
}
