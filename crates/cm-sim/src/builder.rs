//! Fluent builder for constructing a [`MissionSim`].

use cm_core::{MissionConfig, SimConfig, SimRng};
use cm_world::{TaskScheduler, World};

use crate::{MissionSim, SimError, SimResult};

/// Fluent builder for [`MissionSim<W>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: total ticks, seed, tick length, …
/// - `W: World + TaskScheduler`: the colony (e.g. [`cm_world::ColonyWorld`])
///
/// # Optional inputs (have defaults)
///
/// | Method                 | Default                    |
/// |------------------------|----------------------------|
/// | `.mission_config(c)`   | `MissionConfig::default()` |
///
/// # Example
///
/// ```rust,ignore
/// let world = ColonyWorldBuilder::new() /* … */ .build()?;
/// let mut sim = SimBuilder::new(config, world)
///     .mission_config(mission_config)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<W: World + TaskScheduler> {
    config:         SimConfig,
    world:          W,
    mission_config: Option<MissionConfig>,
}

impl<W: World + TaskScheduler> SimBuilder<W> {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, world: W) -> Self {
        Self { config, world, mission_config: None }
    }

    /// Supply the mission constants (consumption rates, margins, site times).
    pub fn mission_config(mut self, mission_config: MissionConfig) -> Self {
        self.mission_config = Some(mission_config);
        self
    }

    /// Validate inputs and return a ready-to-run [`MissionSim`].
    pub fn build(self) -> SimResult<MissionSim<W>> {
        let msol = self.config.millisols_per_tick;
        if msol.is_nan() || msol <= 0.0 {
            return Err(SimError::Config(format!("millisols_per_tick must be positive, got {msol}")));
        }
        let mission_config = self.mission_config.unwrap_or_default();
        mission_config.validate()?;

        Ok(MissionSim {
            clock:          self.config.make_clock(),
            rng:            SimRng::new(self.config.seed),
            config:         self.config,
            mission_config,
            world:          self.world,
            active:         Vec::new(),
            finished:       Vec::new(),
            next_id:        0,
        })
    }
}
