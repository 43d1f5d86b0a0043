//! Layout generation pipeline
//!
//! One pipeline attempt places rooms, builds the edge set and routes every
//! edge. Attempts that run out of placement or routing budget are thrown away
//! and started over from an empty map with the same RNG, so a seed still
//! fully determines the result.

use log::{debug, info, warn};
use strum::Display;

use crate::config::{LayoutConfig, RoutingStrategy};
use crate::error::GenerationError;
use crate::rng::LayoutRng;

use super::connectivity::build_edges;
use super::corridor::{ConnectorRouter, RouteStrategy};
use super::direct::DirectRouter;
use super::grid::GridRouter;
use super::placement::{PlacementRequest, place_rooms};
use super::result::Layout;
use super::spatial::SpatialIndex;

/// Where the pipeline currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Placing,
    Connecting,
    Routing,
    Done,
    Failed,
}

/// Generate a layout for `config` from `seed`
pub fn generate(config: &LayoutConfig, seed: u64) -> Result<Layout, GenerationError> {
    Generator::new(config.clone(), seed).run()
}

/// Stateful driver of the pipeline
#[derive(Debug, Clone)]
pub struct Generator {
    config: LayoutConfig,
    rng: LayoutRng,
    phase: Phase,
    attempts: u32,
}

impl Generator {
    pub fn new(config: LayoutConfig, seed: u64) -> Self {
        Self {
            config,
            rng: LayoutRng::new(seed),
            phase: Phase::Placing,
            attempts: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Pipeline attempts started so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Run attempts until one succeeds or the pipeline budget is spent
    ///
    /// Every call starts over from the seed, so repeated runs agree.
    pub fn run(&mut self) -> Result<Layout, GenerationError> {
        self.rng = LayoutRng::new(self.rng.seed());
        self.phase = Phase::Placing;
        self.attempts = 0;
        if let Err(err) = self.config.validate() {
            self.phase = Phase::Failed;
            return Err(err.into());
        }

        let budget = self.config.budgets.pipeline;
        let mut last_failure = None;
        while self.attempts < budget {
            self.attempts += 1;
            match self.attempt() {
                Ok(layout) => {
                    self.phase = Phase::Done;
                    info!(
                        "generated {} rooms and {} connectors in {} attempts (seed {})",
                        layout.rooms().len(),
                        layout.connectors().len(),
                        self.attempts,
                        self.rng.seed()
                    );
                    return Ok(layout);
                }
                Err(err) if err.is_retryable() => {
                    debug!("attempt {} failed in {} phase: {}", self.attempts, self.phase, err);
                    last_failure = Some(err);
                }
                Err(err) => {
                    self.phase = Phase::Failed;
                    return Err(err);
                }
            }
        }

        self.phase = Phase::Failed;
        warn!("giving up after {} attempts", self.attempts);
        Err(GenerationError::GenerationExhausted {
            attempts: self.attempts,
            last_failure: Box::new(last_failure.unwrap_or(GenerationError::PlacementExhausted {
                placed: 0,
                requested: self.config.room_count,
                attempts: 0,
            })),
        })
    }

    /// One pass over every phase on a fresh map
    fn attempt(&mut self) -> Result<Layout, GenerationError> {
        let config = &self.config;
        let bounds = config.bounds();
        let mut index = SpatialIndex::new(config.index_cell_size);

        self.phase = Phase::Placing;
        let request = PlacementRequest {
            bounds,
            room_count: config.room_count,
            sizes: &config.room_sizes,
            padding: config.room_padding,
            touching_fraction: config.touching_fraction,
            max_attempts: config.budgets.placement,
        };
        let mut rooms = place_rooms(&request, &mut index, &mut self.rng)?;
        info!("placed {} rooms", rooms.len());

        self.phase = Phase::Connecting;
        let edges = build_edges(&rooms, config.metric, config.extra_edge_fraction, &mut self.rng);
        info!("selected {} edges", edges.len());

        self.phase = Phase::Routing;
        let mut strategy: Box<dyn RouteStrategy> = match config.strategy {
            RoutingStrategy::Direct => Box::new(DirectRouter::new()),
            RoutingStrategy::Grid => Box::new(GridRouter::new(&bounds, &rooms, config.crossing)),
        };
        let mut router = ConnectorRouter::new(config);
        let connectors =
            router.route_all(strategy.as_mut(), &mut rooms, &mut index, &edges, &mut self.rng)?;
        info!("routed {} connectors with the {} strategy", connectors.len(), config.strategy);

        Ok(Layout::new(bounds, rooms, connectors, self.rng.seed(), self.attempts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_generate_default() {
        let layout = generate(&LayoutConfig::default(), 42).unwrap();
        assert_eq!(layout.rooms().len(), 10);
        assert!(layout.is_connected());
        assert_eq!(layout.seed(), 42);
        assert!(layout.attempts() >= 1);
    }

    #[test]
    fn test_phase_transitions() {
        let mut generator = Generator::new(LayoutConfig::default(), 7);
        assert_eq!(generator.phase(), Phase::Placing);
        generator.run().unwrap();
        assert_eq!(generator.phase(), Phase::Done);
    }

    #[test]
    fn test_single_room() {
        let config = LayoutConfig {
            room_count: 1,
            ..LayoutConfig::with_bounds(30, 30)
        };
        let layout = generate(&config, 1).unwrap();
        assert_eq!(layout.rooms().len(), 1);
        assert!(layout.connectors().is_empty());
        assert!(layout.rooms()[0].doors().is_empty());
        assert!(layout.is_connected());
    }

    #[test]
    fn test_too_small_bounds_exhaust_budget() {
        let mut config = LayoutConfig::with_bounds(8, 8);
        config.room_count = 3;
        config.budgets.placement = 50;
        config.budgets.pipeline = 5;
        let mut generator = Generator::new(config, 3);

        match generator.run() {
            Err(GenerationError::GenerationExhausted { attempts, last_failure }) => {
                assert_eq!(attempts, 5);
                assert!(matches!(*last_failure, GenerationError::PlacementExhausted { .. }));
            }
            other => panic!("expected GenerationExhausted, got {:?}", other),
        }
        assert_eq!(generator.phase(), Phase::Failed);
    }

    #[test]
    fn test_repeated_runs_start_over() {
        let mut generator = Generator::new(LayoutConfig::default(), 21);
        let first = generator.run().unwrap();
        let second = generator.run().unwrap();
        assert_eq!(first, second);
        assert_eq!(generator.attempts(), first.attempts());

        let mut config = LayoutConfig::with_bounds(8, 8);
        config.room_count = 3;
        config.budgets.placement = 20;
        config.budgets.pipeline = 2;
        let mut generator = Generator::new(config, 3);
        for _ in 0..2 {
            match generator.run() {
                Err(GenerationError::GenerationExhausted { attempts, last_failure }) => {
                    assert_eq!(attempts, 2);
                    assert!(matches!(
                        *last_failure,
                        GenerationError::PlacementExhausted { attempts: 20, .. }
                    ));
                }
                other => panic!("expected GenerationExhausted, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_invalid_config_is_rejected_up_front() {
        let mut config = LayoutConfig::default();
        config.room_sizes.clear();
        let result = generate(&config, 1);
        assert!(matches!(
            result,
            Err(GenerationError::InvalidConfig(ConfigError::NoRoomSizes))
        ));
    }

    #[test]
    fn test_same_seed_same_layout() {
        for strategy in [RoutingStrategy::Direct, RoutingStrategy::Grid] {
            let config = LayoutConfig {
                strategy,
                extra_edge_fraction: 0.3,
                ..LayoutConfig::default()
            };
            assert_eq!(generate(&config, 99).unwrap(), generate(&config, 99).unwrap());
        }
    }
}
