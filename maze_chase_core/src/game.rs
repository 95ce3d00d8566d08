use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Direction,
    agent::{Agent, PlayerController, PursuerController},
    level::{Level, LevelError},
    map::GridMap,
};

/// Whether the game is still running, and how it ended if not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    InProgress,
    Won,
    Lost,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        self != Status::InProgress
    }
}

/// Read-only picture of the game after a tick, handed to renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub player: Agent,
    pub pursuers: Vec<Agent>,
    pub score: usize,
    pub remaining_pickups: usize,
    pub status: Status,
    pub tick: u64,
}

/// The whole simulation: maze, agents, score and terminal status.
///
/// The caller owns this value and drives it with [`GameState::tick`] once per
/// frame. Nothing is shared between instances, so independent games can run
/// side by side.
#[derive(Debug)]
pub struct GameState<R = StdRng> {
    map: GridMap,
    player: Agent,
    pursuers: Vec<Agent>,
    score: usize,
    status: Status,
    ticks: u64,
    player_controller: PlayerController,
    pursuer_controller: PursuerController<R>,
}

impl GameState<StdRng> {
    /// Starts a game whose pursuers draw from a seeded [`StdRng`].
    pub fn with_seed(level: &Level, seed: u64) -> Result<Self, LevelError> {
        Self::new(level, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameState<R> {
    /// Starts a game on `level`, rejecting invalid geometry or spawns.
    pub fn new(level: &Level, rng: R) -> Result<Self, LevelError> {
        let map = level.build_map()?;
        tracing::info!(
            "Starting game on {}x{} maze with {} pickups and {} pursuers",
            map.width(),
            map.height(),
            map.total_pickups(),
            level.pursuers.len()
        );

        Ok(GameState {
            map,
            player: Agent::new(level.player.position, level.player.direction),
            pursuers: level
                .pursuers
                .iter()
                .map(|spawn| Agent::new(spawn.position, spawn.direction))
                .collect(),
            score: 0,
            status: Status::InProgress,
            ticks: 0,
            player_controller: PlayerController,
            pursuer_controller: PursuerController::new(rng),
        })
    }

    /// Advances the simulation by one step.
    ///
    /// Moves the player toward `desired`, moves every pursuer in order, then
    /// checks for a catch and for an empty maze. A catch wins over clearing
    /// the last pickup on the same tick. Once the game is over this returns
    /// the final snapshot without touching anything.
    pub fn tick(&mut self, desired: Direction) -> Snapshot {
        if self.status.is_terminal() {
            return self.snapshot();
        }

        let player_move = self
            .player_controller
            .advance(&mut self.player, desired, &mut self.map);
        if player_move.collected {
            self.score += 1;
        }

        for pursuer in &mut self.pursuers {
            self.pursuer_controller.advance(pursuer, &self.map);
        }

        self.ticks += 1;
        self.status = self.resolve_status();
        tracing::trace!(
            tick = self.ticks,
            score = self.score,
            "Player at ({}, {}) facing {:?}",
            self.player.position.x,
            self.player.position.y,
            self.player.direction
        );
        if self.status.is_terminal() {
            tracing::info!(
                "Game ended {:?} after {} ticks with score {}",
                self.status,
                self.ticks,
                self.score
            );
        }

        self.snapshot()
    }

    fn resolve_status(&self) -> Status {
        let caught = self
            .pursuers
            .iter()
            .any(|pursuer| pursuer.position == self.player.position);
        if caught {
            Status::Lost
        } else if self.map.remaining_pickups() == 0 {
            Status::Won
        } else {
            Status::InProgress
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            player: self.player,
            pursuers: self.pursuers.clone(),
            score: self.score,
            remaining_pickups: self.map.remaining_pickups(),
            status: self.status,
            tick: self.ticks,
        }
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    pub fn player(&self) -> &Agent {
        &self.player
    }

    pub fn pursuers(&self) -> &[Agent] {
        &self.pursuers
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Number of ticks that advanced the simulation.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
