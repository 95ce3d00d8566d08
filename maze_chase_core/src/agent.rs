use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{Direction, Position, map::GridMap};

/// Positional state shared by the player and every pursuer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Agent {
    pub position: Position,
    pub direction: Direction,
}

/// Outcome of a single attempted grid step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub position: Position,
    pub moved: bool,
}

impl Agent {
    pub const fn new(position: Position, direction: Direction) -> Self {
        Agent {
            position,
            direction,
        }
    }

    /// Computes where a step in `direction` would land.
    ///
    /// This is the only place that decides whether an agent may enter a cell.
    /// The agent itself is not modified.
    pub fn attempt_step(&self, direction: Direction, map: &GridMap) -> Step {
        match map.neighbor(self.position, direction) {
            Some(position) => Step {
                position,
                moved: true,
            },
            None => Step {
                position: self.position,
                moved: false,
            },
        }
    }
}

/// Result of advancing the player for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerMove {
    pub moved: bool,
    pub collected: bool,
}

/// Input-driven movement for the player.
///
/// Tries the requested direction first, then coasts in the last committed
/// direction, then stays put. Whatever cell the player ends on is harvested.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlayerController;

impl PlayerController {
    pub fn advance(&self, player: &mut Agent, desired: Direction, map: &mut GridMap) -> PlayerMove {
        let committed = player.direction;
        let step = [desired, committed]
            .into_iter()
            .map(|direction| (direction, player.attempt_step(direction, map)))
            .find(|(_, step)| step.moved);

        let moved = match step {
            Some((direction, step)) => {
                player.direction = direction;
                player.position = step.position;
                true
            }
            None => false,
        };

        // Agents only ever stand on passable cells, so this cannot hit a wall.
        let collected = map.consume_pickup(player.position).unwrap_or(false);
        if collected {
            tracing::debug!(
                "Player consumed pickup at ({}, {}), {} remaining",
                player.position.x,
                player.position.y,
                map.remaining_pickups()
            );
        }

        PlayerMove { moved, collected }
    }
}

/// What a pursuer did during its tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PursuerMove {
    Moved,
    /// Blocked; now faces the given direction and will try it next tick.
    Redirected(Direction),
    /// Blocked on every side; direction unchanged.
    Trapped,
}

/// Corridor-following wanderer.
///
/// A pursuer keeps going until it hits a wall, then picks uniformly among the
/// open neighbours of its cell. Reversing is allowed. The random source is
/// owned here so a seeded generator reproduces a whole game.
#[derive(Debug)]
pub struct PursuerController<R> {
    rng: R,
}

impl<R: Rng> PursuerController<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn advance(&mut self, pursuer: &mut Agent, map: &GridMap) -> PursuerMove {
        let step = pursuer.attempt_step(pursuer.direction, map);
        if step.moved {
            pursuer.position = step.position;
            return PursuerMove::Moved;
        }

        let candidates: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|&direction| map.neighbor(pursuer.position, direction).is_some())
            .collect();

        match candidates.choose(&mut self.rng) {
            Some(&direction) => {
                tracing::debug!(
                    "Pursuer at ({}, {}) blocked facing {:?}, turning {:?} ({} options)",
                    pursuer.position.x,
                    pursuer.position.y,
                    pursuer.direction,
                    direction,
                    candidates.len()
                );
                pursuer.direction = direction;
                PursuerMove::Redirected(direction)
            }
            None => PursuerMove::Trapped,
        }
    }
}
