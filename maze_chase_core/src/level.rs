use serde::{Deserialize, Serialize};

use crate::{
    Direction, Position,
    map::{Cell, GridError, GridMap},
};

/// Problems with a level configuration. All of them are fatal at load time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("Level text is empty")]
    EmptyText,
    #[error("Unknown map token '{token}' at ({x}, {y})")]
    UnknownToken { token: String, x: usize, y: usize },
    #[error("No player start ('P') found in level")]
    MissingPlayer,
    #[error("Multiple player starts ('P') found in level")]
    MultiplePlayers,
    #[error("{who} spawn at ({x}, {y}) is outside the maze")]
    SpawnOutOfBounds { who: &'static str, x: usize, y: usize },
    #[error("{who} spawn at ({x}, {y}) is inside a wall")]
    SpawnInWall { who: &'static str, x: usize, y: usize },
}

/// Where an agent starts and which way it faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawn {
    pub position: Position,
    #[serde(default)]
    pub direction: Direction,
}

impl Spawn {
    pub const fn new(position: Position, direction: Direction) -> Self {
        Spawn {
            position,
            direction,
        }
    }
}

/// Static level configuration: cell codes plus agent spawns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// One row per grid row: 0 = Wall, 1 = Pickup, 2 = Open.
    pub rows: Vec<Vec<u8>>,
    pub player: Spawn,
    #[serde(default)]
    pub pursuers: Vec<Spawn>,
}

impl Level {
    /// Builds the maze and checks every spawn against it.
    pub fn build_map(&self) -> Result<GridMap, LevelError> {
        let map = GridMap::from_rows(&self.rows)?;
        check_spawn(&map, "Player", &self.player)?;
        for spawn in &self.pursuers {
            check_spawn(&map, "Pursuer", spawn)?;
        }
        Ok(map)
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        self.build_map().map(|_| ())
    }

    /// The 20x20 maze shipped with the game: player top-left, four pursuers.
    pub fn classic() -> Level {
        let rows = CLASSIC_ROWS.iter().map(|row| row.to_vec()).collect();
        let pursuers = [(4, 10), (14, 14), (8, 3), (4, 9)]
            .into_iter()
            .map(|(x, y)| Spawn::new(Position::new(x, y), Direction::Right))
            .collect();
        Level {
            rows,
            player: Spawn::new(Position::new(1, 1), Direction::Right),
            pursuers,
        }
    }
}

fn check_spawn(map: &GridMap, who: &'static str, spawn: &Spawn) -> Result<(), LevelError> {
    let Position { x, y } = spawn.position;
    match map.cell_kind(spawn.position) {
        Err(_) => Err(LevelError::SpawnOutOfBounds { who, x, y }),
        Ok(Cell::Wall) => Err(LevelError::SpawnInWall { who, x, y }),
        Ok(_) => Ok(()),
    }
}

/// Loads a level from its text representation.
///
/// Each line is one grid row of whitespace-separated tokens: `0` wall, `1`
/// pickup, `2` open floor, `P` player start and `G` pursuer start. Spawn
/// tokens stand on a pickup. Everyone starts facing right; pursuers are listed
/// in reading order.
pub fn load_level_from_string(map_string: &str) -> Result<Level, LevelError> {
    let lines: Vec<&str> = map_string.trim().lines().collect();
    if lines.is_empty() {
        return Err(LevelError::EmptyText);
    }

    let mut rows = Vec::with_capacity(lines.len());
    let mut player = None;
    let mut pursuers = Vec::new();

    for (y, line) in lines.iter().enumerate() {
        let mut row = Vec::new();
        for (x, token) in line.split_whitespace().enumerate() {
            let pos = Position::new(x, y);
            let code = match token {
                "0" | "1" | "2" => Some(token.as_bytes()[0] - b'0'),
                "P" => {
                    if player.is_some() {
                        return Err(LevelError::MultiplePlayers);
                    }
                    player = Some(Spawn::new(pos, Direction::default()));
                    Some(Cell::Pickup.code())
                }
                "G" => {
                    pursuers.push(Spawn::new(pos, Direction::default()));
                    Some(Cell::Pickup.code())
                }
                _ => None,
            };
            let code = code.ok_or_else(|| LevelError::UnknownToken {
                token: token.to_string(),
                x,
                y,
            })?;
            row.push(code);
        }
        rows.push(row);
    }

    let level = Level {
        rows,
        player: player.ok_or(LevelError::MissingPlayer)?,
        pursuers,
    };
    level.validate()?;
    Ok(level)
}

#[rustfmt::skip]
const CLASSIC_ROWS: [[u8; 20]; 20] = [
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 1, 1, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0],
    [0, 1, 0, 0, 1, 0, 0, 1, 0, 1, 0, 0, 1, 0, 0, 1, 0, 0, 0, 0],
    [0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0],
    [0, 1, 0, 0, 1, 0, 1, 0, 0, 0, 1, 0, 1, 0, 0, 1, 0, 0, 0, 0],
    [0, 1, 1, 1, 1, 0, 1, 1, 0, 1, 1, 0, 1, 1, 1, 1, 0, 0, 0, 0],
    [0, 1, 0, 0, 1, 0, 0, 1, 0, 1, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0],
    [0, 1, 0, 0, 1, 0, 1, 1, 1, 1, 1, 0, 1, 0, 0, 0, 0, 0, 0, 0],
    [0, 1, 1, 1, 1, 1, 1, 0, 0, 0, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0],
    [0, 0, 0, 0, 1, 0, 1, 1, 1, 1, 1, 0, 1, 0, 0, 1, 0, 0, 0, 0],
    [0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 1, 0, 1, 0, 0, 1, 0, 0, 0, 0],
    [0, 1, 1, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0],
    [0, 1, 0, 0, 1, 0, 0, 1, 0, 1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0],
    [0, 1, 1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 1, 0, 0, 0, 0],
    [0, 0, 1, 0, 1, 0, 1, 0, 0, 0, 1, 0, 1, 0, 1, 0, 0, 0, 0, 0],
    [0, 1, 1, 1, 1, 0, 1, 1, 0, 1, 1, 0, 1, 1, 1, 1, 0, 0, 0, 0],
    [0, 1, 0, 0, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0],
    [0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_level_is_valid() {
        let level = Level::classic();
        let map = level.build_map().unwrap();
        assert_eq!((map.width(), map.height()), (20, 20));
        assert_eq!(level.pursuers.len(), 4);
        assert!(map.total_pickups() > 0);
    }

    #[test]
    fn text_loader_reads_tokens_and_spawns() {
        let text = "
            0 0 0 0 0
            0 P 1 G 0
            0 2 0 1 0
            0 G 1 1 0
            0 0 0 0 0
        ";
        let level = load_level_from_string(text).unwrap();
        assert_eq!(level.player, Spawn::new(Position::new(1, 1), Direction::Right));
        assert_eq!(
            level.pursuers.iter().map(|s| s.position).collect::<Vec<_>>(),
            vec![Position::new(3, 1), Position::new(1, 3)]
        );
        assert_eq!(level.rows[1], vec![0, 1, 1, 1, 0]);
        assert_eq!(level.rows[2], vec![0, 2, 0, 1, 0]);
    }

    #[test]
    fn text_loader_rejects_bad_input() {
        assert_eq!(load_level_from_string("  \n "), Err(LevelError::EmptyText));
        assert_eq!(
            load_level_from_string("0 P 1\n0 1"),
            Err(LevelError::Grid(GridError::Ragged {
                row: 1,
                expected: 3,
                found: 2
            }))
        );
        assert_eq!(
            load_level_from_string("1 1 1"),
            Err(LevelError::MissingPlayer)
        );
        assert_eq!(
            load_level_from_string("P 1 P"),
            Err(LevelError::MultiplePlayers)
        );
        assert_eq!(
            load_level_from_string("P 1 X"),
            Err(LevelError::UnknownToken {
                token: "X".to_string(),
                x: 2,
                y: 0
            })
        );
    }

    #[test]
    fn spawns_must_be_on_open_ground() {
        let mut level = Level {
            rows: vec![vec![0, 1, 1]],
            player: Spawn::new(Position::new(0, 0), Direction::Left),
            pursuers: vec![],
        };
        assert_eq!(
            level.validate(),
            Err(LevelError::SpawnInWall {
                who: "Player",
                x: 0,
                y: 0
            })
        );

        level.player.position = Position::new(1, 0);
        level.pursuers.push(Spawn::new(Position::new(5, 0), Direction::Left));
        assert_eq!(
            level.validate(),
            Err(LevelError::SpawnOutOfBounds {
                who: "Pursuer",
                x: 5,
                y: 0
            })
        );
    }

    #[test]
    fn json_levels_fill_in_defaults() {
        let json = r#"{
            "rows": [[1, 1, 1]],
            "player": { "position": { "x": 0, "y": 0 } }
        }"#;
        let level: Level = serde_json::from_str(json).unwrap();
        assert_eq!(level.player.direction, Direction::Right);
        assert!(level.pursuers.is_empty());
        level.validate().unwrap();
    }
}
