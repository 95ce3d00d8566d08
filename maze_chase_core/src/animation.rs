//! Sprite frame selection for front ends.
//!
//! Movement state never depends on anything here.

use std::time::Duration;

use crate::Direction;

/// Frames cycled through while facing one direction.
pub const FRAMES_PER_DIRECTION: usize = 2;

/// Total number of frames across all directions.
pub const FRAME_COUNT: usize = FRAMES_PER_DIRECTION * Direction::ALL.len();

/// Picks the frame to display for an agent facing `direction`.
///
/// Frames are laid out in blocks of [`FRAMES_PER_DIRECTION`], one block per
/// direction in [`Direction::ALL`] order. Within a block the frame advances
/// once per `rate` of `elapsed` time.
pub fn display_frame(direction: Direction, elapsed: Duration, rate: Duration) -> usize {
    let base = match direction {
        Direction::Up => 0,
        Direction::Down => 1,
        Direction::Left => 2,
        Direction::Right => 3,
    } * FRAMES_PER_DIRECTION;

    if rate.is_zero() {
        return base;
    }
    let step = (elapsed.as_nanos() / rate.as_nanos()) as usize;
    base + step % FRAMES_PER_DIRECTION
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: Duration = Duration::from_millis(200);

    #[test]
    fn frames_alternate_within_a_direction() {
        assert_eq!(display_frame(Direction::Left, Duration::ZERO, RATE), 4);
        assert_eq!(display_frame(Direction::Left, Duration::from_millis(199), RATE), 4);
        assert_eq!(display_frame(Direction::Left, Duration::from_millis(200), RATE), 5);
        assert_eq!(display_frame(Direction::Left, Duration::from_millis(400), RATE), 4);
    }

    #[test]
    fn each_direction_owns_its_block() {
        let elapsed = Duration::from_millis(250);
        for (i, direction) in Direction::ALL.into_iter().enumerate() {
            let frame = display_frame(direction, elapsed, RATE);
            assert_eq!(frame / FRAMES_PER_DIRECTION, i);
            assert!(frame < FRAME_COUNT);
        }
    }

    #[test]
    fn zero_rate_is_static() {
        assert_eq!(
            display_frame(Direction::Right, Duration::from_secs(9), Duration::ZERO),
            6
        );
    }
}
