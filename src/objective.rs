//! Objective placement.

use color_eyre::eyre::{OptionExt as _, Result};
use log::info;
use rand::{seq::SliceRandom as _, Rng};

use crate::map::{GridMap, GridPos};

/// Glyph drawn for the objective on the minimap.
pub(crate) const OBJECTIVE_TILE: char = 'X';

/// The cell the player is guided towards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Objective {
    /// Cell occupied by the objective.
    pub(crate) cell: GridPos,
}

impl Objective {
    /// Places a new objective on a random open interior cell.
    ///
    /// Cells on the outer ring of the map are never chosen, nor is `avoid`, when other candidates
    /// exist. The candidates are enumerated row after row, so a seeded generator gives a
    /// reproducible sequence of placements.
    ///
    /// # Errors
    ///
    /// This function returns an error if the map has no open interior cell.
    pub(crate) fn spawn<R: Rng>(map: &GridMap, avoid: Option<GridPos>, rng: &mut R) -> Result<Self> {
        let interior: Vec<GridPos> = map
            .positions()
            .filter(|&pos| is_interior(map, pos) && map.is_open(pos))
            .collect();
        let preferred: Vec<GridPos> = interior
            .iter()
            .copied()
            .filter(|&pos| Some(pos) != avoid)
            .collect();

        let candidates = if preferred.is_empty() {
            &interior
        } else {
            &preferred
        };
        let cell = *candidates
            .choose(rng)
            .ok_or_eyre("map has no open interior cell for the objective")?;

        info!("objective placed at ({}, {})", cell.x, cell.y);

        Ok(Self { cell })
    }
}

/// Returns whether the coordinate is off the map's outer ring.
fn is_interior(map: &GridMap, pos: GridPos) -> bool {
    let inside = |value: i32, size: usize| {
        usize::try_from(value).is_ok_and(|value| value >= 1 && value + 1 < size)
    };

    inside(pos.x, map.width()) && inside(pos.y, map.height())
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng as _};

    use super::*;

    #[test]
    fn test_spawn_lands_on_open_interior() {
        let map = GridMap::default();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..50 {
            let objective = Objective::spawn(&map, None, &mut rng).expect("spawn should succeed");
            assert!(map.is_open(objective.cell), "objective should be on open floor");
            assert!(
                is_interior(&map, objective.cell),
                "objective should avoid the outer ring"
            );
        }
    }

    #[test]
    fn test_spawn_is_reproducible_with_seed() {
        let map = GridMap::default();
        let mut first = StdRng::seed_from_u64(3);
        let mut second = StdRng::seed_from_u64(3);

        for _ in 0..10 {
            assert_eq!(
                Objective::spawn(&map, None, &mut first).expect("spawn should succeed"),
                Objective::spawn(&map, None, &mut second).expect("spawn should succeed"),
                "identical seeds should place identically"
            );
        }
    }

    #[test]
    fn test_spawn_avoids_given_cell() {
        let map = GridMap::parse("####\n#  #\n####").expect("failed to parse map");
        let mut rng = StdRng::seed_from_u64(0);

        for _ in 0..20 {
            let objective = Objective::spawn(&map, Some(GridPos::new(1, 1)), &mut rng)
                .expect("spawn should succeed");
            assert_eq!(
                objective.cell,
                GridPos::new(2, 1),
                "the only other interior cell should be chosen"
            );
        }
    }

    #[test]
    fn test_spawn_falls_back_to_avoided_cell() {
        let map = GridMap::parse("###\n# #\n###").expect("failed to parse map");
        let mut rng = StdRng::seed_from_u64(0);

        let objective = Objective::spawn(&map, Some(GridPos::new(1, 1)), &mut rng)
            .expect("the single interior cell should still be used");
        assert_eq!(objective.cell, GridPos::new(1, 1), "only one candidate exists");
    }

    #[test]
    fn test_spawn_without_open_interior() {
        let map = GridMap::parse("###\n###\n###").expect("failed to parse map");
        let mut rng = StdRng::seed_from_u64(0);

        assert!(
            Objective::spawn(&map, None, &mut rng).is_err(),
            "a solid map leaves nowhere to place the objective"
        );
    }
}
