use crate::{
    util::unit::{Point2, Rect},
    world::{
        grid::check_bounds,
        point::{GridPoint, GridPointIndexMap},
    },
};
use fnv::FnvBuildHasher;
use log::trace;
use std::{collections::HashMap, hash::Hash};

/// Sprites standing on the grid, grouped by the cell they occupy. Each cell
/// holds its occupants in draw-priority order: highest priority first, and
/// sprites with equal priority in the order they were added. A sprite can
/// only be in one cell at a time.
///
/// `S` is a cheap handle to the caller's sprite (an ID, an index, etc.). This
/// type never looks inside it.
#[derive(Clone, Debug)]
pub struct SpriteLayers<S> {
    width: usize,
    height: usize,
    /// Occupied cells only. Cells are kept in the order they were first
    /// occupied, so iteration is deterministic.
    occupants: GridPointIndexMap<Vec<Occupant<S>>>,
    /// Reverse lookup, sprite -> the cell it's in
    locations: HashMap<S, GridPoint, FnvBuildHasher>,
}

#[derive(Copy, Clone, Debug)]
struct Occupant<S> {
    sprite: S,
    priority: i32,
}

impl<S: Copy + Eq + Hash> SpriteLayers<S> {
    /// Create empty layers for a `width × height` grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            occupants: GridPointIndexMap::default(),
            locations: HashMap::default(),
        }
    }

    /// Put a sprite in a cell. If the sprite is already somewhere else, it's
    /// moved, and its old cell is returned. Within the cell, the sprite goes
    /// after every occupant with an equal or higher priority.
    ///
    /// Returns an error if the cell is outside the grid, in which case the
    /// sprite stays wherever it was.
    pub fn add_occupant(
        &mut self,
        cell: GridPoint,
        sprite: S,
        priority: i32,
    ) -> anyhow::Result<Option<GridPoint>> {
        check_bounds(cell, self.width, self.height)?;

        let previous = self.remove_occupant(sprite);
        let occupants = self.occupants.entry(cell).or_insert_with(Vec::new);
        let index = occupants
            .iter()
            .position(|occupant| occupant.priority < priority)
            .unwrap_or(occupants.len());
        occupants.insert(index, Occupant { sprite, priority });
        self.locations.insert(sprite, cell);
        trace!("Sprite moved from {:?} to {}", previous, cell);

        Ok(previous)
    }

    /// Take a sprite off the grid. Returns the cell it was in, or `None` if
    /// it wasn't on the grid at all.
    pub fn remove_occupant(&mut self, sprite: S) -> Option<GridPoint> {
        let cell = self.locations.remove(&sprite)?;
        if let Some(occupants) = self.occupants.get_mut(&cell) {
            occupants.retain(|occupant| occupant.sprite != sprite);
            if occupants.is_empty() {
                self.occupants.shift_remove(&cell);
            }
        }
        Some(cell)
    }

    /// Get all the sprites in a cell, highest priority first. Returns an
    /// error if the cell is outside the grid.
    pub fn occupants_of(
        &self,
        cell: GridPoint,
    ) -> anyhow::Result<impl Iterator<Item = S> + '_> {
        check_bounds(cell, self.width, self.height)?;
        Ok(self.occupants_unchecked(cell))
    }

    /// Get the cell a sprite is in, if it's on the grid
    pub fn location_of(&self, sprite: S) -> Option<GridPoint> {
        self.locations.get(&sprite).copied()
    }

    /// Get the priority a sprite was added with, if it's on the grid
    pub fn priority_of(&self, sprite: S) -> Option<i32> {
        let cell = self.location_of(sprite)?;
        self.occupants
            .get(&cell)?
            .iter()
            .find(|occupant| occupant.sprite == sprite)
            .map(|occupant| occupant.priority)
    }

    /// Iterate over every occupied cell along with its sprites (highest
    /// priority first)
    pub fn iter(&self) -> impl Iterator<Item = (GridPoint, Vec<S>)> + '_ {
        self.occupants.iter().map(|(cell, occupants)| {
            (*cell, occupants.iter().map(|occupant| occupant.sprite).collect())
        })
    }

    /// Number of sprites on the grid
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Like [Self::occupants_of], for callers that have already bounds-checked
    pub(crate) fn occupants_unchecked(
        &self,
        cell: GridPoint,
    ) -> impl Iterator<Item = S> + '_ {
        self.occupants
            .get(&cell)
            .into_iter()
            .flatten()
            .map(|occupant| occupant.sprite)
    }
}

/// Tells the picking engine what area of the screen a sprite covers. Sprite
/// art is owned by the caller, so the caller has to answer these questions.
///
/// Any `Fn(&S) -> Rect` is a hitbox with no transparent pixels.
pub trait SpriteHitbox<S> {
    /// The sprite's bounding rectangle, relative to the corrected anchor of
    /// the cell it stands on (see [crate::Stage::corrected_screen_anchor]).
    fn bounds(&self, sprite: &S) -> Rect;

    /// Pixel-level check, only made once the point is inside
    /// [Self::bounds]. `point` is relative to the top-left corner of the
    /// bounds. Return `false` for transparent pixels so clicks go through
    /// them. By default the whole rectangle is solid.
    fn opaque_at(&self, _sprite: &S, _point: Point2) -> bool {
        true
    }

    /// Is `point` (relative to the cell's corrected anchor) on the sprite?
    fn hit(&self, sprite: &S, point: Point2) -> bool {
        let bounds = self.bounds(sprite);
        bounds.contains(point)
            && self.opaque_at(sprite, point - Point2::new(bounds.x, bounds.y))
    }
}

impl<S, F: Fn(&S) -> Rect> SpriteHitbox<S> for F {
    fn bounds(&self, sprite: &S) -> Rect {
        self(sprite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::grid::GridError;

    fn occupants(layers: &SpriteLayers<u32>, cell: GridPoint) -> Vec<u32> {
        layers.occupants_of(cell).unwrap().collect()
    }

    #[test]
    fn test_priority_order() {
        let mut layers = SpriteLayers::new(4, 4);
        let cell = GridPoint::new(1, 1);
        layers.add_occupant(cell, 1, 0).unwrap();
        layers.add_occupant(cell, 2, 5).unwrap();
        layers.add_occupant(cell, 3, 0).unwrap();
        layers.add_occupant(cell, 4, 5).unwrap();
        layers.add_occupant(cell, 5, -1).unwrap();
        // Descending priority, ties in arrival order
        assert_eq!(occupants(&layers, cell), vec![2, 4, 1, 3, 5]);
        assert_eq!(layers.priority_of(4), Some(5));
        assert_eq!(layers.len(), 5);
    }

    #[test]
    fn test_move() {
        let mut layers = SpriteLayers::new(4, 4);
        let from = GridPoint::new(0, 0);
        let to = GridPoint::new(3, 2);
        assert_eq!(layers.add_occupant(from, 7, 0).unwrap(), None);
        assert_eq!(layers.add_occupant(to, 7, 0).unwrap(), Some(from));
        assert_eq!(occupants(&layers, from), Vec::<u32>::new());
        assert_eq!(occupants(&layers, to), vec![7]);
        assert_eq!(layers.location_of(7), Some(to));
        assert_eq!(layers.len(), 1);
        // Empty cells are dropped entirely
        assert_eq!(layers.iter().count(), 1);
    }

    /// A move to a bad cell leaves the sprite exactly where it was
    #[test]
    fn test_move_out_of_bounds() {
        let mut layers = SpriteLayers::new(4, 4);
        let cell = GridPoint::new(2, 2);
        layers.add_occupant(cell, 1, 3).unwrap();
        layers.add_occupant(cell, 7, 1).unwrap();

        let err = layers
            .add_occupant(GridPoint::new(4, 0), 7, 1)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GridError>(),
            Some(GridError::OutOfBounds { .. })
        ));
        assert_eq!(layers.location_of(7), Some(cell));
        assert_eq!(occupants(&layers, cell), vec![1, 7]);
    }

    /// A long run of interleaved moves and removals, some of them to cells
    /// off the grid, never loses or duplicates a sprite
    #[test]
    fn test_interleaved_moves() {
        let mut layers = SpriteLayers::new(3, 3);
        let mut expected: HashMap<u32, GridPoint> = HashMap::new();
        for step in 0..60 {
            let sprite = (step * 7 % 5) as u32;
            let off_grid = step % 5 == 4;
            let cell = if off_grid {
                GridPoint::new(3, step % 3)
            } else {
                GridPoint::new(step % 3, step * 2 % 3)
            };
            let result = layers.add_occupant(cell, sprite, step % 4 - 2);
            if off_grid {
                assert!(result.is_err());
            } else {
                assert_eq!(result.unwrap(), expected.insert(sprite, cell));
            }
            if step % 11 == 10 {
                let removed = (step % 5) as u32;
                assert_eq!(
                    layers.remove_occupant(removed),
                    expected.remove(&removed)
                );
            }

            let mut seen: HashMap<u32, GridPoint> = HashMap::new();
            for x in 0..3 {
                for y in 0..3 {
                    let cell = GridPoint::new(x, y);
                    for sprite in layers.occupants_of(cell).unwrap() {
                        assert_eq!(
                            seen.insert(sprite, cell),
                            None,
                            "sprite {sprite} in two cells after step {step}"
                        );
                        assert_eq!(layers.location_of(sprite), Some(cell));
                    }
                }
            }
            assert_eq!(seen, expected, "after step {step}");
            assert_eq!(layers.len(), expected.len());
        }
    }

    #[test]
    fn test_remove() {
        let mut layers = SpriteLayers::new(2, 2);
        let cell = GridPoint::new(1, 0);
        layers.add_occupant(cell, 1, 0).unwrap();
        layers.add_occupant(cell, 2, 0).unwrap();
        assert_eq!(layers.remove_occupant(1), Some(cell));
        assert_eq!(layers.remove_occupant(1), None);
        assert_eq!(occupants(&layers, cell), vec![2]);
        assert!(layers.occupants_of(GridPoint::new(-1, 0)).is_err());
    }

    #[test]
    fn test_hitbox() {
        let hitbox = |_: &u32| Rect::new(-8.0, -32.0, 16.0, 32.0);
        assert!(hitbox.hit(&0, Point2::new(0.0, -10.0)));
        assert!(!hitbox.hit(&0, Point2::new(0.0, 1.0)));

        /// Only the left half of the sprite is solid
        struct HalfSolid;
        impl SpriteHitbox<u32> for HalfSolid {
            fn bounds(&self, _: &u32) -> Rect {
                Rect::new(-8.0, -32.0, 16.0, 32.0)
            }

            fn opaque_at(&self, _: &u32, point: Point2) -> bool {
                point.x < 8.0
            }
        }
        assert!(HalfSolid.hit(&0, Point2::new(-4.0, -10.0)));
        assert!(!HalfSolid.hit(&0, Point2::new(4.0, -10.0)));
    }
}
