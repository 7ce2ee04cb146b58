//! Orderings over the grid. [DrawOrder] visits every tile back-to-front for a
//! painter's-algorithm renderer, and [CollisionCandidates] visits the handful
//! of cells that could be under a screen point, front-to-back.
//!
//! Both are written once for the canonical [CameraAngle::UL] view and then
//! rotated into the requested angle, so all four angles share one definition.

use crate::world::{
    grid::TerrainGrid,
    point::{CameraAngle, GridPoint, GridVec},
    tile::Tile,
};
use log::trace;
use std::iter::FusedIterator;

/// Step along a stripe in the camera frame. Every cell in a stripe has the
/// same `x + y`, i.e. the same distance from the viewer.
const STRIPE_DIAGONAL: GridVec = GridVec::new(1, -1);
/// Step from one stripe's first cell to the next stripe's, down the near-left
/// edge of the camera frame
const STRIPE_STEP: GridVec = GridVec::new(0, 1);
/// Once [STRIPE_STEP] runs off the grid, stripes start along the bottom edge
const STRIPE_STEP_AUXILIARY: GridVec = GridVec::new(1, 0);
/// Direction straight toward the viewer in the camera frame. A tile raised
/// by elevation appears where the ground tiles **behind** it along this
/// direction would be.
const TOWARD_VIEWER: GridVec = GridVec::new(1, 1);

/// An iterator over every tile in a grid, in back-to-front order for one
/// camera angle: if tile A is nearer the viewer than tile B, A is yielded
/// after B. Drawing tiles in this order with a painter's algorithm occludes
/// correctly. Elevation only moves a tile straight up on screen, so it never
/// changes this order.
///
/// The walk starts at the corner furthest from the viewer and sweeps
/// anti-diagonal stripes toward the nearest corner. Each tile is visited
/// exactly once. The iterator borrows the grid, so the grid can't change
/// underneath it. To restart, make a new one with
/// [TerrainGrid::iter_draw_order].
#[derive(Clone, Debug)]
pub struct DrawOrder<'a> {
    grid: &'a TerrainGrid,
    /// Next position to yield, `None` once we're done
    current: Option<GridPoint>,
    /// First cell of the stripe we're currently walking
    stripe_origin: GridPoint,
    diagonal: GridVec,
    stripe_step: GridVec,
    stripe_step_auxiliary: GridVec,
    remaining: usize,
}

impl<'a> DrawOrder<'a> {
    pub fn new(grid: &'a TerrainGrid, angle: CameraAngle) -> Self {
        let (width, height) = grid.dimensions();
        // The furthest corner is always the origin of the camera frame
        let start =
            GridPoint::ORIGIN.from_camera_frame(angle, width, height);
        let current = if grid.is_empty() { None } else { Some(start) };
        trace!("Draw order for {} starts at {}", angle, start);

        Self {
            grid,
            current,
            stripe_origin: start,
            diagonal: STRIPE_DIAGONAL.from_camera_frame(angle),
            stripe_step: STRIPE_STEP.from_camera_frame(angle),
            stripe_step_auxiliary: STRIPE_STEP_AUXILIARY
                .from_camera_frame(angle),
            remaining: grid.len(),
        }
    }

    /// Find the cell to yield after `pos`: the next cell along the current
    /// stripe, or the start of the next stripe.
    fn successor(&mut self, pos: GridPoint) -> Option<GridPoint> {
        let along_stripe = pos + self.diagonal;
        if self.grid.has_tile(along_stripe) {
            return Some(along_stripe);
        }

        let grid = self.grid;
        let next_origin = [self.stripe_step, self.stripe_step_auxiliary]
            .iter()
            .map(|step| self.stripe_origin + *step)
            .find(|origin| grid.has_tile(*origin))?;
        self.stripe_origin = next_origin;
        Some(next_origin)
    }
}

impl<'a> Iterator for DrawOrder<'a> {
    type Item = (GridPoint, &'a Tile);

    fn next(&mut self) -> Option<Self::Item> {
        let pos = self.current?;
        self.current = self.successor(pos);
        self.remaining -= 1;
        Some((pos, self.grid.tile_unchecked(pos)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a> ExactSizeIterator for DrawOrder<'a> {}

impl<'a> FusedIterator for DrawOrder<'a> {}

/// Offsets (in the camera frame) of the three parallel lines that make up the
/// candidate set, relative to the seed. Within one step along the lines, the
/// two offset lines are one stripe nearer the viewer than the center line, so
/// they're listed first.
const CANDIDATE_LINES: [GridVec; 3] =
    [GridVec::new(1, 0), GridVec::new(0, 1), GridVec::ZERO];

/// An iterator over the cells that could visually cover a screen point, in
/// front-to-back order. This is the candidate list for picking.
///
/// Converting a screen point straight to a grid cell (the **seed**) only
/// gives the right answer for unelevated tiles. A raised tile is drawn
/// higher up the screen than its grid position, so it can cover the seed's
/// screen location while sitting nearer the viewer in the grid. Moving the
/// point straight down the screen walks along the camera frame's
/// toward-viewer diagonal, crossing the seed's diagonal line and one of the
/// two lines next to it. Any tile that covers the point sits on one of those
/// three lines, at or in front of the seed.
///
/// The walk starts at the far intercept, where the lines run off the near
/// edge of the grid, and walks back toward the seed. The three lines are
/// interleaved by distance from the viewer, so the first candidate whose
/// footprint contains the point is the one drawn on top. When the seed's own
/// line misses the grid (e.g. the point is above the map), the neighboring
/// lines still get a chance, which is the same as retrying with the seed
/// shifted one cell horizontally or vertically. Only cells inside the grid
/// are produced. If nothing is produced, nothing is under the point.
#[derive(Clone, Debug)]
pub struct CollisionCandidates {
    angle: CameraAngle,
    /// Dimensions of the unrotated grid
    width: i32,
    height: i32,
    /// Dimensions of the camera frame
    camera_width: i32,
    camera_height: i32,
    /// Seed position in the camera frame
    seed: GridPoint,
    /// Current number of steps from the seed toward the viewer
    step: i32,
    /// Index into [CANDIDATE_LINES] of the next line to check at this step
    line: usize,
    /// The walk is over once `step` drops below this
    last_step: i32,
}

/// Turn a rounded screen pre-image `(u, v)` (in the camera frame) into a
/// seed cell for [CollisionCandidates]. Pre-images far behind the grid are
/// slid toward the viewer and ones far in front are clamped. Neither changes
/// which in-bounds cells the candidate walk visits, but both keep the seed
/// small enough that the walk's arithmetic can't overflow. A non-finite
/// pre-image gives a seed with no candidates at all.
pub(crate) fn camera_seed(
    u: f64,
    v: f64,
    camera_width: i32,
    camera_height: i32,
) -> GridPoint {
    // Any line more than this far out never touches the grid
    let band = f64::from(camera_width) + f64::from(camera_height) + 2.0;
    if !(u.is_finite() && v.is_finite()) {
        return GridPoint::new(band as i32, band as i32);
    }

    // Sliding along the toward-viewer diagonal only skips steps where both
    // coordinates are still negative
    let nearest = u.min(v);
    let (u, v) = if nearest < -band {
        (u - nearest - band, v - nearest - band)
    } else {
        (u, v)
    };
    GridPoint::new(u.min(band) as i32, v.min(band) as i32)
}

impl CollisionCandidates {
    /// Build the candidate list for a seed cell (which may be outside the
    /// grid) in a `width × height` grid, viewed from `angle`.
    pub fn new(
        seed: GridPoint,
        angle: CameraAngle,
        width: i32,
        height: i32,
    ) -> Self {
        let (camera_width, camera_height) =
            angle.camera_dimensions(width, height);
        let camera_seed = seed.to_camera_frame(angle, width, height);

        // For each line, find the range of steps that land inside the grid.
        // Steps are never negative: cells behind the seed can't cover it.
        let ranges = CANDIDATE_LINES.iter().filter_map(|offset| {
            let base = camera_seed + *offset;
            let first = 0.max(-base.x()).max(-base.y());
            let last = (camera_width - 1 - base.x())
                .min(camera_height - 1 - base.y());
            if first <= last {
                Some((first, last))
            } else {
                None
            }
        });
        let (first_step, last_step) = ranges.fold(
            (i32::MAX, i32::MIN),
            |(acc_first, acc_last), (first, last)| {
                (acc_first.min(first), acc_last.max(last))
            },
        );
        // If no line reaches the grid, `last_step` < `first_step` and the
        // iterator starts out exhausted
        trace!(
            "Collision candidates for seed {} ({}): steps {}..={}",
            seed,
            angle,
            first_step,
            last_step
        );

        Self {
            angle,
            width,
            height,
            camera_width,
            camera_height,
            seed: camera_seed,
            step: last_step,
            line: 0,
            last_step: first_step,
        }
    }

    fn in_camera_bounds(&self, pos: GridPoint) -> bool {
        (0..self.camera_width).contains(&pos.x())
            && (0..self.camera_height).contains(&pos.y())
    }
}

impl Iterator for CollisionCandidates {
    type Item = GridPoint;

    fn next(&mut self) -> Option<Self::Item> {
        while self.step >= self.last_step {
            let cell = self.seed.translate(TOWARD_VIEWER, self.step)
                + CANDIDATE_LINES[self.line];
            self.line += 1;
            if self.line == CANDIDATE_LINES.len() {
                self.line = 0;
                self.step -= 1;
            }

            if self.in_camera_bounds(cell) {
                return Some(cell.from_camera_frame(
                    self.angle,
                    self.width,
                    self.height,
                ));
            }
        }
        None
    }
}

impl FusedIterator for CollisionCandidates {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::point::GridPointMap;
    use strum::IntoEnumIterator;

    /// Distance from the viewer, in stripes. Bigger is nearer.
    fn depth(pos: GridPoint, angle: CameraAngle, grid: &TerrainGrid) -> i32 {
        let (width, height) = grid.dimensions();
        let camera = pos.to_camera_frame(angle, width, height);
        camera.x() + camera.y()
    }

    #[test]
    fn test_draw_order_complete_and_unique() {
        for (width, height) in [(1, 1), (1, 5), (5, 1), (3, 3), (4, 7), (8, 2)]
        {
            let grid = TerrainGrid::filled(width, height, Tile::default());
            for angle in CameraAngle::iter() {
                let order: Vec<GridPoint> =
                    grid.iter_draw_order(angle).map(|(pos, _)| pos).collect();
                assert_eq!(order.len(), width * height);
                let mut seen = order.clone();
                seen.sort();
                seen.dedup();
                assert_eq!(
                    seen.len(),
                    width * height,
                    "duplicates in {width}x{height} {angle}"
                );
                assert!(order.iter().all(|pos| grid.has_tile(*pos)));
            }
        }
    }

    #[test]
    fn test_draw_order_back_to_front() {
        let grid = TerrainGrid::filled(5, 3, Tile::default());
        for angle in CameraAngle::iter() {
            let depths: Vec<i32> = grid
                .iter_draw_order(angle)
                .map(|(pos, _)| depth(pos, angle, &grid))
                .collect();
            assert!(
                depths.windows(2).all(|pair| pair[0] <= pair[1]),
                "depths out of order for {angle}: {depths:?}"
            );
        }
    }

    #[test]
    fn test_draw_order_starts_at_far_corner() {
        let grid = TerrainGrid::filled(4, 3, Tile::default());
        let first = |angle| grid.iter_draw_order(angle).next().unwrap().0;
        assert_eq!(first(CameraAngle::UL), GridPoint::new(0, 0));
        assert_eq!(first(CameraAngle::UR), GridPoint::new(3, 0));
        assert_eq!(first(CameraAngle::LL), GridPoint::new(0, 2));
        assert_eq!(first(CameraAngle::LR), GridPoint::new(3, 2));

        let last = |angle| grid.iter_draw_order(angle).last().unwrap().0;
        assert_eq!(last(CameraAngle::UL), GridPoint::new(3, 2));
        assert_eq!(last(CameraAngle::LR), GridPoint::new(0, 0));
    }

    #[test]
    fn test_draw_order_exact_size_and_restart() {
        let grid = TerrainGrid::filled(3, 4, Tile::default());
        let mut order = grid.iter_draw_order(CameraAngle::LL);
        assert_eq!(order.len(), 12);
        order.next();
        order.next();
        assert_eq!(order.len(), 10);
        // A fresh iterator starts over
        assert_eq!(grid.iter_draw_order(CameraAngle::LL).count(), 12);
    }

    #[test]
    fn test_draw_order_empty_grid() {
        let grid = TerrainGrid::filled(0, 3, Tile::default());
        assert_eq!(grid.iter_draw_order(CameraAngle::UR).count(), 0);
    }

    #[test]
    fn test_candidates_nearest_first() {
        let grid = TerrainGrid::filled(6, 5, Tile::default());
        let (width, height) = grid.dimensions();
        for angle in CameraAngle::iter() {
            for x in -2..width + 2 {
                for y in -2..height + 2 {
                    let seed = GridPoint::new(x, y);
                    let candidates: Vec<GridPoint> =
                        CollisionCandidates::new(seed, angle, width, height)
                            .collect();
                    assert!(candidates.iter().all(|pos| grid.has_tile(*pos)));
                    let depths: Vec<i32> = candidates
                        .iter()
                        .map(|pos| depth(*pos, angle, &grid))
                        .collect();
                    assert!(
                        depths.windows(2).all(|pair| pair[0] >= pair[1]),
                        "candidates for {seed} {angle} not front-to-back: \
                         {candidates:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_candidates_cover_seed_and_neighbors() {
        let (width, height) = (5, 5);
        let seed = GridPoint::new(1, 2);
        let candidates: Vec<GridPoint> =
            CollisionCandidates::new(seed, CameraAngle::UL, width, height)
                .collect();
        // The seed itself is the farthest candidate
        assert_eq!(candidates.last(), Some(&seed));
        // Then everything down the diagonal toward the viewer, plus the two
        // neighboring lines
        for pos in [
            GridPoint::new(2, 3),
            GridPoint::new(3, 4),
            GridPoint::new(2, 2),
            GridPoint::new(1, 3),
            GridPoint::new(4, 4),
        ] {
            assert!(candidates.contains(&pos), "missing {pos}");
        }
        // Nothing behind the seed
        assert!(!candidates.contains(&GridPoint::new(0, 1)));
        assert_eq!(candidates.len(), 8);
    }

    #[test]
    fn test_candidates_from_outside_grid() {
        // Seed just above the far corner. Its own line enters the grid at
        // (0, 0), and the neighbor lines enter at (1, 0) and (0, 1).
        let candidates: Vec<GridPoint> = CollisionCandidates::new(
            GridPoint::new(-1, -1),
            CameraAngle::UL,
            3,
            3,
        )
        .collect();
        assert_eq!(candidates.last(), Some(&GridPoint::new(0, 0)));
        assert_eq!(candidates.len(), 7);

        // Way off to the side, no line can reach the grid
        assert_eq!(
            CollisionCandidates::new(
                GridPoint::new(10, -10),
                CameraAngle::UL,
                3,
                3
            )
            .count(),
            0
        );
    }

    /// Seeds far behind the grid are slid up to it without changing the
    /// candidates, and seeds far in front or at infinity have none
    #[test]
    fn test_camera_seed() {
        let candidates = |seed| -> Vec<GridPoint> {
            CollisionCandidates::new(seed, CameraAngle::UL, 3, 3).collect()
        };

        assert_eq!(camera_seed(1.0, 2.0, 3, 3), GridPoint::new(1, 2));
        assert_eq!(camera_seed(-1e9, -1e9, 3, 3), GridPoint::new(-8, -8));
        assert_eq!(
            candidates(camera_seed(-1e9, -1e9, 3, 3)),
            candidates(GridPoint::new(-1, -1))
        );
        assert_eq!(camera_seed(-1e9, -1e9 + 1.0, 3, 3), GridPoint::new(-8, -7));
        assert_eq!(
            candidates(camera_seed(-1e9, -1e9 + 1.0, 3, 3)),
            candidates(GridPoint::new(-1, 0))
        );

        for (u, v) in [
            (1e12, 5.0),
            (-1e12, 1e12),
            (1e300, -1e300),
            (f64::NAN, 0.0),
            (f64::INFINITY, f64::NEG_INFINITY),
        ] {
            assert_eq!(candidates(camera_seed(u, v, 3, 3)), vec![], "{u}, {v}");
        }
    }

    #[test]
    fn test_candidates_unique() {
        let (width, height) = (4, 6);
        for angle in CameraAngle::iter() {
            let mut counts: GridPointMap<usize> = GridPointMap::default();
            for pos in
                CollisionCandidates::new(GridPoint::new(1, 1), angle, width, height)
            {
                *counts.entry(pos).or_default() += 1;
            }
            assert!(counts.values().all(|count| *count == 1));
        }
    }
}
