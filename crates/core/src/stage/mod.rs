pub mod highlight;
pub mod sprite;

use crate::{
    config::ProjectionConfig,
    render::{footprint::Footprint, IsoProjection},
    stage::{
        highlight::HighlightLayers,
        sprite::{SpriteHitbox, SpriteLayers},
    },
    util::unit::Point2,
    world::{
        grid::TerrainGrid,
        point::{CameraAngle, GridPoint},
        tile::Tile,
        traverse::{CollisionCandidates, DrawOrder},
    },
};
use log::{info, trace};
use std::hash::Hash;

/// A stage is everything needed to draw one map and pick things on it: the
/// terrain, the sprites standing on it, the highlight overlays, and the
/// projection that puts them all on screen. `S` is the caller's sprite
/// handle type.
///
/// The stage never holds a camera angle. Every query takes the angle it
/// should be answered for, so the caller is free to rotate the view at any
/// time.
///
/// ```
/// use isoterra::{CameraAngle, GridPoint, ProjectionConfig, Rect, Stage, TerrainGrid, Tile};
///
/// let mut grid = TerrainGrid::filled(8, 8, Tile::default());
/// grid.set_tile(GridPoint::new(4, 1), Tile::default().with_elevation(2))?;
/// let mut stage: Stage<&str> = Stage::new(grid, ProjectionConfig::default())?;
/// stage.sprites_mut().add_occupant(GridPoint::new(4, 1), "knight", 0)?;
///
/// let click = stage.corrected_screen_anchor(GridPoint::new(4, 1), CameraAngle::UL)?;
/// assert_eq!(
///     stage.mouse_tile_collision(click, CameraAngle::UL),
///     Some(GridPoint::new(4, 1)),
/// );
/// let hitbox = |_: &&str| Rect::new(-8.0, -40.0, 16.0, 40.0);
/// assert_eq!(
///     stage.mouse_sprite_collision(click, CameraAngle::UL, &hitbox),
///     Some("knight"),
/// );
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Stage<S> {
    grid: TerrainGrid,
    projection: IsoProjection,
    sprites: SpriteLayers<S>,
    highlights: HighlightLayers,
}

impl<S: Copy + Eq + Hash> Stage<S> {
    /// Set up a stage for a grid, with no sprites and no highlight layers.
    /// Returns an error if the projection config is invalid.
    pub fn new(grid: TerrainGrid, config: ProjectionConfig) -> anyhow::Result<Self> {
        let projection = IsoProjection::new(config)?;
        let sprites = SpriteLayers::new(grid.width(), grid.height());
        let highlights = HighlightLayers::new(grid.width(), grid.height());
        info!("Created stage for {}x{} grid", grid.width(), grid.height());
        Ok(Self {
            grid,
            projection,
            sprites,
            highlights,
        })
    }

    /// Get a reference to the terrain
    pub fn grid(&self) -> &TerrainGrid {
        &self.grid
    }

    /// Get a reference to the projection this stage is drawn with
    pub fn projection(&self) -> &IsoProjection {
        &self.projection
    }

    /// Get the tile at a position. Returns an error if the position is
    /// outside the grid.
    pub fn tile(&self, pos: GridPoint) -> anyhow::Result<&Tile> {
        self.grid.tile(pos)
    }

    /// Replace the tile at a position, returning the old one. See
    /// [TerrainGrid::set_tile].
    pub fn set_tile(&mut self, pos: GridPoint, tile: Tile) -> anyhow::Result<Tile> {
        self.grid.set_tile(pos, tile)
    }

    pub fn has_tile(&self, pos: GridPoint) -> bool {
        self.grid.has_tile(pos)
    }

    /// Iterate over every tile in draw order for a camera angle. See
    /// [DrawOrder].
    pub fn iter_tiles(&self, angle: CameraAngle) -> DrawOrder<'_> {
        self.grid.iter_draw_order(angle)
    }

    /// Iterate over the cells that could be under a screen point whose
    /// screen-to-grid conversion gave `seed`. See [CollisionCandidates].
    pub fn iter_collision_candidates(
        &self,
        seed: GridPoint,
        angle: CameraAngle,
    ) -> CollisionCandidates {
        let (width, height) = self.grid.dimensions();
        CollisionCandidates::new(seed, angle, width, height)
    }

    /// Get the screen anchor of a cell, ignoring elevation. See
    /// [IsoProjection::to_screen].
    pub fn to_screen(&self, pos: GridPoint, angle: CameraAngle) -> Point2 {
        let (width, height) = self.grid.dimensions();
        self.projection.to_screen(pos, angle, width, height)
    }

    /// Get the cell whose **unelevated** top face contains a screen point.
    /// This may be outside the grid. Use [Self::mouse_tile_collision] to find
    /// what the user actually sees under the point.
    pub fn from_screen(&self, point: Point2, angle: CameraAngle) -> GridPoint {
        let (width, height) = self.grid.dimensions();
        self.projection.from_screen(point, angle, width, height)
    }

    /// Get the screen position of the center of a tile's top face, including
    /// its elevation. Returns an error if the position is outside the grid.
    pub fn corrected_screen_anchor(
        &self,
        pos: GridPoint,
        angle: CameraAngle,
    ) -> anyhow::Result<Point2> {
        let tile = self.grid.tile(pos)?;
        Ok(self.corrected_anchor_unchecked(tile, pos, angle))
    }

    /// Get a tile's on-screen outline, positioned at its corrected anchor.
    /// Returns an error if the position is outside the grid.
    pub fn screen_footprint(
        &self,
        pos: GridPoint,
        angle: CameraAngle,
    ) -> anyhow::Result<Footprint> {
        let tile = self.grid.tile(pos)?;
        Ok(self
            .projection
            .footprint(tile, angle)
            .translate(self.corrected_anchor_unchecked(tile, pos, angle)))
    }

    /// Find the tile that appears under a screen point, taking elevation and
    /// slope into account. When tiles overlap on screen, the one drawn on top
    /// wins. Returns `None` if the point isn't over any tile.
    pub fn mouse_tile_collision(
        &self,
        point: Point2,
        angle: CameraAngle,
    ) -> Option<GridPoint> {
        let seed = self.from_screen(point, angle);
        let hit = self.iter_collision_candidates(seed, angle).find(|pos| {
            let tile = self.grid.tile_unchecked(*pos);
            let anchor = self.corrected_anchor_unchecked(tile, *pos, angle);
            self.projection
                .footprint(tile, angle)
                .contains(point - anchor)
        });
        trace!("Tile pick at {} ({}): seed {}, hit {:?}", point, angle, seed, hit);
        hit
    }

    /// Find the sprite that appears under a screen point. Cells are checked
    /// front to back, and within a cell sprites are checked highest priority
    /// first, so the first sprite hit is the one drawn on top. The hitbox
    /// decides what area each sprite covers. Returns `None` if the point
    /// isn't over any sprite.
    ///
    /// Only cells that could be under the point are considered (the same
    /// cells as [Self::mouse_tile_collision]). A sprite that sticks out
    /// sideways past its cell's diamond can't be picked from the part that
    /// sticks out.
    pub fn mouse_sprite_collision(
        &self,
        point: Point2,
        angle: CameraAngle,
        hitbox: &impl SpriteHitbox<S>,
    ) -> Option<S> {
        let seed = self.from_screen(point, angle);
        let hit = self
            .iter_collision_candidates(seed, angle)
            .find_map(|pos| {
                let tile = self.grid.tile_unchecked(pos);
                let anchor = self.corrected_anchor_unchecked(tile, pos, angle);
                self.sprites
                    .occupants_unchecked(pos)
                    .find(|sprite| hitbox.hit(sprite, point - anchor))
            });
        trace!(
            "Sprite pick at {} ({}): seed {}, hit: {}",
            point,
            angle,
            seed,
            hit.is_some()
        );
        hit
    }

    /// Get a reference to the sprites on this stage
    pub fn sprites(&self) -> &SpriteLayers<S> {
        &self.sprites
    }

    /// Get a mutable reference to the sprites on this stage, to add, move or
    /// remove them
    pub fn sprites_mut(&mut self) -> &mut SpriteLayers<S> {
        &mut self.sprites
    }

    /// Get a reference to the highlight overlays on this stage
    pub fn highlights(&self) -> &HighlightLayers {
        &self.highlights
    }

    /// Get a mutable reference to the highlight overlays on this stage
    pub fn highlights_mut(&mut self) -> &mut HighlightLayers {
        &mut self.highlights
    }

    /// Render this stage as a 2D SVG from the given camera angle. Returns the
    /// SVG in a string.
    #[cfg(feature = "svg")]
    pub fn render_as_svg(&self, angle: CameraAngle) -> String {
        let svg = crate::timed!(
            "SVG rendering",
            crate::render::svg::stage_to_svg(self, angle)
        );
        svg.to_string()
    }

    fn corrected_anchor_unchecked(
        &self,
        tile: &Tile,
        pos: GridPoint,
        angle: CameraAngle,
    ) -> Point2 {
        let (width, height) = self.grid.dimensions();
        self.projection
            .corrected_anchor(tile, pos, angle, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{util::unit::Rect, world::tile::Slope};
    use strum::IntoEnumIterator;

    fn stage(width: usize, height: usize) -> Stage<u32> {
        Stage::new(
            TerrainGrid::filled(width, height, Tile::default()),
            ProjectionConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_pick_flat() {
        let stage = stage(4, 4);
        for angle in CameraAngle::iter() {
            for (pos, _) in stage.iter_tiles(angle) {
                let anchor = stage.to_screen(pos, angle);
                assert_eq!(
                    stage.mouse_tile_collision(anchor, angle),
                    Some(pos),
                    "{pos} from {angle}"
                );
            }
        }
    }

    #[test]
    fn test_pick_off_map() {
        let stage = stage(4, 4);
        assert_eq!(
            stage.mouse_tile_collision(Point2::new(-50.0, -50.0), CameraAngle::UL),
            None
        );
        assert_eq!(
            stage.mouse_tile_collision(Point2::new(5000.0, 10.0), CameraAngle::LR),
            None
        );
    }

    /// A raised tile in front covers the top of the tile behind it
    #[test]
    fn test_pick_occluded() {
        let mut stage = stage(4, 4);
        let behind = GridPoint::new(1, 1);
        let front = GridPoint::new(2, 2);
        stage
            .set_tile(front, Tile::default().with_elevation(2))
            .unwrap();
        // Just below the top vertex of the raised tile
        let nudge = Point2::new(0.0, 2.0);
        let point = stage.to_screen(behind, CameraAngle::UL) + nudge;
        assert_eq!(
            stage.mouse_tile_collision(point, CameraAngle::UL),
            Some(front)
        );
        // From the other side, the raised tile is behind and the flat one
        // isn't covered
        let point = stage.to_screen(behind, CameraAngle::LR) + nudge;
        assert_eq!(
            stage.mouse_tile_collision(point, CameraAngle::LR),
            Some(behind)
        );
    }

    #[test]
    fn test_pick_slope_edge() {
        let mut stage = stage(4, 4);
        let pos = GridPoint::new(1, 1);
        stage
            .set_tile(pos, Tile::default().with_slope(Slope::N))
            .unwrap();
        // Just above the flat top vertex, inside the raised part
        let point = stage.to_screen(pos, CameraAngle::UL) + Point2::new(0.0, -20.0);
        assert_eq!(stage.mouse_tile_collision(point, CameraAngle::UL), Some(pos));
        // Raised edge is at the bottom of the screen from LR, so the same
        // point misses it
        let point = stage.to_screen(pos, CameraAngle::LR) + Point2::new(0.0, -20.0);
        assert_ne!(stage.mouse_tile_collision(point, CameraAngle::LR), Some(pos));
    }

    #[test]
    fn test_pick_sprite_priority() {
        let mut stage = stage(4, 4);
        let pos = GridPoint::new(2, 1);
        stage.sprites_mut().add_occupant(pos, 1, 0).unwrap();
        stage.sprites_mut().add_occupant(pos, 2, 10).unwrap();
        let hitbox = |_: &u32| Rect::new(-10.0, -30.0, 20.0, 30.0);

        let anchor = stage.corrected_screen_anchor(pos, CameraAngle::UL).unwrap();
        assert_eq!(
            stage.mouse_sprite_collision(anchor, CameraAngle::UL, &hitbox),
            Some(2)
        );
        assert_eq!(
            stage.mouse_sprite_collision(
                anchor + Point2::new(0.0, 10.0),
                CameraAngle::UL,
                &hitbox
            ),
            None
        );
    }

    #[test]
    fn test_screen_footprint() {
        let stage = stage(2, 2);
        let pos = GridPoint::new(1, 0);
        let footprint = stage.screen_footprint(pos, CameraAngle::UL).unwrap();
        assert!(footprint.contains(stage.to_screen(pos, CameraAngle::UL)));
        assert!(stage.screen_footprint(GridPoint::new(2, 0), CameraAngle::UL).is_err());
    }
}
