//! Isoterra is the geometry core of a tile-based isometric renderer. It
//! projects a rectangular grid of tiles from one of four fixed camera angles,
//! tells a painter's-algorithm renderer what order to draw tiles in, and
//! resolves screen points back to the tile (or sprite) the user perceives as
//! under the cursor, even when tiles are raised or sloped.
//!
//! Rendering itself is left to the caller. This crate only produces anchors,
//! footprint polygons and orderings.
//!
//! ```
//! use isoterra::{CameraAngle, ProjectionConfig, Stage, TerrainGrid, Tile};
//!
//! let grid = TerrainGrid::filled(8, 8, Tile::default());
//! let stage: Stage<u32> = Stage::new(grid, ProjectionConfig::default()).unwrap();
//! for (pos, _tile) in stage.iter_tiles(CameraAngle::UL) {
//!     // Screen-space outline of the tile, already moved to its anchor
//!     let anchor = stage.corrected_screen_anchor(pos, CameraAngle::UL).unwrap();
//!     let footprint = stage.screen_footprint(pos, CameraAngle::UL).unwrap();
//!     assert!(footprint.contains(anchor));
//! }
//! let picked = stage.mouse_tile_collision(
//!     stage.to_screen(isoterra::GridPoint::new(3, 4), CameraAngle::UL),
//!     CameraAngle::UL,
//! );
//! assert_eq!(picked, Some(isoterra::GridPoint::new(3, 4)));
//! ```
//!
//! See [ProjectionConfig] for the tunable projection constants.

mod config;
mod render;
mod stage;
mod util;
mod world;

pub use crate::{
    config::ProjectionConfig,
    render::{
        footprint::{contains_point, Footprint},
        IsoProjection,
    },
    stage::{
        highlight::HighlightLayers,
        sprite::{SpriteHitbox, SpriteLayers},
        Stage,
    },
    util::unit::{Color3, Point2, Rect},
    world::{
        grid::{GridError, TerrainGrid},
        point::{
            CameraAngle, GridPoint, GridPointIndexMap, GridPointMap,
            GridPointSet, GridVec,
        },
        tile::{Slope, TextureId, Tile, TileFlags},
        traverse::{CollisionCandidates, DrawOrder},
    },
};
