use crate::world::{
    point::{CameraAngle, GridPoint},
    tile::Tile,
    traverse::DrawOrder,
};
use derive_more::Display;
use log::debug;
use serde::{Deserialize, Serialize};

/// Errors for operations on the grid (and the layers built on top of it).
/// These are all precondition violations on the caller's part: nothing in
/// this crate clamps a bad position into range, because a clamped position
/// would silently corrupt draw and pick order.
///
/// Fallible functions in this crate return [anyhow::Result]; when the cause
/// is one of these, it can be recovered with `err.downcast_ref::<GridError>()`.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum GridError {
    /// A position outside `[0, width) × [0, height)` was accessed
    #[display(fmt = "position {} is outside the {}x{} grid", pos, width, height)]
    OutOfBounds {
        pos: GridPoint,
        width: usize,
        height: usize,
    },
    /// A grid was built from the wrong number of tiles
    #[display(
        fmt = "a {}x{} grid needs {} tiles, but {} were given",
        width,
        height,
        "width * height",
        len
    )]
    TileCountMismatch {
        width: usize,
        height: usize,
        len: usize,
    },
    /// A highlight layer index that doesn't exist
    #[display(fmt = "highlight layer {} does not exist ({} layers)", layer, layers)]
    InvalidLayer { layer: usize, layers: usize },
}

impl std::error::Error for GridError {}

/// A fixed-size, dense, rectangular grid of tiles. The dimensions are set at
/// construction and every position inside them always holds exactly one tile.
///
/// Tiles are stored row-major. Tiles are only ever replaced wholesale (see
/// [Tile]), and the borrow checker guarantees nobody is iterating over the
/// grid while a tile is being replaced.
///
/// ## Serialization
/// A grid serializes as `{"width": .., "height": .., "tiles": [..]}`, with the
/// tiles in row-major order. Deserialization runs the same length check as
/// [Self::new], so a tile list of the wrong length is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridData", into = "GridData")]
pub struct TerrainGrid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl TerrainGrid {
    /// Build a grid from a row-major list of tiles. Returns an error if the
    /// list doesn't contain exactly `width * height` tiles.
    pub fn new(
        width: usize,
        height: usize,
        tiles: Vec<Tile>,
    ) -> anyhow::Result<Self> {
        if tiles.len() != width * height {
            return Err(GridError::TileCountMismatch {
                width,
                height,
                len: tiles.len(),
            }
            .into());
        }
        debug!("Created {}x{} terrain grid", width, height);
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// Build a grid where every cell holds the same tile
    pub fn filled(width: usize, height: usize, tile: Tile) -> Self {
        Self {
            width,
            height,
            tiles: vec![tile; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of tiles in the grid
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Is the given position inside the grid?
    pub fn has_tile(&self, pos: GridPoint) -> bool {
        self.index(pos).is_some()
    }

    /// Get the tile at a position. Returns an error if the position is
    /// outside the grid.
    pub fn tile(&self, pos: GridPoint) -> anyhow::Result<&Tile> {
        let index = self.checked_index(pos)?;
        Ok(&self.tiles[index])
    }

    /// Replace the tile at a position, returning the old one. Returns an
    /// error if the position is outside the grid.
    pub fn set_tile(
        &mut self,
        pos: GridPoint,
        tile: Tile,
    ) -> anyhow::Result<Tile> {
        let index = self.checked_index(pos)?;
        Ok(std::mem::replace(&mut self.tiles[index], tile))
    }

    /// Iterate over every tile with its position, in row-major order. This is
    /// **not** a valid draw order; use [Self::iter_draw_order] for that.
    pub fn iter(&self) -> impl Iterator<Item = (GridPoint, &Tile)> {
        let width = self.width;
        self.tiles.iter().enumerate().map(move |(i, tile)| {
            (GridPoint::new((i % width) as i32, (i / width) as i32), tile)
        })
    }

    /// Iterate over every tile in back-to-front order for the given camera
    /// angle. See [DrawOrder].
    pub fn iter_draw_order(&self, angle: CameraAngle) -> DrawOrder<'_> {
        DrawOrder::new(self, angle)
    }

    /// Dimensions as signed values, for point math
    pub(crate) fn dimensions(&self) -> (i32, i32) {
        (self.width as i32, self.height as i32)
    }

    /// Like [Self::tile], for callers that have already bounds-checked
    pub(crate) fn tile_unchecked(&self, pos: GridPoint) -> &Tile {
        &self.tiles[self.flat_index(pos)]
    }

    fn checked_index(&self, pos: GridPoint) -> anyhow::Result<usize> {
        check_bounds(pos, self.width, self.height)?;
        Ok(self.flat_index(pos))
    }

    fn index(&self, pos: GridPoint) -> Option<usize> {
        if in_bounds(pos, self.width, self.height) {
            Some(self.flat_index(pos))
        } else {
            None
        }
    }

    fn flat_index(&self, pos: GridPoint) -> usize {
        pos.y() as usize * self.width + pos.x() as usize
    }

    /// Deserialize a grid from JSON. A grid can be serialized into JSON with
    /// [Self::to_json]. Will fail if the input is malformed or the tile count
    /// doesn't match the dimensions.
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        use anyhow::Context;
        serde_json::from_str(json).context("error deserializing grid")
    }

    /// Serializes this grid into JSON. This is a recoverable format, which
    /// can be loaded back with [Self::from_json].
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> String {
        // Panic here indicates an internal bug in the data format
        serde_json::to_string(self).expect("error serializing grid")
    }
}

/// Is the position inside a `width × height` grid?
fn in_bounds(pos: GridPoint, width: usize, height: usize) -> bool {
    let (x, y) = (pos.x(), pos.y());
    x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height
}

/// Return an error if the position is outside a `width × height` grid. Used
/// by everything layered on top of a grid that needs the same bounds.
pub(crate) fn check_bounds(
    pos: GridPoint,
    width: usize,
    height: usize,
) -> anyhow::Result<()> {
    if in_bounds(pos, width, height) {
        Ok(())
    } else {
        Err(GridError::OutOfBounds { pos, width, height }.into())
    }
}

/// Plain structural form of a grid, used for (de)serialization
#[derive(Clone, Debug, Serialize, Deserialize)]
struct GridData {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl TryFrom<GridData> for TerrainGrid {
    type Error = GridError;

    fn try_from(data: GridData) -> Result<Self, Self::Error> {
        if data.tiles.len() != data.width * data.height {
            Err(GridError::TileCountMismatch {
                width: data.width,
                height: data.height,
                len: data.tiles.len(),
            })
        } else {
            Ok(Self {
                width: data.width,
                height: data.height,
                tiles: data.tiles,
            })
        }
    }
}

impl From<TerrainGrid> for GridData {
    fn from(grid: TerrainGrid) -> Self {
        Self {
            width: grid.width,
            height: grid.height,
            tiles: grid.tiles,
        }
    }
}
