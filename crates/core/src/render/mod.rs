pub mod footprint;
#[cfg(feature = "svg")]
pub mod svg;

use crate::{
    config::ProjectionConfig,
    render::footprint::Footprint,
    util::unit::Point2,
    world::{
        point::{CameraAngle, GridPoint},
        tile::{Slope, Tile},
        traverse::camera_seed,
    },
};
use anyhow::{anyhow, Context};
use log::debug;
use nalgebra::{Matrix2, Vector2};
use validator::Validate;

/// Converts between grid positions and screen space for one set of
/// [ProjectionConfig] constants. A projection is created once from a config
/// and then shared by everything that needs to place or pick tiles.
///
/// Config options cannot be changed after creating a projection, but
/// projections are very cheap to create so if you need to change the config,
/// just create a new one.
///
/// ## Screen Space
/// Screen space is the 2D plane the map is drawn on. Right is positive x and
/// **down** is positive y. The origin is the top-left corner of the bounding
/// box of the (unelevated) tile furthest from the viewer, so every tile's
/// anchor has positive coordinates.
///
/// The grid is first rotated into the camera frame of the requested angle
/// (see [crate::world::point]), then the camera-frame position `(u, v)` is
/// sheared onto the screen:
///
/// ```text
/// x = (u - v) * half_width  + half_width
/// y = (u + v) * half_height + half_height
/// ```
///
/// All of these functions are pure, and none of them check the grid bounds.
#[derive(Clone, Debug)]
pub struct IsoProjection {
    config: ProjectionConfig,
    /// Linear part of the camera frame -> screen transform
    projection: Matrix2<f64>,
    /// Inverse of [Self::projection], computed once up front
    inverse: Matrix2<f64>,
}

impl IsoProjection {
    /// Initialize a new projection with the given constants. Returns an error
    /// if the config is invalid.
    pub fn new(config: ProjectionConfig) -> anyhow::Result<Self> {
        config.validate().context("invalid projection config")?;

        let hw = config.tile_half_width;
        let hh = config.tile_half_height;
        let projection = Matrix2::new(hw, -hw, hh, hh);
        // Validation should make this unreachable, but a zero-size tile would
        // collapse the projection
        let inverse = projection.try_inverse().ok_or_else(|| {
            anyhow!("projection for {:?} is not invertible", config)
        })?;
        debug!("Created isometric projection with {:?}", config);

        Ok(Self {
            config,
            projection,
            inverse,
        })
    }

    /// Get a reference to the config that this projection uses
    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Get the screen anchor of a cell in a `width × height` grid, from the
    /// given camera angle. The anchor is the center of the tile's top face as
    /// if it were unelevated; see [Self::corrected_anchor] to account for
    /// elevation.
    pub fn to_screen(
        &self,
        pos: GridPoint,
        angle: CameraAngle,
        width: i32,
        height: i32,
    ) -> Point2 {
        let camera = pos.to_camera_frame(angle, width, height);
        let sheared: Point2 = (self.projection
            * Vector2::new(camera.x() as f64, camera.y() as f64))
        .into();
        sheared + self.origin_offset()
    }

    /// Convert a screen point to the cell whose unelevated top face contains
    /// it. This is the exact inverse of [Self::to_screen]. It knows nothing
    /// about elevation, so it's only the **seed** for picking. The result
    /// may be outside the grid. Points far off the map are pulled in toward
    /// it along the viewing direction, which never changes what's picked.
    pub fn from_screen(
        &self,
        point: Point2,
        angle: CameraAngle,
        width: i32,
        height: i32,
    ) -> GridPoint {
        // The origin offset is deliberately left in, it's accounted for by
        // the asymmetric rounding below
        let pre_image = self.inverse * Vector2::from(point);
        let (camera_width, camera_height) =
            angle.camera_dimensions(width, height);
        camera_seed(
            (pre_image.x - 0.5).floor(),
            (pre_image.y + 0.5).floor(),
            camera_width,
            camera_height,
        )
        .from_camera_frame(angle, width, height)
    }

    /// Screen offset of a tile's top face for the given elevation
    pub fn elevation_offset(&self, elevation: u16) -> Point2 {
        Point2::new(0.0, self.config.elevation_unit * f64::from(elevation))
    }

    /// Get the screen position of the center of a tile's top face, including
    /// its elevation. This is what sprites standing on the tile and the
    /// tile's [Footprint] are positioned relative to.
    pub fn corrected_anchor(
        &self,
        tile: &Tile,
        pos: GridPoint,
        angle: CameraAngle,
        width: i32,
        height: i32,
    ) -> Point2 {
        self.to_screen(pos, angle, width, height)
            + self.elevation_offset(tile.elevation())
    }

    /// Build the on-screen outline of a tile, relative to its corrected
    /// anchor. This covers the (possibly sloped) top face and the cliff faces
    /// below it, down to the ground.
    pub fn footprint(&self, tile: &Tile, angle: CameraAngle) -> Footprint {
        let hw = self.config.tile_half_width;
        let hh = self.config.tile_half_height;
        let rise = self.config.elevation_unit.abs();

        // Top face diamond, clockwise from the top vertex. Edge i runs from
        // vertex i to vertex i + 1, and edges are in the same order as
        // Slope::CLOCKWISE.
        let mut top = [
            Point2::new(0.0, -hh),
            Point2::new(hw, 0.0),
            Point2::new(0.0, hh),
            Point2::new(-hw, 0.0),
        ];
        if let Some(edge) = tile.visual_slope(angle).clockwise_index() {
            for vertex in [edge, (edge + 1) % Slope::CLOCKWISE.len()] {
                top[vertex].y -= rise;
            }
        }

        let ground_offset = Point2::new(0.0, rise * f64::from(tile.elevation()));
        let ground = [
            Point2::new(0.0, -hh),
            Point2::new(hw, 0.0),
            Point2::new(0.0, hh),
            Point2::new(-hw, 0.0),
        ]
        .map(|vertex| vertex + ground_offset);

        Footprint::from_points(top.iter().chain(ground.iter()).copied())
    }

    /// Offset from a cell's sheared position to its anchor, so that the
    /// furthest tile's bounding box starts at the screen origin
    fn origin_offset(&self) -> Point2 {
        Point2::new(self.config.tile_half_width, self.config.tile_half_height)
    }
}
