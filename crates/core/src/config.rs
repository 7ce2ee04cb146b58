use serde::{Deserialize, Serialize};
use validator::Validate;

/// Tunable constants of the isometric projection. Every value is in screen
/// units (typically pixels). These are typically loaded once, alongside the
/// rest of the application's config, and never change after a
/// [crate::Stage] is built.
///
/// A config is validated when it's handed to [crate::IsoProjection::new] (or
/// [crate::Stage::new]), and an invalid config is rejected there with a
/// [validator::ValidationErrors] inside the returned error.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Half the width of a tile's top-face diamond, i.e. the horizontal
    /// distance from the diamond's center to its left/right vertex.
    #[validate(range(min = 1.0))]
    pub tile_half_width: f64,

    /// Half the height of a tile's top-face diamond, i.e. the vertical
    /// distance from the diamond's center to its top/bottom vertex.
    #[validate(range(min = 1.0))]
    pub tile_half_height: f64,

    /// Vertical screen offset applied per step of tile elevation. Screen y
    /// grows **downward**, so this has to be zero or negative for raised
    /// tiles to move up the screen.
    ///
    /// This is also how far the uphill edge of a sloped tile is raised.
    #[validate(range(max = 0.0))]
    pub elevation_unit: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            tile_half_width: 32.0,
            tile_half_height: 16.0,
            elevation_unit: -16.0,
        }
    }
}
