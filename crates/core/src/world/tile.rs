use crate::world::point::CameraAngle;
use derive_more::{BitOr, BitOrAssign, Display, From, Into};
use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// A single cell of terrain. Tiles are plain values: they can't be modified
/// in place, only replaced. The `with_*` methods build a modified copy, which
/// can then be put back into the grid with [crate::TerrainGrid::set_tile].
/// Anyone holding the old value keeps seeing a consistent tile.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(default)]
pub struct Tile {
    /// Height of the tile's top face above the ground, in elevation steps.
    /// Every step raises the tile on screen by
    /// [crate::ProjectionConfig::elevation_unit].
    elevation: u16,

    /// Which edge of the tile is uphill, relative to the grid (not the
    /// camera). See [Slope].
    slope: Slope,

    /// Texture of the top face. Opaque to this crate.
    texture: TextureId,

    /// Texture of the cliff faces below the top face. Opaque to this crate.
    cliff_texture: TextureId,

    /// Special zone markers. These never affect geometry.
    flags: TileFlags,
}

impl Tile {
    /// Create a flat, unelevated tile with the given textures
    pub const fn new(texture: TextureId, cliff_texture: TextureId) -> Self {
        Self {
            elevation: 0,
            slope: Slope::None,
            texture,
            cliff_texture,
            flags: TileFlags::EMPTY,
        }
    }

    pub fn elevation(&self) -> u16 {
        self.elevation
    }

    pub fn slope(&self) -> Slope {
        self.slope
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }

    pub fn cliff_texture(&self) -> TextureId {
        self.cliff_texture
    }

    pub fn flags(&self) -> TileFlags {
        self.flags
    }

    /// The uphill edge as it appears on screen from the given camera angle
    pub fn visual_slope(&self, angle: CameraAngle) -> Slope {
        self.slope.adjust_for_camera_angle(angle)
    }

    /// Is this tile raised or sloped? Those tiles show cliff faces, so their
    /// footprint isn't just the flat diamond.
    pub fn is_flat(&self) -> bool {
        self.elevation == 0 && self.slope == Slope::None
    }

    /// Copy of this tile with a different elevation
    #[must_use]
    pub fn with_elevation(self, elevation: u16) -> Self {
        Self { elevation, ..self }
    }

    /// Copy of this tile with a different slope
    #[must_use]
    pub fn with_slope(self, slope: Slope) -> Self {
        Self { slope, ..self }
    }

    /// Copy of this tile with a different top texture
    #[must_use]
    pub fn with_texture(self, texture: TextureId) -> Self {
        Self { texture, ..self }
    }

    /// Copy of this tile with a different cliff texture
    #[must_use]
    pub fn with_cliff_texture(self, cliff_texture: TextureId) -> Self {
        Self {
            cliff_texture,
            ..self
        }
    }

    /// Copy of this tile with a different set of zone flags
    #[must_use]
    pub fn with_flags(self, flags: TileFlags) -> Self {
        Self { flags, ..self }
    }
}

/// Identifier of a texture, as understood by whatever loads the assets.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Display,
    PartialEq,
    Eq,
    Hash,
    From,
    Into,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct TextureId(pub u16);

/// A bit set of special-zone markers on a tile (e.g. deployment zones).
/// What each bit means is up to the caller.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Display,
    PartialEq,
    Eq,
    Hash,
    From,
    Into,
    BitOr,
    BitOrAssign,
    Serialize,
    Deserialize,
)]
#[display(fmt = "{:#b}", _0)]
#[serde(transparent)]
pub struct TileFlags(pub u32);

impl TileFlags {
    pub const EMPTY: Self = Self(0);

    /// Flags with only the given bit set
    pub const fn bit(index: u32) -> Self {
        Self(1 << index)
    }

    /// Are all the flags in `other` also set here?
    pub fn contains(self, other: TileFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Copy of these flags without anything in `other`
    #[must_use]
    pub fn without(self, other: TileFlags) -> Self {
        Self(self.0 & !other.0)
    }
}

/// The uphill edge of a sloped tile. For a tile's stored slope, the
/// directions are relative to the grid: `N` is the edge facing `y - 1`, `E`
/// faces `x + 1`, `S` faces `y + 1` and `W` faces `x - 1`. For a **visual**
/// slope, the same names are relative to the camera frame (see
/// [crate::world::point]).
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Slope {
    N,
    E,
    S,
    W,
    #[default]
    None,
}

impl Slope {
    /// The four real slope directions, in clockwise order
    pub const CLOCKWISE: [Self; 4] = [Self::N, Self::E, Self::S, Self::W];

    /// Position of this slope in [Self::CLOCKWISE], or `None` for a flat tile
    pub fn clockwise_index(self) -> Option<usize> {
        match self {
            Self::N => Some(0),
            Self::E => Some(1),
            Self::S => Some(2),
            Self::W => Some(3),
            Self::None => None,
        }
    }

    /// Convert a grid-relative slope to the slope as it appears from the
    /// given camera angle. Each clockwise quarter turn of the camera turns the
    /// slope one step clockwise too. Flat stays flat.
    pub fn adjust_for_camera_angle(self, angle: CameraAngle) -> Self {
        match self.clockwise_index() {
            Some(index) => {
                Self::CLOCKWISE[(index + angle.quarter_turns()) % 4]
            }
            None => Self::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_adjust_slope() {
        assert_eq!(Slope::N.adjust_for_camera_angle(CameraAngle::UL), Slope::N);
        assert_eq!(Slope::N.adjust_for_camera_angle(CameraAngle::LL), Slope::E);
        assert_eq!(Slope::E.adjust_for_camera_angle(CameraAngle::LR), Slope::W);
        assert_eq!(Slope::W.adjust_for_camera_angle(CameraAngle::UR), Slope::S);
        for angle in CameraAngle::iter() {
            assert_eq!(Slope::None.adjust_for_camera_angle(angle), Slope::None);
        }
    }

    /// Four camera steps that add up to a full turn leave every slope alone
    #[test]
    fn test_adjust_slope_full_rotation() {
        let sequences = [
            [CameraAngle::LL; 4],
            [CameraAngle::UR; 4],
            [CameraAngle::UL, CameraAngle::LR, CameraAngle::UL, CameraAngle::LR],
            [CameraAngle::LL, CameraAngle::LR, CameraAngle::UR, CameraAngle::LR],
        ];
        for slope in Slope::iter() {
            for [a1, a2, a3, a4] in sequences {
                let adjusted = slope
                    .adjust_for_camera_angle(a1)
                    .adjust_for_camera_angle(a2)
                    .adjust_for_camera_angle(a3)
                    .adjust_for_camera_angle(a4);
                assert_eq!(adjusted, slope, "{slope:?} through {a1}/{a2}/{a3}/{a4}");
            }
        }
    }

    #[test]
    fn test_copy_on_write() {
        let original = Tile::new(TextureId(3), TextureId(4));
        let raised = original.with_elevation(2).with_slope(Slope::S);
        assert_eq!(original.elevation(), 0);
        assert_eq!(original.slope(), Slope::None);
        assert_eq!(raised.elevation(), 2);
        assert_eq!(raised.slope(), Slope::S);
        assert_eq!(raised.texture(), TextureId(3));
        assert!(original.is_flat());
        assert!(!raised.is_flat());
    }

    #[test]
    fn test_flags() {
        let flags = TileFlags::bit(0) | TileFlags::bit(3);
        assert!(flags.contains(TileFlags::bit(3)));
        assert!(!flags.contains(TileFlags::bit(1)));
        assert_eq!(flags.without(TileFlags::bit(0)), TileFlags::bit(3));
    }
}
