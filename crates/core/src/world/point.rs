//! Basic types for addressing the grid: cell positions, offsets between them,
//! and the four camera angles the grid can be viewed from.
//!
//! ## Camera Frame
//!
//! Every camera angle is defined in terms of the canonical [CameraAngle::UL]
//! view plus some number of clockwise quarter turns of the grid around its
//! center. After rotating, the corner furthest from the viewer always sits at
//! `(0, 0)`, so all the projection and ordering math only has to be written
//! once, for the UL view. We call the rotated coordinates the **camera
//! frame**. A quarter turn maps the point `(x, y)` of a `width × height` grid
//! to `(height - 1 - y, x)` of a `height × width` grid.

use derive_more::{Add, AddAssign, Display, Mul, MulAssign, Neg};
use fnv::FnvBuildHasher;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    ops,
};
use strum::{EnumIter, EnumString};

/// A set of grid points
pub type GridPointSet = HashSet<GridPoint, FnvBuildHasher>;
/// A map of grid points to some `T`
pub type GridPointMap<T> = HashMap<GridPoint, T, FnvBuildHasher>;
/// An ORDERED map of grid points to some `T`. This has some extra memory
/// overhead, so we should only use it when we actually need the ordering.
pub type GridPointIndexMap<T> = IndexMap<GridPoint, T, FnvBuildHasher>;

/// The position of a single cell in the grid. `x` grows to the right along
/// the top edge of the map, `y` grows downward along the left edge (when the
/// map is viewed from directly above with [CameraAngle::UL] at the top).
///
/// A point is just a pair of integers, so it can also refer to a location
/// outside the grid (e.g. the result of converting a screen point that isn't
/// over the map). Use [crate::TerrainGrid::has_tile] to check bounds.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    Serialize,
    Deserialize,
)]
#[display(fmt = "({}, {})", x, y)]
pub struct GridPoint {
    x: i32,
    y: i32,
}

impl GridPoint {
    pub const ORIGIN: Self = Self::new(0, 0);

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    /// Move this point `times` steps along `vector`
    pub fn translate(self, vector: GridVec, times: i32) -> Self {
        self + vector * times
    }

    /// Rotate this point one quarter turn clockwise about the center of the
    /// grid it lives in. `height` is the height of that grid; the rotated
    /// point lives in a grid with width and height swapped.
    pub fn rotate_quarter(self, height: i32) -> Self {
        Self::new(height - 1 - self.y, self.x)
    }

    /// Inverse of [Self::rotate_quarter]. `width` is the width of the grid
    /// this point **currently** lives in (i.e. the rotated grid).
    pub fn unrotate_quarter(self, width: i32) -> Self {
        Self::new(self.y, width - 1 - self.x)
    }

    /// Convert a point in a `width × height` grid into the camera frame of
    /// the given angle. See the module docs for what the camera frame is.
    pub fn to_camera_frame(
        self,
        angle: CameraAngle,
        width: i32,
        height: i32,
    ) -> Self {
        let (mut point, mut height, mut width) = (self, height, width);
        for _ in 0..angle.quarter_turns() {
            point = point.rotate_quarter(height);
            std::mem::swap(&mut width, &mut height);
        }
        point
    }

    /// Inverse of [Self::to_camera_frame]. `width` and `height` are the
    /// dimensions of the **unrotated** grid.
    pub fn from_camera_frame(
        self,
        angle: CameraAngle,
        width: i32,
        height: i32,
    ) -> Self {
        let (mut width, mut height) = angle.camera_dimensions(width, height);
        let mut point = self;
        for _ in 0..angle.quarter_turns() {
            point = point.unrotate_quarter(width);
            std::mem::swap(&mut width, &mut height);
        }
        point
    }
}

impl ops::Add<GridVec> for GridPoint {
    type Output = GridPoint;

    fn add(self, rhs: GridVec) -> Self::Output {
        Self::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

impl ops::AddAssign<GridVec> for GridPoint {
    fn add_assign(&mut self, rhs: GridVec) {
        *self = *self + rhs;
    }
}

impl ops::Sub<GridPoint> for GridPoint {
    type Output = GridVec;

    fn sub(self, rhs: GridPoint) -> Self::Output {
        GridVec::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// An offset between two grid points. By denoting some values explicitly as
/// vectors rather than points, it makes a bit clearer when shifting points
/// around ("one step in direction D").
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    Add,
    AddAssign,
    Mul,
    MulAssign,
    Neg,
)]
#[display(fmt = "<{}, {}>", dx, dy)]
pub struct GridVec {
    pub dx: i32,
    pub dy: i32,
}

impl GridVec {
    pub const ZERO: Self = Self::new(0, 0);

    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Rotate this offset one quarter turn clockwise. This is the linear part
    /// of [GridPoint::rotate_quarter].
    pub fn rotate_quarter(self) -> Self {
        Self::new(-self.dy, self.dx)
    }

    /// Inverse of [Self::rotate_quarter]
    pub fn unrotate_quarter(self) -> Self {
        Self::new(self.dy, -self.dx)
    }

    /// Map an offset expressed in the camera frame of `angle` back into grid
    /// coordinates.
    pub fn from_camera_frame(self, angle: CameraAngle) -> Self {
        (0..angle.quarter_turns()).fold(self, |vec, _| vec.unrotate_quarter())
    }
}

/// One of the four fixed isometric viewing directions. The name of each
/// angle is the corner of the map (viewed from above, `(0, 0)` in the upper
/// left) that appears **furthest** from the viewer, i.e. at the top of the
/// screen.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumString,
    strum::Display,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CameraAngle {
    /// Upper left, `(0, 0)`, is furthest. This is the canonical angle.
    UL,
    /// Upper right, `(width - 1, 0)`, is furthest
    UR,
    /// Lower left, `(0, height - 1)`, is furthest
    LL,
    /// Lower right, `(width - 1, height - 1)`, is furthest
    LR,
}

impl CameraAngle {
    /// All angles, in clockwise rotation order starting from the canonical
    /// angle. The index of an angle in this list is its number of quarter
    /// turns.
    pub const CLOCKWISE: [Self; 4] = [Self::UL, Self::LL, Self::LR, Self::UR];

    /// Number of clockwise quarter turns between the canonical angle and this
    /// one. UL=0, LL=1, LR=2, UR=3.
    pub fn quarter_turns(self) -> usize {
        match self {
            Self::UL => 0,
            Self::LL => 1,
            Self::LR => 2,
            Self::UR => 3,
        }
    }

    /// Get the angle that is the given number of quarter turns from the
    /// canonical angle. Any integer is accepted, negatives turn the other way.
    pub fn from_quarter_turns(turns: i32) -> Self {
        Self::CLOCKWISE[turns.rem_euclid(4) as usize]
    }

    /// The angle reached by rotating the camera one step clockwise
    pub fn next_clockwise(self) -> Self {
        Self::from_quarter_turns(self.quarter_turns() as i32 + 1)
    }

    /// The angle reached by rotating the camera one step counter-clockwise
    pub fn next_counter_clockwise(self) -> Self {
        Self::from_quarter_turns(self.quarter_turns() as i32 - 1)
    }

    /// Dimensions `(width, height)` of a `width × height` grid once it's been
    /// rotated into this angle's camera frame.
    pub fn camera_dimensions(self, width: i32, height: i32) -> (i32, i32) {
        if self.quarter_turns() % 2 == 0 {
            (width, height)
        } else {
            (height, width)
        }
    }
}
