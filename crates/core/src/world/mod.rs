//! The logical side of the map: grid positions and camera angles, tiles, the
//! grid that holds them, and the orderings used to draw and pick them.

pub mod grid;
pub mod point;
pub mod tile;
pub mod traverse;
