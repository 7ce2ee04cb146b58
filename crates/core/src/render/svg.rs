use crate::{
    render::footprint::Footprint,
    stage::Stage,
    util::unit::{Color3, Point2, Rect},
    world::{
        point::{CameraAngle, GridPoint},
        tile::Tile,
    },
};
use std::hash::Hash;
use svg::{
    node::{
        element::{Group, Polygon},
        Comment,
    },
    Document,
};

/// Fill of an unelevated, unhighlighted tile
const GROUND_COLOR: Color3 = Color3::new_int(120, 160, 96);
/// Each step of elevation brightens the fill by this fraction
const ELEVATION_SHADE_STEP: f32 = 0.08;
const OUTLINE_COLOR: Color3 = Color3::new_int(32, 32, 32);

/// Render a stage as an SVG, from the given camera angle. Every tile's
/// footprint is drawn in draw order at its corrected anchor, so raised tiles
/// correctly cover the ones behind them. Highlighted tiles are filled with
/// their active highlight color, everything else is shaded by elevation.
pub fn stage_to_svg<S: Copy + Eq + Hash>(
    stage: &Stage<S>,
    angle: CameraAngle,
) -> Document {
    let projection = stage.projection();

    let mut bounds: Option<Rect> = None;
    let mut polygons = Vec::with_capacity(stage.grid().len());
    for (pos, tile) in stage.iter_tiles(angle) {
        let anchor = stage.to_screen(pos, angle)
            + projection.elevation_offset(tile.elevation());
        let footprint = projection.footprint(tile, angle).translate(anchor);
        bounds = Some(match bounds {
            Some(bounds) => union(bounds, footprint.bounds()),
            None => footprint.bounds(),
        });
        let fill = stage
            .highlights()
            .active_color(pos)
            .unwrap_or_else(|| elevation_shade(tile));
        polygons.push(draw_tile(pos, &footprint, fill));
    }

    let bounds = bounds.unwrap_or_default();
    let mut document = Document::new()
        .set(
            "viewBox",
            (
                bounds.x.floor(),
                bounds.y.floor(),
                bounds.width.ceil(),
                bounds.height.ceil(),
            ),
        )
        .add(Comment::new(format!(
            "\n{}x{} grid from {}\n{:#?}\n",
            stage.grid().width(),
            stage.grid().height(),
            angle,
            projection.config()
        )));
    for polygon in polygons {
        document = document.add(polygon);
    }
    document
}

/// Generate an SVG polygon for a single tile
fn draw_tile(pos: GridPoint, footprint: &Footprint, fill: Color3) -> Group {
    Group::new()
        .add(Comment::new(pos.to_string())) // Readability!
        .add(
            Polygon::new()
                .set(
                    "points",
                    footprint
                        .vertices()
                        .iter()
                        .map(|Point2 { x, y }| (*x, *y))
                        .collect::<Vec<_>>(),
                )
                .set("fill", fill.to_html())
                .set("stroke", OUTLINE_COLOR.to_html())
                .set("stroke-width", 0.5),
        )
}

/// Higher tiles get a brighter fill
fn elevation_shade(tile: &Tile) -> Color3 {
    GROUND_COLOR * (1.0 + ELEVATION_SHADE_STEP * f32::from(tile.elevation()))
}

fn union(a: Rect, b: Rect) -> Rect {
    let x = a.x.min(b.x);
    let y = a.y.min(b.y);
    let right = (a.x + a.width).max(b.x + b.width);
    let bottom = (a.y + a.height).max(b.y + b.height);
    Rect::new(x, y, right - x, bottom - y)
}
