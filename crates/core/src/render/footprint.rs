use crate::util::unit::{Point2, Rect};

/// The on-screen outline of a tile: a convex polygon, relative to the tile's
/// corrected anchor (see [crate::IsoProjection::corrected_anchor]). Vertices
/// are stored clockwise as seen on screen, with no repeated or collinear
/// vertices.
#[derive(Clone, Debug, PartialEq)]
pub struct Footprint {
    vertices: Vec<Point2>,
}

impl Footprint {
    /// Build a footprint from the convex hull of a set of points. Duplicate
    /// and interior points are dropped.
    pub fn from_points(points: impl IntoIterator<Item = Point2>) -> Self {
        Self {
            vertices: convex_hull(points.into_iter().collect()),
        }
    }

    pub fn vertices(&self) -> &[Point2] {
        &self.vertices
    }

    /// Is the point (relative to the anchor) inside or on the border of this
    /// footprint?
    pub fn contains(&self, point: Point2) -> bool {
        contains_point(&self.vertices, point)
    }

    /// Copy of this footprint shifted by an offset, e.g. to put it in screen
    /// space at its anchor
    #[must_use]
    pub fn translate(&self, offset: Point2) -> Self {
        Self {
            vertices: self.vertices.iter().map(|v| *v + offset).collect(),
        }
    }

    /// The smallest rectangle containing every vertex
    pub fn bounds(&self) -> Rect {
        let mut vertices = self.vertices.iter();
        let first = match vertices.next() {
            Some(first) => *first,
            None => return Rect::default(),
        };
        let (min, max) = vertices.fold((first, first), |(min, max), v| {
            (
                Point2::new(min.x.min(v.x), min.y.min(v.y)),
                Point2::new(max.x.max(v.x), max.y.max(v.y)),
            )
        });
        Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }
}

/// Check if a point is inside a convex polygon. The polygon can be wound
/// either way, but it has to be convex. Points on an edge or a vertex count
/// as inside.
///
/// For each edge, the sign of the cross product between the edge and the
/// vector to the point tells us which side of the edge the point is on. The
/// point is inside iff it's on the same side of every edge. A zero cross
/// product (point in line with the edge) is consistent with either side, so
/// it never flips the result or sets the expected side.
pub fn contains_point(vertices: &[Point2], point: Point2) -> bool {
    if vertices.is_empty() {
        return false;
    }

    let mut side: Option<bool> = None;
    let edges = vertices.iter().zip(vertices.iter().cycle().skip(1));
    for (a, b) in edges {
        let det = (b.x - a.x) * (point.y - a.y) - (b.y - a.y) * (point.x - a.x);
        // NaN means the point is too far out to compare
        if det.is_nan() {
            return false;
        }
        if det == 0.0 {
            continue;
        }
        let positive = det > 0.0;
        match side {
            None => side = Some(positive),
            Some(expected) if expected != positive => return false,
            Some(_) => {}
        }
    }
    true
}

/// Convex hull via Andrew's monotone chain. Output is clockwise on screen
/// (y down), starting from the leftmost point.
fn convex_hull(mut points: Vec<Point2>) -> Vec<Point2> {
    points.sort_by(|a, b| {
        a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y))
    });
    points.dedup();
    if points.len() < 3 {
        return points;
    }

    // Positive = turning clockwise on screen
    fn cross(o: Point2, a: Point2, b: Point2) -> f64 {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    }

    let mut hull: Vec<Point2> = Vec::with_capacity(points.len() + 1);
    // Upper chain (on screen) left to right
    for point in &points {
        while hull.len() >= 2
            && cross(hull[hull.len() - 2], hull[hull.len() - 1], *point) <= 0.0
        {
            hull.pop();
        }
        hull.push(*point);
    }
    // Then the lower chain right to left, without popping the upper chain
    let upper_len = hull.len() + 1;
    for point in points.iter().rev().skip(1) {
        while hull.len() >= upper_len
            && cross(hull[hull.len() - 2], hull[hull.len() - 1], *point) <= 0.0
        {
            hull.pop();
        }
        hull.push(*point);
    }
    // The last point is the first one again
    hull.pop();
    hull
}
