//! Bowyer-Watson Delaunay triangulation in the plane.

use super::{sort_edges, Vec2};

use fnv::{FnvHashMap, FnvHashSet};

const SUPER_SCALE: f64 = 100.0;
const EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug)]
struct Triangle {
    vertices: [usize; 3],
    circumcircle: Option<(Vec2, f64)>,
}

impl Triangle {
    fn new(vertices: [usize; 3], points: &[Vec2]) -> Self {
        let [a, b, c] = vertices;

        Triangle {
            vertices,
            circumcircle: circumcircle(points[a], points[b], points[c]),
        }
    }

    fn circumcircle_contains(&self, p: Vec2) -> bool {
        match self.circumcircle {
            Some((center, radius_sq)) => distance_sq(center, p) <= radius_sq * (1.0 + EPSILON),
            None => false,
        }
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        let order = |i: usize, j: usize| if i < j { (i, j) } else { (j, i) };

        [order(a, b), order(a, c), order(b, c)]
    }
}

fn distance_sq(a: Vec2, b: Vec2) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}

fn circumcircle(a: Vec2, b: Vec2, c: Vec2) -> Option<(Vec2, f64)> {
    let u = [b[0] - a[0], b[1] - a[1]];
    let v = [c[0] - a[0], c[1] - a[1]];
    let det = u[0] * v[1] - u[1] * v[0];
    let scale = (u[0].hypot(u[1])) * (v[0].hypot(v[1]));
    if det.abs() <= EPSILON * scale {
        return None;
    }

    let uu = u[0] * u[0] + u[1] * u[1];
    let vv = v[0] * v[0] + v[1] * v[1];
    let offset = [
        (v[1] * uu - u[1] * vv) / (2.0 * det),
        (u[0] * vv - v[0] * uu) / (2.0 * det),
    ];

    Some((
        [a[0] + offset[0], a[1] + offset[1]],
        offset[0] * offset[0] + offset[1] * offset[1],
    ))
}

fn is_collinear(points: &[Vec2]) -> bool {
    let origin = points[0];
    let u = match points
        .iter()
        .map(|p| [p[0] - origin[0], p[1] - origin[1]])
        .find(|d| d[0].hypot(d[1]) > EPSILON)
    {
        Some(u) => u,
        None => return true,
    };
    let u_len = u[0].hypot(u[1]);

    points.iter().all(|p| {
        let d = [p[0] - origin[0], p[1] - origin[1]];
        (u[0] * d[1] - u[1] * d[0]).abs() <= EPSILON * u_len
    })
}

/// Returns the unique, sorted edges of the Delaunay triangulation of `points`. Returns no edges
/// when the points are collinear.
pub fn triangulate(points: &[Vec2]) -> Vec<(usize, usize)> {
    let n = points.len();
    if n < 3 || is_collinear(points) {
        return Vec::new();
    }

    let mut min = points[0];
    let mut max = points[0];
    for p in points.iter() {
        for axis in 0..2 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }
    let center = [(min[0] + max[0]) / 2.0, (min[1] + max[1]) / 2.0];
    let r = ((max[0] - min[0]).hypot(max[1] - min[1]) / 2.0).max(1.0) * SUPER_SCALE;
    let sqrt3 = 3f64.sqrt();

    let mut all_points = points.to_vec();
    all_points.push([center[0], center[1] + 2.0 * r]);
    all_points.push([center[0] - sqrt3 * r, center[1] - r]);
    all_points.push([center[0] + sqrt3 * r, center[1] - r]);

    let mut triangles = vec![Triangle::new([n, n + 1, n + 2], &all_points)];
    for (i, p) in points.iter().enumerate() {
        let (bad, good): (Vec<_>, Vec<_>) = triangles
            .into_iter()
            .partition(|t| t.circumcircle_contains(*p));

        let mut edge_counts = FnvHashMap::default();
        let mut boundary = Vec::new();
        for t in bad.iter() {
            for e in t.edges().iter() {
                let count = edge_counts.entry(*e).or_insert(0);
                if *count == 0 {
                    boundary.push(*e);
                }
                *count += 1;
            }
        }

        triangles = good;
        for (a, b) in boundary.into_iter() {
            if edge_counts[&(a, b)] == 1 {
                triangles.push(Triangle::new([a, b, i], &all_points));
            }
        }
    }

    let mut edges = FnvHashSet::default();
    for t in triangles.iter().filter(|t| t.vertices.iter().all(|v| *v < n)) {
        edges.extend(t.edges().iter().cloned());
    }

    sort_edges(edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_has_one_diagonal() {
        let points = [[0.0, 0.0], [4.0, 0.0], [4.0, 3.0], [0.0, 5.0]];
        let edges = triangulate(&points);

        // Four sides plus exactly one diagonal.
        assert_eq!(edges.len(), 5);
        for side in [(0, 1), (1, 2), (2, 3), (0, 3)].iter() {
            assert!(edges.contains(side));
        }
    }

    #[test]
    fn test_collinear_points_are_degenerate() {
        let points = [[0.5, 0.5], [4.5, 0.5], [9.0, 0.5]];

        assert!(triangulate(&points).is_empty());
    }

    #[test]
    fn test_triangle() {
        let points = [[0.0, 0.0], [6.0, 1.0], [2.0, 5.0]];

        assert_eq!(triangulate(&points), vec![(0, 1), (0, 2), (1, 2)]);
    }
}
