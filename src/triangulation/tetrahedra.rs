//! Bowyer-Watson Delaunay tetrahedralization.

use super::{sort_edges, Vec3};

use fnv::{FnvHashMap, FnvHashSet};

/// How much bigger than the point cloud the enclosing tetrahedron is.
const SUPER_SCALE: f64 = 100.0;
const EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug)]
struct Sphere {
    center: Vec3,
    radius_sq: f64,
}

#[derive(Clone, Copy, Debug)]
struct Tetrahedron {
    vertices: [usize; 4],
    // None for flat tetrahedra, which can never contain a point.
    circumsphere: Option<Sphere>,
}

impl Tetrahedron {
    fn new(vertices: [usize; 4], points: &[Vec3]) -> Self {
        let [a, b, c, d] = vertices;

        Tetrahedron {
            vertices,
            circumsphere: circumsphere(points[a], points[b], points[c], points[d]),
        }
    }

    fn circumsphere_contains(&self, p: Vec3) -> bool {
        match self.circumsphere {
            Some(s) => distance_sq(s.center, p) <= s.radius_sq * (1.0 + EPSILON),
            None => false,
        }
    }

    fn faces(&self) -> [[usize; 3]; 4] {
        let [a, b, c, d] = self.vertices;
        let mut faces = [[a, b, c], [a, b, d], [a, c, d], [b, c, d]];
        for f in faces.iter_mut() {
            f.sort_unstable();
        }

        faces
    }

    fn edges(&self) -> [(usize, usize); 6] {
        let [a, b, c, d] = self.vertices;

        [(a, b), (a, c), (a, d), (b, c), (b, d), (c, d)]
    }
}

fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(a: Vec3) -> f64 {
    dot(a, a).sqrt()
}

fn distance_sq(a: Vec3, b: Vec3) -> f64 {
    let d = sub(a, b);

    dot(d, d)
}

fn circumsphere(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Option<Sphere> {
    let u = sub(b, a);
    let v = sub(c, a);
    let w = sub(d, a);
    let det = dot(u, cross(v, w));
    if det.abs() <= EPSILON * norm(u) * norm(v) * norm(w) {
        return None;
    }

    let (vw, wu, uv) = (cross(v, w), cross(w, u), cross(u, v));
    let (uu, vv, ww) = (dot(u, u), dot(v, v), dot(w, w));
    let offset = [
        (uu * vw[0] + vv * wu[0] + ww * uv[0]) / (2.0 * det),
        (uu * vw[1] + vv * wu[1] + ww * uv[1]) / (2.0 * det),
        (uu * vw[2] + vv * wu[2] + ww * uv[2]) / (2.0 * det),
    ];

    Some(Sphere {
        center: [a[0] + offset[0], a[1] + offset[1], a[2] + offset[2]],
        radius_sq: dot(offset, offset),
    })
}

/// Number of independent directions spanned by `points`: 0 for a single location, 1 for a line,
/// 2 for a plane, 3 for a volume.
pub fn affine_rank(points: &[Vec3]) -> usize {
    let origin = match points.first() {
        Some(p) => *p,
        None => return 0,
    };

    let u = match points
        .iter()
        .map(|p| sub(*p, origin))
        .find(|d| norm(*d) > EPSILON)
    {
        Some(u) => u,
        None => return 0,
    };
    let normal = match points
        .iter()
        .map(|p| cross(u, sub(*p, origin)))
        .find(|n| norm(*n) > EPSILON * norm(u))
    {
        Some(n) => n,
        None => return 1,
    };
    let off_plane = points
        .iter()
        .any(|p| dot(normal, sub(*p, origin)).abs() > EPSILON * norm(normal));

    if off_plane {
        3
    } else {
        2
    }
}

/// Returns the unique, sorted edges of the Delaunay tetrahedralization of `points`. Returns no
/// edges when the points do not span a volume.
pub fn tetrahedralize(points: &[Vec3]) -> Vec<(usize, usize)> {
    let n = points.len();
    if n < 4 || affine_rank(points) < 3 {
        return Vec::new();
    }

    let mut min = points[0];
    let mut max = points[0];
    for p in points.iter() {
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }
    let center = [
        (min[0] + max[0]) / 2.0,
        (min[1] + max[1]) / 2.0,
        (min[2] + max[2]) / 2.0,
    ];
    let r = (norm(sub(max, min)) / 2.0).max(1.0) * SUPER_SCALE;

    let mut all_points = points.to_vec();
    let corners = [
        [1.0, 1.0, 1.0],
        [1.0, -1.0, -1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0],
    ];
    for corner in corners.iter() {
        all_points.push([
            center[0] + r * corner[0],
            center[1] + r * corner[1],
            center[2] + r * corner[2],
        ]);
    }

    let mut tetrahedra = vec![Tetrahedron::new([n, n + 1, n + 2, n + 3], &all_points)];
    for (i, p) in points.iter().enumerate() {
        let (bad, good): (Vec<_>, Vec<_>) = tetrahedra
            .into_iter()
            .partition(|t| t.circumsphere_contains(*p));

        // Faces shared by two bad tetrahedra are interior to the cavity.
        let mut face_counts = FnvHashMap::default();
        let mut faces = Vec::new();
        for t in bad.iter() {
            for f in t.faces().iter() {
                let count = face_counts.entry(*f).or_insert(0);
                if *count == 0 {
                    faces.push(*f);
                }
                *count += 1;
            }
        }

        tetrahedra = good;
        for [a, b, c] in faces.into_iter() {
            if face_counts[&[a, b, c]] == 1 {
                tetrahedra.push(Tetrahedron::new([a, b, c, i], &all_points));
            }
        }
    }

    let mut edges = FnvHashSet::default();
    for t in tetrahedra.iter().filter(|t| t.vertices.iter().all(|v| *v < n)) {
        for (a, b) in t.edges().iter() {
            edges.insert(if a < b { (*a, *b) } else { (*b, *a) });
        }
    }

    sort_edges(edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_tetrahedron_has_six_edges() {
        let points = [
            [0.0, 0.0, 0.0],
            [4.0, 0.0, 0.0],
            [0.0, 4.0, 0.0],
            [0.0, 0.0, 4.0],
        ];

        assert_eq!(
            tetrahedralize(&points),
            vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]
        );
    }

    #[test]
    fn test_coplanar_points_are_degenerate() {
        let points = [
            [0.0, 0.5, 0.0],
            [4.0, 0.5, 0.0],
            [0.0, 0.5, 4.0],
            [5.0, 0.5, 7.0],
            [9.0, 0.5, 2.0],
        ];

        assert_eq!(affine_rank(&points), 2);
        assert!(tetrahedralize(&points).is_empty());
    }

    #[test]
    fn test_affine_rank() {
        assert_eq!(affine_rank(&[]), 0);
        assert_eq!(affine_rank(&[[1.0, 1.0, 1.0], [1.0, 1.0, 1.0]]), 0);
        assert_eq!(
            affine_rank(&[[0.0, 0.0, 0.0], [1.0, 0.0, 1.0], [2.0, 0.0, 2.0]]),
            1
        );
    }

    #[test]
    fn test_interior_point_connects_to_every_corner() {
        let points = [
            [0.0, 0.0, 0.0],
            [10.0, 0.0, 0.0],
            [0.0, 10.0, 0.0],
            [0.0, 0.0, 10.0],
            [2.0, 2.0, 2.0],
        ];
        let edges = tetrahedralize(&points);

        for corner in 0..4 {
            assert!(edges.contains(&(corner, 4)));
        }
        // Every vertex takes part in some tetrahedron.
        for v in 0..points.len() {
            assert!(edges.iter().any(|(a, b)| *a == v || *b == v));
        }
    }
}
