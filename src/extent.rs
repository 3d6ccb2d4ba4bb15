use ilattice3::{Extent, Point};

/// Grows `extent` by `margin` on both sides of the X and Z axes. Y is left alone, so single-floor
/// rooms keep their height.
pub fn pad_horizontal(extent: &Extent, margin: i32) -> Extent {
    let min = *extent.get_minimum();
    let sup = *extent.get_local_supremum();

    Extent::from_min_and_local_supremum(
        min + Point::from([-margin, 0, -margin]),
        sup + Point::from([2 * margin, 0, 2 * margin]),
    )
}

pub fn extents_overlap(a: &Extent, b: &Extent) -> bool {
    !a.intersection(b).is_empty()
}

/// The inclusive maximum corner.
pub fn extent_max(extent: &Extent) -> Point {
    let min = extent.get_minimum();
    let sup = extent.get_local_supremum();

    [min.x + sup.x - 1, min.y + sup.y - 1, min.z + sup.z - 1].into()
}

pub fn extent_volume(extent: &Extent) -> usize {
    let sup = extent.get_local_supremum();

    (sup.x.max(0) * sup.y.max(0) * sup.z.max(0)) as usize
}

/// Geometric center of the box in continuous space, i.e. `min + size / 2`.
pub fn centroid(extent: &Extent) -> [f32; 3] {
    let min = extent.get_minimum();
    let sup = extent.get_local_supremum();

    [
        min.x as f32 + sup.x as f32 / 2.0,
        min.y as f32 + sup.y as f32 / 2.0,
        min.z as f32 + sup.z as f32 / 2.0,
    ]
}

/// The lattice cell closest to the center that is still inside the box.
pub fn central_cell(extent: &Extent) -> Point {
    let min = extent.get_minimum();
    let sup = extent.get_local_supremum();

    [
        min.x + (sup.x - 1).max(0) / 2,
        min.y,
        min.z + (sup.z - 1).max(0) / 2,
    ]
    .into()
}
