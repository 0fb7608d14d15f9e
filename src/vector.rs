use nalgebra::Vector3;

/// A position or direction in volume space, `(x, y, z)` in voxel units.
pub type Vec3 = Vector3<f64>;

/// Vectors shorter than this are treated as zero and left unnormalized.
pub const DEGENERATE_NORM: f64 = 1e-10;

/// Projections shorter than this mean the reference axis was (nearly)
/// parallel to the axis being projected out.
pub const PARALLEL_EPSILON: f64 = 1e-6;

/// Scale `v` to unit length. A (near) zero vector is returned unchanged, so
/// this never produces NaN.
#[inline]
pub fn normalize(v: Vec3) -> Vec3 {
    let norm = v.norm();
    if norm < DEGENERATE_NORM {
        return v;
    }
    v / norm
}

/// Remove the component of `v` along the unit vector `axis`.
#[inline]
pub(crate) fn reject(v: &Vec3, axis: &Vec3) -> Vec3 {
    v - axis * v.dot(axis)
}
