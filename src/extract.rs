use ndarray::{Array2, ArrayView3, Zip};

use crate::{interpolator::Interpolator, plane::ObliquePlane};

/// Resample `volume` (shape `(z, y, x)`) along `plane`, shifted `offset`
/// voxels along its normal.
///
/// The result has shape `(plane.height, plane.width)`. Row `r`, column `c`
/// samples the plane-local point `(c - width / 2, r - height / 2)`. Samples
/// outside the volume are 0, so planes that run past the volume edge still
/// produce a full image.
pub fn extract_oblique_slice<T>(volume: ArrayView3<T>, plane: &ObliquePlane, offset: f64) -> Array2<f32>
where
    T: Copy + Into<f32> + Sync,
{
    let (cx, cy) = plane.center();
    let mut slice = Array2::<f32>::zeros((plane.height, plane.width));

    Zip::indexed(&mut slice).par_for_each(|(row, col), value| {
        let p = plane.point_at(col as f64 - cx, row as f64 - cy, offset);
        *value = Interpolator::trilinear_interpolate(&volume, p.z, p.y, p.x);
    });

    log::debug!(
        "Extracted {}x{} oblique slice at offset {offset}",
        plane.width,
        plane.height
    );
    slice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vec3;
    use ndarray::{Array3, s};

    fn noise_volume() -> Array3<u16> {
        Array3::from_shape_fn((6, 7, 9), |(z, y, x)| ((z * 131 + y * 17 + x * 7) % 251) as u16)
    }

    fn axial_plane(z: f64, height: usize, width: usize) -> ObliquePlane {
        ObliquePlane::new(
            Vec3::new(width as f64 / 2.0, height as f64 / 2.0, z),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            width,
            height,
        )
    }

    #[test]
    fn axial_plane_reproduces_axial_slice() {
        let volume = noise_volume();
        let plane = axial_plane(4.0, 7, 9);
        let slice = extract_oblique_slice(volume.view(), &plane, 0.0);
        let expected = volume.slice(s![4, .., ..]).mapv(f32::from);
        assert_eq!(slice, expected);
    }

    #[test]
    fn offset_moves_along_normal() {
        let volume = noise_volume();
        let plane = axial_plane(1.0, 7, 9);
        let slice = extract_oblique_slice(volume.view(), &plane, 2.0);
        let expected = volume.slice(s![3, .., ..]).mapv(f32::from);
        assert_eq!(slice, expected);
    }

    #[test]
    fn samples_outside_volume_are_zero() {
        let volume = Array3::<f32>::from_elem((4, 4, 4), 9.0);
        let mut plane = axial_plane(2.0, 4, 12);
        plane.origin.x = 2.0;
        let slice = extract_oblique_slice(volume.view(), &plane, 0.0);
        assert_eq!(slice.dim(), (4, 12));
        // columns 4..=7 map to x = 0..=3
        assert_eq!(slice[[1, 3]], 0.0);
        assert_eq!(slice[[1, 4]], 9.0);
        assert_eq!(slice[[1, 7]], 9.0);
        assert_eq!(slice[[1, 8]], 0.0);

        let above = extract_oblique_slice(volume.view(), &plane, 10.0);
        assert!(above.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn transposed_plane_reads_columns() {
        let volume = noise_volume();
        // u along y, v along x: the output is the transposed axial slice
        let plane = ObliquePlane::new(
            Vec3::new(4.5, 3.5, 2.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -1.0),
            7,
            9,
        );
        let slice = extract_oblique_slice(volume.view(), &plane, 0.0);
        let expected = volume.slice(s![2, .., ..]).t().mapv(f32::from);
        assert_eq!(slice, expected);
    }
}
