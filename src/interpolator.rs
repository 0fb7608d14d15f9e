use ndarray::ArrayView3;

pub(crate) struct Interpolator;

impl Interpolator {
    /// Value used for samples that fall outside the volume.
    pub(crate) const FILL: f32 = 0.0;

    /// Sample `volume` (in `(z, y, x)` order) at a fractional position using
    /// linear interpolation along all three axes.
    ///
    /// Positions outside `[0, dim - 1]` on any axis return [`Self::FILL`].
    #[inline]
    pub(crate) fn trilinear_interpolate<T>(volume: &ArrayView3<T>, z: f64, y: f64, x: f64) -> f32
    where
        T: Copy + Into<f32>,
    {
        let (depth, height, width) = volume.dim();
        let Some((z0, z1, dz)) = Self::cell(z, depth) else {
            return Self::FILL;
        };
        let Some((y0, y1, dy)) = Self::cell(y, height) else {
            return Self::FILL;
        };
        let Some((x0, x1, dx)) = Self::cell(x, width) else {
            return Self::FILL;
        };

        let at = |k: usize, j: usize, i: usize| -> f32 { volume[[k, j, i]].into() };
        let one_minus_dx = 1.0 - dx;
        let one_minus_dy = 1.0 - dy;
        let one_minus_dz = 1.0 - dz;

        let c00 = at(z0, y0, x0).mul_add(one_minus_dx, at(z0, y0, x1) * dx);
        let c01 = at(z0, y1, x0).mul_add(one_minus_dx, at(z0, y1, x1) * dx);
        let c10 = at(z1, y0, x0).mul_add(one_minus_dx, at(z1, y0, x1) * dx);
        let c11 = at(z1, y1, x0).mul_add(one_minus_dx, at(z1, y1, x1) * dx);

        let c0 = c00.mul_add(one_minus_dy, c01 * dy);
        let c1 = c10.mul_add(one_minus_dy, c11 * dy);

        c0.mul_add(one_minus_dz, c1 * dz)
    }

    /// Lower index, upper index and fractional weight along one axis, or
    /// `None` when `coord` lies outside the sampled extent.
    #[inline]
    fn cell(coord: f64, len: usize) -> Option<(usize, usize, f32)> {
        if len == 0 || !(0.0..=(len - 1) as f64).contains(&coord) {
            return None;
        }
        let lower = coord.floor() as usize;
        let upper = (lower + 1).min(len - 1);
        Some((lower, upper, (coord - lower as f64) as f32))
    }
}
