use crate::derive::VolumeShape;
use crate::enums::Orientation;
use crate::error::PlanningError;
use crate::extract::extract_oblique_slice;
use crate::plane::ObliquePlane;
use crate::render::{GrayImage, Window, slice_to_image};

use ndarray::Array2;
use ndarray::Array3;
use ndarray::ArrayView2;
use ndarray::Axis;
use ndarray::s;

/// A scalar volume in `(z, y, x)` order, already reoriented so that axial
/// slices are XY planes.
#[derive(Clone, Debug)]
pub struct Volume {
    data: Array3<f32>,
    /// Voxel size along `(x, y, z)`.
    pub spacing: (f32, f32, f32),
}

impl Volume {
    pub fn new(data: Array3<f32>, spacing: (f32, f32, f32)) -> Result<Self, PlanningError> {
        let dim = data.dim();
        if dim.0 == 0 || dim.1 == 0 || dim.2 == 0 {
            return Err(PlanningError::InvalidShape(format!("{dim:?} has an empty axis")));
        }
        Ok(Self { data, spacing })
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> VolumeShape {
        self.data.dim()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    pub fn max_index(&self, orientation: Orientation) -> usize {
        self.data.len_of(Axis(orientation.axis())) - 1
    }

    /// Orthogonal slice at `index`, clamped into range.
    pub fn get_slice_from_axis(&self, index: usize, orientation: Orientation) -> ArrayView2<'_, f32> {
        let index = index.min(self.max_index(orientation));
        match orientation {
            Orientation::Axial => self.data.slice(s![index, .., ..]),
            Orientation::Coronal => self.data.slice(s![.., index, ..]),
            Orientation::Sagittal => self.data.slice(s![.., .., index]),
        }
    }

    /// `(height, width)` of slices in `orientation`.
    pub fn slice_shape(&self, orientation: Orientation) -> (usize, usize) {
        let (depth, height, width) = self.dim();
        match orientation {
            Orientation::Axial => (height, width),
            Orientation::Coronal => (depth, width),
            Orientation::Sagittal => (depth, height),
        }
    }

    /// Factor to stretch the displayed width of an orthogonal slice so that
    /// anisotropic voxels look square.
    pub fn slice_aspect_ratio(&self, orientation: Orientation) -> f32 {
        let (sx, sy, sz) = self.spacing;
        let (horizontal, vertical) = match orientation {
            Orientation::Axial => (sx, sy),
            Orientation::Coronal => (sx, sz),
            Orientation::Sagittal => (sy, sz),
        };
        if vertical == 0.0 {
            1.0
        } else {
            horizontal / vertical
        }
    }

    /// Intensities at the `low` and `high` percentiles (0–100), linearly
    /// interpolated between ranks. Used to pick a display window that
    /// ignores outliers.
    pub fn value_range(&self, low: f32, high: f32) -> (f32, f32) {
        let mut values: Vec<f32> = self.data.iter().copied().collect();
        (Self::percentile(&mut values, low), Self::percentile(&mut values, high))
    }

    /// Selects the two ranks around `pct` in place; `values` ends up
    /// reordered but holds the same elements.
    fn percentile(values: &mut [f32], pct: f32) -> f32 {
        let rank = (pct.clamp(0.0, 100.0) / 100.0) * (values.len() - 1) as f32;
        let lower = (rank.floor() as usize).min(values.len() - 1);
        let t = rank - lower as f32;
        let (_, &mut below, above) = values.select_nth_unstable_by(lower, f32::total_cmp);
        let above = above.iter().copied().min_by(f32::total_cmp).unwrap_or(below);
        below.mul_add(1.0 - t, above * t)
    }

    /// Display window covering the 1st to 99th percentile.
    pub fn default_window(&self) -> Window {
        let (min, max) = self.value_range(1.0, 99.0);
        Window::from_range(min, max)
    }

    pub fn extract_oblique(&self, plane: &ObliquePlane, offset: f64) -> Array2<f32> {
        extract_oblique_slice(self.data.view(), plane, offset)
    }

    pub fn get_image_from_axis(
        &self,
        index: usize,
        orientation: Orientation,
        window: Window,
    ) -> Result<GrayImage, PlanningError> {
        slice_to_image(&self.get_slice_from_axis(index, orientation), window)
    }

    pub fn get_image_from_plane(
        &self,
        plane: &ObliquePlane,
        offset: f64,
        window: Window,
    ) -> Result<GrayImage, PlanningError> {
        slice_to_image(&self.extract_oblique(plane, offset).view(), window)
    }
}
