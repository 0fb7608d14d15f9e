use image::{ImageBuffer, Luma};
use ndarray::ArrayView2;
use rayon::prelude::*;

use crate::error::PlanningError;

pub type GrayImage = ImageBuffer<Luma<u8>, Vec<u8>>;

/// Display window: intensities in `[center - width / 2, center + width / 2]`
/// map onto the full 8-bit range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window {
    pub center: f32,
    pub width: f32,
}

impl Window {
    pub fn from_range(min: f32, max: f32) -> Self {
        Self {
            center: (min + max) / 2.0,
            width: max - min,
        }
    }

    #[inline]
    fn bounds(&self) -> (f32, f32) {
        let half = self.width / 2.0;
        (self.center - half, self.center + half)
    }

    #[inline]
    fn apply(&self, value: f32) -> u8 {
        let (low, high) = self.bounds();
        let scaled = (value.max(low).min(high) - low) / (high - low + 1e-8) * 255.0;
        scaled as u8
    }
}

/// Window a scalar slice into an 8-bit grayscale image of the same shape.
pub fn slice_to_image(slice: &ArrayView2<'_, f32>, window: Window) -> Result<GrayImage, PlanningError> {
    let (height, width) = slice.dim();
    let pixel_data: Vec<u8> = slice.into_par_iter().map(|&v| window.apply(v)).collect();
    ImageBuffer::from_raw(width as u32, height as u32, pixel_data).ok_or_else(|| {
        PlanningError::Image(format!("{width}x{height} buffer does not match its pixel data"))
    })
}
