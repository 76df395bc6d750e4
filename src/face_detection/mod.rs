pub mod model_blazeface;

use image::DynamicImage;

use crate::error::Result;

pub trait FaceDetectionModel {
    /// Best face candidate in `image`, whatever its score.
    fn run(&self, image: &DynamicImage) -> Result<FaceBox>;
}

/// Bounding box around a detected face, in pixels of the original image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Detector confidence in `[0, 1]`.
    pub score: f32,
}

impl FaceBox {
    /// `(x, y, width, height)`
    pub fn to_tuple(&self) -> (u32, u32, u32, u32) {
        (self.x, self.y, self.width, self.height)
    }
}
