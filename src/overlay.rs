use image::{DynamicImage, Rgb};
use imageproc::drawing::draw_cross_mut;

use crate::face::{FaceLandmark, FaceLandmarks};
use crate::simulator::VehicleControl;

/// One line of the control read-out drawn over the camera frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLine {
    pub text: String,
    /// Baseline origin in frame pixels.
    pub origin: (f32, f32),
    pub color: [u8; 3],
}

pub fn overlay_lines(control: &VehicleControl, gear: i32) -> [OverlayLine; 4] {
    [
        OverlayLine {
            text: format!("Throttle: {:?}", control.throttle),
            origin: (10.0, 30.0),
            color: [0, 255, 0],
        },
        OverlayLine {
            text: format!("Brake: {:?}", control.brake),
            origin: (10.0, 60.0),
            color: [255, 0, 0],
        },
        OverlayLine {
            text: format!("Steer: {:.2}", control.steer),
            origin: (10.0, 90.0),
            color: [0, 255, 255],
        },
        OverlayLine {
            text: format!("Gear: {}", gear),
            origin: (10.0, 120.0),
            color: [255, 0, 255],
        },
    ]
}

/// Mark the points gestures are read from.
pub fn mark_gesture_landmarks(image: &mut DynamicImage, landmarks: &FaceLandmarks) {
    let mut rgb = image.to_rgb8();
    let green = Rgb([0u8, 255u8, 0u8]);

    for landmark in FaceLandmark::ALL {
        let p = landmarks.pixel(landmark);
        draw_cross_mut(&mut rgb, green, p.x, p.y);
    }

    *image = DynamicImage::ImageRgb8(rgb);
}
