use nalgebra::Point2;

// struct that stores the landmarks of one detected face in pixel coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct FaceLandmarks {
    // face mesh points, indexed like the mediapipe face mesh (478 with iris refinement)
    pub points: Vec<Point2<f32>>,
}

/// Named face mesh points used for gesture recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceLandmark {
    NoseTip,
    MouthTop,
    MouthBottom,
    LeftBrow,
    LeftEye,
    LeftCheek,
    RightBrow,
    RightEye,
    RightCheek,
}

impl FaceLandmark {
    pub const ALL: [FaceLandmark; 9] = [
        FaceLandmark::NoseTip,
        FaceLandmark::MouthTop,
        FaceLandmark::MouthBottom,
        FaceLandmark::LeftBrow,
        FaceLandmark::LeftEye,
        FaceLandmark::LeftCheek,
        FaceLandmark::RightBrow,
        FaceLandmark::RightEye,
        FaceLandmark::RightCheek,
    ];

    pub fn index(self) -> usize {
        match self {
            FaceLandmark::NoseTip => 1,
            FaceLandmark::MouthTop => 13,
            FaceLandmark::MouthBottom => 14,
            FaceLandmark::LeftBrow => 65,
            FaceLandmark::LeftEye => 159,
            FaceLandmark::LeftCheek => 234,
            FaceLandmark::RightBrow => 295,
            FaceLandmark::RightEye => 386,
            FaceLandmark::RightCheek => 454,
        }
    }
}

impl FaceLandmarks {
    pub fn new(points: Vec<Point2<f32>>) -> FaceLandmarks {
        FaceLandmarks { points }
    }

    /// Build from a flat `[x0, y0, z0, x1, y1, z1, ...]` vector of coordinates
    /// normalised to the face box `(x, y, width, height)`.
    pub fn from_normalized_vec(points: &[f32], face_bbox: (u32, u32, u32, u32)) -> FaceLandmarks {
        let points = points
            .chunks_exact(3)
            .map(|p| {
                Point2::new(
                    p[0] * face_bbox.2 as f32 + face_bbox.0 as f32,
                    p[1] * face_bbox.3 as f32 + face_bbox.1 as f32,
                )
            })
            .collect();
        FaceLandmarks { points }
    }

    /// True when every point used for gesture recognition is present.
    pub fn has_gesture_points(&self) -> bool {
        FaceLandmark::ALL
            .iter()
            .all(|landmark| landmark.index() < self.points.len())
    }

    // pixel position, truncated towards zero
    pub fn pixel(&self, landmark: FaceLandmark) -> Point2<i32> {
        let p = self.points[landmark.index()];
        Point2::new(p.x as i32, p.y as i32)
    }

    pub fn pixel_distance(&self, a: FaceLandmark, b: FaceLandmark) -> f32 {
        let delta = self.pixel(a) - self.pixel(b);
        ((delta.x * delta.x + delta.y * delta.y) as f32).sqrt()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_normalized_points_into_face_box() {
        let landmarks = FaceLandmarks::from_normalized_vec(&[0.5, 0.25, 0.0, 1.0, 1.0, 3.0], (100, 40, 200, 80));
        assert_eq!(landmarks.len(), 2);
        assert_eq!(landmarks.points[0], Point2::new(200.0, 60.0));
        assert_eq!(landmarks.points[1], Point2::new(300.0, 120.0));
    }

    #[test]
    fn pixel_truncates_like_an_integer_cast() {
        let mut points = vec![Point2::new(0.0, 0.0); 478];
        points[FaceLandmark::NoseTip.index()] = Point2::new(10.9, 99.99);
        let landmarks = FaceLandmarks::new(points);
        assert_eq!(landmarks.pixel(FaceLandmark::NoseTip), Point2::new(10, 99));
        assert!(landmarks.has_gesture_points());
    }

    #[test]
    fn short_point_lists_lack_gesture_points() {
        let landmarks = FaceLandmarks::new(vec![Point2::new(0.0, 0.0); 468 - 20]);
        assert!(!landmarks.has_gesture_points());
    }
}
