pub mod model_mediapipe;

use image::DynamicImage;
use log::debug;

use crate::error::{Error, Result};
use crate::face::FaceLandmarks;
use crate::face_detection::FaceDetectionModel;

/// Per-frame facial landmark detection.
pub trait LandmarkDetector {
    /// Landmarks of the first face in `frame`, `None` if there is no face.
    fn detect(&mut self, frame: &DynamicImage) -> Result<Option<FaceLandmarks>>;
}

// define FaceLandmarksModel trait
pub trait FaceLandmarksModel {
    /// Run on the face inside `face_bbox`, returning the landmarks, the face
    /// presence confidence and a refined box to track the face with.
    fn run(
        &self,
        image: &DynamicImage,
        face_bbox: (u32, u32, u32, u32),
    ) -> Result<(FaceLandmarks, f32, (u32, u32, u32, u32))>;
}

/// Two-stage face mesh: the detector finds a face box, the landmark model
/// then follows the face from frame to frame until it loses confidence.
pub struct FaceMeshTracker<D, L> {
    detector: D,
    landmarks: L,
    tracked_bbox: Option<(u32, u32, u32, u32)>,
    min_detection_score: f32,
    min_face_confidence: f32,
}

impl<D: FaceDetectionModel, L: FaceLandmarksModel> FaceMeshTracker<D, L> {
    pub fn new(detector: D, landmarks: L, min_detection_score: f32, min_face_confidence: f32) -> Self {
        Self {
            detector,
            landmarks,
            tracked_bbox: None,
            min_detection_score,
            min_face_confidence,
        }
    }

    pub fn tracked_bbox(&self) -> Option<(u32, u32, u32, u32)> {
        self.tracked_bbox
    }
}

impl<D: FaceDetectionModel, L: FaceLandmarksModel> LandmarkDetector for FaceMeshTracker<D, L> {
    fn detect(&mut self, frame: &DynamicImage) -> Result<Option<FaceLandmarks>> {
        let face_bbox = match self.tracked_bbox {
            Some(face_bbox) => face_bbox,
            None => {
                let face = self.detector.run(frame)?;
                if face.score < self.min_detection_score || face.width == 0 || face.height == 0 {
                    return Ok(None);
                }
                debug!("Detected face at {:?} (score {:.2})", face.to_tuple(), face.score);
                face.to_tuple()
            }
        };

        let (landmarks, confidence, refined_bbox) = self.landmarks.run(frame, face_bbox)?;

        if confidence < self.min_face_confidence {
            // lost the face, search the whole frame again next time
            self.tracked_bbox = None;
            return Ok(None);
        }

        if !landmarks.has_gesture_points() {
            return Err(Error::Model(format!(
                "landmark model returned {} points",
                landmarks.len()
            )));
        }

        self.tracked_bbox = Some(refined_bbox);
        Ok(Some(landmarks))
    }
}
