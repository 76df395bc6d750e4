use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use log::info;
use ndarray::{Array, CowArray};
use ort::tensor::OrtOwnedTensor;
use ort::{Environment, ExecutionProvider, Session, SessionBuilder, Value};

use crate::error::{Error, Result};
use crate::face::FaceLandmarks;
use crate::face_detection::model_blazeface::{sigmoid, BlazefaceModel};
use crate::face_landmarks::{FaceLandmarksModel, FaceMeshTracker};
use crate::settings::ModelSettings;

const INPUT_SIZE: u32 = 256;

/// BlazeFace detection followed by MediaPipe face mesh landmarks.
pub type MediapipeFaceMesh = FaceMeshTracker<BlazefaceModel, MediapipeFaceLandmarksModel>;

pub fn load_face_mesh(settings: &ModelSettings) -> Result<MediapipeFaceMesh> {
    let environment = Environment::builder()
        .with_name("facedrive")
        .with_execution_providers([ExecutionProvider::CPU(Default::default())])
        .build()?
        .into_arc();

    let detector = BlazefaceModel::load(&environment, &settings.face_detector, &settings.anchors)?;
    let landmarks = MediapipeFaceLandmarksModel::load(&environment, &settings.face_landmarks)?;

    Ok(FaceMeshTracker::new(
        detector,
        landmarks,
        settings.min_detection_score,
        settings.min_face_confidence,
    ))
}

pub struct MediapipeFaceLandmarksModel {
    session: Session,
}

impl MediapipeFaceLandmarksModel {
    pub fn load(environment: &Arc<Environment>, model: &Path) -> Result<MediapipeFaceLandmarksModel> {
        let session = SessionBuilder::new(environment)?
            .with_intra_threads(1)?
            .with_model_from_file(model)?;

        info!("Loaded face landmark model {}", model.display());

        Ok(MediapipeFaceLandmarksModel { session })
    }
}

impl FaceLandmarksModel for MediapipeFaceLandmarksModel {
    fn run(
        &self,
        input: &DynamicImage,
        face_bbox: (u32, u32, u32, u32),
    ) -> Result<(FaceLandmarks, f32, (u32, u32, u32, u32))> {
        // add 25% padding around the face
        let padding = 0.25 * face_bbox.2 as f32;

        let crop_bbox = adjust_bbox(
            (face_bbox.0 as f32 - padding) as i32,
            (face_bbox.1 as f32 - padding) as i32,
            (face_bbox.2 as f32 + 2.0 * padding) as i32,
            (face_bbox.3 as f32 + 2.0 * padding) as i32,
            input.width(),
            input.height(),
        );

        let input = input
            .crop_imm(crop_bbox.0, crop_bbox.1, crop_bbox.2, crop_bbox.3)
            .resize_exact(INPUT_SIZE, INPUT_SIZE, image::imageops::FilterType::Nearest)
            .to_rgb8();

        let input: Vec<f32> = input
            .pixels()
            .flat_map(|p| p.0)
            .map(|p| p as f32 / 255.0)
            .collect();

        let array = CowArray::from(
            Array::from_shape_vec((1, INPUT_SIZE as usize, INPUT_SIZE as usize, 3), input)?.into_dyn(),
        );

        let inputs = vec![Value::from_array(self.session.allocator(), &array)?];
        let outputs: Vec<Value> = self.session.run(inputs)?;

        if outputs.len() < 2 {
            return Err(Error::Model(format!(
                "landmark model produced {} outputs",
                outputs.len()
            )));
        }

        let face_flag: OrtOwnedTensor<f32, _> = outputs[1].try_extract()?;
        let face_flag = face_flag.view();
        let face_flag = face_flag
            .deref()
            .iter()
            .next()
            .copied()
            .ok_or_else(|| Error::Model("landmark model produced no face flag".to_string()))?;
        let confidence = sigmoid(face_flag);

        let res: OrtOwnedTensor<f32, _> = outputs[0].try_extract()?;
        let res = res.view();

        // landmarks come in input pixels, normalise them to the crop
        let points: Vec<f32> = res.deref().iter().map(|p| p / INPUT_SIZE as f32).collect();
        let landmarks = FaceLandmarks::from_normalized_vec(&points, crop_bbox);

        let refined_bbox = face_bbox_from_landmarks(&landmarks).unwrap_or(face_bbox);

        Ok((landmarks, confidence, refined_bbox))
    }
}

// square box around all landmarks, in pixels
fn face_bbox_from_landmarks(landmarks: &FaceLandmarks) -> Option<(u32, u32, u32, u32)> {
    if landmarks.is_empty() {
        return None;
    }

    let mut x_min = f32::MAX;
    let mut y_min = f32::MAX;
    let mut x_max = f32::MIN;
    let mut y_max = f32::MIN;

    for p in landmarks.points.iter() {
        x_min = x_min.min(p.x);
        y_min = y_min.min(p.y);
        x_max = x_max.max(p.x);
        y_max = y_max.max(p.y);
    }

    let w = x_max - x_min;
    let h = y_max - y_min;
    let center = (x_min + w / 2.0, y_min + h / 2.0);
    let size = w.max(h);

    // re-center the box
    let x_min = (center.0 - size / 2.0).max(0.0);
    let y_min = (center.1 - size / 2.0).max(0.0);

    Some((x_min as u32, y_min as u32, size as u32, size as u32))
}

fn adjust_bbox(x: i32, y: i32, w: i32, h: i32, image_w: u32, image_h: u32) -> (u32, u32, u32, u32) {
    let original_aspect_ratio = w.max(1) as f32 / h.max(1) as f32;

    // keep the box inside the image
    let x = x.clamp(0, image_w as i32 - 1);
    let y = y.clamp(0, image_h as i32 - 1);

    let w = w.min(image_w as i32 - x).max(1);
    let h = h.min(image_h as i32 - y).max(1);

    // restore the aspect ratio by shortening the longer side
    let short_side = w.min(h) as f32;
    let (w, h) = if original_aspect_ratio >= 1.0 {
        (short_side, short_side / original_aspect_ratio)
    } else {
        (short_side * original_aspect_ratio, short_side)
    };

    (x as u32, y as u32, (w as u32).max(1), (h as u32).max(1))
}
