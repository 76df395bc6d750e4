use std::cmp::min;
use std::fs::File;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use log::info;
use ndarray::prelude::*;
use ndarray::CowArray;
use ndarray_npy::ReadNpyExt;
use ort::tensor::OrtOwnedTensor;
use ort::{Environment, Session, SessionBuilder, Value};

use crate::error::{Error, Result};
use crate::face_detection::{FaceBox, FaceDetectionModel};

const INPUT_SIZE: u32 = 256;

pub struct BlazefaceModel {
    session: Session,
    anchors: Array2<f32>,
}

impl BlazefaceModel {
    pub fn load(environment: &Arc<Environment>, model: &Path, anchors: &Path) -> Result<BlazefaceModel> {
        let session = SessionBuilder::new(environment)?
            .with_intra_threads(1)?
            .with_model_from_file(model)?;

        let anchors: Array2<f64> = Array2::<f64>::read_npy(File::open(anchors)?)?;
        let anchors = anchors.mapv(|x| x as f32);

        info!(
            "Loaded face detector {} ({} anchors)",
            model.display(),
            anchors.nrows()
        );

        Ok(BlazefaceModel { session, anchors })
    }

    // decode the regressor output of box `i` into (ymin, xmin, ymax, xmax), normalised to the input square
    fn decode_box(&self, raw_boxes: &ArrayView3<f32>, i: usize, scale: f32) -> [f32; 4] {
        let anchors = &self.anchors;

        let x_center = raw_boxes[[0, i, 0]] / scale * anchors[[i, 2]] + anchors[[i, 0]];
        let y_center = raw_boxes[[0, i, 1]] / scale * anchors[[i, 3]] + anchors[[i, 1]];

        let w = raw_boxes[[0, i, 2]] / scale * anchors[[i, 2]];
        let h = raw_boxes[[0, i, 3]] / scale * anchors[[i, 3]];

        [
            y_center - h / 2.0,
            x_center - w / 2.0,
            y_center + h / 2.0,
            x_center + w / 2.0,
        ]
    }
}

fn extract(outputs: &[Value], index: usize) -> Result<ArrayD<f32>> {
    let value = outputs
        .get(index)
        .ok_or_else(|| Error::Model(format!("face detector has no output {}", index)))?;
    let tensor: OrtOwnedTensor<f32, _> = value.try_extract()?;
    let view = tensor.view();
    Ok(view.deref().to_owned())
}

impl FaceDetectionModel for BlazefaceModel {
    fn run(&self, image: &DynamicImage) -> Result<FaceBox> {
        // cut a centered square from the image
        let side = min(image.width(), image.height());
        let crop_x = (image.width() - side) / 2;
        let crop_y = (image.height() - side) / 2;

        let input = image
            .crop_imm(crop_x, crop_y, side, side)
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

        // the model splits scores and boxes over two output pairs
        let scores = ndarray::concatenate(
            Axis(1),
            &[extract(&outputs, 0)?.view(), extract(&outputs, 1)?.view()],
        )?
        .into_dimensionality::<Ix3>()?;
        let boxes = ndarray::concatenate(
            Axis(1),
            &[extract(&outputs, 2)?.view(), extract(&outputs, 3)?.view()],
        )?
        .into_dimensionality::<Ix3>()?;

        if boxes.shape()[1] != self.anchors.nrows() || scores.shape()[1] != boxes.shape()[1] {
            return Err(Error::Model(format!(
                "face detector produced {} boxes for {} anchors",
                boxes.shape()[1],
                self.anchors.nrows()
            )));
        }

        let best = argmax(scores.iter());
        let score = sigmoid(scores[[0, best, 0]]);

        let [ymin, xmin, ymax, xmax] = self.decode_box(&boxes.view(), best, INPUT_SIZE as f32);

        // back into pixels of the uncropped image
        let to_px = |v: f32| (v.clamp(0.0, 1.0) * side as f32) as u32;

        Ok(FaceBox {
            x: to_px(xmin) + crop_x,
            y: to_px(ymin) + crop_y,
            width: to_px(xmax).saturating_sub(to_px(xmin)),
            height: to_px(ymax).saturating_sub(to_px(ymin)),
            score,
        })
    }
}

fn argmax<'a>(input: impl Iterator<Item = &'a f32>) -> usize {
    let mut max = f32::NEG_INFINITY;
    let mut max_index = 0;
    for (i, &item) in input.enumerate() {
        if item > max {
            max = item;
            max_index = i;
        }
    }
    max_index
}

pub(crate) fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_finds_negative_maximum() {
        let scores = [-3.0f32, -0.5, -2.0];
        assert_eq!(argmax(scores.iter()), 1);
    }

    #[test]
    fn sigmoid_is_centered_at_zero() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!(sigmoid(10.0) > 0.99);
        assert!(sigmoid(-10.0) < 0.01);
    }
}
