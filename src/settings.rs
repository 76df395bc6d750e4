use std::path::PathBuf;
use std::time::Duration;

use crate::gesture::GestureThresholds;
use crate::simulator::{Location, MapLayer};

// all tunables of a drive session; there is no config file, defaults are the values used
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub camera: CameraSettings,
    pub simulator: SimulatorSettings,
    pub model: ModelSettings,
    pub gestures: GestureThresholds,
}

#[derive(Debug, Clone)]
pub struct CameraSettings {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            index: 0,
            width: 640,
            height: 480,
            fps: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulatorSettings {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
    pub spawn_point: usize,
    pub vehicle_blueprint: String,
    pub unloaded_layers: Vec<MapLayer>,
    /// Spectator position relative to the vehicle, in the vehicle's frame.
    pub follow_offset: Location,
}

impl SimulatorSettings {
    pub fn url(&self) -> String {
        format!("tcp://{}:{}", self.host, self.port)
    }
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 2000,
            timeout: Duration::from_secs(10),
            spawn_point: 75,
            vehicle_blueprint: "vehicle.mercedes.coupe_2020".to_string(),
            unloaded_layers: vec![
                MapLayer::Buildings,
                MapLayer::Decals,
                MapLayer::Foliage,
                MapLayer::ParkedVehicles,
                MapLayer::Particles,
                MapLayer::Props,
                MapLayer::Walls,
            ],
            follow_offset: Location::new(-6.0, 0.0, 2.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub face_detector: PathBuf,
    pub anchors: PathBuf,
    pub face_landmarks: PathBuf,
    /// Minimum face-presence confidence of the landmark model.
    pub min_face_confidence: f32,
    /// Minimum detector score before a face box is handed to the landmark model.
    pub min_detection_score: f32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            face_detector: PathBuf::from("assets/face_detection_back_256x256_float32_opt.onnx"),
            anchors: PathBuf::from("assets/anchors.npy"),
            face_landmarks: PathBuf::from("assets/face_landmarks_detector.onnx"),
            min_face_confidence: 0.5,
            min_detection_score: 0.5,
        }
    }
}
