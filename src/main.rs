use std::sync::{Arc, Mutex};
use std::time::Instant;

use log::info;

use facedrive::app::{FacedriveApp, SharedFailure};
use facedrive::face_landmarks::model_mediapipe::load_face_mesh;
use facedrive::session::{prepare_world, DriveSession};
use facedrive::settings::Settings;
use facedrive::simulator::nng_client::NngSimulator;
use facedrive::webcam::OpenpnpCamera;
use facedrive::{Error, Result};

fn main() -> Result<()> {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let settings = Settings::default();

    let detector = load_face_mesh(&settings.model)?;

    let mut simulator = NngSimulator::connect(&settings.simulator.url(), settings.simulator.timeout)?;
    let vehicle = prepare_world(&mut simulator, &settings.simulator)?;

    let camera = OpenpnpCamera::open(&settings.camera)?;

    let session = DriveSession::new(
        camera,
        detector,
        simulator,
        vehicle,
        settings.simulator.follow_offset,
        settings.gestures.clone(),
        Instant::now(),
    );

    let failure: SharedFailure = Arc::new(Mutex::new(None));
    let app_failure = Arc::clone(&failure);

    // the app owns the camera, so it is released when the window goes away
    let result = eframe::run_native(
        "Facial Control",
        eframe::NativeOptions::default(),
        Box::new(move |_cc| Box::new(FacedriveApp::new(session, app_failure))),
    );

    info!("Exited safely.");

    result.map_err(|err| Error::Display(err.to_string()))?;

    let failure = match failure.lock() {
        Ok(mut guard) => guard.take(),
        Err(_) => None,
    };
    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
