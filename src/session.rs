//! One drive session: camera in, vehicle commands out, one frame at a time.

use std::time::Instant;

use image::DynamicImage;
use log::{debug, info};

use crate::error::{Error, Result};
use crate::face::FaceLandmarks;
use crate::face_landmarks::LandmarkDetector;
use crate::gesture::{GestureInterpreter, GestureThresholds, Gestures};
use crate::settings::SimulatorSettings;
use crate::simulator::{ActorId, Location, Simulator, Transform};
use crate::webcam::FrameSource;

/// Spectator transform sitting at `offset` in the vehicle's frame, looking
/// the same way as the vehicle.
pub fn follow_camera(vehicle: &Transform, offset: Location) -> Transform {
    Transform::new(vehicle.transform_point(offset), vehicle.rotation)
}

/// Unload the décor map layers and spawn the vehicle to drive.
pub fn prepare_world<S: Simulator>(simulator: &mut S, settings: &SimulatorSettings) -> Result<ActorId> {
    for layer in settings.unloaded_layers.iter() {
        simulator.unload_map_layer(*layer)?;
    }

    let vehicle = simulator
        .spawn_vehicle(&settings.vehicle_blueprint, settings.spawn_point)?
        .ok_or_else(|| Error::SpawnFailed {
            blueprint: settings.vehicle_blueprint.clone(),
            spawn_point: settings.spawn_point,
        })?;

    info!(
        "Spawned {} at spawn point {} as actor {}",
        settings.vehicle_blueprint, settings.spawn_point, vehicle.0
    );

    Ok(vehicle)
}

/// What a face-bearing frame turned into.
#[derive(Debug, Clone)]
pub struct Driven {
    pub gestures: Gestures,
    /// Internal gear after this frame, `-1` meaning reverse.
    pub gear: i32,
    pub landmarks: FaceLandmarks,
}

#[derive(Debug, Clone)]
pub struct DriveFrame {
    pub image: DynamicImage,
    /// `None` when no face was found; nothing was sent to the vehicle then.
    pub driven: Option<Driven>,
}

#[derive(Debug, Clone)]
pub enum Step {
    Frame(DriveFrame),
    CameraClosed,
}

pub struct DriveSession<C, D, S> {
    camera: C,
    detector: D,
    simulator: S,
    vehicle: ActorId,
    follow_offset: Location,
    interpreter: GestureInterpreter,
}

impl<C, D, S> DriveSession<C, D, S>
where
    C: FrameSource,
    D: LandmarkDetector,
    S: Simulator,
{
    pub fn new(
        camera: C,
        detector: D,
        simulator: S,
        vehicle: ActorId,
        follow_offset: Location,
        thresholds: GestureThresholds,
        started_at: Instant,
    ) -> Self {
        Self {
            camera,
            detector,
            simulator,
            vehicle,
            follow_offset,
            interpreter: GestureInterpreter::new(thresholds, started_at),
        }
    }

    pub fn gear(&self) -> i32 {
        self.interpreter.gear()
    }

    pub fn vehicle(&self) -> ActorId {
        self.vehicle
    }

    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    /// Run one iteration of the drive loop.
    pub fn step(&mut self, now: Instant) -> Result<Step> {
        let image = match self.camera.read_frame() {
            Some(image) => image,
            None => {
                info!("Camera stopped delivering frames");
                return Ok(Step::CameraClosed);
            }
        };

        let landmarks = self.detector.detect(&image)?;

        let vehicle_transform = self.simulator.actor_transform(self.vehicle)?;
        self.simulator
            .set_spectator_transform(follow_camera(&vehicle_transform, self.follow_offset))?;

        let driven = match landmarks {
            Some(landmarks) => {
                let gestures = self.interpreter.interpret(&landmarks, now);
                self.simulator.apply_control(self.vehicle, &gestures.control)?;
                debug!("{:?}", gestures.control);

                Some(Driven {
                    gestures,
                    gear: self.interpreter.gear(),
                    landmarks,
                })
            }
            None => None,
        };

        Ok(Step::Frame(DriveFrame { image, driven }))
    }
}
