use std::collections::VecDeque;
use std::time::{Duration, Instant};

use facedrive::face::{FaceLandmark, FaceLandmarks};
use facedrive::face_landmarks::LandmarkDetector;
use facedrive::gesture::GestureThresholds;
use facedrive::session::{follow_camera, prepare_world, DriveSession, Step};
use facedrive::settings::SimulatorSettings;
use facedrive::simulator::{
    ActorId, Location, MapLayer, Rotation, Simulator, Transform, VehicleControl,
};
use facedrive::webcam::FrameSource;
use facedrive::{Error, Result};
use image::{DynamicImage, RgbImage};
use nalgebra::Point2;

struct ScriptedCamera {
    frames: usize,
}

impl FrameSource for ScriptedCamera {
    fn read_frame(&mut self) -> Option<DynamicImage> {
        if self.frames == 0 {
            return None;
        }
        self.frames -= 1;
        Some(DynamicImage::ImageRgb8(RgbImage::new(64, 48)))
    }
}

/// Hands out one scripted detection per frame; `None` entries mean no face.
struct ScriptedDetector {
    faces: VecDeque<Option<FaceLandmarks>>,
}

impl LandmarkDetector for ScriptedDetector {
    fn detect(&mut self, _frame: &DynamicImage) -> Result<Option<FaceLandmarks>> {
        Ok(self.faces.pop_front().flatten())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Unload(MapLayer),
    Spawn(String, usize),
    Transform(ActorId),
    Spectator(Transform),
    Control(ActorId, VehicleControl),
}

#[derive(Default)]
struct RecordingSimulator {
    calls: Vec<Call>,
    spawn_blocked: bool,
    vehicle_transform: Transform,
}

impl RecordingSimulator {
    fn controls(&self) -> Vec<VehicleControl> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Control(_, control) => Some(*control),
                _ => None,
            })
            .collect()
    }

    fn spectator_moves(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, Call::Spectator(_)))
            .count()
    }
}

impl Simulator for RecordingSimulator {
    fn unload_map_layer(&mut self, layer: MapLayer) -> Result<()> {
        self.calls.push(Call::Unload(layer));
        Ok(())
    }

    fn spawn_vehicle(&mut self, blueprint: &str, spawn_point: usize) -> Result<Option<ActorId>> {
        self.calls.push(Call::Spawn(blueprint.to_string(), spawn_point));
        if self.spawn_blocked {
            Ok(None)
        } else {
            Ok(Some(ActorId(24)))
        }
    }

    fn actor_transform(&mut self, actor: ActorId) -> Result<Transform> {
        self.calls.push(Call::Transform(actor));
        Ok(self.vehicle_transform)
    }

    fn set_spectator_transform(&mut self, transform: Transform) -> Result<()> {
        self.calls.push(Call::Spectator(transform));
        Ok(())
    }

    fn apply_control(&mut self, vehicle: ActorId, control: &VehicleControl) -> Result<()> {
        self.calls.push(Call::Control(vehicle, *control));
        Ok(())
    }
}

fn face_with_nose_at(nose_y: f32) -> FaceLandmarks {
    let mut points = vec![Point2::new(0.0, 0.0); 478];
    points[FaceLandmark::MouthTop.index()] = Point2::new(320.0, 300.0);
    points[FaceLandmark::MouthBottom.index()] = Point2::new(320.0, 330.0);
    points[FaceLandmark::LeftBrow.index()] = Point2::new(280.0, 150.0);
    points[FaceLandmark::LeftEye.index()] = Point2::new(280.0, 190.0);
    points[FaceLandmark::RightBrow.index()] = Point2::new(360.0, 150.0);
    points[FaceLandmark::RightEye.index()] = Point2::new(360.0, 190.0);
    points[FaceLandmark::LeftCheek.index()] = Point2::new(240.0, 250.0);
    points[FaceLandmark::RightCheek.index()] = Point2::new(400.0, 250.0);
    points[FaceLandmark::NoseTip.index()] = Point2::new(320.0, nose_y);
    FaceLandmarks::new(points)
}

fn session(
    frames: usize,
    faces: Vec<Option<FaceLandmarks>>,
    start: Instant,
) -> DriveSession<ScriptedCamera, ScriptedDetector, RecordingSimulator> {
    DriveSession::new(
        ScriptedCamera { frames },
        ScriptedDetector {
            faces: faces.into(),
        },
        RecordingSimulator::default(),
        ActorId(24),
        Location::new(-6.0, 0.0, 2.0),
        GestureThresholds::default(),
        start,
    )
}

#[test]
fn nod_sequence_shifts_into_second_gear() {
    let start = Instant::now();
    let mut session = session(
        2,
        vec![Some(face_with_nose_at(100.0)), Some(face_with_nose_at(130.0))],
        start,
    );

    session.step(start).unwrap();
    let step = session.step(start + Duration::from_millis(1500)).unwrap();

    let frame = match step {
        Step::Frame(frame) => frame,
        Step::CameraClosed => panic!("camera closed early"),
    };
    let driven = frame.driven.expect("face was present");
    assert_eq!(driven.gear, 2);
    assert_eq!(driven.gestures.control.gear, 2);
    assert!(!driven.gestures.control.reverse);
    assert_eq!(session.gear(), 2);

    let controls = session.simulator().controls();
    assert_eq!(controls.len(), 2);
    assert_eq!(controls[1], VehicleControl::with_gear(0.6, 0.0, 0.0, 2));
}

#[test]
fn frames_without_a_face_send_nothing_but_move_the_spectator() {
    let start = Instant::now();
    let mut session = session(3, vec![Some(face_with_nose_at(240.0)), None, None], start);

    for _ in 0..3 {
        session.step(start).unwrap();
    }

    assert_eq!(session.simulator().controls().len(), 1);
    assert_eq!(session.simulator().spectator_moves(), 3);
    assert_eq!(session.gear(), 1);
}

#[test]
fn frame_without_face_carries_no_drive_result() {
    let start = Instant::now();
    let mut session = session(1, vec![None], start);

    match session.step(start).unwrap() {
        Step::Frame(frame) => {
            assert!(frame.driven.is_none());
            assert_eq!(frame.image.width(), 64);
        }
        Step::CameraClosed => panic!("camera closed early"),
    }
}

#[test]
fn camera_failure_ends_the_session() {
    let start = Instant::now();
    let mut session = session(1, vec![None], start);

    assert!(matches!(session.step(start).unwrap(), Step::Frame(_)));
    assert!(matches!(session.step(start).unwrap(), Step::CameraClosed));
    assert!(session.simulator().calls.len() <= 2);
}

#[test]
fn spectator_follows_behind_and_above_the_vehicle() {
    let vehicle = Transform::new(Location::new(100.0, 50.0, 0.5), Rotation::new(0.0, 180.0, 0.0));
    let spectator = follow_camera(&vehicle, Location::new(-6.0, 0.0, 2.0));

    assert!((spectator.location.x - 106.0).abs() < 1e-3);
    assert!((spectator.location.y - 50.0).abs() < 1e-3);
    assert!((spectator.location.z - 2.5).abs() < 1e-3);
    assert_eq!(spectator.rotation, vehicle.rotation);
}

#[test]
fn prepare_world_unloads_decor_then_spawns() {
    let settings = SimulatorSettings::default();
    let mut simulator = RecordingSimulator::default();

    let vehicle = prepare_world(&mut simulator, &settings).unwrap();

    assert_eq!(vehicle, ActorId(24));
    assert_eq!(simulator.calls.len(), 8);
    assert_eq!(simulator.calls[0], Call::Unload(MapLayer::Buildings));
    assert_eq!(simulator.calls[6], Call::Unload(MapLayer::Walls));
    assert_eq!(
        simulator.calls[7],
        Call::Spawn("vehicle.mercedes.coupe_2020".to_string(), 75)
    );
}

#[test]
fn blocked_spawn_point_is_an_error() {
    let settings = SimulatorSettings::default();
    let mut simulator = RecordingSimulator {
        spawn_blocked: true,
        ..Default::default()
    };

    match prepare_world(&mut simulator, &settings) {
        Err(Error::SpawnFailed {
            blueprint,
            spawn_point,
        }) => {
            assert_eq!(blueprint, "vehicle.mercedes.coupe_2020");
            assert_eq!(spawn_point, 75);
        }
        other => panic!("unexpected {:?}", other),
    }
}
