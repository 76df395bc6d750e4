pub mod nng_client;
pub mod protocol;

use std::fmt;
use std::str::FromStr;

use nalgebra::{Matrix3, Vector3};

use crate::error::Result;

/// Identifier of an actor spawned in the simulation world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId(pub u32);

/// Control command applied to a vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleControl {
    pub throttle: f32,
    pub steer: f32,
    pub brake: f32,
    /// Forward gear sent to the simulator, never negative.
    pub gear: i32,
    pub reverse: bool,
}

impl Default for VehicleControl {
    fn default() -> Self {
        Self {
            throttle: 0.0,
            steer: 0.0,
            brake: 0.0,
            gear: 0,
            reverse: false,
        }
    }
}

impl VehicleControl {
    /// Build a command from an internal gear in `[-1, max]`; negative gears
    /// select reverse with the forward gear left at 0.
    pub fn with_gear(throttle: f32, steer: f32, brake: f32, gear: i32) -> Self {
        Self {
            throttle,
            steer,
            brake,
            gear: gear.max(0),
            reverse: gear < 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Location {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Location {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Rotation {
    pub fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    // left-handed, z-up rotation matrix (yaw about z, pitch about y, roll about x)
    pub fn matrix(&self) -> Matrix3<f32> {
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        let (sr, cr) = self.roll.to_radians().sin_cos();

        Matrix3::new(
            cp * cy,
            cy * sp * sr - sy * cr,
            -cy * sp * cr - sy * sr,
            cp * sy,
            sy * sp * sr + cy * cr,
            -sy * sp * cr + cy * sr,
            sp,
            -cp * sr,
            cp * cr,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub location: Location,
    pub rotation: Rotation,
}

impl Transform {
    pub fn new(location: Location, rotation: Rotation) -> Self {
        Self { location, rotation }
    }

    /// Map a point from this transform's local frame into world coordinates.
    pub fn transform_point(&self, point: Location) -> Location {
        let local = Vector3::new(point.x, point.y, point.z);
        let world = self.rotation.matrix() * local
            + Vector3::new(self.location.x, self.location.y, self.location.z);
        Location::new(world.x, world.y, world.z)
    }
}

/// Map layers that can be unloaded to lighten the rendered world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapLayer {
    Buildings,
    Decals,
    Foliage,
    ParkedVehicles,
    Particles,
    Props,
    Walls,
}

impl fmt::Display for MapLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MapLayer::Buildings => "Buildings",
            MapLayer::Decals => "Decals",
            MapLayer::Foliage => "Foliage",
            MapLayer::ParkedVehicles => "ParkedVehicles",
            MapLayer::Particles => "Particles",
            MapLayer::Props => "Props",
            MapLayer::Walls => "Walls",
        };
        f.write_str(name)
    }
}

impl FromStr for MapLayer {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Buildings" => Ok(MapLayer::Buildings),
            "Decals" => Ok(MapLayer::Decals),
            "Foliage" => Ok(MapLayer::Foliage),
            "ParkedVehicles" => Ok(MapLayer::ParkedVehicles),
            "Particles" => Ok(MapLayer::Particles),
            "Props" => Ok(MapLayer::Props),
            "Walls" => Ok(MapLayer::Walls),
            other => Err(format!("unknown map layer {}", other)),
        }
    }
}

/// Session with a running simulation world.
pub trait Simulator {
    fn unload_map_layer(&mut self, layer: MapLayer) -> Result<()>;

    /// Try to spawn a vehicle; `None` when the spawn point is occupied.
    fn spawn_vehicle(&mut self, blueprint: &str, spawn_point: usize) -> Result<Option<ActorId>>;

    fn actor_transform(&mut self, actor: ActorId) -> Result<Transform>;

    fn set_spectator_transform(&mut self, transform: Transform) -> Result<()>;

    fn apply_control(&mut self, vehicle: ActorId, control: &VehicleControl) -> Result<()>;
}
