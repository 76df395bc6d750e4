//! Text messages exchanged with the simulator bridge.
//!
//! Every request and reply is one UTF-8 message of space-separated fields.
//! Replies start with `ok` followed by the request's result fields, or with
//! `err` followed by a human readable message.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::simulator::{ActorId, Location, MapLayer, Rotation, Transform, VehicleControl};

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    UnloadMapLayer(MapLayer),
    SpawnVehicle { blueprint: String, spawn_point: usize },
    GetTransform(ActorId),
    SetSpectatorTransform(Transform),
    ApplyControl { vehicle: ActorId, control: VehicleControl },
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::UnloadMapLayer(layer) => write!(f, "unload_map_layer {}", layer),
            Request::SpawnVehicle {
                blueprint,
                spawn_point,
            } => write!(f, "spawn_vehicle {} {}", blueprint, spawn_point),
            Request::GetTransform(actor) => write!(f, "get_transform {}", actor.0),
            Request::SetSpectatorTransform(t) => write!(
                f,
                "set_spectator_transform {} {} {} {} {} {}",
                t.location.x, t.location.y, t.location.z, t.rotation.pitch, t.rotation.yaw, t.rotation.roll
            ),
            Request::ApplyControl { vehicle, control } => write!(
                f,
                "apply_control {} {} {} {} {} {}",
                vehicle.0, control.throttle, control.steer, control.brake, control.gear, control.reverse
            ),
        }
    }
}

/// Fields of a successful reply, already split on whitespace.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    fields: Vec<String>,
}

impl Reply {
    /// Parse a raw reply, turning `err ...` into [`Error::Simulator`].
    pub fn parse(request: &Request, raw: &[u8]) -> Result<Reply> {
        let text = std::str::from_utf8(raw)
            .map_err(|err| Error::Protocol(format!("reply is not utf-8: {}", err)))?;
        let text = text.trim();

        let (status, rest) = match text.split_once(' ') {
            Some((status, rest)) => (status, rest.trim()),
            None => (text, ""),
        };

        match status {
            "ok" => Ok(Reply {
                fields: rest.split_whitespace().map(str::to_string).collect(),
            }),
            "err" => Err(Error::Simulator {
                request: request.to_string(),
                message: rest.to_string(),
            }),
            _ => Err(Error::Protocol(format!("unexpected reply `{}`", text))),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn expect_empty(self) -> Result<()> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(Error::Protocol(format!(
                "expected an empty reply, got `{}`",
                self.fields.join(" ")
            )))
        }
    }

    pub fn into_spawned_actor(self) -> Result<Option<ActorId>> {
        match self.fields.as_slice() {
            [id] if id == "none" => Ok(None),
            [id] => Ok(Some(ActorId(parse_field(id)?))),
            _ => Err(Error::Protocol(format!(
                "expected an actor id, got `{}`",
                self.fields.join(" ")
            ))),
        }
    }

    pub fn into_transform(self) -> Result<Transform> {
        if self.fields.len() != 6 {
            return Err(Error::Protocol(format!(
                "expected 6 transform fields, got {}",
                self.fields.len()
            )));
        }

        let mut values = [0.0f32; 6];
        for (value, field) in values.iter_mut().zip(self.fields.iter()) {
            *value = parse_field(field)?;
        }

        Ok(Transform::new(
            Location::new(values[0], values[1], values[2]),
            Rotation::new(values[3], values[4], values[5]),
        ))
    }
}

fn parse_field<T: FromStr>(field: &str) -> Result<T> {
    field
        .parse()
        .map_err(|_| Error::Protocol(format!("invalid field `{}`", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_control_requests() {
        let request = Request::ApplyControl {
            vehicle: ActorId(42),
            control: VehicleControl::with_gear(0.6, -0.5, 0.0, -1),
        };
        assert_eq!(request.to_string(), "apply_control 42 0.6 -0.5 0 0 true");
    }

    #[test]
    fn encodes_spawn_and_layer_requests() {
        let spawn = Request::SpawnVehicle {
            blueprint: "vehicle.mercedes.coupe_2020".to_string(),
            spawn_point: 75,
        };
        assert_eq!(spawn.to_string(), "spawn_vehicle vehicle.mercedes.coupe_2020 75");
        assert_eq!(
            Request::UnloadMapLayer(MapLayer::ParkedVehicles).to_string(),
            "unload_map_layer ParkedVehicles"
        );
    }

    #[test]
    fn parses_transform_replies() {
        let request = Request::GetTransform(ActorId(7));
        let transform = Reply::parse(&request, b"ok 1 2.5 3 0 90 -1.5")
            .unwrap()
            .into_transform()
            .unwrap();
        assert_eq!(transform.location, Location::new(1.0, 2.5, 3.0));
        assert_eq!(transform.rotation, Rotation::new(0.0, 90.0, -1.5));
    }

    #[test]
    fn parses_spawn_replies() {
        let request = Request::SpawnVehicle {
            blueprint: "vehicle.tesla.model3".to_string(),
            spawn_point: 0,
        };
        let spawned = Reply::parse(&request, b"ok 12").unwrap().into_spawned_actor().unwrap();
        assert_eq!(spawned, Some(ActorId(12)));
        let occupied = Reply::parse(&request, b"ok none").unwrap().into_spawned_actor().unwrap();
        assert_eq!(occupied, None);
    }

    #[test]
    fn err_replies_carry_the_request() {
        let request = Request::GetTransform(ActorId(3));
        match Reply::parse(&request, b"err actor 3 not found") {
            Err(Error::Simulator { request, message }) => {
                assert_eq!(request, "get_transform 3");
                assert_eq!(message, "actor 3 not found");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rejects_garbage() {
        let request = Request::GetTransform(ActorId(3));
        assert!(matches!(Reply::parse(&request, b"maybe"), Err(Error::Protocol(_))));
        let short = Reply::parse(&request, b"ok 1 2 3").unwrap().into_transform();
        assert!(matches!(short, Err(Error::Protocol(_))));
        let not_empty = Reply::parse(&request, b"ok 1").unwrap().expect_empty();
        assert!(matches!(not_empty, Err(Error::Protocol(_))));
    }
}
