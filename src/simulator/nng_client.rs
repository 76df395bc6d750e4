use std::time::Duration;

use log::{debug, info};
use nng::options::{Options, RecvTimeout, SendTimeout};
use nng::{Protocol, Socket};

use crate::error::Result;
use crate::simulator::protocol::{Reply, Request};
use crate::simulator::{ActorId, MapLayer, Simulator, Transform, VehicleControl};

/// Simulator session over an nng request/reply socket.
pub struct NngSimulator {
    socket: Socket,
}

impl NngSimulator {
    /// Dial the simulator bridge at `url`; `timeout` bounds every send and receive.
    pub fn connect(url: &str, timeout: Duration) -> Result<NngSimulator> {
        let socket = Socket::new(Protocol::Req0)?;
        socket.set_opt::<SendTimeout>(Some(timeout))?;
        socket.set_opt::<RecvTimeout>(Some(timeout))?;
        socket.dial(url)?;

        info!("Connected to simulator at {}", url);

        Ok(NngSimulator { socket })
    }

    fn request(&mut self, request: Request) -> Result<Reply> {
        let encoded = request.to_string();
        debug!("-> {}", encoded);

        self.socket
            .send(encoded.as_bytes())
            .map_err(|(_, err)| err)?;
        let msg = self.socket.recv()?;

        Reply::parse(&request, &msg)
    }
}

impl Simulator for NngSimulator {
    fn unload_map_layer(&mut self, layer: MapLayer) -> Result<()> {
        self.request(Request::UnloadMapLayer(layer))?.expect_empty()
    }

    fn spawn_vehicle(&mut self, blueprint: &str, spawn_point: usize) -> Result<Option<ActorId>> {
        self.request(Request::SpawnVehicle {
            blueprint: blueprint.to_string(),
            spawn_point,
        })?
        .into_spawned_actor()
    }

    fn actor_transform(&mut self, actor: ActorId) -> Result<Transform> {
        self.request(Request::GetTransform(actor))?.into_transform()
    }

    fn set_spectator_transform(&mut self, transform: Transform) -> Result<()> {
        self.request(Request::SetSpectatorTransform(transform))?
            .expect_empty()
    }

    fn apply_control(&mut self, vehicle: ActorId, control: &VehicleControl) -> Result<()> {
        self.request(Request::ApplyControl {
            vehicle,
            control: *control,
        })?
        .expect_empty()
    }
}
