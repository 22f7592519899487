//! # TM Server
//!
//! Publishes telemetry packets on a PUB socket. Publication is
//! fire-and-forget: a failed send is reported to the driver, which logs it
//! and carries on, while the socket reconnects in the background.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::Utc;

use comms_if::{
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
    tm::{TmPacket, TIMESTAMP_FORMAT},
};

use crate::data_store::DataStore;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Telemetry server
pub struct TmServer {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TmServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send telemetry: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the telemetry: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TmServer {
    /// Create a new instance of the TM Server.
    ///
    /// This function will not block until a subscriber connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, TmServerError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            bind: true,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(ctx, zmq::PUB, socket_options, &params.tm_endpoint)
            .map_err(TmServerError::SocketError)?;

        Ok(Self { socket })
    }

    /// True if at least one subscriber is connected.
    pub fn is_connected(&self) -> bool {
        self.socket.connected()
    }

    /// Publish a telemetry packet.
    pub fn send(&mut self, packet: &TmPacket) -> Result<(), TmServerError> {
        let packet_string =
            serde_json::to_string(packet).map_err(TmServerError::SerializationError)?;

        self.socket
            .send(&packet_string, 0)
            .map_err(TmServerError::SendError)
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the telemetry packet for the current cycle from the data store.
pub fn packet_from_datastore(ds: &DataStore) -> TmPacket {
    TmPacket {
        time_s: ds.elapsed_s,
        timestamp: Utc::now().format(TIMESTAMP_FORMAT).to_string(),
        line_sensors: ds.line_ctrl_input.frame.as_array(),
        left_speed: ds.line_ctrl_output.cmd.left_speed,
        right_speed: ds.line_ctrl_output.cmd.right_speed,
        error: ds.line_ctrl_output.error,
        derivative: ds.line_ctrl_output.derivative,
        control: ds.line_ctrl_output.control,
        kp: ds.line_ctrl.kp(),
        kd: ds.line_ctrl.kd(),
        distance: ds.distance,
        imu: ds.imu,
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::LineSensorFrame;

    #[test]
    fn test_packet_reflects_datastore() {
        let mut ds = DataStore::default();
        ds.elapsed_s = 2.5;
        ds.line_ctrl_input.frame = LineSensorFrame::new(120, 580, 90);
        ds.line_ctrl_output.cmd.left_speed = 20.0;
        ds.line_ctrl_output.cmd.right_speed = 30.0;
        ds.line_ctrl_output.error = 0.1;

        let packet = packet_from_datastore(&ds);

        assert_eq!(packet.time_s, 2.5);
        assert_eq!(packet.line_sensors, [120, 580, 90]);
        assert_eq!(packet.left_speed, 20.0);
        assert_eq!(packet.right_speed, 30.0);
        assert_eq!(packet.error, 0.1);
        assert_eq!(packet.kp, 60.0);
        assert_eq!(packet.kd, 15.0);
        assert!(packet.distance.is_none());
        assert!(packet.imu.is_none());
    }
}
