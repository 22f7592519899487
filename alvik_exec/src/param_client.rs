//! # Parameter Client
//!
//! Subscribes to the ground's parameter channel and hands out gain updates.
//! The check is non-blocking so the control loop's cadence is never held up
//! by an idle channel.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
    param::{ParamParseError, ParamUpdate},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameter update client
pub struct ParamClient {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ParamClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not recieve a message from the channel: {0}")]
    RecvError(zmq::Error),

    #[error("Could not parse the recieved update: {0}")]
    ParseError(#[from] ParamParseError),

    #[error("The channel sent a message which was not valid UTF-8")]
    NonUtf8Message,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ParamClient {
    /// Create a new instance of the parameter client.
    ///
    /// This function will not block until the channel connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, ParamClientError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(ctx, zmq::SUB, socket_options, &params.param_endpoint)
            .map_err(ParamClientError::SocketError)?;

        // All messages on this channel are parameter updates
        socket
            .set_subscribe(b"")
            .map_err(|e| ParamClientError::SocketError(MonitoredSocketError::SocketOptionError(
                "set_subscribe".into(),
                e,
            )))?;

        Ok(Self { socket })
    }

    /// True if the client is connected to the channel.
    pub fn is_connected(&self) -> bool {
        self.socket.connected()
    }

    /// Check for a pending parameter update without blocking.
    ///
    /// The protocol is to call `poll` in a loop until `Ok(None)` is returned,
    /// indicating there are no more pending updates this cycle. A parse error
    /// consumes the offending message, the caller logs it and carries on -
    /// a malformed update never partially applies.
    pub fn poll(&self) -> Result<Option<ParamUpdate>, ParamClientError> {
        let msg_str = match self.socket.recv_string(0) {
            // Valid message
            Ok(Ok(s)) => s,
            // Non UTF-8 message
            Ok(Err(_)) => return Err(ParamClientError::NonUtf8Message),
            // No message in timeout
            Err(zmq::Error::EAGAIN) => return Ok(None),
            // Recieve error
            Err(e) => return Err(ParamClientError::RecvError(e)),
        };

        ParamUpdate::from_json(&msg_str)
            .map(Some)
            .map_err(ParamClientError::from)
    }
}
