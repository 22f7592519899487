//! Simple telemetry subscriber test
//!
//! Connects to the robot's telemetry publisher and prints every packet it
//! recieves. This is the minimal stand-in for a ground dashboard.

use comms_if::net::{MonitoredSocket, SocketOptions};
use comms_if::tm::TmPacket;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Create zmq context
    let ctx = zmq::Context::new();

    // Create socket options
    let socket_options = SocketOptions {
        ..Default::default()
    };

    // Create the socket
    let socket = MonitoredSocket::new(&ctx, zmq::SUB, socket_options, "tcp://localhost:5040")?;

    // Subscribe to everything, the robot publishes a single stream
    socket.set_subscribe(b"")?;

    println!("Subscribed to telemetry on port 5040");

    // Recieve packets from the robot
    loop {
        let msg = socket.recv_msg(0)?;

        let msg_str = match msg.as_str() {
            Some(s) => s,
            None => {
                println!("Got non UTF-8 message, skipping");
                continue;
            }
        };

        match serde_json::from_str::<TmPacket>(msg_str) {
            Ok(packet) => println!(
                "[{:8.3}] line {:?} speeds ({:5.1}, {:5.1}) error {:+.3} control {:+.3}",
                packet.time_s,
                packet.line_sensors,
                packet.left_speed,
                packet.right_speed,
                packet.error,
                packet.control
            ),
            Err(e) => println!("Could not parse packet ({}): {}", e, msg_str),
        }
    }
}
