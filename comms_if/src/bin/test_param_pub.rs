//! Simple parameter publisher test
//!
//! Binds the parameter channel and cycles the proportional gain between two
//! values so a running robot can be watched reacting to live retuning.

use comms_if::net::{MonitoredSocket, SocketOptions};
use comms_if::param::ParamUpdate;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Create zmq context
    let ctx = zmq::Context::new();

    // Create socket options
    let socket_options = SocketOptions {
        bind: true,
        block_on_first_connect: false,
        ..Default::default()
    };

    // Create the socket
    let socket = MonitoredSocket::new(&ctx, zmq::PUB, socket_options, "tcp://*:5041")?;

    println!("Parameter publisher open on port 5041");

    let gains = [60.0, 80.0];
    let mut i = 0;

    loop {
        let update = ParamUpdate {
            kp: Some(gains[i % gains.len()]),
            ..Default::default()
        };
        i += 1;

        let update_str = serde_json::to_string(&update)?;

        match socket.send(&update_str, 0) {
            Ok(_) => println!("Sent {}", update_str),
            Err(e) => println!("Failed to send update: {}", e),
        }

        std::thread::sleep(std::time::Duration::from_secs(5));
    }
}
