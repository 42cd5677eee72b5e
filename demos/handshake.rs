//! # Handshake Example
//!
//! Two tasks talk through a pair of channels. Every step runs inline inside
//! the `emit` that wakes it; there is no executor.
//!
//! ## Run
//! ```bash
//! cargo run --example handshake
//! ```

use eventcast::{Channel, Task};

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let ping = Channel::<(u32,)>::new();
    let pong = Channel::<(u32,)>::new();

    let server = Task::new("server", {
        let ping = ping.clone();
        let pong = pong.clone();
        async move {
            loop {
                let (n,) = ping.next().await;
                println!("[server] ping {n}");
                pong.emit((n + 1,));
            }
        }
    });

    let client = Task::new("client", {
        let ping = ping.clone();
        let pong = pong.clone();
        async move {
            for round in 0..3 {
                // Attach to `pong` before pinging so the reply is not missed.
                let ((n,), ()) = futures::join!(pong.next(), async { ping.emit((round * 10,)) });
                println!("[client] pong {n}");
            }
        }
    });

    server.advance();
    client.advance();

    println!("client done: {}", client.is_done());
}
