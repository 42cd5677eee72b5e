//! # Clicks Example
//!
//! Mixes both consumer kinds on one channel:
//! - a `LogWriter` and a counter callback that see every click,
//! - a task that waits for a "double click" (two clicks at the same spot).
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example clicks --features logging
//! ```

use std::{cell::Cell, rc::Rc};

use eventcast::{Channel, ChannelConfig, LogWriter, Progress, Task};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let clicks = Channel::<(i32, i32)>::with_config(ChannelConfig::named("clicks"));
    clicks.subscribe_handler(LogWriter::with_label("clicks"));

    let total = Rc::new(Cell::new(0u32));
    let t = Rc::clone(&total);
    clicks.subscribe(move |_| t.set(t.get() + 1));

    let detector = Task::new("double-click", {
        let clicks = clicks.clone();
        async move {
            let mut prev = clicks.next().await;
            loop {
                let next = clicks.next().await;
                if next == prev {
                    println!("double click at {next:?}");
                    return;
                }
                prev = next;
            }
        }
    });
    assert_eq!(detector.advance(), Progress::Suspended);

    for pos in [(1, 1), (5, 2), (5, 2), (9, 9)] {
        clicks.emit(pos);
    }

    println!();
    println!("Summary:");
    println!(" ├─► Clicks:   {}", total.get());
    println!(" ├─► Detector: {}", if detector.is_done() { "done" } else { "waiting" });
    println!(" └─► Last:     {:?}", clicks.last());
}
