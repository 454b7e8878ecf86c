// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loads a JSON file with `${VAR}` placeholders taken from the environment and
//! prints every change made to it.
//!
//! ```text
//! DB_PASSWORD=secret cargo run --example watch_file -- config.json
//! ```

use std::time::Duration;
use streamcfg::prelude::*;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: watch_file <config.json>")?;

    let mut config = FileConfig::builder(serde_json::Value::Null)
        .path(&path)
        .codec(JsonCodec::pretty())
        .env_placeholders()
        .build()?;

    config.load()?;
    println!("loaded {}: {}", path, config.record());

    let watcher = config.watch(
        WatchOptions::new().interval(Duration::from_secs(1), Duration::from_secs(2)),
    )?;

    loop {
        match watcher.next() {
            Ok(delta) => {
                for (field, value) in &delta {
                    println!("{} = {}", field, value);
                }
            }
            Err(err) if err.is_stopped() => return Ok(()),
            Err(err) => return Err(err.into()),
        }
    }
}
