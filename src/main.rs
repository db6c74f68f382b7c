//! script-bridge demo entry point.
//!
//! Wires a bridge to the in-process loopback runtime, performs one
//! invocation, and prints the settled result. The real embedded runtime
//! would sit behind the same dispatch channel.

use std::sync::Arc;

use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use script_bridge_core::{Bridge, RuntimeId};
use script_bridge_host::{ChannelDispatcher, LoopbackRuntime};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,script_bridge=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting script-bridge demo");

    let (dispatcher, requests) = ChannelDispatcher::new();
    let bridge = Arc::new(Bridge::new(RuntimeId::new(0), Arc::new(dispatcher)));

    let runtime = LoopbackRuntime::builder()
        .function("Kernel", "+", |args| {
            let mut total = 0i64;
            for arg in args {
                total += arg
                    .as_i64()
                    .ok_or_else(|| json!("argument is not an integer"))?;
            }
            Ok(json!(total))
        })
        .build();
    let worker = runtime.spawn(&bridge, requests);

    info!(runtime_id = %bridge.runtime_id(), "Bridge wired to loopback runtime");

    let result = bridge.invoke("Kernel", "+", json!([1, 2]))?.await?;
    println!("Result: {result}");

    // Dropping the bridge closes the dispatch channel and stops the loop.
    drop(bridge);
    worker.await?;

    Ok(())
}
