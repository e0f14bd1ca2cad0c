//! # digit-ink demo driver
//!
//! Headless stand-in for the drawing page: connects to the inference
//! service, hand-draws a digit "7" with synthetic pointer events, and logs
//! every prediction that comes back until Ctrl-C.

use std::time::Duration;

use ink_core::PointerEvent;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ink_client::{ClientConfig, Session, SessionHandle};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,ink_client=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ink_client=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ClientConfig::from_env();
    tracing::info!(endpoint = %config.endpoint, "Starting digit-ink session");

    let handle = Session::spawn(config);

    // Log every prediction as it lands.
    let mut predictions = handle.predictions();
    tokio::spawn(async move {
        while predictions.changed().await.is_ok() {
            let latest = predictions.borrow_and_update().clone();
            if let Some(prediction) = latest {
                let ranked: Vec<String> = prediction
                    .ranked()
                    .iter()
                    .map(|e| format!("{} ({:.1}%)", e.label, f64::from(e.confidence) * 100.0))
                    .collect();
                tracing::info!("Prediction: {}", ranked.join(", "));
            }
        }
    });

    draw_seven(&handle).await;
    tracing::info!("Digit drawn; streaming until Ctrl-C");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    handle.shutdown().await;

    Ok(())
}

/// Trace a "7" the way a hand would: a horizontal bar, then a diagonal
/// descender, with move events spread over real time so several export
/// ticks see the stroke in progress.
async fn draw_seven(handle: &SessionHandle) {
    handle.pointer(PointerEvent::Down { x: 70.0, y: 60.0 });
    glide(handle, (70.0, 60.0), (210.0, 60.0)).await;
    glide(handle, (210.0, 60.0), (130.0, 230.0)).await;
    handle.pointer(PointerEvent::Up);
}

/// Emit interpolated move events between two points at pointer-ish pace.
async fn glide(handle: &SessionHandle, from: (f32, f32), to: (f32, f32)) {
    const STEPS: u32 = 20;
    for i in 1..=STEPS {
        #[allow(clippy::cast_precision_loss)]
        let t = i as f32 / STEPS as f32;
        handle.pointer(PointerEvent::Move {
            x: from.0 + (to.0 - from.0) * t,
            y: from.1 + (to.1 - from.1) * t,
        });
        tokio::time::sleep(Duration::from_millis(15)).await;
    }
}
