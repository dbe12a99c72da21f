//! Kiosk entry point.

use std::sync::Arc;

use domain::CartEvent;
use kiosk::{Config, Kiosk, KioskSession, Reply, render};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, closing the kiosk");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, closing the kiosk");
        }
    }
}

async fn show_event(session: &KioskSession, event: &CartEvent) {
    let view = session.view().await;
    if let Some(text) = render::event(event, &view) {
        println!("{text}");
    }
}

/// Prints session notifications and background notices until stopped, then
/// drains whatever is still queued.
async fn print_updates(
    session: Arc<KioskSession>,
    mut events: broadcast::Receiver<CartEvent>,
    mut notices: mpsc::UnboundedReceiver<String>,
    mut stop: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = &mut stop => break,
            event = events.recv() => match event {
                Ok(event) => show_event(&session, &event).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "display fell behind on cart updates");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            Some(notice) = notices.recv() => println!("{notice}"),
        }
    }

    while let Ok(event) = events.try_recv() {
        show_event(&session, &event).await;
    }
    while let Ok(notice) = notices.try_recv() {
        println!("{notice}");
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing on stderr so logs stay off the kiosk screen
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Open the ordering session
    let session = kiosk::build_session(&config).expect("failed to load menu");
    let events = session.subscribe().await;
    tracing::info!(
        session = %session.id(),
        latency_ms = config.submit_latency.as_millis() as u64,
        demo_table = %config.demo_table,
        "kiosk starting"
    );
    let (kiosk, notices) = Kiosk::new(session, &config);
    let mut kiosk = kiosk.with_metrics(metrics_handle);

    // 4. Print updates in the background
    let (stop_tx, stop_rx) = oneshot::channel();
    let printer = tokio::spawn(print_updates(
        Arc::clone(kiosk.session()),
        events,
        notices,
        stop_rx,
    ));

    println!("{}", render::menu(kiosk.session().catalog(), &kiosk.session().view().await));
    println!("Scan your table's QR code (`scan <payload>`) or type `demo`. `help` lists commands.");

    // 5. Command loop
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            line = lines.next_line() => match line {
                Ok(Some(line)) => match kiosk.handle_line(&line).await {
                    Reply::Output(text) if text.is_empty() => {}
                    Reply::Output(text) => println!("{text}"),
                    Reply::Quit => break,
                },
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "failed to read input");
                    break;
                }
            },
        }
    }

    // 6. Let a pending order land, flush the display, then close the session
    kiosk.wait_idle().await;
    let _ = stop_tx.send(());
    if let Err(e) = printer.await {
        tracing::error!(error = %e, "display task failed");
    }

    match kiosk.shutdown().await {
        Some(view) => tracing::info!(status = %view.status, items_left = view.total_quantity, "kiosk closed"),
        None => tracing::warn!("session still in use at shutdown"),
    }
}
