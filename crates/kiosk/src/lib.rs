//! Terminal ordering kiosk.
//!
//! Turns typed commands into ordering session operations and renders the
//! results as text. Order submission runs in the background so the customer
//! can keep asking for `status` while the kitchen answers; the outcome arrives
//! as a [`CartEvent`](domain::CartEvent) on the session's notification channel.

pub mod command;
pub mod config;
pub mod render;

use std::sync::Arc;

use domain::{
    CartView, Catalog, CatalogError, CustomerInfo, MenuItemId, PaymentMethod, ScanSession,
    TableResolver,
};
use metrics_exporter_prometheus::PrometheusHandle;
use ordering::{OrderingError, OrderingSession, SimulatedSubmissionService};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub use command::{Command, CommandError};
pub use config::Config;

/// The session type the kiosk drives.
pub type KioskSession = OrderingSession<SimulatedSubmissionService>;

/// Builds an ordering session from configuration.
pub fn build_session(config: &Config) -> Result<KioskSession, CatalogError> {
    let catalog = match &config.menu_path {
        Some(path) => Catalog::load(path)?,
        None => Catalog::demo(),
    };
    let service = SimulatedSubmissionService::with_latency(config.submit_latency);
    Ok(OrderingSession::new(
        Arc::new(catalog),
        TableResolver::new(config.demo_table.as_str()),
        service,
    ))
}

/// What the command loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Print this text; empty means print nothing.
    Output(String),
    /// Leave the command loop.
    Quit,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Reply::Output(text.into())
    }
}

/// Command interpreter bound to one ordering session.
pub struct Kiosk {
    session: Arc<KioskSession>,
    demo_table: String,
    scan_frames: u32,
    in_flight: Option<JoinHandle<()>>,
    metrics: Option<PrometheusHandle>,
    notices: mpsc::UnboundedSender<String>,
}

impl Kiosk {
    /// Creates a kiosk and the channel on which background notices arrive.
    pub fn new(session: KioskSession, config: &Config) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (notices, rx) = mpsc::unbounded_channel();
        let kiosk = Self {
            session: Arc::new(session),
            demo_table: config.demo_table.clone(),
            scan_frames: config.scan_frames.max(1),
            in_flight: None,
            metrics: None,
            notices,
        };
        (kiosk, rx)
    }

    /// Attaches the Prometheus handle rendered by the `metrics` command.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Returns the ordering session.
    pub fn session(&self) -> &Arc<KioskSession> {
        &self.session
    }

    /// Parses and runs one input line.
    pub async fn handle_line(&mut self, line: &str) -> Reply {
        match line.parse::<Command>() {
            Ok(command) => self.handle(command).await,
            Err(CommandError::Empty) => Reply::text(""),
            Err(e) => Reply::text(e.to_string()),
        }
    }

    /// Runs one command.
    #[tracing::instrument(skip(self, command), fields(command = command.name()))]
    pub async fn handle(&mut self, command: Command) -> Reply {
        metrics::counter!("kiosk_commands_total", "command" => command.name()).increment(1);

        let result = match command {
            Command::Menu => {
                let view = self.session.view().await;
                Ok(render::menu(self.session.catalog(), &view))
            }
            Command::Scan(payload) => self.scan(&payload).await,
            Command::Demo => self
                .session
                .bind_table_from_payload(&self.demo_table)
                .await
                .map(|_| "Demo mode: no scan needed".to_string()),
            Command::Add(item_id) => self.add(item_id).await,
            Command::Remove(item_id) => self.remove(item_id).await,
            Command::Delete(item_id) => {
                let name = self.item_name(item_id);
                self.session.delete_line(item_id).await.map(|deleted| {
                    if deleted {
                        format!("Removed all {name} from your cart")
                    } else {
                        format!("{name} is not in your cart")
                    }
                })
            }
            Command::Clear => self
                .session
                .clear_cart()
                .await
                .map(|()| "Cart cleared".to_string()),
            Command::Cart => Ok(render::cart(&self.session.view().await)),
            Command::Checkout {
                payment_method,
                name,
                notes,
            } => {
                let mut customer = CustomerInfo::new(name);
                if let Some(notes) = notes {
                    customer = customer.with_notes(notes);
                }
                self.checkout(customer, payment_method).await
            }
            Command::NewOrder => self
                .session
                .reset_for_new_order()
                .await
                .map(|()| "Ready for a new order".to_string()),
            Command::Status => Ok(render::status(&self.session.view().await)),
            Command::Json => Ok(serde_json::to_string_pretty(&self.session.view().await)
                .unwrap_or_else(|e| format!("could not serialize cart: {e}"))),
            Command::SimulateFailure(fail) => {
                self.session.service().set_fail_on_submit(fail);
                tracing::info!(fail, "simulated submission failure toggled");
                Ok(if fail {
                    "The kitchen will reject orders".to_string()
                } else {
                    "The kitchen is accepting orders".to_string()
                })
            }
            Command::Metrics => Ok(match &self.metrics {
                Some(handle) => handle.render(),
                None => "Metrics recorder is not installed".to_string(),
            }),
            Command::Help => Ok(render::help()),
            Command::Quit => return Reply::Quit,
        };

        match result {
            Ok(text) => Reply::Output(text),
            Err(e) => {
                tracing::debug!(error = %e, recoverable = e.is_recoverable(), "command failed");
                Reply::Output(e.to_string())
            }
        }
    }

    fn item_name(&self, item_id: MenuItemId) -> String {
        self.session
            .catalog()
            .get(item_id)
            .map(|item| item.name.clone())
            .unwrap_or_else(|| format!("item {item_id}"))
    }

    async fn add(&self, item_id: MenuItemId) -> ordering::Result<String> {
        let quantity = self.session.add_item(item_id).await?;
        let view = self.session.view().await;
        Ok(format!(
            "Added {} (x{quantity}). Cart: {} item(s), {}",
            self.item_name(item_id),
            view.total_quantity,
            view.total_amount
        ))
    }

    async fn remove(&self, item_id: MenuItemId) -> ordering::Result<String> {
        let name = self.item_name(item_id);
        Ok(match self.session.remove_one_unit(item_id).await? {
            None => format!("{name} is not in your cart"),
            Some(0) => format!("Removed {name} from your cart"),
            Some(quantity) => format!("{name}: x{quantity}"),
        })
    }

    // A camera reports the same code on several consecutive frames; only the
    // first read of a scan is resolved.
    async fn scan(&self, payload: &str) -> ordering::Result<String> {
        let mut scan = ScanSession::new();
        let mut accepted = None;
        for _ in 0..self.scan_frames {
            if let Some(raw) = scan.offer(payload) {
                accepted = Some(raw);
            }
        }
        let Some(raw) = accepted else {
            return Ok(String::new());
        };

        let table = self.session.bind_table_from_payload(raw).await?;
        tracing::debug!(%table, ignored = scan.ignored_count(), "scan resolved");
        Ok("QR code accepted".to_string())
    }

    async fn checkout(
        &mut self,
        customer: CustomerInfo,
        payment_method: PaymentMethod,
    ) -> ordering::Result<String> {
        // The cart is `Submitting` before the reply goes out; only the wait for
        // the kitchen runs in the background.
        let snapshot = self.session.begin_order(customer, payment_method).await?;
        let reply = format!(
            "Placing your order ({}, {})...",
            snapshot.total_amount, payment_method
        );

        let session = Arc::clone(&self.session);
        let notices = self.notices.clone();
        self.in_flight = Some(tokio::spawn(async move {
            match session.complete_order(snapshot).await {
                // Outcomes are rendered from the session's events.
                Ok(_) | Err(OrderingError::Submission(_)) => {}
                Err(e) => {
                    let _ = notices.send(e.to_string());
                }
            }
        }));

        Ok(reply)
    }

    /// Waits for a background submission to finish.
    pub async fn wait_idle(&mut self) {
        if let Some(task) = self.in_flight.take() {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "submission task failed");
            }
        }
    }

    /// Waits for any submission, then closes the session.
    ///
    /// Returns `None` if the session is still shared elsewhere.
    pub async fn shutdown(mut self) -> Option<CartView> {
        self.wait_idle().await;
        Arc::into_inner(self.session).map(OrderingSession::close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn kiosk() -> (Kiosk, mpsc::UnboundedReceiver<String>) {
        let config = Config {
            submit_latency: Duration::ZERO,
            ..Config::default()
        };
        let session = build_session(&config).unwrap();
        Kiosk::new(session, &config)
    }

    fn text(reply: Reply) -> String {
        match reply {
            Reply::Output(text) => text,
            Reply::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn test_build_session_with_missing_menu_file() {
        let config = Config {
            menu_path: Some("/no/such/menu.json".into()),
            ..Config::default()
        };
        assert!(matches!(build_session(&config), Err(CatalogError::Io { .. })));
    }

    #[tokio::test]
    async fn test_add_and_remove_replies() {
        let (mut kiosk, _rx) = kiosk();

        let reply = text(kiosk.handle_line("add 1").await);
        assert_eq!(reply, "Added Classic Burger (x1). Cart: 1 item(s), RM18.99");

        let reply = text(kiosk.handle_line("remove 1").await);
        assert_eq!(reply, "Removed Classic Burger from your cart");

        let reply = text(kiosk.handle_line("remove 1").await);
        assert_eq!(reply, "Classic Burger is not in your cart");
    }

    #[tokio::test]
    async fn test_errors_are_rendered() {
        let (mut kiosk, _rx) = kiosk();
        assert_eq!(
            text(kiosk.handle_line("add 99").await),
            "Cart error: Unknown menu item: 99"
        );
        assert!(text(kiosk.handle_line("scan nope").await).starts_with("Invalid QR code."));
        assert!(text(kiosk.handle_line("bogus").await).starts_with("unknown command"));
        assert_eq!(text(kiosk.handle_line("").await), "");
    }

    #[tokio::test]
    async fn test_empty_checkout_rejected_immediately() {
        let (mut kiosk, _rx) = kiosk();
        let reply = text(kiosk.handle_line("checkout cash Ben").await);
        assert_eq!(reply, "Cart error: Cart is empty");
        assert!(kiosk.in_flight.is_none());
    }

    #[tokio::test]
    async fn test_quit() {
        let (mut kiosk, _rx) = kiosk();
        assert_eq!(kiosk.handle_line("quit").await, Reply::Quit);
    }

    #[tokio::test]
    async fn test_metrics_without_recorder() {
        let (mut kiosk, _rx) = kiosk();
        assert_eq!(
            text(kiosk.handle(Command::Metrics).await),
            "Metrics recorder is not installed"
        );
    }
}
