//! Order submission service trait and simulated implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use domain::{OrderSnapshot, SubmissionAck, SubmissionError};
use tokio::sync::Mutex;

/// How long the simulated service takes to accept an order.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(1500);

/// Reason reported when the simulated service is told to fail.
pub const REJECTION_REASON: &str = "Failed to place order. Please try again.";

/// Trait for handing an order to the kitchen.
///
/// Latency is unspecified; callers must not assume the order was accepted
/// until the returned future resolves.
#[async_trait]
pub trait OrderSubmissionService: Send + Sync {
    /// Submits an order snapshot.
    async fn submit(&self, order: &OrderSnapshot) -> Result<SubmissionAck, SubmissionError>;
}

#[derive(Debug, Default)]
struct SimulatedState {
    orders: Vec<(SubmissionAck, OrderSnapshot)>,
    next_id: u32,
}

/// Submission service that waits, then accepts every order.
#[derive(Debug, Clone)]
pub struct SimulatedSubmissionService {
    latency: Duration,
    fail_on_submit: Arc<AtomicBool>,
    state: Arc<Mutex<SimulatedState>>,
}

impl Default for SimulatedSubmissionService {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSubmissionService {
    /// Creates a service with the default latency.
    pub fn new() -> Self {
        Self::with_latency(DEFAULT_LATENCY)
    }

    /// Creates a service with a custom latency.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            fail_on_submit: Arc::new(AtomicBool::new(false)),
            state: Arc::new(Mutex::new(SimulatedState::default())),
        }
    }

    /// Returns the simulated latency.
    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Configures the service to reject subsequent submissions.
    pub fn set_fail_on_submit(&self, fail: bool) {
        self.fail_on_submit.store(fail, Ordering::SeqCst);
    }

    /// Returns true if submissions are currently rejected.
    pub fn fails_on_submit(&self) -> bool {
        self.fail_on_submit.load(Ordering::SeqCst)
    }

    /// Returns the number of accepted orders.
    pub async fn submitted_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }

    /// Returns the accepted orders with their references, oldest first.
    pub async fn submitted_orders(&self) -> Vec<(SubmissionAck, OrderSnapshot)> {
        self.state.lock().await.orders.clone()
    }
}

#[async_trait]
impl OrderSubmissionService for SimulatedSubmissionService {
    async fn submit(&self, order: &OrderSnapshot) -> Result<SubmissionAck, SubmissionError> {
        tokio::time::sleep(self.latency).await;

        if self.fails_on_submit() {
            return Err(SubmissionError::Rejected(REJECTION_REASON.to_string()));
        }

        let mut state = self.state.lock().await;
        state.next_id += 1;
        let ack = SubmissionAck {
            order_ref: format!("ORD-{:04}", state.next_id),
        };
        state.orders.push((ack.clone(), order.clone()));

        tracing::debug!(order_ref = %ack.order_ref, total = %order.total_amount, "order accepted");
        Ok(ack)
    }
}
