//! Best-effort confirmation publisher.
//!
//! Delivery failures are logged and swallowed; they never roll back or fail
//! the operation that triggered them.

use crate::store::orders::OrderRow;

const CONFIRMED_SUBJECT: &str = "shopfront.orders.confirmed";

#[derive(Clone)]
pub struct Notifier {
    client: Option<async_nats::Client>,
}

impl Notifier {
    pub fn new(client: Option<async_nats::Client>) -> Self {
        Self { client }
    }

    /// A notifier that drops everything; used when no broker is configured
    /// and in tests.
    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub async fn order_confirmed(&self, recipient: &str, order: &OrderRow) {
        let Some(client) = &self.client else {
            tracing::debug!(order_id = %order.id, "no notification broker configured");
            return;
        };
        let payload = serde_json::json!({
            "recipient": recipient,
            "subject": "Your order is confirmed",
            "order_id": order.id,
            "payment_ref": order.payment_ref,
            "total_cents": order.total_cents,
        });
        if let Err(e) = client.publish(CONFIRMED_SUBJECT.to_string(), payload.to_string().into()).await {
            tracing::warn!(order_id = %order.id, error = %e, "order confirmation notification failed");
        }
    }
}
