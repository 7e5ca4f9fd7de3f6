//! Reqwest-backed chat webhook notifier.
//!
//! Posts short order summaries to the shop team's chat channel webhook.
//! Message rendering is kept here so the port stays free of chat formatting
//! concerns.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;

use crate::domain::orders::Order;
use crate::domain::ports::{NotifyError, OrderNotifier};

/// Connection settings for the chat webhook.
#[derive(Debug, Clone)]
pub struct ChatWebhookConfig {
    /// Incoming webhook URL.
    pub webhook_url: Url,
    /// Request timeout.
    pub timeout: Duration,
}

/// Notifier posting JSON messages to one webhook URL.
pub struct ChatWebhookNotifier {
    client: Client,
    webhook_url: Url,
}

impl ChatWebhookNotifier {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: ChatWebhookConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            webhook_url: config.webhook_url,
        })
    }

    async fn post(&self, content: String) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(&WebhookMessage { content })
            .send()
            .await
            .map_err(|err| map_transport_error(&err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(map_status_error(status));
        }
        Ok(())
    }
}

/// Chat webhook message body.
#[derive(Debug, Serialize)]
struct WebhookMessage {
    content: String,
}

fn map_transport_error(error: &reqwest::Error) -> NotifyError {
    if error.is_timeout() {
        NotifyError::timeout(error.to_string())
    } else {
        NotifyError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode) -> NotifyError {
    let message = format!("status {}", status.as_u16());
    if status.is_client_error() {
        NotifyError::rejected(message)
    } else {
        NotifyError::transport(message)
    }
}

fn render_placed(order: &Order) -> String {
    format!(
        "New order {} — {} line(s), {} — {}, {}",
        order.reference,
        order.lines.len(),
        order.totals.total,
        order.address.city,
        order.email,
    )
}

fn render_paid(order: &Order) -> String {
    format!("Order {} paid — {}", order.reference, order.totals.total)
}

#[async_trait]
impl OrderNotifier for ChatWebhookNotifier {
    async fn order_placed(&self, order: &Order) -> Result<(), NotifyError> {
        self.post(render_placed(order)).await
    }

    async fn order_paid(&self, order: &Order) -> Result<(), NotifyError> {
        self.post(render_paid(order)).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::domain::customer::EmailAddress;
    use crate::domain::money::Money;
    use crate::domain::orders::{
        OrderLine, OrderReference, OrderStatus, OrderTotals, ShippingAddress,
    };

    fn order() -> Order {
        let now = Utc::now();
        Order {
            id: Uuid::new_v4(),
            reference: OrderReference::parse("CH-7K2M9QARZX").expect("fixture reference"),
            customer_id: None,
            email: EmailAddress::new("ivan@example.bg").expect("fixture email"),
            address: ShippingAddress::try_from_parts(
                "Ivan Petrov",
                "0888123456",
                "Plovdiv",
                "4000",
                "ul. Ivan Vazov 5",
                None,
            )
            .expect("fixture address"),
            lines: vec![OrderLine {
                product_id: Uuid::new_v4(),
                sku: "BP-0986-4612".to_owned(),
                name: "Front brake pads".to_owned(),
                unit_price: Money::from_minor(5_990).expect("fixture"),
                quantity: 2,
            }],
            totals: OrderTotals {
                subtotal: Money::from_minor(11_980).expect("fixture"),
                delivery: Money::from_minor(690).expect("fixture"),
                total: Money::from_minor(12_670).expect("fixture"),
            },
            status: OrderStatus::Pending,
            payment_session_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn placed_message_names_reference_total_and_city() {
        let message = render_placed(&order());
        assert!(message.contains("CH-7K2M9QARZX"));
        assert!(message.contains("126.70 lv."));
        assert!(message.contains("Plovdiv"));
    }

    #[test]
    fn paid_message_is_short() {
        let message = render_paid(&order());
        assert!(message.starts_with("Order CH-7K2M9QARZX paid"));
    }
}
