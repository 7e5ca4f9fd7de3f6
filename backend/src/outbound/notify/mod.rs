//! Ops chat-webhook notification adapter.

mod chat_webhook;

pub use chat_webhook::{ChatWebhookConfig, ChatWebhookNotifier};
