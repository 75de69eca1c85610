// LINE Messaging API transport

mod client;
mod signature;
mod webhook;

pub use client::LineClient;
pub use signature::{sign, verify_signature, SignatureError, SIGNATURE_HEADER};
pub use webhook::{EventMessage, TextMessageEvent, WebhookEvent, WebhookPayload};

use anyhow::Result;
use async_trait::async_trait;

/// Outbound side of the chat transport.
///
/// Shared between the webhook handler and the change monitor, so
/// implementations must be safe under concurrent use.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Answer one inbound event, correlated by its reply token.
    async fn reply(&self, reply_token: &str, text: &str) -> Result<()>;

    /// Push an unsolicited message to every subscriber.
    async fn broadcast(&self, text: &str) -> Result<()>;
}
