// HTTP API: LINE webhook and health

pub mod health;
pub mod webhook;

pub use health::{create_health_router, HealthAppState};
pub use webhook::{create_webhook_router, WebhookAppState};
