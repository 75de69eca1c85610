use serde::Deserialize;

/// Body of one webhook delivery from the LINE platform
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    /// Bot user ID the events were sent to
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// A single webhook event.
///
/// Only the fields needed to route text messages are modelled; everything
/// else in the event object is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    /// "message", "follow", "unfollow", "postback", ...
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(rename = "replyToken", default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub message: Option<EventMessage>,
}

/// Message object of a "message" event
#[derive(Debug, Clone, Deserialize)]
pub struct EventMessage {
    /// "text", "image", "sticker", ...
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// A validated (reply token, text) pair ready for dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct TextMessageEvent {
    pub reply_token: String,
    pub text: String,
}

impl WebhookEvent {
    /// Returns the text event carried by this event, if it is one.
    pub fn as_text_message(&self) -> Option<TextMessageEvent> {
        if self.event_type != "message" {
            return None;
        }
        let message = self.message.as_ref()?;
        if message.message_type != "text" {
            return None;
        }
        Some(TextMessageEvent {
            reply_token: self.reply_token.clone()?,
            text: message.text.clone()?,
        })
    }
}

impl WebhookPayload {
    /// Text-message events in delivery order; all other events are dropped.
    pub fn text_messages(&self) -> Vec<TextMessageEvent> {
        self.events
            .iter()
            .filter_map(WebhookEvent::as_text_message)
            .collect()
    }
}
