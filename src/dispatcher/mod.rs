// Chat command dispatch

pub mod replies;


use crate::line::ChatTransport;
use crate::store::{RemoteStore, FOOD_PATH, LED_PATH, MOTOR_PATH};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Food level above which feeding is refused
pub const DEFAULT_FEED_THRESHOLD: i64 = 30;

/// Recognized chat commands.
///
/// Matching is exact and case-sensitive: "LED ON" or "led on " are not
/// commands and get the help reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    LedOn,
    LedOff,
    Feed,
    CheckFoodStatus,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::LedOn,
        Command::LedOff,
        Command::Feed,
        Command::CheckFoodStatus,
    ];

    /// The exact text a user sends for this command
    pub fn text(self) -> &'static str {
        match self {
            Command::LedOn => "led on",
            Command::LedOff => "led off",
            Command::Feed => "feed",
            Command::CheckFoodStatus => "Check food status",
        }
    }

    pub fn parse(input: &str) -> Option<Command> {
        Self::ALL.into_iter().find(|command| command.text() == input)
    }
}

/// Maps inbound chat text to store operations and exactly one reply.
///
/// Holds no mutable state; any number of dispatches may run concurrently.
#[derive(Clone)]
pub struct CommandDispatcher {
    store: Arc<dyn RemoteStore>,
    transport: Arc<dyn ChatTransport>,
    feed_threshold: i64,
}

impl CommandDispatcher {
    pub fn new(store: Arc<dyn RemoteStore>, transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            store,
            transport,
            feed_threshold: DEFAULT_FEED_THRESHOLD,
        }
    }

    pub fn with_feed_threshold(mut self, feed_threshold: i64) -> Self {
        self.feed_threshold = feed_threshold;
        self
    }

    /// Handle one text message and send its reply.
    ///
    /// Every outcome is reported through the reply; a failed send is logged
    /// and dropped.
    pub async fn dispatch(&self, reply_token: &str, text: &str) {
        let reply = self.respond(text).await;

        if let Err(e) = self.transport.reply(reply_token, &reply).await {
            error!(reply_token = %reply_token, error = %e, "Failed to send reply");
        }
    }

    /// Run the command named by `text` and return the reply to send.
    pub async fn respond(&self, text: &str) -> String {
        match Command::parse(text) {
            Some(command) => {
                info!(command = ?command, "Dispatching command");
                self.execute(command).await
            }
            None => {
                debug!(text = %text, "Unrecognized command");
                replies::HELP.to_string()
            }
        }
    }

    async fn execute(&self, command: Command) -> String {
        match command {
            Command::LedOn => self.set_led(1, replies::LED_ON, replies::LED_ON_FAILED).await,
            Command::LedOff => self.set_led(0, replies::LED_OFF, replies::LED_OFF_FAILED).await,
            Command::Feed => self.feed().await,
            Command::CheckFoodStatus => self.check_food().await,
        }
    }

    async fn set_led(&self, value: i64, success: &str, failure: &str) -> String {
        match self.store.set_int(LED_PATH, value).await {
            Ok(()) => success.to_string(),
            Err(e) => {
                error!(path = %LED_PATH, value = value, error = %e, "Failed to set LED state");
                failure.to_string()
            }
        }
    }

    /// Read-then-write; the food level may change in between.
    async fn feed(&self) -> String {
        let food_level = match self.store.get_int(FOOD_PATH).await {
            Ok(level) => level,
            Err(e) => {
                error!(path = %FOOD_PATH, error = %e, "Failed to read food level");
                return replies::FOOD_STATUS_FAILED.to_string();
            }
        };

        if food_level > self.feed_threshold {
            info!(
                food_level = food_level,
                threshold = self.feed_threshold,
                "Feeding refused"
            );
            return replies::TOO_MUCH_FOOD.to_string();
        }

        match self.store.set_int(MOTOR_PATH, 1).await {
            Ok(()) => replies::FEEDING_INITIATED.to_string(),
            Err(e) => {
                error!(path = %MOTOR_PATH, error = %e, "Failed to start feeding motor");
                replies::MOTOR_FAILED.to_string()
            }
        }
    }

    async fn check_food(&self) -> String {
        match self.store.get_int(FOOD_PATH).await {
            Ok(level) => replies::food_level(level),
            Err(e) => {
                error!(path = %FOOD_PATH, error = %e, "Failed to read food level");
                replies::FOOD_STATUS_FAILED.to_string()
            }
        }
    }
}
