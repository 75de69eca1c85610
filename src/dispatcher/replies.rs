//! Reply texts sent back to the chat user.

pub const LED_ON: &str = "LED is now ON";
pub const LED_ON_FAILED: &str = "Failed to turn on LED";
pub const LED_OFF: &str = "LED is now OFF";
pub const LED_OFF_FAILED: &str = "Failed to turn off LED";

pub const FOOD_STATUS_FAILED: &str = "Failed to retrieve food status.";
pub const TOO_MUCH_FOOD: &str = "Too much food!!!";
pub const MOTOR_FAILED: &str = "Failed to activate the motor for feeding.";
pub const FEEDING_INITIATED: &str = "Feeding initiated!";

pub const HELP: &str = "Send 'led on' or 'led off' to control the LED, 'feed' to activate \
feeding, or 'Check food status' to check the food level.";

pub fn food_level(percent: i64) -> String {
    format!("Current food level: {}%", percent)
}
