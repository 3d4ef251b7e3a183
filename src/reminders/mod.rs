pub mod config;
pub mod confirmations;
pub mod services;

pub use config::ReminderConfig;
pub use confirmations::{confirm_by_token, send_confirmation_requests};
pub use services::send_service_reminders;
