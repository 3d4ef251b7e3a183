pub mod appointments;
pub mod campaigns;
pub mod clients;
pub mod reminder_rules;
pub mod segments;
