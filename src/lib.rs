pub mod agenda;
pub mod layout;
pub mod models;
pub mod reminders;
pub mod reports;
pub mod settings;
pub mod store;
pub mod utils;

pub use agenda::{build_day_agenda, AgendaEntry, DayAgenda};
pub use layout::{layout, DayLayout, LayoutConfig, Placement};
pub use settings::{AgendaSettings, SettingsStore};
pub use store::{AppointmentRepository, Store, Tables};
pub use utils::init_logging;
