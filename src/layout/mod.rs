pub mod algorithm;
pub mod config;
pub mod geometry;

pub use algorithm::{
    form_clusters, layout, DayLayout, Placement, RejectReason, RejectedAppointment, TimeBlock,
};
pub use config::LayoutConfig;
pub use geometry::{block_geometry, BlockGeometry};
