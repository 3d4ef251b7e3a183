//! Builds the renderer-ready agenda for one calendar day.
//!
//! Appointments come from any [`AppointmentRepository`]; the layout engine
//! assigns columns and the geometry helpers turn those into block positions.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::layout::{
    self,
    geometry::{block_geometry, grid_height_px, hour_lines},
    BlockGeometry, LayoutConfig, Placement, RejectedAppointment,
};
use crate::{log_debug, log_warn};
use crate::models::{Appointment, AppointmentStatus};
use crate::store::AppointmentRepository;

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaEntry {
    pub id: String,
    pub client_name: String,
    pub service: String,
    pub status: AppointmentStatus,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub placement: Placement,
    pub geometry: BlockGeometry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAgenda {
    pub day: NaiveDate,
    pub entries: Vec<AgendaEntry>,
    /// Laid out but starting before the work window, so not drawn
    pub hidden: Vec<String>,
    pub rejected: Vec<RejectedAppointment>,
    pub grid_height_px: f64,
    pub hour_lines: Vec<(u32, f64)>,
}

/// Appointments whose start falls on `day`, in any status.
pub fn appointments_on(appointments: Vec<Appointment>, day: NaiveDate) -> Vec<Appointment> {
    appointments
        .into_iter()
        .filter(|a| a.start.date() == day)
        .collect()
}

/// Lays out one day's appointments and positions them on the grid.
pub fn arrange_day(appointments: &[Appointment], day: NaiveDate, config: &LayoutConfig) -> DayAgenda {
    let day_layout = layout::layout(appointments);

    // One block per placed id. The layout keeps the occurrence that sorts
    // last, so a later or equal start replaces an earlier duplicate.
    let mut placed: HashMap<&str, &Appointment> = HashMap::with_capacity(day_layout.len());
    for appointment in appointments.iter().filter(|a| a.end > a.start) {
        match placed.get(appointment.id.as_str()) {
            Some(&previous) => {
                log_warn!("Duplicate appointment id {} on {}", appointment.id, day);
                if appointment.start >= previous.start {
                    placed.insert(&appointment.id, appointment);
                }
            }
            None => {
                placed.insert(&appointment.id, appointment);
            }
        }
    }

    let mut entries = Vec::with_capacity(placed.len());
    let mut hidden = Vec::new();
    for appointment in placed.into_values() {
        let Some(placement) = day_layout.get(&appointment.id) else {
            continue;
        };

        match block_geometry(appointment.start, appointment.end, placement, config) {
            Some(geometry) => entries.push(AgendaEntry {
                id: appointment.id.clone(),
                client_name: appointment.client_name.clone(),
                service: appointment.service.clone(),
                status: appointment.status,
                start: appointment.start,
                end: appointment.end,
                placement,
                geometry,
            }),
            None => hidden.push(appointment.id.clone()),
        }
    }
    entries.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
    hidden.sort();

    log_debug!(
        "Agenda for {}: {} placed, {} hidden, {} rejected, {} clusters",
        day,
        entries.len(),
        hidden.len(),
        day_layout.rejected.len(),
        day_layout.cluster_count
    );

    DayAgenda {
        day,
        entries,
        hidden,
        rejected: day_layout.rejected,
        grid_height_px: grid_height_px(config),
        hour_lines: hour_lines(config),
    }
}

/// Fetches every appointment from `repo` and arranges the ones on `day`.
pub async fn build_day_agenda<R: AppointmentRepository>(
    repo: &R,
    day: NaiveDate,
    config: &LayoutConfig,
) -> Result<DayAgenda> {
    config.validate()?;
    let todays = appointments_on(repo.list().await?, day);
    Ok(arrange_day(&todays, day, config))
}
