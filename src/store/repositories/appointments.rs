use std::future::Future;

use anyhow::Result;

use crate::log_info;
use crate::models::{Appointment, AppointmentInput, AppointmentPatch, AppointmentStatus};
use crate::store::{
    helpers::{new_id, not_found},
    Store,
};

const ENABLE_LOGS: bool = true;

/// Appointment storage as seen by the agenda. The layout engine never touches
/// this; only the code that feeds it does.
pub trait AppointmentRepository {
    fn list(&self) -> impl Future<Output = Result<Vec<Appointment>>> + Send;

    fn get_by_id(&self, id: &str) -> impl Future<Output = Result<Option<Appointment>>> + Send;

    fn add(&self, input: AppointmentInput) -> impl Future<Output = Result<Appointment>> + Send;

    fn update(
        &self,
        id: &str,
        patch: AppointmentPatch,
    ) -> impl Future<Output = Result<Appointment>> + Send;

    fn delete(&self, id: &str) -> impl Future<Output = Result<()>> + Send;
}

impl Store {
    pub async fn list_appointments(&self) -> Result<Vec<Appointment>> {
        self.execute(|tables| Ok(tables.appointments.clone())).await
    }

    pub async fn list_appointments_for_client(&self, client_id: &str) -> Result<Vec<Appointment>> {
        let client_id = client_id.to_string();
        self.execute(move |tables| {
            Ok(tables
                .appointments
                .iter()
                .filter(|a| a.client_id == client_id)
                .cloned()
                .collect())
        })
        .await
    }

    pub async fn get_appointment(&self, id: &str) -> Result<Option<Appointment>> {
        let id = id.to_string();
        self.execute(move |tables| Ok(tables.appointments.iter().find(|a| a.id == id).cloned()))
            .await
    }

    /// Books a new appointment as `pending_confirmation`; end = start + duration.
    pub async fn add_appointment(&self, input: AppointmentInput) -> Result<Appointment> {
        let appointment = Appointment {
            id: new_id(),
            end: input.end()?,
            client_id: input.client_id,
            client_name: input.client_name,
            service: input.service,
            start: input.start,
            estimated_duration_minutes: input.estimated_duration_minutes,
            status: AppointmentStatus::PendingConfirmation,
            confirmation_token: None,
        };

        let created = self
            .execute(move |tables| {
                tables.appointments.push(appointment.clone());
                Ok(appointment)
            })
            .await?;

        log_info!(
            "Booked appointment {} for {} at {}",
            created.id,
            created.client_name,
            created.start
        );
        Ok(created)
    }

    pub async fn update_appointment(
        &self,
        id: &str,
        patch: AppointmentPatch,
    ) -> Result<Appointment> {
        let id = id.to_string();
        self.execute(move |tables| {
            let slot = tables
                .appointments
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| not_found("appointment", &id))?;

            *slot = patch.apply(slot)?;
            Ok(slot.clone())
        })
        .await
    }

    pub async fn delete_appointment(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.execute(move |tables| {
            let index = tables
                .appointments
                .iter()
                .position(|a| a.id == id)
                .ok_or_else(|| not_found("appointment", &id))?;
            tables.appointments.remove(index);
            Ok(())
        })
        .await
    }
}

impl AppointmentRepository for Store {
    async fn list(&self) -> Result<Vec<Appointment>> {
        self.list_appointments().await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Appointment>> {
        self.get_appointment(id).await
    }

    async fn add(&self, input: AppointmentInput) -> Result<Appointment> {
        self.add_appointment(input).await
    }

    async fn update(&self, id: &str, patch: AppointmentPatch) -> Result<Appointment> {
        self.update_appointment(id, patch).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.delete_appointment(id).await
    }
}
