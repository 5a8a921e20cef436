//! Appointment service - booking, rescheduling and the status machine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    schedule_window, Appointment, AppointmentFilter, AppointmentStatus, AppointmentView,
    BookAppointment, RescheduleAppointment, UpdateAppointmentStatus,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::services::container::parallel;
use crate::types::{Paginated, PaginationParams};

#[async_trait]
pub trait AppointmentService: Send + Sync {
    async fn book(&self, tenant_id: Uuid, input: BookAppointment) -> AppResult<Appointment>;

    /// Sorted by start time, with patient and doctor names
    async fn list(
        &self,
        tenant_id: Uuid,
        filter: AppointmentFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<AppointmentView>>;

    async fn get(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Appointment>;

    /// Move a scheduled appointment to a new slot
    async fn reschedule(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: RescheduleAppointment,
    ) -> AppResult<Appointment>;

    async fn update_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateAppointmentStatus,
    ) -> AppResult<Appointment>;
}

pub struct AppointmentManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> AppointmentManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn ensure_slot_free(
        &self,
        tenant_id: Uuid,
        doctor_id: Uuid,
        window: (DateTime<Utc>, DateTime<Utc>),
        exclude: Option<Uuid>,
    ) -> AppResult<()> {
        let clashes = self
            .uow
            .appointments()
            .find_overlapping(tenant_id, doctor_id, window.0, window.1, exclude)
            .await?;
        if clashes.is_empty() {
            Ok(())
        } else {
            Err(AppError::conflict(
                "SLOT_UNAVAILABLE",
                "The doctor already has an appointment in this slot",
            ))
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> AppointmentService for AppointmentManager<U> {
    async fn book(&self, tenant_id: Uuid, input: BookAppointment) -> AppResult<Appointment> {
        let patient = self
            .uow
            .patients()
            .find_by_id(tenant_id, input.patient_id)
            .await?
            .ok_or_not_found("PATIENT_NOT_FOUND", "Patient")?;
        if !patient.is_active() {
            return Err(AppError::bad_request(
                "PATIENT_INACTIVE",
                "Cannot book an appointment for an inactive patient",
            ));
        }

        match self.uow.staff().find_by_id(tenant_id, input.doctor_id).await? {
            Some(doctor) if doctor.is_active() => {}
            _ => {
                return Err(AppError::bad_request(
                    "INVALID_DOCTOR",
                    "Doctor does not exist or is inactive",
                ))
            }
        }

        if let Some(department_id) = input.department_id {
            match self
                .uow
                .departments()
                .find_by_id(tenant_id, department_id)
                .await?
            {
                Some(department) if department.is_active() => {}
                _ => {
                    return Err(AppError::bad_request(
                        "INVALID_DEPARTMENT",
                        "Department does not exist or is inactive",
                    ))
                }
            }
        }

        let now = Utc::now();
        let window = schedule_window(input.scheduled_at, input.duration_minutes, now)?;
        self.ensure_slot_free(tenant_id, input.doctor_id, window, None)
            .await?;

        let appointment = Appointment {
            id: Uuid::new_v4(),
            tenant_id,
            patient_id: patient.id,
            doctor_id: input.doctor_id,
            department_id: input.department_id,
            scheduled_at: window.0,
            ends_at: window.1,
            reason: input.reason,
            notes: input.notes,
            status: AppointmentStatus::Scheduled,
            created_at: now,
            updated_at: now,
        };
        let appointment = self.uow.appointments().insert(&appointment).await?;
        tracing::info!(
            tenant = %tenant_id,
            appointment = %appointment.id,
            doctor = %appointment.doctor_id,
            at = %appointment.scheduled_at,
            "Appointment booked"
        );
        Ok(appointment)
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: AppointmentFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<AppointmentView>> {
        let (rows, total) = self
            .uow
            .appointments()
            .list(tenant_id, &filter, page)
            .await?;

        let patient_ids: Vec<Uuid> = rows
            .iter()
            .map(|a| a.patient_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let doctor_ids: Vec<Uuid> = rows
            .iter()
            .map(|a| a.doctor_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let patients_repo = self.uow.patients();
        let staff_repo = self.uow.staff();
        let (patients, doctors) = parallel::join2(
            patients_repo.find_by_ids(tenant_id, &patient_ids),
            staff_repo.find_by_ids(tenant_id, &doctor_ids),
        )
        .await?;

        let patient_names: HashMap<Uuid, String> =
            patients.iter().map(|p| (p.id, p.full_name())).collect();
        let doctor_names: HashMap<Uuid, String> =
            doctors.iter().map(|s| (s.id, s.full_name())).collect();

        Ok(Paginated::new(rows, page, total).map(|appointment| AppointmentView {
            patient_name: patient_names.get(&appointment.patient_id).cloned(),
            doctor_name: doctor_names.get(&appointment.doctor_id).cloned(),
            appointment,
        }))
    }

    async fn get(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Appointment> {
        self.uow
            .appointments()
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_not_found("APPOINTMENT_NOT_FOUND", "Appointment")
    }

    async fn reschedule(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: RescheduleAppointment,
    ) -> AppResult<Appointment> {
        let mut appointment = self.get(tenant_id, id).await?;
        if appointment.status != AppointmentStatus::Scheduled {
            return Err(AppError::bad_request(
                "INVALID_STATUS",
                format!(
                    "Appointment in status {} cannot be rescheduled",
                    appointment.status.as_str()
                ),
            ));
        }

        let window = schedule_window(input.scheduled_at, input.duration_minutes, Utc::now())?;
        self.ensure_slot_free(tenant_id, appointment.doctor_id, window, Some(id))
            .await?;

        appointment.scheduled_at = window.0;
        appointment.ends_at = window.1;
        appointment.updated_at = Utc::now();
        self.uow.appointments().update(&appointment).await
    }

    async fn update_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateAppointmentStatus,
    ) -> AppResult<Appointment> {
        let mut appointment = self.get(tenant_id, id).await?;
        let from = appointment.status;
        appointment.transition(input.status)?;
        if input.notes.is_some() {
            appointment.notes = input.notes;
        }

        let appointment = self.uow.appointments().update(&appointment).await?;
        tracing::info!(
            appointment = %id,
            from = from.as_str(),
            to = appointment.status.as_str(),
            "Appointment status changed"
        );
        Ok(appointment)
    }
}
