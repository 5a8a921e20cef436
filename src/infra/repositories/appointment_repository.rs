//! Appointment repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use super::entities::appointment::{ActiveModel, Column, Entity as AppointmentEntity};
use super::fetch_page;
use crate::domain::{Appointment, AppointmentFilter, AppointmentStatus};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Appointment>>;

    /// Sorted by start time
    async fn list(
        &self,
        tenant_id: Uuid,
        filter: &AppointmentFilter,
        page: PaginationParams,
    ) -> AppResult<(Vec<Appointment>, u64)>;

    async fn insert(&self, appointment: &Appointment) -> AppResult<Appointment>;

    async fn update(&self, appointment: &Appointment) -> AppResult<Appointment>;

    /// Slot-blocking appointments of `doctor_id` intersecting `[start, end)`,
    /// ignoring `exclude`
    async fn find_overlapping(
        &self,
        tenant_id: Uuid,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> AppResult<Vec<Appointment>>;

    /// Next slot-blocking appointments starting after `from`
    async fn upcoming_for_patient(
        &self,
        tenant_id: Uuid,
        patient_id: Uuid,
        from: DateTime<Utc>,
        limit: u64,
    ) -> AppResult<Vec<Appointment>>;
}

pub struct AppointmentStore {
    db: DatabaseConnection,
}

impl AppointmentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn scoped(tenant_id: Uuid) -> sea_orm::Select<AppointmentEntity> {
    AppointmentEntity::find().filter(Column::TenantId.eq(tenant_id))
}

fn blocking_statuses() -> impl Iterator<Item = &'static str> {
    AppointmentStatus::BLOCKING.into_iter().map(|s| s.as_str())
}

#[async_trait]
impl AppointmentRepository for AppointmentStore {
    async fn find_by_id(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Option<Appointment>> {
        let result = scoped(tenant_id)
            .filter(Column::Id.eq(id))
            .one(&self.db)
            .await?;
        Ok(result.map(Appointment::from))
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: &AppointmentFilter,
        page: PaginationParams,
    ) -> AppResult<(Vec<Appointment>, u64)> {
        let mut query = scoped(tenant_id);
        if let Some(patient_id) = filter.patient_id {
            query = query.filter(Column::PatientId.eq(patient_id));
        }
        if let Some(doctor_id) = filter.doctor_id {
            query = query.filter(Column::DoctorId.eq(doctor_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(Column::Status.eq(status.as_str()));
        }
        if let Some(from) = filter.from {
            query = query.filter(Column::ScheduledAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(Column::ScheduledAt.lt(to));
        }

        let (rows, total) =
            fetch_page(query.order_by_asc(Column::ScheduledAt), &self.db, page).await?;
        Ok((rows.into_iter().map(Appointment::from).collect(), total))
    }

    async fn insert(&self, appointment: &Appointment) -> AppResult<Appointment> {
        let model = ActiveModel::from(appointment).insert(&self.db).await?;
        Ok(Appointment::from(model))
    }

    async fn update(&self, appointment: &Appointment) -> AppResult<Appointment> {
        let mut active = ActiveModel::from(appointment);
        active.id = NotSet;
        active.tenant_id = NotSet;
        active.created_at = NotSet;

        let result = AppointmentEntity::update_many()
            .set(active)
            .filter(Column::Id.eq(appointment.id))
            .filter(Column::TenantId.eq(appointment.tenant_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found(
                "APPOINTMENT_NOT_FOUND",
                "Appointment not found",
            ));
        }
        Ok(appointment.clone())
    }

    async fn find_overlapping(
        &self,
        tenant_id: Uuid,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> AppResult<Vec<Appointment>> {
        let mut query = scoped(tenant_id)
            .filter(Column::DoctorId.eq(doctor_id))
            .filter(Column::Status.is_in(blocking_statuses()))
            .filter(Column::ScheduledAt.lt(end))
            .filter(Column::EndsAt.gt(start));
        if let Some(id) = exclude {
            query = query.filter(Column::Id.ne(id));
        }

        let rows = query.all(&self.db).await?;
        Ok(rows.into_iter().map(Appointment::from).collect())
    }

    async fn upcoming_for_patient(
        &self,
        tenant_id: Uuid,
        patient_id: Uuid,
        from: DateTime<Utc>,
        limit: u64,
    ) -> AppResult<Vec<Appointment>> {
        let rows = scoped(tenant_id)
            .filter(Column::PatientId.eq(patient_id))
            .filter(Column::Status.is_in(blocking_statuses()))
            .filter(Column::ScheduledAt.gte(from))
            .order_by_asc(Column::ScheduledAt)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Appointment::from).collect())
    }
}
