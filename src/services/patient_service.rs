//! Patient service - registration, records and the clinical summary.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    generate_mrn, Patient, PatientFilter, PatientIdentity, PatientSummary, Principal,
    RecordStatus, RegisterPatient, UpdatePatient,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::services::container::parallel;
use crate::types::{Paginated, PaginationParams};

const MRN_ATTEMPTS: usize = 5;
const SUMMARY_UPCOMING_LIMIT: u64 = 5;

#[async_trait]
pub trait PatientService: Send + Sync {
    async fn register(&self, tenant_id: Uuid, input: RegisterPatient) -> AppResult<Patient>;

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: PatientFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<Patient>>;

    /// Subject to the department policy of `patients:read`
    async fn get(&self, principal: &Principal, id: Uuid) -> AppResult<Patient>;

    async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        input: UpdatePatient,
    ) -> AppResult<Patient>;

    async fn deactivate(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Patient>;

    /// Patient with latest vitals, open prescriptions and upcoming appointments
    async fn summary(&self, principal: &Principal, id: Uuid) -> AppResult<PatientSummary>;
}

pub struct PatientManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> PatientManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn find(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Patient> {
        self.uow
            .patients()
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_not_found("PATIENT_NOT_FOUND", "Patient")
    }

    async fn ensure_active_department(
        &self,
        tenant_id: Uuid,
        department_id: Uuid,
    ) -> AppResult<()> {
        match self
            .uow
            .departments()
            .find_by_id(tenant_id, department_id)
            .await?
        {
            Some(department) if department.is_active() => Ok(()),
            _ => Err(AppError::bad_request(
                "INVALID_DEPARTMENT",
                "Department does not exist or is inactive",
            )),
        }
    }

    async fn ensure_active_doctor(&self, tenant_id: Uuid, doctor_id: Uuid) -> AppResult<()> {
        match self.uow.staff().find_by_id(tenant_id, doctor_id).await? {
            Some(doctor) if doctor.is_active() => Ok(()),
            _ => Err(AppError::bad_request(
                "INVALID_DOCTOR",
                "Primary doctor does not exist or is inactive",
            )),
        }
    }

    async fn allocate_mrn(&self, tenant_id: Uuid, hospital_code: &str) -> AppResult<String> {
        let today = Utc::now().date_naive();
        for _ in 0..MRN_ATTEMPTS {
            let mrn = generate_mrn(hospital_code, today);
            if !self.uow.patients().mrn_exists(tenant_id, &mrn).await? {
                return Ok(mrn);
            }
            tracing::debug!(tenant = %tenant_id, mrn = %mrn, "MRN collision, retrying");
        }
        Err(AppError::internal("Could not allocate a unique MRN"))
    }
}

#[async_trait]
impl<U: UnitOfWork> PatientService for PatientManager<U> {
    async fn register(&self, tenant_id: Uuid, input: RegisterPatient) -> AppResult<Patient> {
        let hospital = self
            .uow
            .hospitals()
            .find_by_id(tenant_id)
            .await?
            .ok_or_not_found("HOSPITAL_NOT_FOUND", "Hospital")?;

        let identity = PatientIdentity {
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            date_of_birth: input.date_of_birth,
            phone: input.phone.clone(),
        };
        if let Some(existing) = self
            .uow
            .patients()
            .find_duplicate(tenant_id, &identity)
            .await?
        {
            return Err(AppError::conflict(
                "PATIENT_EXISTS",
                format!("Patient already registered as {}", existing.mrn),
            ));
        }

        if let Some(department_id) = input.department_id {
            self.ensure_active_department(tenant_id, department_id)
                .await?;
        }
        if let Some(doctor_id) = input.primary_doctor_id {
            self.ensure_active_doctor(tenant_id, doctor_id).await?;
        }

        let mrn = self.allocate_mrn(tenant_id, &hospital.code).await?;
        let now = Utc::now();
        let patient = Patient {
            id: Uuid::new_v4(),
            tenant_id,
            mrn,
            first_name: input.first_name,
            last_name: input.last_name,
            date_of_birth: input.date_of_birth,
            gender: input.gender,
            phone: input.phone,
            email: input.email.map(|e| e.trim().to_lowercase()),
            address: input.address,
            blood_group: input.blood_group,
            allergies: input.allergies,
            department_id: input.department_id,
            primary_doctor_id: input.primary_doctor_id,
            status: RecordStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let patient = self.uow.patients().insert(&patient).await?;
        tracing::info!(
            tenant = %tenant_id,
            patient = %patient.id,
            mrn = %patient.mrn,
            "Patient registered"
        );
        Ok(patient)
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: PatientFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<Patient>> {
        let (rows, total) = self.uow.patients().list(tenant_id, &filter, page).await?;
        Ok(Paginated::new(rows, page, total))
    }

    async fn get(&self, principal: &Principal, id: Uuid) -> AppResult<Patient> {
        let patient = self.find(principal.tenant_id, id).await?;
        principal.authorize("patients:read", &patient.attributes())?;
        Ok(patient)
    }

    async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        input: UpdatePatient,
    ) -> AppResult<Patient> {
        let tenant_id = principal.tenant_id;
        let mut patient = self.find(tenant_id, id).await?;
        principal.authorize("patients:update", &patient.attributes())?;

        if let Some(department_id) = input.department_id {
            if patient.department_id != Some(department_id) {
                self.ensure_active_department(tenant_id, department_id)
                    .await?;
            }
        }
        if let Some(doctor_id) = input.primary_doctor_id {
            if patient.primary_doctor_id != Some(doctor_id) {
                self.ensure_active_doctor(tenant_id, doctor_id).await?;
            }
        }

        patient.apply(input);
        self.uow.patients().update(&patient).await
    }

    async fn deactivate(&self, tenant_id: Uuid, id: Uuid) -> AppResult<Patient> {
        let mut patient = self.find(tenant_id, id).await?;
        patient.status = RecordStatus::Inactive;
        patient.updated_at = Utc::now();
        let patient = self.uow.patients().update(&patient).await?;
        tracing::info!(tenant = %tenant_id, patient = %id, "Patient deactivated");
        Ok(patient)
    }

    async fn summary(&self, principal: &Principal, id: Uuid) -> AppResult<PatientSummary> {
        let tenant_id = principal.tenant_id;
        let patient = self.find(tenant_id, id).await?;
        principal.authorize("patients:read", &patient.attributes())?;

        let vitals = self.uow.vitals();
        let prescriptions = self.uow.prescriptions();
        let appointments = self.uow.appointments();
        let (latest_vitals, open_prescriptions, upcoming_appointments) = parallel::join3(
            vitals.latest_for_patient(tenant_id, id),
            prescriptions.list_open_for_patient(tenant_id, id),
            appointments.upcoming_for_patient(tenant_id, id, Utc::now(), SUMMARY_UPCOMING_LIMIT),
        )
        .await?;

        Ok(PatientSummary {
            patient,
            latest_vitals,
            open_prescriptions,
            upcoming_appointments,
        })
    }
}
