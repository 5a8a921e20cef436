//! Migration: patients, vitals and appointments.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_tenancy_tables::{timestamp, Departments, Hospitals, Staff};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Patients::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Patients::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Patients::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Patients::Mrn).string_len(64).not_null())
                    .col(ColumnDef::new(Patients::FirstName).string().not_null())
                    .col(ColumnDef::new(Patients::LastName).string().not_null())
                    .col(ColumnDef::new(Patients::DateOfBirth).date().not_null())
                    .col(ColumnDef::new(Patients::Gender).string_len(16).not_null())
                    .col(ColumnDef::new(Patients::Phone).string().null())
                    .col(ColumnDef::new(Patients::Email).string().null())
                    .col(ColumnDef::new(Patients::Address).text().null())
                    .col(ColumnDef::new(Patients::BloodGroup).string_len(8).null())
                    .col(
                        ColumnDef::new(Patients::Allergies)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(ColumnDef::new(Patients::DepartmentId).uuid().null())
                    .col(ColumnDef::new(Patients::PrimaryDoctorId).uuid().null())
                    .col(
                        ColumnDef::new(Patients::Status)
                            .string_len(16)
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(timestamp(Patients::CreatedAt))
                    .col(timestamp(Patients::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_patients_tenant")
                            .from(Patients::Table, Patients::TenantId)
                            .to(Hospitals::Table, Hospitals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_patients_department")
                            .from(Patients::Table, Patients::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_patients_primary_doctor")
                            .from(Patients::Table, Patients::PrimaryDoctorId)
                            .to(Staff::Table, Staff::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_patients_tenant_mrn")
                    .table(Patients::Table)
                    .col(Patients::TenantId)
                    .col(Patients::Mrn)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_patients_identity")
                    .table(Patients::Table)
                    .col(Patients::TenantId)
                    .col(Patients::DateOfBirth)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Vitals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Vitals::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Vitals::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Vitals::PatientId).uuid().not_null())
                    .col(ColumnDef::new(Vitals::RecordedBy).uuid().not_null())
                    .col(ColumnDef::new(Vitals::TemperatureC).double().null())
                    .col(ColumnDef::new(Vitals::SystolicBp).integer().null())
                    .col(ColumnDef::new(Vitals::DiastolicBp).integer().null())
                    .col(ColumnDef::new(Vitals::HeartRate).integer().null())
                    .col(ColumnDef::new(Vitals::RespiratoryRate).integer().null())
                    .col(ColumnDef::new(Vitals::OxygenSaturation).double().null())
                    .col(ColumnDef::new(Vitals::WeightKg).double().null())
                    .col(ColumnDef::new(Vitals::HeightCm).double().null())
                    .col(ColumnDef::new(Vitals::BloodGlucoseMgDl).double().null())
                    .col(ColumnDef::new(Vitals::PainScore).integer().null())
                    .col(ColumnDef::new(Vitals::Bmi).double().null())
                    .col(ColumnDef::new(Vitals::Notes).text().null())
                    .col(
                        ColumnDef::new(Vitals::Alerts)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(timestamp(Vitals::RecordedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vitals_tenant")
                            .from(Vitals::Table, Vitals::TenantId)
                            .to(Hospitals::Table, Hospitals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vitals_patient")
                            .from(Vitals::Table, Vitals::PatientId)
                            .to(Patients::Table, Patients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vitals_recorded_by")
                            .from(Vitals::Table, Vitals::RecordedBy)
                            .to(Staff::Table, Staff::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vitals_patient_recorded_at")
                    .table(Vitals::Table)
                    .col(Vitals::TenantId)
                    .col(Vitals::PatientId)
                    .col(Vitals::RecordedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Appointments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Appointments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Appointments::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Appointments::PatientId).uuid().not_null())
                    .col(ColumnDef::new(Appointments::DoctorId).uuid().not_null())
                    .col(ColumnDef::new(Appointments::DepartmentId).uuid().null())
                    .col(
                        ColumnDef::new(Appointments::ScheduledAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Appointments::EndsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Appointments::Reason).text().null())
                    .col(ColumnDef::new(Appointments::Notes).text().null())
                    .col(
                        ColumnDef::new(Appointments::Status)
                            .string_len(16)
                            .not_null()
                            .default("SCHEDULED"),
                    )
                    .col(timestamp(Appointments::CreatedAt))
                    .col(timestamp(Appointments::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_tenant")
                            .from(Appointments::Table, Appointments::TenantId)
                            .to(Hospitals::Table, Hospitals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_patient")
                            .from(Appointments::Table, Appointments::PatientId)
                            .to(Patients::Table, Patients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_doctor")
                            .from(Appointments::Table, Appointments::DoctorId)
                            .to(Staff::Table, Staff::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_department")
                            .from(Appointments::Table, Appointments::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Overlap checks filter by doctor and time window
        manager
            .create_index(
                Index::create()
                    .name("idx_appointments_doctor_window")
                    .table(Appointments::Table)
                    .col(Appointments::TenantId)
                    .col(Appointments::DoctorId)
                    .col(Appointments::ScheduledAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Appointments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vitals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Patients::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum Patients {
    Table,
    Id,
    TenantId,
    Mrn,
    FirstName,
    LastName,
    DateOfBirth,
    Gender,
    Phone,
    Email,
    Address,
    BloodGroup,
    Allergies,
    DepartmentId,
    PrimaryDoctorId,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Vitals {
    Table,
    Id,
    TenantId,
    PatientId,
    RecordedBy,
    TemperatureC,
    SystolicBp,
    DiastolicBp,
    HeartRate,
    RespiratoryRate,
    OxygenSaturation,
    WeightKg,
    HeightCm,
    BloodGlucoseMgDl,
    PainScore,
    Bmi,
    Notes,
    Alerts,
    RecordedAt,
}

#[derive(Iden)]
enum Appointments {
    Table,
    Id,
    TenantId,
    PatientId,
    DoctorId,
    DepartmentId,
    ScheduledAt,
    EndsAt,
    Reason,
    Notes,
    Status,
    CreatedAt,
    UpdatedAt,
}
