//! Migration: prescriptions and their dispensing records.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_tenancy_tables::{timestamp, Hospitals, Staff};
use super::m20250101_000002_create_clinical_tables::Patients;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Prescriptions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Prescriptions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Prescriptions::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Prescriptions::PatientId).uuid().not_null())
                    .col(ColumnDef::new(Prescriptions::PrescriberId).uuid().not_null())
                    .col(ColumnDef::new(Prescriptions::Items).json_binary().not_null())
                    .col(ColumnDef::new(Prescriptions::Notes).text().null())
                    .col(
                        ColumnDef::new(Prescriptions::Status)
                            .string_len(24)
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(timestamp(Prescriptions::CreatedAt))
                    .col(timestamp(Prescriptions::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_prescriptions_tenant")
                            .from(Prescriptions::Table, Prescriptions::TenantId)
                            .to(Hospitals::Table, Hospitals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_prescriptions_patient")
                            .from(Prescriptions::Table, Prescriptions::PatientId)
                            .to(Patients::Table, Patients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_prescriptions_prescriber")
                            .from(Prescriptions::Table, Prescriptions::PrescriberId)
                            .to(Staff::Table, Staff::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_prescriptions_patient_status")
                    .table(Prescriptions::Table)
                    .col(Prescriptions::TenantId)
                    .col(Prescriptions::PatientId)
                    .col(Prescriptions::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Dispensings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Dispensings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Dispensings::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Dispensings::PrescriptionId).uuid().not_null())
                    .col(ColumnDef::new(Dispensings::PatientId).uuid().not_null())
                    .col(ColumnDef::new(Dispensings::PharmacistId).uuid().not_null())
                    .col(ColumnDef::new(Dispensings::Items).json_binary().not_null())
                    .col(ColumnDef::new(Dispensings::Notes).text().null())
                    .col(timestamp(Dispensings::DispensedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dispensings_tenant")
                            .from(Dispensings::Table, Dispensings::TenantId)
                            .to(Hospitals::Table, Hospitals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dispensings_prescription")
                            .from(Dispensings::Table, Dispensings::PrescriptionId)
                            .to(Prescriptions::Table, Prescriptions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dispensings_pharmacist")
                            .from(Dispensings::Table, Dispensings::PharmacistId)
                            .to(Staff::Table, Staff::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dispensings_prescription")
                    .table(Dispensings::Table)
                    .col(Dispensings::TenantId)
                    .col(Dispensings::PrescriptionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Dispensings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Prescriptions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Prescriptions {
    Table,
    Id,
    TenantId,
    PatientId,
    PrescriberId,
    Items,
    Notes,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Dispensings {
    Table,
    Id,
    TenantId,
    PrescriptionId,
    PatientId,
    PharmacistId,
    Items,
    Notes,
    DispensedAt,
}
