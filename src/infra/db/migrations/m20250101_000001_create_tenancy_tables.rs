//! Migration: hospitals and the per-tenant organisation tables
//! (departments, roles, staff).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Hospitals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Hospitals::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Hospitals::Name).string().not_null())
                    .col(
                        ColumnDef::new(Hospitals::Code)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Hospitals::Email).string().not_null())
                    .col(ColumnDef::new(Hospitals::Phone).string().null())
                    .col(ColumnDef::new(Hospitals::Address).text().null())
                    .col(ColumnDef::new(Hospitals::LicenseNumber).string().null())
                    .col(
                        ColumnDef::new(Hospitals::Timezone)
                            .string()
                            .not_null()
                            .default("UTC"),
                    )
                    .col(
                        ColumnDef::new(Hospitals::Status)
                            .string_len(16)
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(timestamp(Hospitals::CreatedAt))
                    .col(timestamp(Hospitals::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Departments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Departments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Departments::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Departments::Name).string().not_null())
                    .col(ColumnDef::new(Departments::Code).string_len(32).not_null())
                    .col(ColumnDef::new(Departments::Description).text().null())
                    .col(ColumnDef::new(Departments::ParentId).uuid().null())
                    .col(ColumnDef::new(Departments::HeadId).uuid().null())
                    .col(
                        ColumnDef::new(Departments::Status)
                            .string_len(16)
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(timestamp(Departments::CreatedAt))
                    .col(timestamp(Departments::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_departments_tenant")
                            .from(Departments::Table, Departments::TenantId)
                            .to(Hospitals::Table, Hospitals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_departments_parent")
                            .from(Departments::Table, Departments::ParentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_departments_tenant_code")
                    .table(Departments::Table)
                    .col(Departments::TenantId)
                    .col(Departments::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Roles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Roles::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Roles::Name).string().not_null())
                    .col(ColumnDef::new(Roles::Code).string_len(32).not_null())
                    .col(ColumnDef::new(Roles::Description).text().null())
                    .col(
                        ColumnDef::new(Roles::Permissions)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(ColumnDef::new(Roles::ParentId).uuid().null())
                    .col(
                        ColumnDef::new(Roles::IsSystem)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Roles::Status)
                            .string_len(16)
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(timestamp(Roles::CreatedAt))
                    .col(timestamp(Roles::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_roles_tenant")
                            .from(Roles::Table, Roles::TenantId)
                            .to(Hospitals::Table, Hospitals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_roles_parent")
                            .from(Roles::Table, Roles::ParentId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_roles_tenant_code")
                    .table(Roles::Table)
                    .col(Roles::TenantId)
                    .col(Roles::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Staff::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Staff::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Staff::TenantId).uuid().not_null())
                    .col(ColumnDef::new(Staff::Email).string().not_null())
                    .col(ColumnDef::new(Staff::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Staff::FirstName).string().not_null())
                    .col(ColumnDef::new(Staff::LastName).string().not_null())
                    .col(ColumnDef::new(Staff::Phone).string().null())
                    .col(ColumnDef::new(Staff::JobTitle).string().null())
                    .col(ColumnDef::new(Staff::DepartmentId).uuid().null())
                    .col(
                        ColumnDef::new(Staff::RoleIds)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Staff::Status)
                            .string_len(16)
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(
                        ColumnDef::new(Staff::LastLoginAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(timestamp(Staff::CreatedAt))
                    .col(timestamp(Staff::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_staff_tenant")
                            .from(Staff::Table, Staff::TenantId)
                            .to(Hospitals::Table, Hospitals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_staff_department")
                            .from(Staff::Table, Staff::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_staff_tenant_email")
                    .table(Staff::Table)
                    .col(Staff::TenantId)
                    .col(Staff::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Department heads reference staff, which is created after departments
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_departments_head")
                    .from(Departments::Table, Departments::HeadId)
                    .to(Staff::Table, Staff::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_foreign_key(
                ForeignKey::drop()
                    .name("fk_departments_head")
                    .table(Departments::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Staff::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Departments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Hospitals::Table).to_owned())
            .await?;
        Ok(())
    }
}

/// `TIMESTAMPTZ NOT NULL DEFAULT now()`
pub(super) fn timestamp<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
pub(super) enum Hospitals {
    Table,
    Id,
    Name,
    Code,
    Email,
    Phone,
    Address,
    LicenseNumber,
    Timezone,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(super) enum Departments {
    Table,
    Id,
    TenantId,
    Name,
    Code,
    Description,
    ParentId,
    HeadId,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Roles {
    Table,
    Id,
    TenantId,
    Name,
    Code,
    Description,
    Permissions,
    ParentId,
    IsSystem,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(super) enum Staff {
    Table,
    Id,
    TenantId,
    Email,
    PasswordHash,
    FirstName,
    LastName,
    Phone,
    JobTitle,
    DepartmentId,
    RoleIds,
    Status,
    LastLoginAt,
    CreatedAt,
    UpdatedAt,
}
