//! Initial schema for the fuel tracker.
//!
//! - `users`: people logging refuelings, with an optional primary vehicle
//! - `vehicles`: one owner each, current odometer reading
//! - `vehicle_co_owners`: users sharing a vehicle with its owner
//! - `refuelings`: individual refueling entries of a vehicle
//!
//! Memberships and refueling lists are derived from foreign keys; nothing
//! is stored as an embedded array.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Username,
    Password,
    PrimaryVehicle,
}

#[derive(Iden)]
enum Vehicles {
    Table,
    Id,
    Name,
    LicensePlate,
    Odometer,
    OwnerId,
}

#[derive(Iden)]
enum VehicleCoOwners {
    Table,
    VehicleId,
    UserId,
}

#[derive(Iden)]
enum Refuelings {
    Table,
    Id,
    Date,
    Odometer,
    Liters,
    TripKilometers,
    AvgConsumption,
    VehicleId,
    UserId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        // `primary_vehicle` carries no FK: users and vehicles reference each
        // other and the engine clears the pointer before a vehicle goes away.
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Username).string().not_null())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::PrimaryVehicle).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-username-unique")
                    .table(Users::Table)
                    .col(Users::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Vehicles
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Vehicles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vehicles::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vehicles::Name).string().not_null())
                    .col(ColumnDef::new(Vehicles::LicensePlate).string().not_null())
                    .col(
                        ColumnDef::new(Vehicles::Odometer)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Vehicles::OwnerId).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-vehicles-owner_id")
                            .from(Vehicles::Table, Vehicles::OwnerId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-vehicles-license_plate-unique")
                    .table(Vehicles::Table)
                    .col(Vehicles::LicensePlate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-vehicles-owner_id")
                    .table(Vehicles::Table)
                    .col(Vehicles::OwnerId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Vehicle co-owners
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(VehicleCoOwners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VehicleCoOwners::VehicleId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VehicleCoOwners::UserId).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(VehicleCoOwners::VehicleId)
                            .col(VehicleCoOwners::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-vehicle_co_owners-vehicle_id")
                            .from(VehicleCoOwners::Table, VehicleCoOwners::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-vehicle_co_owners-user_id")
                            .from(VehicleCoOwners::Table, VehicleCoOwners::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-vehicle_co_owners-user_id")
                    .table(VehicleCoOwners::Table)
                    .col(VehicleCoOwners::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Refuelings
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Refuelings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Refuelings::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Refuelings::Date).timestamp().not_null())
                    .col(
                        ColumnDef::new(Refuelings::Odometer)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Refuelings::Liters).double().not_null())
                    .col(
                        ColumnDef::new(Refuelings::TripKilometers)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Refuelings::AvgConsumption)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Refuelings::VehicleId).string().not_null())
                    .col(ColumnDef::new(Refuelings::UserId).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-refuelings-vehicle_id")
                            .from(Refuelings::Table, Refuelings::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-refuelings-vehicle_id-date")
                    .table(Refuelings::Table)
                    .col(Refuelings::VehicleId)
                    .col(Refuelings::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-refuelings-user_id")
                    .table(Refuelings::Table)
                    .col(Refuelings::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Refuelings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VehicleCoOwners::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vehicles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
