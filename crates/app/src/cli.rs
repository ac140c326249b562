use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "fuel_tracker")]
#[command(about = "Log refuelings and track fuel consumption across shared vehicles")]
pub struct Cli {
    /// Database connection string, overriding `settings.toml`.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Username the command runs as.
    #[arg(long = "as", global = true)]
    pub actor: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    User(User),
    Vehicle(Vehicle),
    Refueling(Refueling),
}

#[derive(Args, Debug)]
pub struct User {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Register a new user.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Edit the acting user.
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Delete the acting user with everything they own.
    Delete,
    /// Show a user, the acting one when no username is given.
    Show { username: Option<String> },
    List,
}

#[derive(Args, Debug)]
pub struct Vehicle {
    #[command(subcommand)]
    pub command: VehicleCommand,
}

#[derive(Subcommand, Debug)]
pub enum VehicleCommand {
    /// Register a vehicle owned by the acting user.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        license_plate: String,
        #[arg(long)]
        odometer: i64,
        /// Username of a co-owner, repeatable.
        #[arg(long = "co-owner")]
        co_owners: Vec<String>,
        #[arg(long)]
        primary: bool,
    },
    Update(VehicleUpdateArgs),
    Delete {
        id: Uuid,
    },
    Show {
        id: Uuid,
    },
    /// Vehicles the acting user owns or co-uses.
    List,
}

#[derive(Args, Debug)]
pub struct VehicleUpdateArgs {
    pub id: Uuid,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub license_plate: Option<String>,
    #[arg(long)]
    pub odometer: Option<i64>,
    /// Replacement co-owner set, by username. Repeatable.
    #[arg(long = "co-owner", conflicts_with = "clear_co_owners")]
    pub co_owners: Vec<String>,
    #[arg(long)]
    pub clear_co_owners: bool,
    /// Make (`true`) or stop making (`false`) this the acting user's primary vehicle.
    #[arg(long)]
    pub primary: Option<bool>,
}

#[derive(Args, Debug)]
pub struct Refueling {
    #[command(subcommand)]
    pub command: RefuelingCommand,
}

#[derive(Subcommand, Debug)]
pub enum RefuelingCommand {
    /// Log a refueling: `addEnd` with `--odometer`, `addMiddle` with `--trip`.
    Add {
        vehicle: Uuid,
        #[arg(long, default_value = "addEnd")]
        mode: String,
        /// RFC 3339 timestamp, now when omitted.
        #[arg(long)]
        date: Option<DateTime<Utc>>,
        #[arg(long)]
        liters: f64,
        #[arg(long)]
        odometer: Option<i64>,
        #[arg(long)]
        trip: Option<i64>,
    },
    Update {
        id: Uuid,
        #[arg(long)]
        date: DateTime<Utc>,
        #[arg(long)]
        odometer: i64,
        #[arg(long)]
        liters: f64,
        #[arg(long)]
        trip: i64,
    },
    Delete {
        id: Uuid,
    },
    Show {
        id: Uuid,
    },
    /// Refuelings of a vehicle, oldest first.
    List {
        vehicle: Uuid,
    },
    /// Whether the refueling is its vehicle's latest.
    Latest {
        id: Uuid,
    },
}
