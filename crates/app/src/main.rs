use clap::Parser;
use engine::{
    Engine, EngineError, RefuelingNew, RefuelingUpdate, UserNew, UserUpdate, VehicleNew,
    VehicleUpdate,
};
use migration::{Migrator, MigratorTrait};
use serde::Serialize;
use uuid::Uuid;

use cli::{Cli, Command, RefuelingCommand, UserCommand, VehicleCommand};

mod cli;
mod settings;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "fuel_tracker={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let url = cli
        .database_url
        .clone()
        .unwrap_or_else(|| settings.database.url());
    let engine = connect(&url).await?;

    match run(&engine, cli).await {
        Ok(output) => {
            println!("{output}");
            Ok(())
        }
        Err(Failure::Engine(err)) => {
            tracing::debug!("command failed: {err}");
            let body = serde_json::json!({
                "error": err.kind().code(),
                "message": err.to_string(),
            });
            eprintln!("{}", serde_json::to_string_pretty(&body)?);
            std::process::exit(1);
        }
        Err(Failure::Other(err)) => Err(err),
    }
}

async fn connect(url: &str) -> Result<Engine, BoxError> {
    tracing::info!("opening database {url}");
    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(Engine::builder().database(database).build().await?)
}

enum Failure {
    Engine(EngineError),
    Other(BoxError),
}

impl From<EngineError> for Failure {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

impl From<serde_json::Error> for Failure {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(err.into())
    }
}

fn render<T: Serialize>(value: &T) -> Result<String, Failure> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Resolve `--as`. Every command but user creation needs it.
async fn actor(engine: &Engine, username: Option<&str>) -> Result<Uuid, Failure> {
    let username = username.ok_or_else(|| {
        EngineError::Unauthorized("an acting user is required (--as <username>)".to_string())
    })?;
    Ok(engine.user_by_username(username).await?.id)
}

async fn user_ids(engine: &Engine, usernames: &[String]) -> Result<Vec<Uuid>, Failure> {
    let mut ids = Vec::with_capacity(usernames.len());
    for username in usernames {
        ids.push(engine.user_by_username(username).await?.id);
    }
    Ok(ids)
}

async fn run(engine: &Engine, cli: Cli) -> Result<String, Failure> {
    let as_user = cli.actor.as_deref();
    match cli.command {
        Command::User(user) => match user.command {
            UserCommand::Create {
                name,
                username,
                password,
            } => render(
                &engine
                    .create_user(UserNew::new(name, username, password))
                    .await?,
            ),
            UserCommand::Update { name, password } => {
                let actor = actor(engine, as_user).await?;
                render(
                    &engine
                        .update_user(actor, actor, UserUpdate { name, password })
                        .await?,
                )
            }
            UserCommand::Delete => {
                let actor = actor(engine, as_user).await?;
                render(&engine.delete_user(actor, actor).await?)
            }
            UserCommand::Show { username } => match username {
                Some(username) => render(&engine.user_by_username(&username).await?),
                None => {
                    let actor = actor(engine, as_user).await?;
                    render(&engine.user(actor).await?)
                }
            },
            UserCommand::List => render(&engine.users().await?),
        },
        Command::Vehicle(vehicle) => {
            let actor = actor(engine, as_user).await?;
            match vehicle.command {
                VehicleCommand::Create {
                    name,
                    license_plate,
                    odometer,
                    co_owners,
                    primary,
                } => {
                    let payload = VehicleNew::new(name, license_plate, odometer)
                        .co_owners(user_ids(engine, &co_owners).await?)
                        .primary(primary);
                    render(&engine.create_vehicle(actor, payload).await?)
                }
                VehicleCommand::Update(args) => {
                    let mut payload = VehicleUpdate {
                        name: args.name,
                        license_plate: args.license_plate,
                        odometer: args.odometer,
                        co_owners: None,
                        primary_vehicle: args.primary,
                    };
                    if args.clear_co_owners {
                        payload.co_owners = Some(Vec::new());
                    } else if !args.co_owners.is_empty() {
                        payload.co_owners = Some(user_ids(engine, &args.co_owners).await?);
                    }
                    render(&engine.update_vehicle(actor, args.id, payload).await?)
                }
                VehicleCommand::Delete { id } => render(&engine.delete_vehicle(actor, id).await?),
                VehicleCommand::Show { id } => render(&engine.vehicle(id).await?),
                VehicleCommand::List => render(&engine.vehicles_for_user(actor).await?),
            }
        }
        Command::Refueling(refueling) => {
            let actor = actor(engine, as_user).await?;
            match refueling.command {
                RefuelingCommand::Add {
                    vehicle,
                    mode,
                    date,
                    liters,
                    odometer,
                    trip,
                } => {
                    let payload = RefuelingNew {
                        mode: Some(mode),
                        vehicle: Some(vehicle),
                        date: Some(date.unwrap_or_else(chrono::Utc::now)),
                        odometer,
                        liters: Some(liters),
                        trip,
                    };
                    render(&engine.create_refueling(actor, payload).await?)
                }
                RefuelingCommand::Update {
                    id,
                    date,
                    odometer,
                    liters,
                    trip,
                } => render(
                    &engine
                        .update_refueling(
                            actor,
                            id,
                            RefuelingUpdate::new(date, odometer, liters, trip),
                        )
                        .await?,
                ),
                RefuelingCommand::Delete { id } => {
                    render(&engine.delete_refueling(actor, id).await?)
                }
                RefuelingCommand::Show { id } => render(&engine.refueling(id).await?),
                RefuelingCommand::List { vehicle } => {
                    render(&engine.refuelings_for_vehicle(vehicle).await?)
                }
                RefuelingCommand::Latest { id } => {
                    render(&engine.is_latest_refueling(id).await?)
                }
            }
        }
    }
}
