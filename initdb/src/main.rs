//! Creates or upgrades the booking schema by running the migrations
//! under `./migrations`.

use std::env;

use movine::Movine;
use postgres::{Client, NoTls};

use log::{debug, info, initialize_logger};

const MIGRATION_DIR: &str = "./migrations";

fn main() {
    dotenv::dotenv().ok();

    let logger = initialize_logger();
    let connection_string = env::var("BOOKING_DB_CONNECTION_STRING")
        .expect("could not read BOOKING_DB_CONNECTION_STRING");

    debug!(logger, "Connecting to database...");

    let client = Client::connect(&connection_string, NoTls).expect("could not connect to database");

    let mut movine = Movine::new(client);
    movine.set_migration_dir(MIGRATION_DIR);

    if movine.status().is_err() {
        debug!(logger, "Initializing migration table...");
        movine.initialize().expect("failed to initialize movine")
    }

    info!(logger, "Running migrations..."; "directory" => MIGRATION_DIR);
    movine.up().expect("failed to run migrations");

    info!(logger, "Schema is up to date.");
}
