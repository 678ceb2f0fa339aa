use sqlx::{postgres::PgPoolOptions, Executor, Pool, Postgres};

pub type Database = Postgres;

pub struct PgPool(pub Pool<Database>);

impl PgPool {
    #[tracing::instrument(name = "PgPool::new", skip(db_uri))]
    pub async fn new(db_uri: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(db_uri)
            .await?;

        Ok(Self(pool))
    }
}

const SCHEMA: [&str; 13] = [
    "CREATE TABLE IF NOT EXISTS accounts (
        id UUID PRIMARY KEY,
        email VARCHAR NOT NULL UNIQUE,
        pseudo VARCHAR NOT NULL UNIQUE,
        password_hash VARCHAR NOT NULL,
        status VARCHAR NOT NULL,
        data JSONB NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS sessions (
        token UUID PRIMARY KEY,
        account_id UUID NOT NULL REFERENCES accounts(id),
        expiry TIMESTAMPTZ NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS sessions_account_idx ON sessions (account_id)",
    "CREATE TABLE IF NOT EXISTS vehicles (
        id UUID PRIMARY KEY,
        owner_id UUID NOT NULL REFERENCES accounts(id),
        plate VARCHAR NOT NULL,
        deleted_at TIMESTAMPTZ,
        data JSONB NOT NULL
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS vehicles_plate_idx ON vehicles (plate) WHERE deleted_at IS NULL",
    "CREATE TABLE IF NOT EXISTS rides (
        id UUID PRIMARY KEY,
        driver_id UUID NOT NULL REFERENCES accounts(id),
        vehicle_id UUID NOT NULL REFERENCES vehicles(id),
        status VARCHAR NOT NULL,
        departure_city VARCHAR NOT NULL,
        arrival_city VARCHAR NOT NULL,
        departure_time TIMESTAMPTZ NOT NULL,
        arrival_time TIMESTAMPTZ NOT NULL,
        price INT4 NOT NULL,
        seats_available INT4 NOT NULL CHECK (seats_available >= 0),
        eco BOOLEAN NOT NULL,
        data JSONB NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS rides_search_idx ON rides (lower(departure_city), lower(arrival_city), departure_time) WHERE status = 'planned'",
    "CREATE INDEX IF NOT EXISTS rides_driver_idx ON rides (driver_id)",
    "CREATE TABLE IF NOT EXISTS participations (
        id UUID PRIMARY KEY,
        ride_id UUID NOT NULL REFERENCES rides(id),
        passenger_id UUID NOT NULL REFERENCES accounts(id),
        status VARCHAR NOT NULL,
        data JSONB NOT NULL
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS participations_confirmed_idx ON participations (ride_id, passenger_id) WHERE status = 'confirmed'",
    "CREATE INDEX IF NOT EXISTS participations_passenger_idx ON participations (passenger_id)",
    "CREATE TABLE IF NOT EXISTS reviews (
        id UUID PRIMARY KEY,
        ride_id UUID NOT NULL REFERENCES rides(id),
        driver_id UUID NOT NULL REFERENCES accounts(id),
        author_id UUID NOT NULL REFERENCES accounts(id),
        status VARCHAR NOT NULL,
        rating INT4 NOT NULL CHECK (rating BETWEEN 1 AND 5),
        data JSONB NOT NULL,
        UNIQUE (ride_id, author_id)
    )",
    "CREATE INDEX IF NOT EXISTS reviews_driver_idx ON reviews (driver_id, status)",
];

// TODO: move this to sqlx migrations once the schema settles
#[tracing::instrument(skip(pool))]
pub async fn create_schema(pool: &Pool<Database>) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        pool.execute(statement).await?;
    }

    Ok(())
}
