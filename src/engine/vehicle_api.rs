use super::helpers::{fetch_vehicle, fetch_vehicle_for_update};
use super::Engine;

use async_trait::async_trait;
use sqlx::{types::Json, Executor, Row};
use uuid::Uuid;

use crate::{
    api::VehicleAPI,
    auth::{Platform, User},
    entities::{Vehicle, VehicleSpec},
    error::{invalid_invocation_error, Error},
};

#[async_trait]
impl VehicleAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_vehicle(&self, user: User, spec: VehicleSpec) -> Result<Vehicle, Error> {
        self.authorize(user.clone(), "create_vehicle", Platform::default())?;

        let vehicle = Vehicle::new(user.id, spec)?;

        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query("INSERT INTO vehicles (id, owner_id, plate, data) VALUES ($1, $2, $3, $4)")
                .bind(vehicle.id)
                .bind(vehicle.owner_id)
                .bind(&vehicle.plate)
                .bind(Json(&vehicle)),
        )
        .await?;

        Ok(vehicle)
    }

    #[tracing::instrument(skip(self))]
    async fn find_vehicle(&self, user: User, id: Uuid) -> Result<Vehicle, Error> {
        let vehicle = fetch_vehicle(&self.pool, &id).await?;

        self.authorize(user.clone(), "read", vehicle.clone())?;

        Ok(vehicle)
    }

    #[tracing::instrument(skip(self))]
    async fn list_vehicles(&self, user: User) -> Result<Vec<Vehicle>, Error> {
        let mut conn = self.pool.acquire().await?;

        let results = conn
            .fetch_all(
                sqlx::query(
                    "SELECT data FROM vehicles WHERE owner_id = $1 AND deleted_at IS NULL ORDER BY plate",
                )
                .bind(user.id),
            )
            .await?;

        let mut vehicles = Vec::with_capacity(results.len());

        for result in results.iter() {
            let Json(vehicle): Json<Vehicle> = result.try_get("data")?;
            vehicles.push(vehicle);
        }

        Ok(vehicles)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_vehicle(&self, user: User, id: Uuid) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;

        let vehicle = fetch_vehicle_for_update(&mut tx, &id).await?;

        self.authorize(user.clone(), "delete", vehicle.clone())?;

        let in_use: bool = tx
            .fetch_one(
                sqlx::query(
                    "SELECT EXISTS (SELECT 1 FROM rides WHERE vehicle_id = $1 AND status IN ('planned', 'ongoing')) AS in_use",
                )
                .bind(vehicle.id),
            )
            .await?
            .try_get("in_use")?;

        if in_use {
            tracing::info!("vehicle is used by an upcoming ride, refusing to delete");
            return Err(invalid_invocation_error());
        }

        // rides keep referencing retired vehicles, so the row stays
        tx.execute(
            sqlx::query("UPDATE vehicles SET deleted_at = now() WHERE id = $1").bind(vehicle.id),
        )
        .await?;

        tx.commit().await?;

        Ok(())
    }
}
