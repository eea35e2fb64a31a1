//! [`Image`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        landlord,
        property::{self, image, Image},
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Builds an [`Image`] out of the `property_images` table [`Row`].
fn from_row(row: &Row) -> Image {
    Image {
        id: row.get("id"),
        property_id: row.get("property_id"),
        file: row.get("file"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Insert<Image>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(image): Insert<Image>,
    ) -> Result<Self::Ok, Self::Err> {
        let Image {
            id,
            property_id,
            file,
            created_at,
        } = image;

        const SQL: &str = "\
            INSERT INTO property_images (id, property_id, file, created_at) \
            VALUES ($1::UUID, $2::UUID, $3::VARCHAR, $4::TIMESTAMPTZ)";
        self.exec(SQL, &[&id, &property_id, &file, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Vec<Image>, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Image>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Image>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let property_id: property::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, property_id, file, created_at \
            FROM property_images \
            WHERE property_id = $1::UUID \
            ORDER BY created_at, id";
        Ok(self
            .query(SQL, &[&property_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Image>, landlord::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Image>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Image>, landlord::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let owner: landlord::Id = by.into_inner();

        const SQL: &str = "\
            SELECT i.id, i.property_id, i.file, i.created_at \
            FROM property_images AS i \
            INNER JOIN properties AS p ON p.id = i.property_id \
            WHERE p.landlord_id = $1::UUID";
        Ok(self
            .query(SQL, &[&owner])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Option<Image>, (image::Id, landlord::Id)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Image>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Image>, (image::Id, landlord::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (id, owner) = by.into_inner();

        const SQL: &str = "\
            SELECT i.id, i.property_id, i.file, i.created_at \
            FROM property_images AS i \
            INNER JOIN properties AS p ON p.id = i.property_id \
            WHERE i.id = $1::UUID \
              AND p.landlord_id = $2::UUID";
        Ok(self
            .query_opt(SQL, &[&id, &owner])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Delete<By<Image, image::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Image, image::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: image::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM property_images \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|n| n > 0)
    }
}
