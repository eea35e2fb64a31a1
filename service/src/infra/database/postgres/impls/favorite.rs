//! [`Favorite`]-related [`Database`] implementations.

use std::collections::HashSet;

use common::operations::{By, Delete, Insert, Select};
use tracerr::Traced;
use uuid::Uuid;

use crate::{
    domain::{favorite, property, Favorite, Property},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

use super::property::{from_row, COLUMNS};

/// Location of [`Favorite`]s of a single [`favorite::Owner`] namespace.
struct Table {
    /// Name of the table.
    name: &'static str,

    /// Column referencing the [`favorite::Owner`] profile.
    owner_column: &'static str,

    /// ID of the [`favorite::Owner`] profile.
    owner_id: Uuid,
}

impl From<favorite::Owner> for Table {
    fn from(owner: favorite::Owner) -> Self {
        match owner {
            favorite::Owner::Tenant(id) => Self {
                name: "tenant_favorites",
                owner_column: "tenant_id",
                owner_id: id.into(),
            },
            favorite::Owner::Landlord(id) => Self {
                name: "landlord_favorites",
                owner_column: "landlord_id",
                owner_id: id.into(),
            },
        }
    }
}

impl<C> Database<Insert<Favorite>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(favorite): Insert<Favorite>,
    ) -> Result<Self::Ok, Self::Err> {
        let Favorite {
            id,
            owner,
            property_id,
            created_at,
        } = favorite;
        let Table {
            name,
            owner_column,
            owner_id,
        } = owner.into();

        let sql = format!(
            "INSERT INTO {name} (id, {owner_column}, property_id, created_at) \
             VALUES ($1::UUID, $2::UUID, $3::UUID, $4::TIMESTAMPTZ) \
             ON CONFLICT ({owner_column}, property_id) DO NOTHING"
        );
        self.exec(&sql, &[&id, &owner_id, &property_id, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(|n| n > 0)
    }
}

impl<C> Database<Delete<By<Favorite, (favorite::Owner, property::Id)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Favorite, (favorite::Owner, property::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (owner, property_id) = by.into_inner();
        let Table {
            name,
            owner_column,
            owner_id,
        } = owner.into();

        let sql = format!(
            "DELETE FROM {name} \
             WHERE {owner_column} = $1::UUID \
               AND property_id = $2::UUID"
        );
        self.exec(&sql, &[&owner_id, &property_id])
            .await
            .map_err(tracerr::wrap!())
            .map(|n| n > 0)
    }
}

impl<C> Database<Select<By<Vec<Property>, favorite::Owner>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Property>, favorite::Owner>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Table {
            name,
            owner_column,
            owner_id,
        } = by.into_inner().into();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties \
             INNER JOIN (\
                 SELECT property_id, created_at AS favorited_at, \
                        id AS favorite_id \
                 FROM {name} \
                 WHERE {owner_column} = $1::UUID\
             ) AS f ON f.property_id = properties.id \
             ORDER BY f.favorited_at DESC, f.favorite_id DESC"
        );
        Ok(self
            .query(&sql, &[&owner_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<HashSet<property::Id>, favorite::Owner>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = HashSet<property::Id>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashSet<property::Id>, favorite::Owner>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Table {
            name,
            owner_column,
            owner_id,
        } = by.into_inner().into();

        let sql = format!(
            "SELECT property_id \
             FROM {name} \
             WHERE {owner_column} = $1::UUID"
        );
        Ok(self
            .query(&sql, &[&owner_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("property_id"))
            .collect())
    }
}
