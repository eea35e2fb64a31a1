//! [`Landlord`] and [`Tenant`] profiles [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{user, Landlord, Tenant},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Insert<Landlord>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(landlord): Insert<Landlord>,
    ) -> Result<Self::Ok, Self::Err> {
        let Landlord {
            id,
            user_id,
            created_at,
        } = landlord;

        const SQL: &str = "\
            INSERT INTO landlords (id, user_id, created_at) \
            VALUES ($1::UUID, $2::UUID, $3::TIMESTAMPTZ) \
            ON CONFLICT (user_id) DO NOTHING";
        self.exec(SQL, &[&id, &user_id, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Option<Landlord>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Landlord>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Landlord>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, user_id, created_at \
            FROM landlords \
            WHERE user_id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Landlord {
                id: row.get("id"),
                user_id: row.get("user_id"),
                created_at: row.get("created_at"),
            }))
    }
}

impl<C> Database<Insert<Tenant>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(tenant): Insert<Tenant>,
    ) -> Result<Self::Ok, Self::Err> {
        let Tenant {
            id,
            user_id,
            created_at,
        } = tenant;

        const SQL: &str = "\
            INSERT INTO tenants (id, user_id, created_at) \
            VALUES ($1::UUID, $2::UUID, $3::TIMESTAMPTZ) \
            ON CONFLICT (user_id) DO NOTHING";
        self.exec(SQL, &[&id, &user_id, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Option<Tenant>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Tenant>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Tenant>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, user_id, created_at \
            FROM tenants \
            WHERE user_id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Tenant {
                id: row.get("id"),
                user_id: row.get("user_id"),
                created_at: row.get("created_at"),
            }))
    }
}
