//! [`Property`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        landlord,
        property::{self, County, Town},
        Property,
    },
    infra::{
        database::{
            self,
            postgres::{Connection, LikePattern},
            Postgres,
        },
        Database,
    },
    read::property::{facets, list, Condition, Predicate},
};

/// Columns of the `properties` table, in the order [`from_row()`] expects
/// them.
pub(super) const COLUMNS: &str = "\
    id, landlord_id, \
    house_type, house_number, rent, \
    county, town, location, \
    description, available, \
    created_at";

/// Builds a [`Property`] out of the `properties` table [`Row`].
pub(super) fn from_row(row: &Row) -> Property {
    Property {
        id: row.get("id"),
        landlord_id: row.get("landlord_id"),
        house_type: row.get("house_type"),
        house_number: row.get("house_number"),
        rent: row.get("rent"),
        county: row.get("county"),
        town: row.get("town"),
        location: row.get("location"),
        description: row.get("description"),
        available: row.get("available"),
        created_at: row.get("created_at"),
    }
}

/// Owned SQL parameter.
type Param = Box<dyn ToSql + Sync + Send>;

/// Renders the provided [`Predicate`] as an SQL boolean expression, pushing
/// its parameters to the provided `ps`.
fn render(predicate: &Predicate, ps: &mut Vec<Param>) -> String {
    let mut push = |p: Param| {
        ps.push(p);
        ps.len()
    };

    predicate
        .conditions()
        .iter()
        .map(|c| match c {
            Condition::Available(v) => {
                format!("available = ${}::BOOL", push(Box::new(*v)))
            }
            Condition::OwnedBy(id) => {
                format!("landlord_id = ${}::UUID", push(Box::new(*id)))
            }
            Condition::MatchesText {
                needle,
                house_types,
            } => {
                let idx = push(Box::new(LikePattern::containing(needle)));
                let types = if house_types.is_empty() {
                    String::new()
                } else {
                    let codes = house_types
                        .iter()
                        .map(|t| i16::from(t.u8()))
                        .collect::<Vec<_>>();
                    format!(
                        " OR house_type = ANY(${}::INT2[])",
                        push(Box::new(codes)),
                    )
                };
                format!(
                    "(description ILIKE ${idx}::VARCHAR \
                      OR location ILIKE ${idx}::VARCHAR{types})",
                )
            }
            Condition::RentAtLeast(r) => {
                format!("rent >= ${}::INT8", push(Box::new(*r)))
            }
            Condition::RentAtMost(r) => {
                format!("rent <= ${}::INT8", push(Box::new(*r)))
            }
            Condition::CountyIs(c) => format!(
                "LOWER(county) = LOWER(${}::VARCHAR)",
                push(Box::new(c.clone())),
            ),
            Condition::TownIs(t) => format!(
                "LOWER(town) = LOWER(${}::VARCHAR)",
                push(Box::new(t.clone())),
            ),
            Condition::LocationContains(l) => format!(
                "location ILIKE ${}::VARCHAR",
                push(Box::new(LikePattern::containing(l))),
            ),
            Condition::HouseTypeIs(t) => {
                format!("house_type = ${}::INT2", push(Box::new(*t)))
            }
        })
        .join(" AND ")
}

/// Borrows the owned [`Param`]s for passing them to a [`Connection`].
fn borrow(ps: &[Param]) -> Vec<&(dyn ToSql + Sync)> {
    ps.iter().map(|p| -> &(dyn ToSql + Sync) { &**p }).collect()
}

impl<C> Database<Insert<Property>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        let Property {
            id,
            landlord_id,
            house_type,
            house_number,
            rent,
            county,
            town,
            location,
            description,
            available,
            created_at,
        } = property;

        const SQL: &str = "\
            INSERT INTO properties (\
                id, landlord_id, \
                house_type, house_number, rent, \
                county, town, location, \
                description, available, \
                created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, \
                $3::INT2, $4::VARCHAR, $5::INT4, \
                $6::VARCHAR, $7::VARCHAR, $8::VARCHAR, \
                $9::TEXT, $10::BOOL, \
                $11::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &landlord_id,
                &house_type,
                &house_number,
                &rent,
                &county,
                &town,
                &location,
                &description,
                &available,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<Property>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(property): Update<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        let Property {
            id,
            landlord_id,
            house_type,
            house_number,
            rent,
            county,
            town,
            location,
            description,
            available,
            created_at: _,
        } = property;

        const SQL: &str = "\
            UPDATE properties \
            SET house_type = $3::INT2, \
                house_number = $4::VARCHAR, \
                rent = $5::INT4, \
                county = $6::VARCHAR, \
                town = $7::VARCHAR, \
                location = $8::VARCHAR, \
                description = $9::TEXT, \
                available = $10::BOOL \
            WHERE id = $1::UUID \
              AND landlord_id = $2::UUID";
        self.exec(
            SQL,
            &[
                &id,
                &landlord_id,
                &house_type,
                &house_number,
                &rent,
                &county,
                &town,
                &location,
                &description,
                &available,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Select<By<Option<Property>, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties \
             WHERE id = $1::UUID"
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Option<Property>, (property::Id, landlord::Id)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, (property::Id, landlord::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (id, owner) = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties \
             WHERE id = $1::UUID \
               AND landlord_id = $2::UUID"
        );
        Ok(self
            .query_opt(&sql, &[&id, &owner])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Delete<By<Property, (property::Id, landlord::Id)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Property, (property::Id, landlord::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (id, owner) = by.into_inner();

        const SQL: &str = "\
            DELETE FROM properties \
            WHERE id = $1::UUID \
              AND landlord_id = $2::UUID";
        self.exec(SQL, &[&id, &owner])
            .await
            .map_err(tracerr::wrap!())
            .map(|n| n > 0)
    }
}

impl<C> Database<Select<By<list::Page, list::Selector>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::Page, list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let list::Selector {
            arguments,
            filter: predicate,
        } = by.into_inner();

        let mut ps = Vec::new();
        let condition = render(&predicate, &mut ps);

        let count_sql = format!(
            "SELECT COUNT(*) \
             FROM properties \
             WHERE {condition}"
        );
        let total = self
            .query_one(&count_sql, &borrow(&ps))
            .await
            .map_err(tracerr::wrap!())?
            .get::<_, i64>(0);
        let window = arguments.window(usize::try_from(total).unwrap_or(0));

        ps.push(Box::new(i64::try_from(window.limit).unwrap_or(i64::MAX)));
        let limit_idx = ps.len();
        ps.push(Box::new(i64::try_from(window.offset).unwrap_or(i64::MAX)));
        let offset_idx = ps.len();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties \
             WHERE {condition} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${limit_idx}::INT8 \
             OFFSET ${offset_idx}::INT8"
        );
        let rows = self
            .query(&sql, &borrow(&ps))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(list::Page::new(window, rows.iter().map(from_row)))
    }
}

/// Renders the SQL selecting distinct [`Town`]s, optionally filtered by the
/// owner and the county parameters at the provided indices.
///
/// [`Town`]s are sorted in byte order.
fn towns_sql(owner_idx: Option<usize>, county_idx: Option<usize>) -> String {
    format!(
        "SELECT DISTINCT town COLLATE \"C\" AS town \
         FROM properties \
         WHERE TRUE \
               {owner_filtering} \
               {county_filtering} \
         ORDER BY town",
        owner_filtering = owner_idx.into_iter().format_with("", |idx, f| {
            f(&format_args!("AND landlord_id = ${idx}::UUID"))
        }),
        county_filtering = county_idx.into_iter().format_with("", |idx, f| {
            f(&format_args!("AND LOWER(county) = LOWER(${idx}::VARCHAR)"))
        }),
    )
}

impl<C> Database<Select<By<Vec<Town>, facets::Towns>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Town>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Town>, facets::Towns>>,
    ) -> Result<Self::Ok, Self::Err> {
        let facets::Towns { owner, county } = by.into_inner();

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let owner_idx = owner.as_ref().map(|o| {
            ps.push(o);
            ps.len()
        });
        let county_idx = county.as_ref().map(|c| {
            ps.push(c);
            ps.len()
        });

        let sql = towns_sql(owner_idx, county_idx);
        Ok(self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("town"))
            .collect())
    }
}

impl<C> Database<Select<By<Vec<County>, facets::OwnCounties>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<County>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<County>, facets::OwnCounties>>,
    ) -> Result<Self::Ok, Self::Err> {
        let facets::OwnCounties(owner) = by.into_inner();

        const SQL: &str = "\
            SELECT DISTINCT county COLLATE \"C\" AS county \
            FROM properties \
            WHERE landlord_id = $1::UUID \
            ORDER BY county";
        Ok(self
            .query(SQL, &[&owner])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| row.get("county"))
            .collect())
    }
}

impl<C> Database<Select<By<facets::Stats, landlord::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = facets::Stats;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<facets::Stats, landlord::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let owner: landlord::Id = by.into_inner();

        const SQL: &str = "\
            SELECT COUNT(*) AS total, \
                   COUNT(*) FILTER (WHERE available) AS available \
            FROM properties \
            WHERE landlord_id = $1::UUID";
        let row = self
            .query_one(SQL, &[&owner])
            .await
            .map_err(tracerr::wrap!())?;
        Ok(facets::Stats {
            total: usize::try_from(row.get::<_, i64>("total")).unwrap_or(0),
            available: usize::try_from(row.get::<_, i64>("available"))
                .unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::landlord,
        read::property::{Filter, Predicate, Scope},
    };

    use super::{render, towns_sql};

    #[test]
    fn renders_scope_only() {
        let mut ps = vec![];

        assert_eq!(
            render(&Predicate::scoped(Scope::Public), &mut ps),
            "available = $1::BOOL",
        );
        assert_eq!(ps.len(), 1);
    }

    #[test]
    fn renders_filters_after_scope() {
        let mut ps = vec![];
        let predicate =
            Predicate::scoped(Scope::Owner(landlord::Id::new())).and(Filter {
                q: Some("bedroom".into()),
                county: "nairobi".parse().ok(),
                min_rent: "4000".parse().ok(),
                ..Filter::default()
            });

        assert_eq!(
            render(&predicate, &mut ps),
            "landlord_id = $1::UUID AND \
             (description ILIKE $2::VARCHAR \
              OR location ILIKE $2::VARCHAR \
              OR house_type = ANY($3::INT2[])) AND \
             rent >= $4::INT8 AND \
             LOWER(county) = LOWER($5::VARCHAR)",
        );
        assert_eq!(ps.len(), 5);
    }

    #[test]
    fn skips_house_types_when_none_match() {
        let mut ps = vec![];
        let predicate = Predicate::scoped(Scope::Public).and(Filter {
            q: Some("garden".into()),
            ..Filter::default()
        });

        assert_eq!(
            render(&predicate, &mut ps),
            "available = $1::BOOL AND \
             (description ILIKE $2::VARCHAR \
              OR location ILIKE $2::VARCHAR)",
        );
        assert_eq!(ps.len(), 2);
    }

    #[test]
    fn towns_are_sorted_in_byte_order() {
        let sql = towns_sql(None, Some(1));

        assert!(sql.starts_with("SELECT DISTINCT town COLLATE \"C\" AS town"));
        assert!(sql.contains("AND LOWER(county) = LOWER($1::VARCHAR)"));
        assert!(sql.ends_with("ORDER BY town"));
        assert!(!sql.contains("landlord_id"));
    }
}
