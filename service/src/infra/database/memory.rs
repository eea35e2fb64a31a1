//! In-memory [`Database`] implementation.

use std::{
    cmp::Reverse,
    collections::{BTreeSet, HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use common::operations::{By, Commit, Delete, Insert, Select, Transact, Update};
use derive_more::{Display, Error as StdError};
use tracerr::Traced;

use crate::{
    domain::{
        favorite, landlord,
        property::{self, image, County, Image, Town},
        tenant, user, Favorite, Landlord, Property, Tenant, User,
    },
    infra::{database, Database},
    read::property::{facets, list},
};

/// In-memory [`Database`] keeping everything in a single shared [`State`].
///
/// Enforces the same uniqueness and foreign key constraints as the SQL schema
/// does, including cascade deletion. Transactions are not isolated: every
/// operation is applied immediately and [`Commit`] is a no-op.
#[derive(Clone, Debug, Default)]
pub struct Memory(Arc<Mutex<State>>);

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current [`Counts`] of stored rows.
    #[must_use]
    pub fn counts(&self) -> Counts {
        let state = self.state();
        Counts {
            users: state.users.len(),
            landlords: state.landlords.len(),
            tenants: state.tenants.len(),
            properties: state.properties.len(),
            images: state.images.len(),
            favorites: state.favorites.len(),
        }
    }

    /// Locks the [`State`] of this [`Memory`] database.
    fn state(&self) -> MutexGuard<'_, State> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Numbers of rows stored in a [`Memory`] database.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Counts {
    /// Number of [`User`]s.
    pub users: usize,

    /// Number of [`Landlord`] profiles.
    pub landlords: usize,

    /// Number of [`Tenant`] profiles.
    pub tenants: usize,

    /// Number of [`Property`]s.
    pub properties: usize,

    /// Number of [`Image`]s.
    pub images: usize,

    /// Number of [`Favorite`]s of both namespaces.
    pub favorites: usize,
}

/// Rows of a [`Memory`] database.
#[derive(Debug, Default)]
struct State {
    /// Stored [`User`]s.
    users: HashMap<user::Id, User>,

    /// Stored [`Landlord`] profiles.
    landlords: HashMap<landlord::Id, Landlord>,

    /// Stored [`Tenant`] profiles.
    tenants: HashMap<tenant::Id, Tenant>,

    /// Stored [`Property`]s.
    properties: HashMap<property::Id, Property>,

    /// Stored [`Image`]s.
    images: HashMap<image::Id, Image>,

    /// Stored [`Favorite`]s.
    favorites: Vec<Favorite>,
}

impl State {
    /// Removes the [`User`] and everything referencing it.
    fn delete_user(&mut self, id: user::Id) -> bool {
        let landlords = self
            .landlords
            .values()
            .filter(|l| l.user_id == id)
            .map(|l| l.id)
            .collect::<HashSet<_>>();
        let tenants = self
            .tenants
            .values()
            .filter(|t| t.user_id == id)
            .map(|t| t.id)
            .collect::<HashSet<_>>();

        for l in &landlords {
            let owned = self
                .properties
                .values()
                .filter(|p| p.landlord_id == *l)
                .map(|p| p.id)
                .collect::<Vec<_>>();
            for p in owned {
                _ = self.delete_property(p);
            }
            drop(self.landlords.remove(l));
        }
        for t in &tenants {
            drop(self.tenants.remove(t));
        }
        self.favorites.retain(|f| match f.owner {
            favorite::Owner::Tenant(t) => !tenants.contains(&t),
            favorite::Owner::Landlord(l) => !landlords.contains(&l),
        });

        self.users.remove(&id).is_some()
    }

    /// Removes the [`Property`] and everything referencing it.
    fn delete_property(&mut self, id: property::Id) -> bool {
        self.images.retain(|_, i| i.property_id != id);
        self.favorites.retain(|f| f.property_id != id);
        self.properties.remove(&id).is_some()
    }

    /// Checks whether the [`favorite::Owner`] exists.
    fn owner_exists(&self, owner: favorite::Owner) -> bool {
        match owner {
            favorite::Owner::Tenant(id) => self.tenants.contains_key(&id),
            favorite::Owner::Landlord(id) => self.landlords.contains_key(&id),
        }
    }
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, StdError)]
pub enum Error {
    /// Unique constraint is violated.
    #[display("Unique constraint `{_0}` is violated")]
    UniqueViolation(#[error(not(source))] &'static str),

    /// Foreign key constraint is violated.
    #[display("Foreign key constraint `{_0}` is violated")]
    ForeignKeyViolation(#[error(not(source))] &'static str),
}

impl Error {
    /// Checks if this [`Error`] is a unique violation of the specified
    /// constraint (or any constraint, if [`None`]).
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            Self::UniqueViolation(c) => constraint.map_or(true, |x| x == *c),
            Self::ForeignKeyViolation(_) => false,
        }
    }
}

/// Creates a new [`Traced`] [`database::Error`] out of the [`Error`].
macro_rules! fail {
    ($e:expr) => {
        Err(tracerr::new!(database::Error::from($e)))
    };
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().users.get(&by.into_inner()).cloned())
    }
}

impl<'u> Database<Select<By<Option<User>, &'u user::Username>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'u user::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        let username = by.into_inner();
        Ok(self
            .state()
            .users
            .values()
            .find(|u| u.username == *username)
            .cloned())
    }
}

impl Database<Insert<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        if state.users.values().any(|u| u.username == user.username) {
            return fail!(Error::UniqueViolation("users_username_key"));
        }
        if state.users.contains_key(&user.id) {
            return fail!(Error::UniqueViolation("users_pkey"));
        }
        drop(state.users.insert(user.id, user));
        Ok(())
    }
}

impl Database<Update<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        if state
            .users
            .values()
            .any(|u| u.username == user.username && u.id != user.id)
        {
            return fail!(Error::UniqueViolation("users_username_key"));
        }
        if let Some(u) = state.users.get_mut(&user.id) {
            *u = user;
        }
        Ok(())
    }
}

impl Database<Delete<By<User, user::Id>>> for Memory {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().delete_user(by.into_inner()))
    }
}

impl Database<Insert<Landlord>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(landlord): Insert<Landlord>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        if !state.users.contains_key(&landlord.user_id) {
            return fail!(Error::ForeignKeyViolation(
                "landlords_user_id_fkey"
            ));
        }
        if !state
            .landlords
            .values()
            .any(|l| l.user_id == landlord.user_id)
        {
            drop(state.landlords.insert(landlord.id, landlord));
        }
        Ok(())
    }
}

impl Database<Select<By<Option<Landlord>, user::Id>>> for Memory {
    type Ok = Option<Landlord>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Landlord>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();
        Ok(self
            .state()
            .landlords
            .values()
            .find(|l| l.user_id == user_id)
            .copied())
    }
}

impl Database<Insert<Tenant>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(tenant): Insert<Tenant>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        if !state.users.contains_key(&tenant.user_id) {
            return fail!(Error::ForeignKeyViolation("tenants_user_id_fkey"));
        }
        if !state.tenants.values().any(|t| t.user_id == tenant.user_id) {
            drop(state.tenants.insert(tenant.id, tenant));
        }
        Ok(())
    }
}

impl Database<Select<By<Option<Tenant>, user::Id>>> for Memory {
    type Ok = Option<Tenant>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Tenant>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();
        Ok(self
            .state()
            .tenants
            .values()
            .find(|t| t.user_id == user_id)
            .copied())
    }
}

impl Database<Insert<Property>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        if !state.landlords.contains_key(&property.landlord_id) {
            return fail!(Error::ForeignKeyViolation(
                "properties_landlord_id_fkey"
            ));
        }
        if state.properties.contains_key(&property.id) {
            return fail!(Error::UniqueViolation("properties_pkey"));
        }
        drop(state.properties.insert(property.id, property));
        Ok(())
    }
}

impl Database<Update<Property>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(property): Update<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        if let Some(p) = self.state().properties.get_mut(&property.id) {
            *p = property;
        }
        Ok(())
    }
}

impl Database<Select<By<Option<Property>, property::Id>>> for Memory {
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().properties.get(&by.into_inner()).cloned())
    }
}

impl Database<Select<By<Option<Property>, (property::Id, landlord::Id)>>>
    for Memory
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, (property::Id, landlord::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (id, owner) = by.into_inner();
        Ok(self
            .state()
            .properties
            .get(&id)
            .filter(|p| p.landlord_id == owner)
            .cloned())
    }
}

impl Database<Delete<By<Property, (property::Id, landlord::Id)>>> for Memory {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Property, (property::Id, landlord::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (id, owner) = by.into_inner();
        let mut state = self.state();
        let owned = state
            .properties
            .get(&id)
            .is_some_and(|p| p.landlord_id == owner);
        Ok(owned && state.delete_property(id))
    }
}

impl Database<Select<By<list::Page, list::Selector>>> for Memory {
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

        let mut matched = self
            .state()
            .properties
            .values()
            .filter(|p| predicate.matches(p))
            .cloned()
            .collect::<Vec<_>>();
        matched.sort_by_key(|p| Reverse((p.created_at, p.id)));

        let window = arguments.window(matched.len());
        Ok(list::Page::new(
            window,
            matched.into_iter().skip(window.offset).take(window.limit),
        ))
    }
}

impl Database<Select<By<Vec<Town>, facets::Towns>>> for Memory {
    type Ok = Vec<Town>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Town>, facets::Towns>>,
    ) -> Result<Self::Ok, Self::Err> {
        let facets::Towns { owner, county } = by.into_inner();
        Ok(self
            .state()
            .properties
            .values()
            .filter(|p| owner.map_or(true, |o| p.landlord_id == o))
            .filter(|p| {
                county.as_ref().map_or(true, |c| {
                    p.county.to_string().to_lowercase()
                        == c.to_string().to_lowercase()
                })
            })
            .map(|p| p.town.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect())
    }
}

impl Database<Select<By<Vec<County>, facets::OwnCounties>>> for Memory {
    type Ok = Vec<County>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<County>, facets::OwnCounties>>,
    ) -> Result<Self::Ok, Self::Err> {
        let facets::OwnCounties(owner) = by.into_inner();
        Ok(self
            .state()
            .properties
            .values()
            .filter(|p| p.landlord_id == owner)
            .map(|p| p.county.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect())
    }
}

impl Database<Select<By<facets::Stats, landlord::Id>>> for Memory {
    type Ok = facets::Stats;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<facets::Stats, landlord::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let owner = by.into_inner();
        Ok(self
            .state()
            .properties
            .values()
            .filter(|p| p.landlord_id == owner)
            .fold(facets::Stats::default(), |mut stats, p| {
                stats.total += 1;
                if p.available {
                    stats.available += 1;
                }
                stats
            }))
    }
}

impl Database<Insert<Image>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(image): Insert<Image>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        if !state.properties.contains_key(&image.property_id) {
            return fail!(Error::ForeignKeyViolation(
                "property_images_property_id_fkey"
            ));
        }
        drop(state.images.insert(image.id, image));
        Ok(())
    }
}

impl Database<Select<By<Vec<Image>, property::Id>>> for Memory {
    type Ok = Vec<Image>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Image>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let property_id = by.into_inner();
        let mut images = self
            .state()
            .images
            .values()
            .filter(|i| i.property_id == property_id)
            .cloned()
            .collect::<Vec<_>>();
        images.sort_by_key(|i| (i.created_at, i.id));
        Ok(images)
    }
}

impl Database<Select<By<Vec<Image>, landlord::Id>>> for Memory {
    type Ok = Vec<Image>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Image>, landlord::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let owner = by.into_inner();
        let state = self.state();
        Ok(state
            .images
            .values()
            .filter(|i| {
                state
                    .properties
                    .get(&i.property_id)
                    .is_some_and(|p| p.landlord_id == owner)
            })
            .cloned()
            .collect())
    }
}

impl Database<Select<By<Option<Image>, (image::Id, landlord::Id)>>>
    for Memory
{
    type Ok = Option<Image>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Image>, (image::Id, landlord::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (id, owner) = by.into_inner();
        let state = self.state();
        Ok(state
            .images
            .get(&id)
            .filter(|i| {
                state
                    .properties
                    .get(&i.property_id)
                    .is_some_and(|p| p.landlord_id == owner)
            })
            .cloned())
    }
}

impl Database<Delete<By<Image, image::Id>>> for Memory {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Image, image::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().images.remove(&by.into_inner()).is_some())
    }
}

impl Database<Insert<Favorite>> for Memory {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(favorite): Insert<Favorite>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        if !state.properties.contains_key(&favorite.property_id) {
            return fail!(Error::ForeignKeyViolation(
                "favorites_property_id_fkey"
            ));
        }
        if !state.owner_exists(favorite.owner) {
            return fail!(Error::ForeignKeyViolation("favorites_owner_fkey"));
        }
        if state.favorites.iter().any(|f| {
            f.owner == favorite.owner && f.property_id == favorite.property_id
        }) {
            return Ok(false);
        }
        state.favorites.push(favorite);
        Ok(true)
    }
}

impl Database<Delete<By<Favorite, (favorite::Owner, property::Id)>>>
    for Memory
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Favorite, (favorite::Owner, property::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (owner, property_id) = by.into_inner();
        let mut state = self.state();
        let before = state.favorites.len();
        state
            .favorites
            .retain(|f| f.owner != owner || f.property_id != property_id);
        Ok(state.favorites.len() < before)
    }
}

impl Database<Select<By<Vec<Property>, favorite::Owner>>> for Memory {
    type Ok = Vec<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Property>, favorite::Owner>>,
    ) -> Result<Self::Ok, Self::Err> {
        let owner = by.into_inner();
        let state = self.state();
        let mut favorites = state
            .favorites
            .iter()
            .filter(|f| f.owner == owner)
            .collect::<Vec<_>>();
        favorites.sort_by_key(|f| Reverse((f.created_at, f.id)));
        Ok(favorites
            .into_iter()
            .filter_map(|f| state.properties.get(&f.property_id).cloned())
            .collect())
    }
}

impl Database<Select<By<HashSet<property::Id>, favorite::Owner>>> for Memory {
    type Ok = HashSet<property::Id>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashSet<property::Id>, favorite::Owner>>,
    ) -> Result<Self::Ok, Self::Err> {
        let owner = by.into_inner();
        Ok(self
            .state()
            .favorites
            .iter()
            .filter(|f| f.owner == owner)
            .map(|f| f.property_id)
            .collect())
    }
}
