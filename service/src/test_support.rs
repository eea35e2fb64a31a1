//! Fixtures shared by [`Command`] and [`Query`] tests.
//!
//! [`Command`]: crate::Command
//! [`Query`]: crate::Query

use std::time::Duration;

use common::{
    operations::{By, Insert, Select},
    DateTimeOf,
};
use uuid::Uuid;

use crate::{
    domain::{
        landlord,
        property::{
            self, image, County, Description, HouseNumber, Location, Town,
        },
        user, Landlord, Principal, Property, Tenant, User,
    },
    command::create_property,
    infra::{database, storage, Database as _},
    query::ResolvePrincipal,
    Config, Query as _, Service,
};

/// [`Service`] over in-memory infrastructure.
pub(crate) type TestService = Service<database::Memory, storage::Memory>;

/// Creates a new [`TestService`] with empty infrastructure.
pub(crate) fn service() -> TestService {
    service_with(storage::Memory::new())
}

/// Creates a new [`TestService`] over the provided [`storage::Memory`].
pub(crate) fn service_with(storage: storage::Memory) -> TestService {
    let secret = b"test-secret";
    Service::new(
        Config {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(secret),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(secret),
            session_ttl: Duration::from_secs(30 * 60),
        },
        database::Memory::new(),
        storage,
    )
}

/// Stores a new [`User`] with the provided [`user::Role`].
///
/// No profile is created.
pub(crate) async fn user(svc: &TestService, role: user::Role) -> User {
    let user = User {
        id: user::Id::new(),
        username: user::Username::new(format!("user-{}", Uuid::new_v4()))
            .unwrap(),
        password_hash: user::PasswordHash::new(
            &user::Password::new("correct horse").unwrap(),
        )
        .unwrap(),
        email: None,
        phone: None,
        role,
        created_at: DateTimeOf::now(),
    };
    svc.database().execute(Insert(user.clone())).await.unwrap();
    user
}

/// Stores a new [`Principal::Landlord`].
pub(crate) async fn landlord(svc: &TestService) -> Principal {
    let user = user(svc, user::Role::Landlord).await;
    svc.database()
        .execute(Insert(Landlord::new(user.id)))
        .await
        .unwrap();
    resolve(svc, user.id).await
}

/// Stores a new [`Principal::Tenant`] with its profile.
pub(crate) async fn tenant(svc: &TestService) -> Principal {
    let user = user(svc, user::Role::Tenant).await;
    svc.database()
        .execute(Insert(Tenant::new(user.id)))
        .await
        .unwrap();
    resolve(svc, user.id).await
}

/// Resolves the [`Principal`] of the provided [`User`].
pub(crate) async fn resolve(svc: &TestService, user_id: user::Id) -> Principal {
    svc.execute(ResolvePrincipal {
        user_id: Some(user_id),
    })
    .await
    .unwrap()
}

/// Builder of a [`Property`] to be stored by [`Listing::store()`].
#[derive(Clone, Debug)]
pub(crate) struct Listing {
    /// [`Property`] being built.
    property: Property,
}

impl Listing {
    /// Starts building an available [`Property`] of the provided landlord.
    ///
    /// `age` orders listings: the older one was created `age` seconds
    /// before the current moment.
    pub(crate) fn of(principal: &Principal, age: u64) -> Self {
        Self::of_landlord(principal.landlord_id().unwrap(), age)
    }

    /// Same as [`Listing::of()`], but for a raw [`landlord::Id`].
    pub(crate) fn of_landlord(landlord_id: landlord::Id, age: u64) -> Self {
        let created_at = DateTimeOf::from_unix_timestamp(
            DateTimeOf::<()>::now().unix_timestamp()
                - i64::try_from(age).unwrap(),
        )
        .unwrap();
        Self {
            property: Property {
                id: property::Id::new(),
                landlord_id,
                house_type: property::HouseType::OneBedroom,
                house_number: HouseNumber::new("A1").unwrap(),
                rent: property::Rent::new(10_000).unwrap(),
                county: County::new("Nairobi").unwrap(),
                town: Town::new("Kasarani").unwrap(),
                location: Location::new("Mwiki").unwrap(),
                description: Description::default(),
                available: true,
                created_at,
            },
        }
    }

    /// Places the [`Property`] into the provided county and town.
    pub(crate) fn at(mut self, county: &str, town: &str) -> Self {
        self.property.county = County::new(county).unwrap();
        self.property.town = Town::new(town).unwrap();
        self
    }

    /// Sets the monthly rent of the [`Property`].
    pub(crate) fn rent(mut self, rent: i32) -> Self {
        self.property.rent = property::Rent::new(rent).unwrap();
        self
    }

    /// Marks the [`Property`] as not available for renting.
    pub(crate) fn unavailable(mut self) -> Self {
        self.property.available = false;
        self
    }

    /// Sets the description of the [`Property`].
    pub(crate) fn described(mut self, text: &str) -> Self {
        self.property.description = text.into();
        self
    }

    /// Stores the [`Property`].
    pub(crate) async fn store(self, svc: &TestService) -> Property {
        svc.database()
            .execute(Insert(self.property.clone()))
            .await
            .unwrap();
        self.property
    }
}

/// Checks whether the provided [`Property`] is still stored.
pub(crate) async fn exists(svc: &TestService, id: property::Id) -> bool {
    svc.database()
        .execute(Select(By::<Option<Property>, _>::new(id)))
        .await
        .unwrap()
        .is_some()
}

/// Creates a new PNG [`image::Upload`] with the provided file name.
pub(crate) fn image_upload(name: &str) -> image::Upload {
    image::Upload {
        file_name: Some(name.into()),
        content_type: "image/png".into(),
        bytes: b"\x89PNG\r\n\x1a\n".to_vec(),
    }
}

/// Creates new [`create_property::Fields`] of a bedsitter in the provided
/// county.
pub(crate) fn property_fields(county: &str) -> create_property::Fields {
    create_property::Fields {
        house_type: property::HouseType::Bedsitter,
        house_number: HouseNumber::new("B12").unwrap(),
        rent: property::Rent::new(7500).unwrap(),
        county: County::new(county).unwrap(),
        town: Town::new("kasarani").unwrap(),
        location: Location::new("Mwiki").unwrap(),
        description: "Near the stage".into(),
        available: true,
    }
}
