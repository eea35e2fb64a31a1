//! [`Command`] for creating a new [`Property`].

use common::{operations::Insert, DateTimeOf};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Landlord;
use crate::{
    domain::{
        principal::{Denial, Operation},
        property::{
            self, image, County, Description, HouseNumber, HouseType,
            Location, Rent, Town,
        },
        Principal, Property,
    },
    infra::{database, Database},
    Service,
};

use super::{
    attach_property_images::{self, Failure},
    AttachPropertyImages, Command,
};

/// Editable fields of a [`Property`].
#[derive(Clone, Debug)]
pub struct Fields {
    /// [`HouseType`] of the [`Property`].
    pub house_type: HouseType,

    /// [`HouseNumber`] of the [`Property`].
    pub house_number: HouseNumber,

    /// Monthly [`Rent`] of the [`Property`].
    pub rent: Rent,

    /// [`County`] of the [`Property`], one of the known ones.
    pub county: County,

    /// [`Town`] of the [`Property`].
    pub town: Town,

    /// [`Location`] of the [`Property`].
    pub location: Location,

    /// [`Description`] of the [`Property`].
    pub description: Description,

    /// Indicator whether the [`Property`] is open for renting.
    pub available: bool,
}

impl Fields {
    /// Checks these [`Fields`] to be acceptable for a [`Property`].
    pub(super) fn check(&self) -> Result<(), County> {
        if self.county.is_known() {
            Ok(())
        } else {
            Err(self.county.clone())
        }
    }
}

/// [`Command`] for creating a new [`Property`] of a [`Landlord`].
#[derive(Clone, Debug)]
pub struct CreateProperty {
    /// [`Principal`] creating the [`Property`].
    pub principal: Principal,

    /// [`Fields`] of the new [`Property`].
    pub fields: Fields,

    /// Uploaded [`image::Upload`]s to attach to the new [`Property`].
    pub images: Vec<image::Upload>,
}

/// Output of [`CreateProperty`] and [`UpdateProperty`] [`Command`]s.
///
/// [`UpdateProperty`]: super::UpdateProperty
#[derive(Clone, Debug)]
pub struct Output {
    /// Created or updated [`Property`].
    pub property: Property,

    /// Newly attached [`property::Image`]s.
    pub images: Vec<property::Image>,

    /// Uploads that couldn't be attached.
    pub failed: Vec<Failure>,
}

impl Output {
    /// Creates a new [`Output`] attaching the provided `images` to the
    /// provided [`Property`].
    pub(super) async fn attach<Svc>(
        svc: &Svc,
        principal: Principal,
        property: Property,
        images: Vec<image::Upload>,
    ) -> Result<Self, Traced<attach_property_images::ExecutionError>>
    where
        Svc: Command<
            AttachPropertyImages,
            Ok = attach_property_images::Output,
            Err = Traced<attach_property_images::ExecutionError>,
        >,
    {
        if images.is_empty() {
            return Ok(Self {
                property,
                images: vec![],
                failed: vec![],
            });
        }

        let attached = svc
            .execute(AttachPropertyImages {
                principal,
                property_id: property.id,
                uploads: images,
            })
            .await?;
        Ok(Self {
            property,
            images: attached.images,
            failed: attached.failed,
        })
    }
}

impl<Db, St> Command<CreateProperty> for Service<Db, St>
where
    Db: Database<Insert<Property>, Ok = (), Err = Traced<database::Error>>,
    Self: Command<
        AttachPropertyImages,
        Ok = attach_property_images::Output,
        Err = Traced<attach_property_images::ExecutionError>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateProperty {
            principal,
            fields,
            images,
        } = cmd;

        principal
            .authorize(Operation::ManageProperty)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let landlord_id = principal
            .landlord_id()
            .ok_or(Denial::InsufficientRole)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        fields
            .check()
            .map_err(E::UnknownCounty)
            .map_err(tracerr::wrap!())?;

        let Fields {
            house_type,
            house_number,
            rent,
            county,
            town,
            location,
            description,
            available,
        } = fields;
        let property = Property {
            id: property::Id::new(),
            landlord_id,
            house_type,
            house_number,
            rent,
            county,
            town,
            location,
            description,
            available,
            created_at: DateTimeOf::now(),
        };
        self.database()
            .execute(Insert(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Output::attach(self, principal, property, images)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`CreateProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Principal`] may not manage properties.
    #[display("`Principal` cannot manage properties: {_0}")]
    Denied(Denial),

    /// [`County`] is not a known one.
    #[display("`{_0}` is not a known county")]
    #[from(ignore)]
    UnknownCounty(#[error(not(source))] County),

    /// Attaching images failed as a whole.
    #[display("Failed to attach images: {_0}")]
    Images(attach_property_images::ExecutionError),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::principal::Denial,
        test_support::{
            image_upload, landlord, property_fields, service, tenant,
        },
        Command as _,
    };

    use super::{CreateProperty, ExecutionError};

    #[tokio::test]
    async fn creates_normalized_property_with_images() {
        let svc = service();
        let owner = landlord(&svc).await;

        let out = svc
            .execute(CreateProperty {
                principal: owner,
                fields: property_fields(" nairobi "),
                images: vec![image_upload("a.png"), image_upload("b.png")],
            })
            .await
            .unwrap();

        assert_eq!(out.property.landlord_id, owner.landlord_id().unwrap());
        assert_eq!(out.property.county.to_string(), "Nairobi");
        assert_eq!(out.property.town.to_string(), "Kasarani");
        assert_eq!(out.images.len(), 2);
        assert!(out.failed.is_empty());
        assert_eq!(svc.database().counts().properties, 1);
    }

    #[tokio::test]
    async fn rejects_unknown_county() {
        let svc = service();

        let err = svc
            .execute(CreateProperty {
                principal: landlord(&svc).await,
                fields: property_fields("Atlantis"),
                images: vec![],
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::UnknownCounty(_)));
        assert_eq!(svc.database().counts().properties, 0);
    }

    #[tokio::test]
    async fn tenant_is_denied() {
        let svc = service();

        let err = svc
            .execute(CreateProperty {
                principal: tenant(&svc).await,
                fields: property_fields("Nairobi"),
                images: vec![],
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Denied(Denial::InsufficientRole),
        ));
    }
}
