//! [`Command`] for updating an own [`Property`].

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        landlord,
        principal::{Denial, Operation},
        property::{self, image, County},
        Principal, Property,
    },
    infra::{database, Database},
    Service,
};

use super::{
    attach_property_images,
    create_property::{Fields, Output},
    AttachPropertyImages, Command,
};

/// [`Command`] for updating an own [`Property`] and attaching new images to
/// it.
#[derive(Clone, Debug)]
pub struct UpdateProperty {
    /// [`Principal`] owning the [`Property`].
    pub principal: Principal,

    /// ID of the [`Property`] to update.
    pub id: property::Id,

    /// New [`Fields`] of the [`Property`].
    pub fields: Fields,

    /// Uploaded [`image::Upload`]s to attach to the [`Property`].
    pub images: Vec<image::Upload>,
}

impl<Db, St> Command<UpdateProperty> for Service<Db, St>
where
    Db: Database<
            Select<By<Option<Property>, (property::Id, landlord::Id)>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Update<Property>, Ok = (), Err = Traced<database::Error>>,
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
        cmd: UpdateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateProperty {
            principal,
            id,
            fields,
            images,
        } = cmd;

        principal
            .authorize(Operation::ManageProperty)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let owner = principal
            .landlord_id()
            .ok_or(Denial::InsufficientRole)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        // Properties of other landlords are reported as missing.
        let property = self
            .database()
            .execute(Select(By::<Option<Property>, _>::new((id, owner))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(id))
            .map_err(tracerr::wrap!())?;
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
            house_type,
            house_number,
            rent,
            county,
            town,
            location,
            description,
            available,
            ..property
        };
        self.database()
            .execute(Update(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Output::attach(self, principal, property, images)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`UpdateProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Principal`] may not manage properties.
    #[display("`Principal` cannot manage properties: {_0}")]
    Denied(Denial),

    /// [`Property`] doesn't exist or is owned by someone else.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),

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
    use common::operations::{By, Select};

    use crate::{
        domain::Property,
        infra::Database as _,
        test_support::{
            image_upload, landlord, property_fields, service, Listing,
        },
        Command as _,
    };

    use super::{ExecutionError, UpdateProperty};

    #[tokio::test]
    async fn owner_updates_and_attaches() {
        let svc = service();
        let owner = landlord(&svc).await;
        let before = Listing::of(&owner, 0).store(&svc).await;

        let out = svc
            .execute(UpdateProperty {
                principal: owner,
                id: before.id,
                fields: property_fields("mombasa"),
                images: vec![image_upload("new.png")],
            })
            .await
            .unwrap();

        assert_eq!(out.property.id, before.id);
        assert_eq!(out.property.created_at, before.created_at);
        assert_eq!(out.property.county.to_string(), "Mombasa");
        assert_eq!(out.images.len(), 1);
        let stored = svc
            .database()
            .execute(Select(By::<Option<Property>, _>::new(before.id)))
            .await
            .unwrap();
        assert_eq!(stored, Some(out.property));
    }

    #[tokio::test]
    async fn other_landlord_gets_not_found() {
        let svc = service();
        let owner = landlord(&svc).await;
        let before = Listing::of(&owner, 0).store(&svc).await;

        let err = svc
            .execute(UpdateProperty {
                principal: landlord(&svc).await,
                id: before.id,
                fields: property_fields("Mombasa"),
                images: vec![],
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::PropertyNotExists(id) if *id == before.id,
        ));
        let stored = svc
            .database()
            .execute(Select(By::<Option<Property>, _>::new(before.id)))
            .await
            .unwrap();
        assert_eq!(stored, Some(before));
    }
}
