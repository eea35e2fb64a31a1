//! [`Command`] for attaching [`Image`]s to a [`Property`].

use common::operations::{By, Delete, Insert, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        landlord,
        principal::{Denial, Operation},
        property::{self, image, Image},
        Principal, Property,
    },
    infra::{database, storage, Database, Storage},
    Service,
};

use super::Command;

/// [`Command`] for attaching uploaded [`Image`]s to an own [`Property`].
///
/// Every upload is stored independently: a failed one is reported in the
/// [`Output`] and doesn't affect the others.
#[derive(Clone, Debug)]
pub struct AttachPropertyImages {
    /// [`Principal`] owning the [`Property`].
    pub principal: Principal,

    /// ID of the [`Property`] to attach the [`Image`]s to.
    pub property_id: property::Id,

    /// Uploaded [`Image`] files.
    pub uploads: Vec<image::Upload>,
}

/// Output of [`AttachPropertyImages`] [`Command`].
#[derive(Clone, Debug, Default)]
pub struct Output {
    /// Attached [`Image`]s.
    pub images: Vec<Image>,

    /// Uploads that haven't been attached.
    pub failed: Vec<Failure>,
}

/// Upload that couldn't be attached to a [`Property`].
#[derive(Clone, Debug, Display)]
#[display("`{file_name}`: {reason}")]
pub struct Failure {
    /// Name of the failed upload.
    pub file_name: String,

    /// [`FailureReason`] of the upload.
    pub reason: FailureReason,
}

/// Reason of an upload [`Failure`].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum FailureReason {
    /// Content type is not a supported [`image::Format`].
    #[display("unsupported image format")]
    UnsupportedFormat,

    /// Upload has no contents.
    #[display("empty file")]
    Empty,

    /// [`Storage`] failed to store the file.
    #[display("failed to store the file")]
    StorageFailed,

    /// [`Database`] failed to record the [`Image`].
    #[display("failed to record the image")]
    DatabaseFailed,
}

impl<Db, St> Command<AttachPropertyImages> for Service<Db, St>
where
    Db: Database<
            Select<By<Option<Property>, (property::Id, landlord::Id)>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Insert<Image>, Ok = (), Err = Traced<database::Error>>,
    St: Storage<Insert<storage::Blob>, Ok = (), Err = Traced<storage::Error>>
        + Storage<Delete<image::File>, Ok = (), Err = Traced<storage::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AttachPropertyImages,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AttachPropertyImages {
            principal,
            property_id,
            uploads,
        } = cmd;

        principal
            .authorize(Operation::ManageProperty)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let owner = principal
            .landlord_id()
            .ok_or(Denial::InsufficientRole)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        // Properties of other landlords are reported as missing.
        drop(
            self.database()
                .execute(Select(By::<Option<Property>, _>::new((
                    property_id,
                    owner,
                ))))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::PropertyNotExists(property_id))
                .map_err(tracerr::wrap!())?,
        );

        let mut out = Output::default();
        for upload in uploads {
            match self.attach(property_id, &upload).await {
                Ok(image) => out.images.push(image),
                Err(reason) => out.failed.push(Failure {
                    file_name: upload.name().to_owned(),
                    reason,
                }),
            }
        }
        Ok(out)
    }
}

impl<Db, St> Service<Db, St>
where
    Db: Database<Insert<Image>, Ok = (), Err = Traced<database::Error>>,
    St: Storage<Insert<storage::Blob>, Ok = (), Err = Traced<storage::Error>>
        + Storage<Delete<image::File>, Ok = (), Err = Traced<storage::Error>>,
{
    /// Stores a single [`image::Upload`] and records its [`Image`].
    async fn attach(
        &self,
        property_id: property::Id,
        upload: &image::Upload,
    ) -> Result<Image, FailureReason> {
        let format = image::Format::from_content_type(&upload.content_type)
            .ok_or(FailureReason::UnsupportedFormat)?;
        if upload.bytes.is_empty() {
            return Err(FailureReason::Empty);
        }

        let image = Image::new(property_id, format);
        self.storage()
            .execute(Insert(storage::Blob {
                file: image.file.clone(),
                bytes: upload.bytes.clone(),
            }))
            .await
            .map_err(|e| {
                log::warn!("failed to store `{}` upload: {e}", upload.name());
                FailureReason::StorageFailed
            })?;

        if let Err(e) = self.database().execute(Insert(image.clone())).await {
            log::error!("failed to record `{}` image: {e}", image.file);
            if let Err(e) =
                self.storage().execute(Delete(image.file.clone())).await
            {
                log::warn!("failed to remove `{}` image file: {e}", image.file);
            }
            return Err(FailureReason::DatabaseFailed);
        }

        log::info!("stored `{}` image of `Property({property_id})`", image.file);
        Ok(image)
    }
}

/// Error of [`AttachPropertyImages`] [`Command`] execution.
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
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::property::image,
        infra::storage,
        test_support::{
            image_upload, landlord, service, service_with, Listing,
        },
        Command as _,
    };

    use super::{AttachPropertyImages, ExecutionError, FailureReason};

    #[tokio::test]
    async fn reports_failed_uploads_and_keeps_the_rest() {
        let svc = service();
        let owner = landlord(&svc).await;
        let property = Listing::of(&owner, 0).store(&svc).await;

        let out = svc
            .execute(AttachPropertyImages {
                principal: owner,
                property_id: property.id,
                uploads: vec![
                    image_upload("front.png"),
                    image::Upload {
                        content_type: "application/pdf".into(),
                        ..image_upload("lease.pdf")
                    },
                    image::Upload {
                        bytes: vec![],
                        ..image_upload("empty.png")
                    },
                ],
            })
            .await
            .unwrap();

        assert_eq!(out.images.len(), 1);
        assert!(svc.storage().contains(&out.images[0].file));
        assert_eq!(
            out.failed
                .iter()
                .map(|f| (f.file_name.as_str(), f.reason))
                .collect::<Vec<_>>(),
            [
                ("lease.pdf", FailureReason::UnsupportedFormat),
                ("empty.png", FailureReason::Empty),
            ],
        );
        assert_eq!(svc.database().counts().images, 1);
    }

    #[tokio::test]
    async fn storage_failure_records_nothing() {
        let svc = service_with(storage::Memory::broken());
        let owner = landlord(&svc).await;
        let property = Listing::of(&owner, 0).store(&svc).await;

        let out = svc
            .execute(AttachPropertyImages {
                principal: owner,
                property_id: property.id,
                uploads: vec![image_upload("front.png")],
            })
            .await
            .unwrap();

        assert!(out.images.is_empty());
        assert_eq!(out.failed[0].reason, FailureReason::StorageFailed);
        assert_eq!(svc.database().counts().images, 0);
    }

    #[tokio::test]
    async fn foreign_property_is_not_found() {
        let svc = service();
        let owner = landlord(&svc).await;
        let property = Listing::of(&owner, 0).store(&svc).await;

        let err = svc
            .execute(AttachPropertyImages {
                principal: landlord(&svc).await,
                property_id: property.id,
                uploads: vec![image_upload("front.png")],
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::PropertyNotExists(id) if *id == property.id,
        ));
        assert!(svc.storage().is_empty());
    }
}
