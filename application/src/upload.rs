//! Multipart upload of property photos.

use axum::{
    extract::{Multipart, Path},
    Json,
};
use serde::Serialize;
use service::{
    command::{self, attach_property_images, Command as _},
    domain::property::image,
};
use tracing as log;
use uuid::Uuid;

use crate::{AsError, Context, Error, MediaUrl};

/// Attaches every file of a `multipart/form-data` request as a photo of the
/// property with the ID from the path.
///
/// Parts without a file name are ignored. Files that can't be stored are
/// reported in [`Uploaded::failed`] and don't fail the request.
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
/// - `NOT_LANDLORD` - the authenticated `User` is not a landlord;
/// - `PROPERTY_NOT_EXISTS` - the property doesn't exist or is owned by
///                           someone else.
pub async fn upload_images(
    Path(id): Path<Uuid>,
    ctx: Context,
    mut multipart: Multipart,
) -> Result<Json<Uploaded>, Error> {
    let principal = ctx.principal().await?;

    let mut uploads = vec![];
    while let Some(field) =
        multipart.next_field().await.map_err(AsError::into_error)?
    {
        let Some(file_name) = field.file_name().map(ToOwned::to_owned) else {
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
        let bytes = field.bytes().await.map_err(AsError::into_error)?;
        uploads.push(image::Upload {
            file_name: Some(file_name),
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    let output = ctx
        .service()
        .execute(command::AttachPropertyImages {
            principal,
            property_id: id.into(),
            uploads,
        })
        .await
        .map_err(AsError::into_error)?;

    log::info!(
        property_id = %id,
        stored = output.images.len(),
        failed = output.failed.len(),
        "property photos uploaded",
    );

    Ok(Json(Uploaded::new(output, ctx.media_url())))
}

/// Result of [`upload_images()`].
#[derive(Clone, Debug, Serialize)]
pub struct Uploaded {
    /// Stored photos.
    pub stored: Vec<Stored>,

    /// Files that haven't been stored.
    pub failed: Vec<Failed>,
}

impl Uploaded {
    /// Builds an [`Uploaded`] out of the provided
    /// [`attach_property_images::Output`].
    fn new(output: attach_property_images::Output, media: &MediaUrl) -> Self {
        let attach_property_images::Output { images, failed } = output;
        Self {
            stored: images
                .into_iter()
                .map(|i| Stored {
                    id: i.id.into(),
                    url: media.of(&i.file),
                })
                .collect(),
            failed: failed
                .into_iter()
                .map(|f| Failed {
                    file_name: f.file_name,
                    reason: f.reason.to_string(),
                })
                .collect(),
        }
    }
}

/// Stored photo.
#[derive(Clone, Debug, Serialize)]
pub struct Stored {
    /// ID of the photo.
    pub id: Uuid,

    /// URL the photo is served under.
    pub url: String,
}

/// File that hasn't been stored.
#[derive(Clone, Debug, Serialize)]
pub struct Failed {
    /// Name of the file, as provided by the client.
    pub file_name: String,

    /// Human-readable reason of the failure.
    pub reason: String,
}

#[cfg(test)]
mod spec {
    use service::{
        command::attach_property_images::{Failure, FailureReason, Output},
        domain::property::{self, Image},
    };
    use uuid::Uuid;

    use crate::MediaUrl;

    use super::Uploaded;

    #[test]
    fn reports_stored_and_failed_files() {
        let image =
            Image::new(property::Id::new(), property::image::Format::Png);
        let output = Output {
            images: vec![image.clone()],
            failed: vec![Failure {
                file_name: "notes.pdf".to_owned(),
                reason: FailureReason::UnsupportedFormat,
            }],
        };

        let uploaded = Uploaded::new(output, &MediaUrl::new("/media"));

        assert_eq!(uploaded.stored.len(), 1);
        assert_eq!(uploaded.stored[0].id, Uuid::from(image.id));
        assert_eq!(uploaded.stored[0].url, format!("/media/{}", image.file));
        assert_eq!(uploaded.failed.len(), 1);
        assert_eq!(uploaded.failed[0].file_name, "notes.pdf");
        assert_eq!(uploaded.failed[0].reason, "unsupported image format");
    }
}
