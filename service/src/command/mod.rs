//! [`Command`] definition.

pub mod attach_property_images;
pub mod authorize_user_session;
pub mod create_property;
pub mod create_user;
pub mod create_user_session;
pub mod delete_property;
pub mod delete_property_image;
pub mod delete_user;
pub mod promote_to_landlord;
pub mod toggle_favorite;
pub mod update_property;

use common::operations::Delete;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::property::image,
    infra::{storage, Storage},
};

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    attach_property_images::AttachPropertyImages,
    authorize_user_session::AuthorizeUserSession,
    create_property::CreateProperty, create_user::CreateUser,
    create_user_session::CreateUserSession, delete_property::DeleteProperty,
    delete_property_image::DeletePropertyImage, delete_user::DeleteUser,
    promote_to_landlord::PromoteToLandlord, toggle_favorite::ToggleFavorite,
    update_property::UpdateProperty,
};

/// Removes the provided [`image::File`]s from the [`Storage`].
///
/// Failures are logged only, as the database rows are gone already.
async fn remove_files<St>(
    storage: &St,
    files: impl IntoIterator<Item = image::File>,
) where
    St: Storage<
        Delete<image::File>,
        Ok = (),
        Err = Traced<storage::Error>,
    >,
{
    for file in files {
        if let Err(e) = storage.execute(Delete(file.clone())).await {
            log::warn!("failed to remove `{file}` image file: {e}");
        }
    }
}
