//! [`Principal`] definitions.

use derive_more::{Display, Error};

#[cfg(doc)]
use crate::domain::{Landlord, Property, Tenant, User};
use crate::domain::{favorite, landlord, tenant, user};

/// Caller of an [`Operation`], resolved once per request.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Principal {
    /// Unauthenticated caller.
    #[default]
    Anonymous,

    /// Authenticated [`User`] without a [`Landlord`] profile.
    Tenant {
        /// ID of the authenticated [`User`].
        user_id: user::Id,

        /// [`Tenant`] profile, if it has been created already.
        profile: Option<tenant::Id>,
    },

    /// Authenticated [`User`] owning a [`Landlord`] profile.
    Landlord {
        /// ID of the authenticated [`User`].
        user_id: user::Id,

        /// [`Landlord`] profile.
        profile: landlord::Id,
    },
}

impl Principal {
    /// Returns the [`user::Id`] of this [`Principal`], if authenticated.
    #[must_use]
    pub const fn user_id(&self) -> Option<user::Id> {
        match self {
            Self::Anonymous => None,
            Self::Tenant { user_id, .. } | Self::Landlord { user_id, .. } => {
                Some(*user_id)
            }
        }
    }

    /// Returns the [`landlord::Id`] of this [`Principal`], if it's a
    /// [`Principal::Landlord`].
    #[must_use]
    pub const fn landlord_id(&self) -> Option<landlord::Id> {
        match self {
            Self::Landlord { profile, .. } => Some(*profile),
            Self::Anonymous | Self::Tenant { .. } => None,
        }
    }

    /// Returns the [`favorite::Owner`] this [`Principal`] bookmarks
    /// [`Property`]s as.
    ///
    /// [`None`] for a [`Principal::Tenant`] whose profile hasn't been created
    /// yet.
    #[must_use]
    pub const fn favorite_owner(&self) -> Option<favorite::Owner> {
        match self {
            Self::Anonymous | Self::Tenant { profile: None, .. } => None,
            Self::Tenant {
                profile: Some(id), ..
            } => Some(favorite::Owner::Tenant(*id)),
            Self::Landlord { profile, .. } => {
                Some(favorite::Owner::Landlord(*profile))
            }
        }
    }

    /// Authorizes this [`Principal`] to perform the provided [`Operation`].
    ///
    /// # Errors
    ///
    /// With a [`Denial`] reason if the [`Operation`] is not allowed.
    pub const fn authorize(&self, op: Operation) -> Result<(), Denial> {
        match (op.access(), self) {
            (Access::Public, _)
            | (Access::Authenticated, Self::Tenant { .. } | Self::Landlord { .. })
            | (Access::Landlord, Self::Landlord { .. }) => Ok(()),
            (Access::Authenticated | Access::Landlord, Self::Anonymous) => {
                Err(Denial::AuthenticationRequired)
            }
            (Access::Landlord, Self::Tenant { .. }) => {
                Err(Denial::InsufficientRole)
            }
        }
    }
}

/// Operation guarded by [`Principal::authorize()`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Operation {
    /// Browsing the public catalog of available [`Property`]s.
    BrowseCatalog,

    /// Viewing a single [`Property`] with its images.
    ViewProperty,

    /// Listing towns for a county.
    ListTowns,

    /// Viewing own [`User`] account.
    ViewAccount,

    /// Deleting own [`User`] account.
    DeleteAccount,

    /// Bookmarking or un-bookmarking a [`Property`].
    ToggleFavorite,

    /// Listing bookmarked [`Property`]s.
    ListFavorites,

    /// Becoming a [`Landlord`].
    PromoteToLandlord,

    /// Browsing available [`Property`]s from a profile dashboard.
    BrowseListings,

    /// Listing own [`Property`]s.
    ListOwnProperties,

    /// Viewing the [`Landlord`] dashboard.
    ViewDashboard,

    /// Creating, editing or deleting own [`Property`]s and their images.
    ManageProperty,
}

impl Operation {
    /// Returns the [`Access`] level required to perform this [`Operation`].
    #[must_use]
    pub const fn access(self) -> Access {
        match self {
            Self::BrowseCatalog | Self::ViewProperty | Self::ListTowns => {
                Access::Public
            }
            Self::BrowseListings
            | Self::ViewAccount
            | Self::DeleteAccount
            | Self::ToggleFavorite
            | Self::ListFavorites
            | Self::PromoteToLandlord => Access::Authenticated,
            Self::ListOwnProperties
            | Self::ViewDashboard
            | Self::ManageProperty => Access::Landlord,
        }
    }
}

/// Access level of an [`Operation`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Access {
    /// Anyone may perform the [`Operation`].
    Public,

    /// Any authenticated [`Principal`] may perform the [`Operation`].
    Authenticated,

    /// Only a [`Principal::Landlord`] may perform the [`Operation`].
    Landlord,
}

/// Reason of a [`Principal::authorize()`] denial.
#[derive(Clone, Copy, Debug, Display, Eq, Error, Hash, PartialEq)]
pub enum Denial {
    /// [`Principal`] is not authenticated.
    #[display("Authentication required")]
    AuthenticationRequired,

    /// [`Principal`] has no [`Landlord`] profile.
    #[display("`Landlord` profile required")]
    InsufficientRole,
}

#[cfg(test)]
mod spec {
    use crate::domain::{favorite, landlord, tenant, user};

    use super::{Denial, Operation, Principal};

    fn tenant(profile: Option<tenant::Id>) -> Principal {
        Principal::Tenant {
            user_id: user::Id::new(),
            profile,
        }
    }

    fn landlord() -> Principal {
        Principal::Landlord {
            user_id: user::Id::new(),
            profile: landlord::Id::new(),
        }
    }

    #[test]
    fn anonymous_reaches_public_operations_only() {
        let p = Principal::Anonymous;

        assert_eq!(p.authorize(Operation::BrowseCatalog), Ok(()));
        assert_eq!(p.authorize(Operation::ListTowns), Ok(()));
        assert_eq!(
            p.authorize(Operation::BrowseListings),
            Err(Denial::AuthenticationRequired),
        );
        assert_eq!(
            p.authorize(Operation::ToggleFavorite),
            Err(Denial::AuthenticationRequired),
        );
        assert_eq!(
            p.authorize(Operation::ManageProperty),
            Err(Denial::AuthenticationRequired),
        );
    }

    #[test]
    fn tenant_is_denied_landlord_operations() {
        let p = tenant(None);

        assert_eq!(p.authorize(Operation::ToggleFavorite), Ok(()));
        assert_eq!(p.authorize(Operation::PromoteToLandlord), Ok(()));
        assert_eq!(
            p.authorize(Operation::ListOwnProperties),
            Err(Denial::InsufficientRole),
        );
        assert_eq!(
            p.authorize(Operation::ManageProperty),
            Err(Denial::InsufficientRole),
        );
    }

    #[test]
    fn landlord_reaches_everything() {
        let p = landlord();

        for op in [
            Operation::BrowseCatalog,
            Operation::ToggleFavorite,
            Operation::BrowseListings,
            Operation::ManageProperty,
            Operation::ViewDashboard,
        ] {
            assert_eq!(p.authorize(op), Ok(()), "{op}");
        }
    }

    #[test]
    fn favorite_owner_follows_profile() {
        let id = tenant::Id::new();

        assert_eq!(Principal::Anonymous.favorite_owner(), None);
        assert_eq!(tenant(None).favorite_owner(), None);
        assert_eq!(
            tenant(Some(id)).favorite_owner(),
            Some(favorite::Owner::Tenant(id)),
        );
        assert!(matches!(
            landlord().favorite_owner(),
            Some(favorite::Owner::Landlord(_)),
        ));
    }
}
