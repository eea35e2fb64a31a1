//! [`Scope`] definitions.

use std::num::NonZeroUsize;

use crate::domain::{
    landlord,
    principal::{Denial, Operation},
    Principal, Property,
};

use super::{
    list::{BROWSE_PAGE_SIZE, CATALOG_PAGE_SIZE},
    Condition,
};
#[cfg(doc)]
use super::{Filter, Predicate};

/// Base visibility of listed [`Property`]s, applied before any [`Filter`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Scope {
    /// Available [`Property`]s of any landlord.
    Public,

    /// [`Property`]s of the [`landlord::Id`], available or not.
    Owner(landlord::Id),
}

impl Scope {
    /// Returns the [`Condition`] opening a [`Predicate`] of this [`Scope`].
    #[must_use]
    pub const fn condition(self) -> Condition {
        match self {
            Self::Public => Condition::Available(true),
            Self::Owner(id) => Condition::OwnedBy(id),
        }
    }

    /// Checks whether the provided [`Principal`] may see the provided
    /// [`Property`] in detail.
    ///
    /// Everyone sees available [`Property`]s, while landlords also see their
    /// own unavailable ones.
    #[must_use]
    pub fn reveals(principal: &Principal, property: &Property) -> bool {
        property.available
            || principal.landlord_id() == Some(property.landlord_id)
    }
}

/// Place a [`Property`] list is requested from.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum View {
    /// Public catalog of available [`Property`]s.
    Catalog,

    /// Tenant or landlord dashboard browsing available [`Property`]s.
    Browse,

    /// Landlord's own [`Property`]s.
    Mine,
}

impl View {
    /// Returns the [`Operation`] of requesting this [`View`].
    #[must_use]
    pub const fn operation(self) -> Operation {
        match self {
            Self::Catalog => Operation::BrowseCatalog,
            Self::Browse => Operation::BrowseListings,
            Self::Mine => Operation::ListOwnProperties,
        }
    }

    /// Returns the number of [`Property`]s on a single page of this [`View`].
    #[must_use]
    pub const fn per_page(self) -> NonZeroUsize {
        match self {
            Self::Catalog => CATALOG_PAGE_SIZE,
            Self::Browse | Self::Mine => BROWSE_PAGE_SIZE,
        }
    }

    /// Authorizes the provided [`Principal`] for this [`View`] and resolves
    /// its [`Scope`].
    ///
    /// # Errors
    ///
    /// With a [`Denial`] if the [`Principal`] may not request this [`View`].
    pub fn scope(self, principal: &Principal) -> Result<Scope, Denial> {
        principal.authorize(self.operation())?;
        match self {
            Self::Catalog | Self::Browse => Ok(Scope::Public),
            Self::Mine => principal
                .landlord_id()
                .map(Scope::Owner)
                .ok_or(Denial::InsufficientRole),
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::{landlord, principal::Denial, tenant, user, Principal};

    use super::{Scope, View};

    #[test]
    fn landlord_browses_like_tenant() {
        let profile = landlord::Id::new();
        let landlord = Principal::Landlord {
            user_id: user::Id::new(),
            profile,
        };

        assert_eq!(View::Browse.scope(&landlord), Ok(Scope::Public));
        assert_eq!(View::Mine.scope(&landlord), Ok(Scope::Owner(profile)));
    }

    #[test]
    fn tenant_has_no_own_listings() {
        let tenant = Principal::Tenant {
            user_id: user::Id::new(),
            profile: Some(tenant::Id::new()),
        };

        assert_eq!(View::Browse.scope(&tenant), Ok(Scope::Public));
        assert_eq!(View::Mine.scope(&tenant), Err(Denial::InsufficientRole));
    }

    #[test]
    fn anonymous_sees_catalog_only() {
        let anon = Principal::Anonymous;

        assert_eq!(View::Catalog.scope(&anon), Ok(Scope::Public));
        assert_eq!(
            View::Browse.scope(&anon),
            Err(Denial::AuthenticationRequired),
        );
    }

    #[test]
    fn page_sizes() {
        assert_eq!(View::Catalog.per_page().get(), 10);
        assert_eq!(View::Browse.per_page().get(), 6);
        assert_eq!(View::Mine.per_page().get(), 6);
    }
}
