//! Access to the external identity service, which owns users and organizations.
//!
//! Lookups here never fail. An unreachable or misbehaving identity service degrades to "no
//! data", so callers can always render a record even when the owner details are missing.

pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use client::IdentityClient;

/// An organization as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalOrganization {
    #[serde(alias = "id")]
    pub organization_id: Option<String>,
    pub organization_code: Option<String>,
    pub organization_name: Option<String>,
    pub legal_representative: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
}

/// A user as reported by the identity service.
///
/// `ExternalUser::default()` is the placeholder used when no matching user could be found.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalUser {
    pub id: Option<String>,
    pub user_code: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub roles: Vec<String>,
    pub status: Option<String>,
    pub organization: Option<ExternalOrganization>,
}

impl ExternalUser {
    /// True for the placeholder user, which carries no identity.
    pub fn is_placeholder(&self) -> bool {
        self.id.is_none()
    }

    pub fn has_id(&self, user_id: &str) -> bool {
        self.id.as_deref() == Some(user_id)
    }
}

/// Read-only directory of organization admins and users.
///
/// Implementations must swallow upstream failures and return empty results instead.
#[async_trait]
pub trait AdminDirectory: Send + Sync {
    /// Admin users of an organization, possibly empty
    async fn organization_admins(&self, organization_id: &str) -> Vec<ExternalUser>;

    /// A single user by id
    async fn user_by_id(&self, user_id: &str) -> Option<ExternalUser>;

    /// The organization embedded in the first admin returned for it.
    ///
    /// The identity service has no organization lookup of its own.
    async fn organization(&self, organization_id: &str) -> Option<ExternalOrganization> {
        self.organization_admins(organization_id)
            .await
            .into_iter()
            .next()
            .and_then(|admin| admin.organization)
    }
}
