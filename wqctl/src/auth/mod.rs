//! Caller identification.
//!
//! Authentication happens upstream (an API gateway or auth proxy). By the time a request
//! reaches this service the caller's organization is carried in a trusted header, named by
//! `auth.organization_header` in the config (`x-organization-id` by default). Every record
//! operation is scoped to that organization.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{instrument, trace};

use crate::AppState;
use crate::errors::{Error, Result};
use crate::types::OrganizationId;

/// The organization on whose behalf a request is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationContext {
    pub organization_id: OrganizationId,
}

impl OrganizationContext {
    fn from_parts(parts: &Parts, header_name: &str) -> Result<Self> {
        let organization_id = parts
            .headers
            .get(header_name)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| Error::Unauthenticated {
                message: Some(format!("Missing {header_name} header")),
            })?;

        Ok(Self {
            organization_id: organization_id.to_string(),
        })
    }
}

impl FromRequestParts<AppState> for OrganizationContext {
    type Rejection = Error;

    #[instrument(skip_all)]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let context = Self::from_parts(parts, &state.config.auth.organization_header)?;
        trace!(organization_id = %context.organization_id, "Resolved organization context");
        Ok(context)
    }
}
