// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use washnet_audit::Actor;
use washnet_domain::EntryMode;

use crate::error::AuthError;

/// Actor roles for authorization.
///
/// Roles determine what actions an authenticated actor may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Admin role: network administrators with structural and billing
    /// authority.
    ///
    /// Admins may perform:
    /// - partner company onboarding, ladder changes, and deactivation
    /// - price catalog and location administration
    /// - invoice preparation, issuance, payment, and cancellation
    /// - any wash-event action an operator may perform
    Admin,
    /// Operator role: location staff recording and driving washes.
    ///
    /// Operators may:
    /// - record manual wash events
    /// - authorize, start, complete, and reject washes
    ///
    /// Operators never touch billing; invoices are Admin territory.
    Operator,
    /// Driver role: the self-service QR flow.
    ///
    /// Drivers may create and start their own wash events by scanning a
    /// location QR code. Everything else requires an operator.
    Driver,
}

/// An authenticated actor with an associated role.
///
/// This represents a caller who has been authenticated by the embedding
/// transport and has permission to perform certain actions based on role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The role assigned to this actor.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `role` - The role assigned to this actor
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self { id, role }
    }

    /// Converts this authenticated actor into an audit Actor.
    ///
    /// This is used when recording audit events to attribute actions
    /// to the authenticated caller.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        let actor_type: String = match self.role {
            Role::Admin => String::from("admin"),
            Role::Operator => String::from("operator"),
            Role::Driver => String::from("driver"),
        };
        Actor::new(self.id.clone(), actor_type)
    }
}

/// Authorization service for enforcing role-based access control.
///
/// This service determines whether an authenticated actor has permission
/// to perform a specific action based on their role.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks if an actor may record a new wash event.
    ///
    /// Manual entries require an Operator (or Admin); QR entries may also
    /// be created by the driver themselves.
    ///
    /// # Arguments
    ///
    /// * `actor` - The authenticated actor
    /// * `entry_mode` - How the wash event enters the system
    ///
    /// # Errors
    ///
    /// Returns an error if the actor's role does not permit the entry mode.
    pub fn authorize_create_wash(
        actor: &AuthenticatedActor,
        entry_mode: EntryMode,
    ) -> Result<(), AuthError> {
        match (actor.role, entry_mode) {
            (Role::Admin | Role::Operator, _) | (Role::Driver, EntryMode::DriverQr) => Ok(()),
            (Role::Driver, EntryMode::ManualOperator) => Err(AuthError::Unauthorized {
                action: String::from("create_wash_event"),
                required_role: String::from("Operator"),
            }),
        }
    }

    /// Checks if an actor may authorize a created wash.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is a driver.
    pub fn authorize_authorize_wash(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_operator(actor, "authorize_wash")
    }

    /// Checks if an actor may start a wash.
    ///
    /// Drivers may start only QR washes (the self-authorizing flow);
    /// manual washes are started by operators.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor's role does not permit the entry mode.
    pub fn authorize_start_wash(
        actor: &AuthenticatedActor,
        entry_mode: EntryMode,
    ) -> Result<(), AuthError> {
        match (actor.role, entry_mode) {
            (Role::Admin | Role::Operator, _) | (Role::Driver, EntryMode::DriverQr) => Ok(()),
            (Role::Driver, EntryMode::ManualOperator) => Err(AuthError::Unauthorized {
                action: String::from("start_wash"),
                required_role: String::from("Operator"),
            }),
        }
    }

    /// Checks if an actor may complete a wash.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is a driver.
    pub fn authorize_complete_wash(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_operator(actor, "complete_wash")
    }

    /// Checks if an actor may reject a wash.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is a driver.
    pub fn authorize_reject_wash(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_operator(actor, "reject_wash")
    }

    /// Checks if an actor may administer partner companies.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an Admin.
    pub fn authorize_manage_partners(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "manage_partners")
    }

    /// Checks if an actor may administer the price catalog and locations.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an Admin.
    pub fn authorize_manage_catalog(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "manage_catalog")
    }

    /// Checks if an actor may run billing operations (preparation,
    /// issuance, payment, cancellation, the overdue sweep).
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an Admin.
    pub fn authorize_billing(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "billing")
    }

    /// Checks if an actor may read audit timelines.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is a driver.
    pub fn authorize_view_audit(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_operator(actor, "view_audit")
    }

    fn require_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Operator | Role::Driver => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Admin"),
            }),
        }
    }

    fn require_operator(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin | Role::Operator => Ok(()),
            Role::Driver => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Operator"),
            }),
        }
    }
}

/// Stub authentication function.
///
/// Real authentication (sessions, tokens, an identity provider) is an
/// external collaborator; this placeholder only binds an identifier to a
/// role so the boundary layer can be exercised end to end.
///
/// # Arguments
///
/// * `actor_id` - The identifier of the actor to authenticate
/// * `role` - The role to assign to the actor
///
/// # Returns
///
/// An authenticated actor if successful.
///
/// # Errors
///
/// Returns an error if authentication fails.
pub fn authenticate_stub(actor_id: String, role: Role) -> Result<AuthenticatedActor, AuthError> {
    if actor_id.is_empty() {
        return Err(AuthError::AuthenticationFailed {
            reason: String::from("Actor ID cannot be empty"),
        });
    }
    Ok(AuthenticatedActor::new(actor_id, role))
}
