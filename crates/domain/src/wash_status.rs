// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Wash-event status tracking and transition logic.
//!
//! This module defines the wash-event lifecycle states and valid
//! transitions. Once a wash event reaches a settled state it is immutable;
//! the single system-initiated exception is locking a completed wash when
//! it is included in an issued invoice.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Wash-event lifecycle states.
///
/// Status is tracked per wash event and mutated only through the state
/// machine; operator and driver actions never write status directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WashStatus {
    /// Event recorded, awaiting authorization or start.
    Created,
    /// Operator approved the wash; it may now start.
    Authorized,
    /// The wash is physically underway.
    InProgress,
    /// The wash finished; the price has been computed.
    Completed,
    /// The wash was refused before it started.
    Rejected,
    /// The completed wash is included in an issued invoice.
    Locked,
}

impl WashStatus {
    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Authorized => "authorized",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Locked => "locked",
        }
    }

    /// Parses a status from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidWashStatus` if the string is not a valid status.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "created" => Ok(Self::Created),
            "authorized" => Ok(Self::Authorized),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "rejected" => Ok(Self::Rejected),
            "locked" => Ok(Self::Locked),
            _ => Err(DomainError::InvalidWashStatus {
                status: s.to_string(),
            }),
        }
    }

    /// Returns true if this status is terminal for operator and driver actions.
    ///
    /// Terminal events are immutable: no verb may move them to another
    /// state, and no field other than invoice linkage may change.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected | Self::Locked)
    }

    /// Returns true if a wash in this status counts toward billing.
    #[must_use]
    pub const fn is_billable(&self) -> bool {
        matches!(self, Self::Completed | Self::Locked)
    }

    /// Validates if a transition from this status to another is permitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is not allowed.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        // Locking is the sole transition out of a terminal state: a completed
        // wash becomes locked when an invoice referencing it is issued.
        if *self == Self::Completed && new_status == Self::Locked {
            return Ok(());
        }

        // No other transition may leave a terminal state
        if self.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "cannot transition from terminal state".to_string(),
            });
        }

        // Valid transitions based on current state
        let valid = match self {
            Self::Created => matches!(
                new_status,
                Self::Authorized | Self::InProgress | Self::Rejected
            ),
            Self::Authorized => matches!(new_status, Self::InProgress | Self::Rejected),
            Self::InProgress => matches!(new_status, Self::Completed),
            Self::Completed | Self::Rejected | Self::Locked => false,
        };

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "transition not permitted by wash lifecycle rules".to_string(),
            })
        }
    }
}

impl FromStr for WashStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for WashStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
