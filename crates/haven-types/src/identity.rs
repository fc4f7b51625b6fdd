//! Connection identity and counselor availability types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::channel::ParticipantId;

/// Participant role as carried on the wire and in access tokens.
///
/// Transcript entries keep the raw role string instead of this enum so
/// unrecognized roles can pass through the summarizer untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_COUNSELOR")]
    Counselor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "ROLE_USER"),
            Role::Counselor => write!(f, "ROLE_COUNSELOR"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROLE_USER" => Ok(Role::User),
            "ROLE_COUNSELOR" => Ok(Role::Counselor),
            other => Err(format!("invalid role: '{other}'")),
        }
    }
}

/// Identity extracted from a validated access token and attached to a
/// WebSocket connection for the lifetime of that connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject_id: ParticipantId,
    pub role: Role,
}

/// Counselor availability flag.
///
/// Two states, no transition validation: the coordinator is responsible
/// for flipping it at the right lifecycle points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    Available,
    Busy,
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvailabilityStatus::Available => write!(f, "available"),
            AvailabilityStatus::Busy => write!(f, "busy"),
        }
    }
}

impl FromStr for AvailabilityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "available" => Ok(AvailabilityStatus::Available),
            "busy" => Ok(AvailabilityStatus::Busy),
            other => Err(format!("invalid availability status: '{other}'")),
        }
    }
}
