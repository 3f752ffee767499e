//! Identity of the user acting on a thread

use crate::negotiation::Role;
use crate::types::{Participant, ParticipantId};
use serde::{Deserialize, Serialize};

/// The caller's identity, handed to every engine operation.
///
/// Nothing here is authenticated. The engine only checks that the claimed
/// role matches the participant's side of the thread.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub participant: Participant,
    pub role: Role,
}

impl Session {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            participant: Participant::new(id, name),
            role,
        }
    }

    pub fn id(&self) -> &ParticipantId {
        &self.participant.id
    }

    pub fn name(&self) -> &str {
        &self.participant.name
    }
}
