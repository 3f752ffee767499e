//! Command and event envelopes exchanged with a presentation layer

use crate::error::MarketError;
use crate::negotiation::{Decision, Message, NegotiationAction, NegotiationEngine};
use crate::types::{MessageId, ParticipantId, ThreadId};
use serde::{Deserialize, Serialize};

/// Requests sent by a client
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatCommand {
    /// Send a chat message.
    SendText { author: ParticipantId, text: String },
    /// Propose a price.
    SendOffer { author: ParticipantId, amount: f64 },
    /// Accept or reject a pending offer.
    Respond {
        responder: ParticipantId,
        message_id: String,
        decision: Decision,
    },
    /// Fetch the whole thread.
    List,
}

/// Notifications sent back to the client
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    MessageAppended { message: Message },
    OfferUpdated { message: Message },
    /// A price was agreed; the client should tell the user.
    OfferAccepted {
        message_id: MessageId,
        amount: f64,
        notice: String,
    },
    Thread { messages: Vec<Message> },
    Error { kind: ErrorKind, message: String },
}

/// Error classification carried in `ChatEvent::Error`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    InvalidTransition,
    Forbidden,
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidTransition => "invalid_transition",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Internal => "internal",
        };
        write!(f, "{}", name)
    }
}

impl From<&MarketError> for ChatEvent {
    fn from(err: &MarketError) -> Self {
        ChatEvent::Error {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<NegotiationAction> for Vec<ChatEvent> {
    fn from(action: NegotiationAction) -> Self {
        match action {
            NegotiationAction::OfferAccepted { message, notice } => {
                let amount = message.offer().map(|o| o.amount).unwrap_or_default();
                let message_id = message.id;
                vec![
                    ChatEvent::OfferUpdated { message },
                    ChatEvent::OfferAccepted {
                        message_id,
                        amount,
                        notice,
                    },
                ]
            }
            NegotiationAction::OfferRejected { message } => {
                vec![ChatEvent::OfferUpdated { message }]
            }
        }
    }
}

impl ChatCommand {
    /// Execute against a thread; domain failures come back as `Error` events
    pub fn apply(&self, engine: &mut NegotiationEngine, thread_id: &ThreadId) -> Vec<ChatEvent> {
        match self.execute(engine, thread_id) {
            Ok(events) => events,
            Err(e) => vec![ChatEvent::from(&e)],
        }
    }

    fn execute(
        &self,
        engine: &mut NegotiationEngine,
        thread_id: &ThreadId,
    ) -> crate::error::Result<Vec<ChatEvent>> {
        match self {
            ChatCommand::SendText { author, text } => {
                let session = engine.session_for(thread_id, author)?;
                let message = engine.send_text(thread_id, &session, text)?;
                Ok(vec![ChatEvent::MessageAppended { message }])
            }
            ChatCommand::SendOffer { author, amount } => {
                let session = engine.session_for(thread_id, author)?;
                let message = engine.send_offer(thread_id, &session, *amount)?;
                Ok(vec![ChatEvent::MessageAppended { message }])
            }
            ChatCommand::Respond {
                responder,
                message_id,
                decision,
            } => {
                let session = engine.session_for(thread_id, responder)?;
                let action = engine.respond_to_offer(thread_id, &session, message_id, *decision)?;
                Ok(action.into())
            }
            ChatCommand::List => Ok(vec![ChatEvent::Thread {
                messages: engine.list(thread_id)?,
            }]),
        }
    }
}
