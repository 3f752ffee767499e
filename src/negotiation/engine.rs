//! Negotiation engine manages all open threads

use crate::error::{MarketError, Result};
use crate::session::Session;
use crate::types::{MessageId, Participant, ParticipantId, ProductListing, ThreadId};
use std::collections::HashMap;
use std::sync::Arc;

use super::clock::{Clock, SystemClock};
use super::thread::{NegotiationThread, ThreadSettings};
use super::types::{Decision, Message, OfferStatus};

/// Shown to the seller-side UI once a price is agreed
pub const OFFER_ACCEPTED_NOTICE: &str =
    "Offer accepted. Arrange a meeting to complete the transaction.";

/// Negotiation engine owns every thread, keyed by (buyer, seller, product)
#[derive(Debug)]
pub struct NegotiationEngine {
    threads: HashMap<ThreadId, NegotiationThread>,
    settings: ThreadSettings,
    clock: Arc<dyn Clock>,
}

impl NegotiationEngine {
    /// Create new negotiation engine
    pub fn new() -> Self {
        Self::with_clock(ThreadSettings::default(), Arc::new(SystemClock))
    }

    pub fn with_settings(settings: ThreadSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: ThreadSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            threads: HashMap::new(),
            settings,
            clock,
        }
    }

    /// Open the thread for this buyer, seller and product, or return the existing one
    pub fn open_thread(
        &mut self,
        buyer: Participant,
        seller: Participant,
        product: ProductListing,
    ) -> Result<ThreadId> {
        let thread_id = ThreadId::derive(&buyer.id, &seller.id, &product.id);
        if self.threads.contains_key(&thread_id) {
            tracing::debug!("Reusing thread {}", thread_id);
            return Ok(thread_id);
        }

        let thread = NegotiationThread::with_clock(buyer, seller, product, self.clock.clone())?
            .with_settings(self.settings.clone());

        tracing::info!(
            "Opened thread {} between {} and {} about {}",
            thread_id,
            thread.buyer().id,
            thread.seller().id,
            thread.product().title
        );
        self.threads.insert(thread_id.clone(), thread);

        Ok(thread_id)
    }

    /// Send a plain message as the session's user
    pub fn send_text(&mut self, thread_id: &ThreadId, session: &Session, text: &str) -> Result<Message> {
        let thread = self.thread_for_session(thread_id, session)?;
        let message = thread.send_text(session.id(), text).inspect_err(|e| {
            tracing::warn!("Rejected message from {} in {}: {}", session.id(), thread_id, e);
        })?;

        tracing::info!("{} sent {} in {}", session.id(), message.id, thread_id);
        Ok(message)
    }

    /// Send a price offer as the session's user
    pub fn send_offer(&mut self, thread_id: &ThreadId, session: &Session, amount: f64) -> Result<Message> {
        let thread = self.thread_for_session(thread_id, session)?;
        let message = thread.send_offer(session.id(), amount).inspect_err(|e| {
            tracing::warn!("Rejected offer from {} in {}: {}", session.id(), thread_id, e);
        })?;

        tracing::info!(
            "{} offered {} as {} in {}",
            session.id(),
            amount,
            message.id,
            thread_id
        );
        Ok(message)
    }

    /// Accept or reject an offer referenced by its textual id (`msg-<n>`)
    pub fn respond_to_offer(
        &mut self,
        thread_id: &ThreadId,
        session: &Session,
        message_ref: &str,
        decision: Decision,
    ) -> Result<NegotiationAction> {
        let thread = self.thread_for_session(thread_id, session)?;
        let message_id: MessageId = message_ref
            .parse()
            .map_err(|_| MarketError::NotFound(message_ref.to_string()))?;

        let message = thread
            .respond_to_offer(session.id(), message_id, decision)
            .inspect_err(|e| {
                tracing::warn!(
                    "Rejected response from {} to {} in {}: {}",
                    session.id(),
                    message_ref,
                    thread_id,
                    e
                );
            })?;

        tracing::info!(
            "{} {} offer {} in {}",
            session.id(),
            message.offer_status().unwrap_or(OfferStatus::Pending),
            message.id,
            thread_id
        );

        Ok(match decision {
            Decision::Accept => NegotiationAction::OfferAccepted {
                message,
                notice: OFFER_ACCEPTED_NOTICE.to_string(),
            },
            Decision::Reject => NegotiationAction::OfferRejected { message },
        })
    }

    /// All messages in a thread, in creation order
    pub fn list(&self, thread_id: &ThreadId) -> Result<Vec<Message>> {
        Ok(self.thread(thread_id)?.list().to_vec())
    }

    /// Get a thread
    pub fn get_thread(&self, thread_id: &ThreadId) -> Option<&NegotiationThread> {
        self.threads.get(thread_id)
    }

    /// Get all threads
    pub fn threads(&self) -> &HashMap<ThreadId, NegotiationThread> {
        &self.threads
    }

    /// Threads a participant takes part in, on either side
    pub fn threads_for<'a>(
        &'a self,
        participant: &'a ParticipantId,
    ) -> impl Iterator<Item = &'a NegotiationThread> + 'a {
        self.threads
            .values()
            .filter(move |t| t.role_of(participant).is_some())
    }

    /// Build the session for a participant of an existing thread
    pub fn session_for(&self, thread_id: &ThreadId, participant: &ParticipantId) -> Result<Session> {
        let thread = self.thread(thread_id)?;
        let role = thread.role_of(participant).ok_or_else(|| {
            MarketError::Forbidden(format!(
                "{} is not a participant in thread {}",
                participant, thread_id
            ))
        })?;

        Ok(Session {
            participant: thread.participant(role).clone(),
            role,
        })
    }

    fn thread(&self, thread_id: &ThreadId) -> Result<&NegotiationThread> {
        self.threads
            .get(thread_id)
            .ok_or_else(|| MarketError::ThreadNotFound(thread_id.0.clone()))
    }

    /// Thread lookup that also refuses outsiders and sessions whose role disagrees with the thread
    fn thread_for_session(
        &mut self,
        thread_id: &ThreadId,
        session: &Session,
    ) -> Result<&mut NegotiationThread> {
        let thread = self.thread_mut(thread_id)?;
        match thread.role_of(session.id()) {
            None => Err(MarketError::Forbidden(format!(
                "{} is not a participant in thread {}",
                session.id(),
                thread_id
            ))),
            Some(role) if role != session.role => {
                tracing::warn!(
                    "Session for {} claims {} but is the {} in {}",
                    session.id(),
                    session.role,
                    role,
                    thread_id
                );
                Err(MarketError::Forbidden(format!(
                    "{} is the {} in thread {}, not the {}",
                    session.id(),
                    role,
                    thread_id,
                    session.role
                )))
            }
            _ => Ok(thread),
        }
    }

    fn thread_mut(&mut self, thread_id: &ThreadId) -> Result<&mut NegotiationThread> {
        self.threads
            .get_mut(thread_id)
            .ok_or_else(|| MarketError::ThreadNotFound(thread_id.0.clone()))
    }
}

impl Default for NegotiationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of responding to an offer
#[derive(Clone, Debug, PartialEq)]
pub enum NegotiationAction {
    /// The presentation layer should surface `notice` to the user
    OfferAccepted { message: Message, notice: String },
    OfferRejected { message: Message },
}

impl NegotiationAction {
    pub fn message(&self) -> &Message {
        match self {
            NegotiationAction::OfferAccepted { message, .. } => message,
            NegotiationAction::OfferRejected { message } => message,
        }
    }
}
