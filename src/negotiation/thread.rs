//! Negotiation thread: the message log between one buyer and one seller

use crate::error::{MarketError, Result};
use crate::types::{format_amount, MessageId, Participant, ParticipantId, ProductListing, ThreadId};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::clock::{Clock, SystemClock};
use super::types::{Decision, Message, MessageKind, Offer, OfferStatus, Role};

/// Per-thread limits and presentation settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreadSettings {
    pub currency_symbol: String,
    pub max_message_chars: usize,
}

impl Default for ThreadSettings {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
            max_message_chars: 1000,
        }
    }
}

/// Ordered conversation about a single product, with embedded price offers
#[derive(Clone, Debug)]
pub struct NegotiationThread {
    id: ThreadId,
    buyer: Participant,
    seller: Participant,
    product: ProductListing,
    messages: Vec<Message>,
    next_id: u64,
    settings: ThreadSettings,
    clock: Arc<dyn Clock>,
}

impl NegotiationThread {
    /// Create an empty thread using wall-clock time
    pub fn new(buyer: Participant, seller: Participant, product: ProductListing) -> Result<Self> {
        Self::with_clock(buyer, seller, product, Arc::new(SystemClock))
    }

    /// Create an empty thread with an explicit time source
    pub fn with_clock(
        buyer: Participant,
        seller: Participant,
        product: ProductListing,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        if buyer.id == seller.id {
            return Err(MarketError::Validation(format!(
                "buyer and seller must differ (both are {})",
                buyer.id
            )));
        }

        Ok(Self {
            id: ThreadId::derive(&buyer.id, &seller.id, &product.id),
            buyer,
            seller,
            product,
            messages: Vec::new(),
            next_id: 1,
            settings: ThreadSettings::default(),
            clock,
        })
    }

    pub fn with_settings(mut self, settings: ThreadSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn id(&self) -> &ThreadId {
        &self.id
    }

    pub fn buyer(&self) -> &Participant {
        &self.buyer
    }

    pub fn seller(&self) -> &Participant {
        &self.seller
    }

    pub fn product(&self) -> &ProductListing {
        &self.product
    }

    pub fn settings(&self) -> &ThreadSettings {
        &self.settings
    }

    /// Which side `participant` is on, if any
    pub fn role_of(&self, participant: &ParticipantId) -> Option<Role> {
        if *participant == self.buyer.id {
            Some(Role::Buyer)
        } else if *participant == self.seller.id {
            Some(Role::Seller)
        } else {
            None
        }
    }

    pub fn participant(&self, role: Role) -> &Participant {
        match role {
            Role::Buyer => &self.buyer,
            Role::Seller => &self.seller,
        }
    }

    /// The other side of the conversation from `participant`
    pub fn counterparty_of(&self, participant: &ParticipantId) -> Option<&Participant> {
        self.role_of(participant).map(|role| match role {
            Role::Buyer => &self.seller,
            Role::Seller => &self.buyer,
        })
    }

    /// Append a plain text message
    pub fn send_text(&mut self, author: &ParticipantId, text: &str) -> Result<Message> {
        self.ensure_participant(author)?;

        let text = text.trim();
        if text.is_empty() {
            return Err(MarketError::Validation(
                "message text must not be empty".to_string(),
            ));
        }
        let length = text.chars().count();
        if length > self.settings.max_message_chars {
            return Err(MarketError::Validation(format!(
                "message is {} characters, limit is {}",
                length, self.settings.max_message_chars
            )));
        }

        Ok(self.append(author, text.to_string(), MessageKind::Text))
    }

    /// Append a pending price offer
    pub fn send_offer(&mut self, author: &ParticipantId, amount: f64) -> Result<Message> {
        self.ensure_participant(author)?;

        if !amount.is_finite() || amount <= 0.0 {
            return Err(MarketError::Validation(format!(
                "offer amount must be a positive number, got {}",
                amount
            )));
        }

        let text = format!(
            "I'd like to offer {} for this item.",
            format_amount(&self.settings.currency_symbol, amount)
        );
        let kind = MessageKind::Offer(Offer {
            amount,
            status: OfferStatus::Pending,
        });

        Ok(self.append(author, text, kind))
    }

    /// Accept or reject a pending offer made by the other participant
    pub fn respond_to_offer(
        &mut self,
        responder: &ParticipantId,
        message_id: MessageId,
        decision: Decision,
    ) -> Result<Message> {
        self.ensure_participant(responder)?;

        let message = self
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| MarketError::NotFound(message_id.to_string()))?;

        let offer = match &mut message.kind {
            MessageKind::Offer(offer) => offer,
            MessageKind::Text => {
                return Err(MarketError::NotFound(format!(
                    "{} is not an offer",
                    message_id
                )))
            }
        };

        if offer.status.is_terminal() {
            return Err(MarketError::InvalidTransition(format!(
                "offer {} is already {}",
                message_id, offer.status
            )));
        }

        if message.sender_id == *responder {
            return Err(MarketError::Forbidden(format!(
                "{} cannot respond to their own offer {}",
                responder, message_id
            )));
        }

        offer.status = decision.outcome();
        Ok(message.clone())
    }

    /// The full thread in creation order
    pub fn list(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, message_id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == message_id)
    }

    /// Offers still waiting for a response, oldest first
    pub fn pending_offers(&self) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(|m| m.offer_status() == Some(OfferStatus::Pending))
    }

    pub fn latest_offer(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_offer())
    }

    /// Most recently accepted offer, if the parties have agreed on a price
    pub fn accepted_offer(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.offer_status() == Some(OfferStatus::Accepted))
    }

    fn ensure_participant(&self, who: &ParticipantId) -> Result<()> {
        if self.role_of(who).is_none() {
            return Err(MarketError::Forbidden(format!(
                "{} is not a participant in thread {}",
                who, self.id
            )));
        }
        Ok(())
    }

    fn append(&mut self, author: &ParticipantId, text: String, kind: MessageKind) -> Message {
        let message = Message {
            id: MessageId(self.next_id),
            sender_id: author.clone(),
            text,
            timestamp: self.next_timestamp(),
            kind,
        };
        self.next_id += 1;
        self.messages.push(message.clone());
        message
    }

    // Never earlier than the previous message, so the log stays sorted
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = self.clock.now();
        match self.messages.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::negotiation::clock::ManualClock;
    use chrono::Duration;

    fn thread_with_clock() -> (NegotiationThread, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let thread = NegotiationThread::with_clock(
            Participant::new("buyer", "Alex Johnson"),
            Participant::new("seller", "John Doe"),
            ProductListing::new("product-1", "Scientific Calculator TI-84", 45.0),
            clock.clone(),
        )
        .unwrap();
        (thread, clock)
    }

    fn a() -> ParticipantId {
        ParticipantId::new("buyer")
    }

    fn b() -> ParticipantId {
        ParticipantId::new("seller")
    }

    #[test]
    fn test_thread_creation() {
        let (thread, _) = thread_with_clock();
        assert!(thread.is_empty());
        assert_eq!(thread.role_of(&a()), Some(Role::Buyer));
        assert_eq!(thread.role_of(&b()), Some(Role::Seller));
        assert_eq!(thread.counterparty_of(&a()).unwrap().id, b());
        assert_eq!(thread.role_of(&ParticipantId::new("stranger")), None);
    }

    #[test]
    fn test_same_buyer_and_seller_rejected() {
        let result = NegotiationThread::new(
            Participant::new("same", "Sam"),
            Participant::new("same", "Sam"),
            ProductListing::new("p", "Lamp", 10.0),
        );
        assert!(matches!(result, Err(MarketError::Validation(_))));
    }

    #[test]
    fn test_send_text() {
        let (mut thread, _) = thread_with_clock();

        let message = thread.send_text(&a(), "  Is this still available?  ").unwrap();

        assert_eq!(message.id, MessageId(1));
        assert_eq!(message.sender_id, a());
        assert_eq!(message.text, "Is this still available?");
        assert_eq!(message.kind, MessageKind::Text);
        assert_eq!(thread.list(), &[message]);
    }

    #[test]
    fn test_blank_text_rejected() {
        let (mut thread, _) = thread_with_clock();

        assert!(matches!(
            thread.send_text(&a(), ""),
            Err(MarketError::Validation(_))
        ));
        assert!(matches!(
            thread.send_text(&a(), "   \n\t"),
            Err(MarketError::Validation(_))
        ));
        assert!(thread.is_empty());
    }

    #[test]
    fn test_overlong_text_rejected() {
        let (thread, _) = thread_with_clock();
        let mut thread = thread.with_settings(ThreadSettings {
            currency_symbol: "₹".to_string(),
            max_message_chars: 5,
        });

        assert!(thread.send_text(&a(), "hello").is_ok());
        assert!(matches!(
            thread.send_text(&a(), "hello!"),
            Err(MarketError::Validation(_))
        ));
        assert_eq!(thread.len(), 1);
    }

    #[test]
    fn test_outsider_cannot_post() {
        let (mut thread, _) = thread_with_clock();
        let outsider = ParticipantId::new("stranger");

        assert!(matches!(
            thread.send_text(&outsider, "hi"),
            Err(MarketError::Forbidden(_))
        ));
        assert!(matches!(
            thread.send_offer(&outsider, 10.0),
            Err(MarketError::Forbidden(_))
        ));
        assert!(thread.is_empty());
    }

    #[test]
    fn test_send_offer_validation() {
        let (mut thread, _) = thread_with_clock();

        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                thread.send_offer(&a(), bad),
                Err(MarketError::Validation(_))
            ));
        }
        assert!(thread.is_empty());

        let message = thread.send_offer(&a(), 40.0).unwrap();
        assert_eq!(message.offer_status(), Some(OfferStatus::Pending));
        assert_eq!(message.offer().unwrap().amount, 40.0);
        assert_eq!(message.text, "I'd like to offer ₹40 for this item.");
    }

    #[test]
    fn test_tiny_offer_text_is_not_rounded_to_zero() {
        let (mut thread, _) = thread_with_clock();

        let message = thread.send_offer(&a(), 0.001).unwrap();
        assert_eq!(message.offer().unwrap().amount, 0.001);
        assert_eq!(message.text, "I'd like to offer ₹0.001 for this item.");
    }

    #[test]
    fn test_accept_then_second_response_fails() {
        let (mut thread, _) = thread_with_clock();
        let m1 = thread.send_offer(&a(), 40.0).unwrap();

        let accepted = thread
            .respond_to_offer(&b(), m1.id, Decision::Accept)
            .unwrap();
        assert_eq!(accepted.offer_status(), Some(OfferStatus::Accepted));
        assert_eq!(accepted.text, m1.text);
        assert_eq!(accepted.timestamp, m1.timestamp);

        // Creator acting on a terminal offer
        assert!(matches!(
            thread.respond_to_offer(&a(), m1.id, Decision::Reject),
            Err(MarketError::InvalidTransition(_))
        ));
        // Counterparty trying again
        assert!(matches!(
            thread.respond_to_offer(&b(), m1.id, Decision::Reject),
            Err(MarketError::InvalidTransition(_))
        ));
        assert_eq!(
            thread.get(m1.id).unwrap().offer_status(),
            Some(OfferStatus::Accepted)
        );
    }

    #[test]
    fn test_reject_is_terminal() {
        let (mut thread, _) = thread_with_clock();
        let m1 = thread.send_offer(&b(), 50.0).unwrap();

        let rejected = thread
            .respond_to_offer(&a(), m1.id, Decision::Reject)
            .unwrap();
        assert_eq!(rejected.offer_status(), Some(OfferStatus::Rejected));

        assert!(matches!(
            thread.respond_to_offer(&a(), m1.id, Decision::Accept),
            Err(MarketError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_cannot_respond_to_own_offer() {
        let (mut thread, _) = thread_with_clock();
        let m1 = thread.send_offer(&a(), 40.0).unwrap();

        for decision in [Decision::Accept, Decision::Reject] {
            assert!(matches!(
                thread.respond_to_offer(&a(), m1.id, decision),
                Err(MarketError::Forbidden(_))
            ));
        }
        assert_eq!(
            thread.get(m1.id).unwrap().offer_status(),
            Some(OfferStatus::Pending)
        );
    }

    #[test]
    fn test_respond_to_unknown_or_text_message() {
        let (mut thread, _) = thread_with_clock();
        let text = thread.send_text(&a(), "hello").unwrap();

        assert!(matches!(
            thread.respond_to_offer(&b(), MessageId(99), Decision::Accept),
            Err(MarketError::NotFound(_))
        ));
        assert!(matches!(
            thread.respond_to_offer(&b(), text.id, Decision::Accept),
            Err(MarketError::NotFound(_))
        ));
    }

    #[test]
    fn test_multiple_pending_offers() {
        let (mut thread, _) = thread_with_clock();
        let first = thread.send_offer(&a(), 35.0).unwrap();
        let second = thread.send_offer(&b(), 42.0).unwrap();
        let third = thread.send_offer(&a(), 40.0).unwrap();

        assert_eq!(thread.pending_offers().count(), 3);
        assert_eq!(thread.latest_offer().unwrap().id, third.id);

        thread
            .respond_to_offer(&a(), second.id, Decision::Reject)
            .unwrap();
        thread
            .respond_to_offer(&b(), third.id, Decision::Accept)
            .unwrap();

        let pending: Vec<_> = thread.pending_offers().map(|m| m.id).collect();
        assert_eq!(pending, vec![first.id]);
        assert_eq!(thread.accepted_offer().unwrap().id, third.id);
    }

    #[test]
    fn test_order_follows_calls_even_if_clock_steps_back() {
        let (mut thread, clock) = thread_with_clock();

        thread.send_text(&a(), "one").unwrap();
        clock.advance(Duration::seconds(10));
        thread.send_offer(&b(), 40.0).unwrap();
        clock.advance(Duration::seconds(-60));
        thread.send_text(&a(), "three").unwrap();
        thread.send_text(&b(), "four").unwrap();

        let list = thread.list();
        let ids: Vec<u64> = list.iter().map(|m| m.id.sequence()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert!(list.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_list_is_restartable() {
        let (mut thread, _) = thread_with_clock();
        thread.send_text(&a(), "hi").unwrap();
        thread.send_offer(&a(), 30.0).unwrap();

        let first = thread.list().to_vec();
        let second = thread.list().to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn test_failed_operations_leave_thread_unchanged() {
        let (mut thread, _) = thread_with_clock();
        let m1 = thread.send_offer(&a(), 40.0).unwrap();
        let before = thread.list().to_vec();

        let _ = thread.send_text(&a(), " ");
        let _ = thread.send_offer(&b(), -1.0);
        let _ = thread.respond_to_offer(&a(), m1.id, Decision::Accept);
        let _ = thread.respond_to_offer(&b(), MessageId(42), Decision::Accept);

        assert_eq!(thread.list(), before.as_slice());

        // Ids keep counting from where the successful appends left off
        let next = thread.send_text(&b(), "ok").unwrap();
        assert_eq!(next.id, MessageId(2));
    }
}
