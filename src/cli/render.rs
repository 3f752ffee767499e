//! Text rendering of thread events for the terminal

use crate::negotiation::{Message, MessageKind, NegotiationThread, OfferStatus};
use crate::protocol::ChatEvent;
use crate::types::format_amount;

/// One line per message: `[HH:MM] msg-3 Name: text`
pub fn render_message(thread: &NegotiationThread, message: &Message) -> String {
    let sender = thread
        .role_of(&message.sender_id)
        .map(|role| thread.participant(role).name.as_str())
        .unwrap_or(message.sender_id.0.as_str());
    let time = message.timestamp.format("%H:%M");

    match &message.kind {
        MessageKind::Text => format!("[{}] {} {}: {}", time, message.id, sender, message.text),
        MessageKind::Offer(offer) => {
            let badge = match offer.status {
                OfferStatus::Pending => "PENDING",
                OfferStatus::Accepted => "ACCEPTED",
                OfferStatus::Rejected => "DECLINED",
            };
            format!(
                "[{}] {} {}: Price Offer {} [{}] {}",
                time,
                message.id,
                sender,
                format_amount(&thread.settings().currency_symbol, offer.amount),
                badge,
                message.text
            )
        }
    }
}

/// Header shown when a chat starts
pub fn render_header(thread: &NegotiationThread) -> String {
    let product = thread.product();
    format!(
        "{} <-> {} | {} ({})",
        thread.buyer().name,
        thread.seller().name,
        product.title,
        format_amount(&thread.settings().currency_symbol, product.price)
    )
}

pub fn render_event(thread: &NegotiationThread, event: &ChatEvent) -> String {
    match event {
        ChatEvent::MessageAppended { message } | ChatEvent::OfferUpdated { message } => {
            render_message(thread, message)
        }
        ChatEvent::OfferAccepted {
            message_id,
            amount,
            notice,
        } => format!(
            "*** {} accepted at {}. {}",
            message_id,
            format_amount(&thread.settings().currency_symbol, *amount),
            notice
        ),
        ChatEvent::Thread { messages } => {
            if messages.is_empty() {
                return "(no messages yet)".to_string();
            }
            messages
                .iter()
                .map(|m| render_message(thread, m))
                .collect::<Vec<_>>()
                .join("\n")
        }
        ChatEvent::Error { kind, message } => format!("error ({}): {}", kind, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ErrorKind;
    use crate::types::{Participant, ParticipantId, ProductListing};

    fn thread() -> NegotiationThread {
        NegotiationThread::new(
            Participant::new("a", "Alex Johnson"),
            Participant::new("b", "John Doe"),
            ProductListing::new("product-1", "Scientific Calculator TI-84", 45.0),
        )
        .unwrap()
    }

    #[test]
    fn test_render_offer_uses_names_and_badges() {
        let mut thread = thread();
        let offer = thread.send_offer(&ParticipantId::new("a"), 40.0).unwrap();

        let line = render_message(&thread, &offer);
        assert!(line.contains("msg-1 Alex Johnson: Price Offer ₹40 [PENDING]"));
    }

    #[test]
    fn test_render_header() {
        assert_eq!(
            render_header(&thread()),
            "Alex Johnson <-> John Doe | Scientific Calculator TI-84 (₹45)"
        );
    }

    #[test]
    fn test_render_error_and_empty_thread() {
        let thread = thread();
        let line = render_event(
            &thread,
            &ChatEvent::Error {
                kind: ErrorKind::NotFound,
                message: "Message not found: msg-9".to_string(),
            },
        );
        assert_eq!(line, "error (not_found): Message not found: msg-9");

        let empty = render_event(&thread, &ChatEvent::Thread { messages: vec![] });
        assert_eq!(empty, "(no messages yet)");
    }
}
