//! Scripted negotiation: offer, refusals and acceptance end to end
//!
//! Walks one thread through the whole offer lifecycle:
//! 1. Buyer and seller exchange messages about a listing
//! 2. Buyer makes an offer
//! 3. Buyer tries to accept their own offer (refused)
//! 4. Seller accepts
//! 5. Buyer tries to withdraw the accepted offer (refused, already terminal)
//! 6. Seller responds to an id that does not exist (refused)

use crate::config::Settings;
use crate::error::Result;
use crate::negotiation::{Decision, NegotiationAction, NegotiationEngine, Role};
use crate::session::Session;
use crate::types::{format_amount, ProductListing};

use super::render::{render_header, render_message};

/// Run the scripted demo, printing each step to stdout
pub fn run_demo(settings: &Settings) -> Result<()> {
    let mut engine = NegotiationEngine::with_settings(settings.thread_settings());
    let buyer = Session::new("alex", "Alex Johnson", Role::Buyer);
    let seller = Session::new("john", "John Doe", Role::Seller);
    let product = ProductListing::new("product-1", "Scientific Calculator TI-84", 45.0);

    let thread_id = engine.open_thread(
        buyer.participant.clone(),
        seller.participant.clone(),
        product,
    )?;
    tracing::debug!("Demo thread {}", thread_id);

    let print_thread = |engine: &NegotiationEngine| {
        if let Some(thread) = engine.get_thread(&thread_id) {
            for message in thread.list() {
                println!("   {}", render_message(thread, message));
            }
        }
    };

    println!("\n== Loop negotiation demo ==");
    if let Some(thread) = engine.get_thread(&thread_id) {
        println!("{}\n", render_header(thread));
    }

    println!("-- Step 1: chat");
    engine.send_text(&thread_id, &buyer, "Hi there! Is this calculator still available?")?;
    engine.send_text(&thread_id, &seller, "Yes, it's still available!")?;
    print_thread(&engine);

    println!("\n-- Step 2: buyer offers");
    let offer = engine.send_offer(&thread_id, &buyer, 40.0)?;
    print_thread(&engine);
    let offer_ref = offer.id.to_string();

    println!("\n-- Step 3: buyer tries to accept their own offer");
    match engine.respond_to_offer(&thread_id, &buyer, &offer_ref, Decision::Accept) {
        Ok(_) => println!("   unexpected: accepted"),
        Err(e) => println!("   refused: {}", e),
    }

    println!("\n-- Step 4: seller accepts");
    if let NegotiationAction::OfferAccepted { message, notice } =
        engine.respond_to_offer(&thread_id, &seller, &offer_ref, Decision::Accept)?
    {
        let amount = message.offer().map(|o| o.amount).unwrap_or_default();
        println!(
            "   {} accepted at {}. {}",
            message.id,
            format_amount(&settings.currency_symbol, amount),
            notice
        );
    }
    print_thread(&engine);

    println!("\n-- Step 5: buyer tries to withdraw the accepted offer");
    match engine.respond_to_offer(&thread_id, &buyer, &offer_ref, Decision::Reject) {
        Ok(_) => println!("   unexpected: rejected"),
        Err(e) => println!("   refused: {}", e),
    }

    println!("\n-- Step 6: seller responds to an unknown id");
    match engine.respond_to_offer(&thread_id, &seller, "nonexistent-id", Decision::Accept) {
        Ok(_) => println!("   unexpected: found"),
        Err(e) => println!("   refused: {}", e),
    }

    println!("\nDone.");
    Ok(())
}
