//! CLI command definitions

use crate::negotiation::Role;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "loop-market")]
#[command(about = "Loop - buyer/seller negotiation threads for a student marketplace", long_about = None)]
pub struct Cli {
    /// Settings file (defaults to ./loop-market.* when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open a thread and drive it from stdin
    Chat {
        /// Buyer participant id
        #[arg(long, default_value = "buyer")]
        buyer: String,

        /// Buyer display name
        #[arg(long, default_value = "Alex Johnson")]
        buyer_name: String,

        /// Seller participant id
        #[arg(long, default_value = "seller")]
        seller: String,

        /// Seller display name
        #[arg(long, default_value = "John Doe")]
        seller_name: String,

        /// Product id
        #[arg(short, long, default_value = "product-1")]
        product: String,

        /// Product title
        #[arg(short, long, default_value = "Scientific Calculator TI-84")]
        title: String,

        /// Listed price
        #[arg(long, default_value = "45")]
        price: f64,

        /// Side to act as initially (buyer or seller)
        #[arg(long = "as", default_value = "seller")]
        acting: Role,

        /// Preload the sample conversation
        #[arg(long)]
        seed: bool,

        /// Emit one JSON event per line instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run a scripted negotiation and print each step
    Demo,
}
