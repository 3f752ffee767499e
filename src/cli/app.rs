//! Interactive chat application on top of the negotiation engine

use crate::config::Settings;
use crate::error::{MarketError, Result};
use crate::negotiation::{Decision, NegotiationEngine, Role};
use crate::protocol::{decode_line, encode_line, ChatCommand, ChatEvent};
use crate::session::Session;
use crate::types::{Participant, ParticipantId, ProductListing, ThreadId};
use futures::StreamExt;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio_util::codec::FramedRead;

use super::lines::InputLines;
use super::render::{render_event, render_header};

pub const HELP: &str = "\
commands:
  say <text>          send a message
  offer <amount>      propose a price
  accept <msg-id>     accept the other side's offer
  reject <msg-id>     decline the other side's offer
  list                show the whole thread
  as <buyer|seller>   switch who you are acting as
  help                show this help
  quit                leave
  {...}               any JSON command, e.g. {\"type\":\"list\"}";

/// How events are written out
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Result of handling one input line
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Events(Vec<ChatEvent>),
    Info(String),
    Quit,
}

enum Input {
    Command(ChatCommand),
    SwitchTo(Role),
    Help,
    Quit,
}

/// One open thread plus the identity currently typing into it
#[derive(Clone)]
pub struct MarketApp {
    engine: Arc<Mutex<NegotiationEngine>>,
    thread_id: ThreadId,
    acting: Arc<Mutex<Session>>,
    settings: Settings,
}

impl MarketApp {
    /// Open the thread for `buyer`, `seller` and `product`
    pub async fn new(
        settings: Settings,
        buyer: Participant,
        seller: Participant,
        product: ProductListing,
        acting: Role,
    ) -> Result<Self> {
        let mut engine = NegotiationEngine::with_settings(settings.thread_settings());
        let thread_id = engine.open_thread(buyer, seller, product)?;

        let participant = engine
            .get_thread(&thread_id)
            .map(|t| t.participant(acting).clone())
            .ok_or_else(|| MarketError::ThreadNotFound(thread_id.0.clone()))?;

        Ok(Self {
            engine: Arc::new(Mutex::new(engine)),
            thread_id,
            acting: Arc::new(Mutex::new(Session {
                participant,
                role: acting,
            })),
            settings,
        })
    }

    /// Get negotiation engine
    pub fn engine(&self) -> Arc<Mutex<NegotiationEngine>> {
        self.engine.clone()
    }

    pub fn thread_id(&self) -> &ThreadId {
        &self.thread_id
    }

    pub async fn acting_session(&self) -> Session {
        self.acting.lock().await.clone()
    }

    /// Act as the other side of the thread from now on
    pub async fn switch_to(&self, role: Role) -> Result<Session> {
        let participant = {
            let engine = self.engine.lock().await;
            engine
                .get_thread(&self.thread_id)
                .map(|t| t.participant(role).clone())
                .ok_or_else(|| MarketError::ThreadNotFound(self.thread_id.0.clone()))?
        };

        let session = Session { participant, role };
        *self.acting.lock().await = session.clone();
        tracing::info!("Now acting as {} ({})", session.name(), role);
        Ok(session)
    }

    /// Preload the sample conversation: four messages and a pending offer from the buyer
    pub async fn seed_sample_conversation(&self) -> Result<()> {
        let mut engine = self.engine.lock().await;
        let thread = engine
            .get_thread(&self.thread_id)
            .ok_or_else(|| MarketError::ThreadNotFound(self.thread_id.0.clone()))?;
        let buyer = Session {
            participant: thread.buyer().clone(),
            role: Role::Buyer,
        };
        let seller = Session {
            participant: thread.seller().clone(),
            role: Role::Seller,
        };

        let id = self.thread_id.clone();
        engine.send_text(&id, &buyer, "Hi there! Is this calculator still available?")?;
        engine.send_text(&id, &seller, "Yes, it's still available!")?;
        engine.send_text(&id, &buyer, "Great! Does it come with batteries?")?;
        engine.send_text(
            &id,
            &seller,
            "Yes, it does. It's in great condition and I've barely used it.",
        )?;
        engine.send_offer(&id, &buyer, 40.0)?;

        tracing::info!("Seeded sample conversation in {}", id);
        Ok(())
    }

    /// Handle one line of user input
    pub async fn handle_line(&self, line: &str) -> Reply {
        let author = self.acting.lock().await.id().clone();

        let input = match parse_input(line, author) {
            Ok(Some(input)) => input,
            Ok(None) => return Reply::Events(Vec::new()),
            Err(e) => return Reply::Events(vec![ChatEvent::from(&e)]),
        };

        match input {
            Input::Command(command) => {
                let mut engine = self.engine.lock().await;
                Reply::Events(command.apply(&mut engine, &self.thread_id))
            }
            Input::SwitchTo(role) => match self.switch_to(role).await {
                Ok(session) => Reply::Info(format!("acting as {} ({})", session.name(), role)),
                Err(e) => Reply::Events(vec![ChatEvent::from(&e)]),
            },
            Input::Help => Reply::Info(HELP.to_string()),
            Input::Quit => Reply::Quit,
        }
    }

    /// Read commands line by line until EOF or `quit`
    pub async fn run<R, W>(&self, input: R, mut output: W, format: OutputFormat) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = FramedRead::new(input, InputLines::new(self.settings.max_line_bytes));

        if format == OutputFormat::Human {
            let header = self.header().await?;
            write_line(&mut output, &header).await?;
            write_line(&mut output, "type `help` for commands").await?;
        }

        while let Some(line) = lines.next().await {
            // Unreadable lines are reported and skipped; only I/O failures stop the loop
            let reply = match line? {
                Ok(line) => self.handle_line(&line).await,
                Err(e) => Reply::Events(vec![ChatEvent::from(&e)]),
            };

            match reply {
                Reply::Events(events) => {
                    for event in &events {
                        let rendered = self.render(event, format).await?;
                        write_line(&mut output, &rendered).await?;
                    }
                }
                Reply::Info(text) => {
                    if format == OutputFormat::Human {
                        write_line(&mut output, &text).await?;
                    }
                }
                Reply::Quit => break,
            }
        }

        output.flush().await?;
        Ok(())
    }

    async fn header(&self) -> Result<String> {
        let engine = self.engine.lock().await;
        let thread = engine
            .get_thread(&self.thread_id)
            .ok_or_else(|| MarketError::ThreadNotFound(self.thread_id.0.clone()))?;
        Ok(render_header(thread))
    }

    async fn render(&self, event: &ChatEvent, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => encode_line(event),
            OutputFormat::Human => {
                let engine = self.engine.lock().await;
                let thread = engine
                    .get_thread(&self.thread_id)
                    .ok_or_else(|| MarketError::ThreadNotFound(self.thread_id.0.clone()))?;
                Ok(render_event(thread, event))
            }
        }
    }
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> Result<()> {
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    Ok(())
}

fn parse_input(line: &str, author: ParticipantId) -> Result<Option<Input>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if line.starts_with('{') {
        return decode_line(line).map(|c| Some(Input::Command(c)));
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let input = match verb.to_ascii_lowercase().as_str() {
        "say" => Input::Command(ChatCommand::SendText {
            author,
            text: rest.to_string(),
        }),
        "offer" => {
            let amount = rest
                .trim_start_matches(|c: char| !c.is_ascii_digit() && c != '-' && c != '.')
                .parse::<f64>()
                .map_err(|_| {
                    MarketError::Validation(format!("offer amount must be a number, got {:?}", rest))
                })?;
            Input::Command(ChatCommand::SendOffer { author, amount })
        }
        "accept" | "reject" | "decline" => {
            let decision: Decision = verb.parse().map_err(MarketError::Validation)?;
            if rest.is_empty() {
                return Err(MarketError::Validation(format!(
                    "usage: {} <msg-id>",
                    verb
                )));
            }
            Input::Command(ChatCommand::Respond {
                responder: author,
                message_id: rest.to_string(),
                decision,
            })
        }
        "list" => Input::Command(ChatCommand::List),
        "as" => Input::SwitchTo(rest.parse().map_err(MarketError::Validation)?),
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => {
            return Err(MarketError::Validation(format!(
                "unknown command {:?} (try `help`)",
                other
            )))
        }
    };

    Ok(Some(input))
}
