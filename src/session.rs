//! Conversational create-or-read flow.
//!
//! A [`Session`] is a small state machine driven by user inputs, the shape
//! of a chat bot conversation: `/start` offers a choice, the choice decides
//! whether the next messages are texts to encode or images to decode.

use image::DynamicImage;
use tracing::debug;

use crate::encoder::{EncodedCode, Encoder};
use crate::error::FgcError;
use crate::models::DecodeReport;
use crate::pipeline::FgcDecoder;

/// Menu choice that switches to encoding.
pub const CREATE_CHOICE: &str = "Create FGC";
/// Menu choice that switches to decoding.
pub const READ_CHOICE: &str = "Read FGC";
/// Menu question.
pub const MENU_PROMPT: &str = "Create or read FGC?";
/// Prompt after choosing to encode.
pub const ENCODE_PROMPT: &str = "Send the string to encode.";
/// Prompt after choosing to decode.
pub const DECODE_PROMPT: &str = "Send a photo to decode.";
/// Reply to unexpected input.
pub const HELP_TEXT: &str = "Type /start to create or read an FGC.";

/// Where the conversation stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for a menu choice
    #[default]
    Idle,
    /// Every text is encoded
    AwaitingEncodeText,
    /// Every image is decoded
    AwaitingDecodeImage,
}

/// One user message.
#[derive(Debug, Clone)]
pub enum SessionInput {
    /// Restart and show the menu
    Start,
    /// Ask for help
    Help,
    /// A text message
    Text(String),
    /// A photo
    Image(DynamicImage),
    /// Leave the current mode
    Cancel,
}

/// Answer to one user message.
#[derive(Debug)]
pub enum SessionReply {
    /// Menu with its choices
    Menu {
        /// Question shown above the choices
        prompt: &'static str,
        /// Selectable answers
        choices: [&'static str; 2],
    },
    /// Plain text
    Prompt(&'static str),
    /// A freshly encoded code
    Encoded(Box<EncodedCode>),
    /// Result of decoding a photo
    Decoded(Box<DecodeReport>),
    /// Encoding failed
    Failed(FgcError),
}

/// One conversation.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    encoder: Encoder,
    decoder: FgcDecoder,
}

impl Session {
    /// Start a conversation with custom encoder and decoder.
    pub fn new(encoder: Encoder, decoder: FgcDecoder) -> Self {
        Self {
            state: SessionState::Idle,
            encoder,
            decoder,
        }
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Process one message and move to the next state.
    pub fn handle(&mut self, input: SessionInput) -> SessionReply {
        let before = self.state;
        let reply = match (self.state, input) {
            (_, SessionInput::Start) => {
                self.state = SessionState::Idle;
                menu()
            }
            (_, SessionInput::Help) => SessionReply::Prompt(HELP_TEXT),
            (_, SessionInput::Cancel) => {
                self.state = SessionState::Idle;
                SessionReply::Prompt(HELP_TEXT)
            }
            (SessionState::Idle, SessionInput::Text(text)) => {
                if text.starts_with(CREATE_CHOICE) {
                    self.state = SessionState::AwaitingEncodeText;
                    SessionReply::Prompt(ENCODE_PROMPT)
                } else if text.starts_with(READ_CHOICE) {
                    self.state = SessionState::AwaitingDecodeImage;
                    SessionReply::Prompt(DECODE_PROMPT)
                } else {
                    SessionReply::Prompt(HELP_TEXT)
                }
            }
            (SessionState::Idle, SessionInput::Image(_)) => SessionReply::Prompt(HELP_TEXT),
            (SessionState::AwaitingEncodeText, SessionInput::Text(text)) => {
                match self.encoder.encode(&text) {
                    Ok(code) => SessionReply::Encoded(Box::new(code)),
                    Err(err) => SessionReply::Failed(err),
                }
            }
            (SessionState::AwaitingEncodeText, SessionInput::Image(_)) => {
                SessionReply::Prompt(ENCODE_PROMPT)
            }
            (SessionState::AwaitingDecodeImage, SessionInput::Image(image)) => {
                SessionReply::Decoded(Box::new(self.decoder.read(&image)))
            }
            (SessionState::AwaitingDecodeImage, SessionInput::Text(_)) => {
                SessionReply::Prompt(DECODE_PROMPT)
            }
        };
        debug!(?before, after = ?self.state, "session step");
        reply
    }
}

fn menu() -> SessionReply {
    SessionReply::Menu {
        prompt: MENU_PROMPT,
        choices: [CREATE_CHOICE, READ_CHOICE],
    }
}
