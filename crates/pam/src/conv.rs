//! # PAM conversation module
//!
//! Types for the synchronous prompt/response exchange between a module and
//! the human-interaction layer.
//!
//! The application registers a single [`Conversation`] delegate when the
//! transaction starts; a module then exchanges [`Message`]s for
//! [`Response`]s through `PamHandle::conversation`. The exchange is a
//! blocking call-and-return with no timeout or cancellation semantics.
//!
//! Cardinality is preserved exactly: a single prompt yields a single
//! response (or a neutral "no response" when the delegate produced none),
//! a batch of N prompts yields the delegate's responses in order.
//!
//! ## License
//!
//! pam-pyhost
//! Copyright (C) 2024 pam-pyhost contributors
//!
//! This program is free software: you can redistribute it and/or modify
//! it under the terms of the GNU General Public License as published by
//! the Free Software Foundation, either version 3 of the License, or
//! (at your option) any later version.
//!
//! This program is distributed in the hope that it will be useful,
//! but WITHOUT ANY WARRANTY; without even the implied warranty of
//! MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//! GNU General Public License for more details.
//!
//! You should have received a copy of the GNU General Public License
//! along with this program.  If not, see <http://www.gnu.org/licenses/>.

use thiserror::Error;

use crate::PamMessageStyle;

/// Failure of the application-supplied conversation delegate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("conversation failed: {0}")]
pub struct ConvError(pub String);

/// A prompt sent from a module to the interactive layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub msg_style: PamMessageStyle,
    pub msg: String,
}

impl Message {
    #[must_use]
    pub fn new(msg_style: PamMessageStyle, msg: impl Into<String>) -> Self {
        Message {
            msg_style,
            msg: msg.into(),
        }
    }
}

/// A reply produced by the interactive layer. `resp` is `None` for message
/// styles that return no user input, such as `PAM_TEXT_INFO`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub resp: Option<String>,
    pub resp_retcode: i32,
}

impl Response {
    #[must_use]
    pub fn new(resp: Option<String>, resp_retcode: i32) -> Self {
        Response { resp, resp_retcode }
    }

    /// A plain text reply with status 0.
    #[must_use]
    pub fn answer(text: impl Into<String>) -> Self {
        Response::new(Some(text.into()), 0)
    }
}

/// The application-supplied conversation delegate.
///
/// Registered once per transaction. Closures of signature
/// `FnMut(&[Message]) -> Result<Vec<Response>, ConvError>` implement this
/// trait directly, which is the adapter point for delegates of other
/// shapes.
pub trait Conversation {
    /// Relays the prompts to the user and collects replies, one per prompt,
    /// in order.
    ///
    /// # Errors
    ///
    /// Returns `ConvError` when the interactive layer cannot complete the
    /// exchange.
    fn converse(&mut self, messages: &[Message]) -> Result<Vec<Response>, ConvError>;
}

impl<F> Conversation for F
where
    F: FnMut(&[Message]) -> Result<Vec<Response>, ConvError>,
{
    fn converse(&mut self, messages: &[Message]) -> Result<Vec<Response>, ConvError> {
        self(messages)
    }
}

/// Prompt payload of one conversation call. The distinction between a
/// single message and a batch is kept so the reply can mirror it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompts {
    Single(Message),
    Batch(Vec<Message>),
}

impl From<Message> for Prompts {
    fn from(msg: Message) -> Self {
        Prompts::Single(msg)
    }
}

impl From<Vec<Message>> for Prompts {
    fn from(msgs: Vec<Message>) -> Self {
        Prompts::Batch(msgs)
    }
}

/// Reply of one conversation call, mirroring the payload cardinality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvReply {
    Single(Option<Response>),
    Batch(Vec<Response>),
}

impl ConvReply {
    /// The single response of a `Single` exchange, if any.
    #[must_use]
    pub fn into_single(self) -> Option<Response> {
        match self {
            ConvReply::Single(resp) => resp,
            ConvReply::Batch(mut responses) => {
                if responses.is_empty() {
                    None
                } else {
                    Some(responses.remove(0))
                }
            }
        }
    }
}
