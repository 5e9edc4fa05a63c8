//! Chat session: question validation, the append-only message log and the
//! loading indicators that stand in for answers still in flight.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use crate::api::{ChatRequest, ChatResponse, ManualsClient};
use crate::error::{ClientError, ValidationError};
use crate::input::TextInput;
use crate::markup::{escape_text, format_response, scroll_to_bottom, wrapped_height};
use crate::tui::{AppEvent, EventSender};

/// Shown in the log whenever a question could not be answered.
pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again.";

/// Identifies one loading indicator. Unique for the lifetime of a `ChatLog`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadingToken(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessage {
    User { text: String },
    Assistant { answer: String, data_available: bool },
    Error { message: String },
    Loading { token: LoadingToken },
}

impl ChatMessage {
    /// Display lines for this message, including the trailing blank line.
    pub fn to_lines(&self, animation_frame: u8) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        match self {
            ChatMessage::User { text } => {
                lines.push(Line::from(Span::styled(
                    "You asked",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                for line in escape_text(text).split('\n') {
                    lines.push(Line::from(line.to_string()));
                }
            }
            ChatMessage::Assistant { answer, data_available } => {
                lines.push(Line::from(Span::styled(
                    "AI Assistant",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(Span::styled(
                    "📝 AI Explanation",
                    Style::default().fg(Color::DarkGray),
                )));
                let normalized = answer.replace("\r\n", "\n");
                lines.extend(format_response(&escape_text(&normalized)).lines);
                if *data_available {
                    lines.push(Line::from(Span::styled(
                        "✓ Verified from dataset",
                        Style::default().fg(Color::Green),
                    )));
                }
            }
            ChatMessage::Error { message } => {
                lines.push(Line::from(Span::styled(
                    "Error",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(Span::styled(
                    escape_text(message),
                    Style::default().fg(Color::Red),
                )));
            }
            ChatMessage::Loading { .. } => {
                // Animated ellipsis: cycles through ".", "..", "..."
                let dots = ".".repeat((animation_frame as usize % 3) + 1);
                lines.push(Line::from(Span::styled(
                    format!("Analyzing manuals{}", dots),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            }
        }
        lines.push(Line::default());
        lines
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
    next_token: u64,
    pub scroll: u16,
    viewport_height: u16,
    wrap_width: u16,
    pub animation_frame: u8,
}

impl ChatLog {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.scroll_to_bottom();
    }

    pub fn add_loading_indicator(&mut self) -> LoadingToken {
        self.next_token += 1;
        let token = LoadingToken(self.next_token);
        self.push(ChatMessage::Loading { token });
        token
    }

    /// Remove the indicator owned by `token`. Returns false if it was
    /// already gone.
    pub fn remove_loading_indicator(&mut self, token: LoadingToken) -> bool {
        let before = self.messages.len();
        self.messages
            .retain(|m| !matches!(m, ChatMessage::Loading { token: t } if *t == token));
        self.messages.len() != before
    }

    pub fn pending_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| matches!(m, ChatMessage::Loading { .. }))
            .count()
    }

    pub fn tick_animation(&mut self) {
        if self.pending_count() > 0 {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn lines(&self) -> Vec<Line<'static>> {
        self.messages
            .iter()
            .flat_map(|m| m.to_lines(self.animation_frame))
            .collect()
    }

    /// Record the inner size of the chat area. A size change re-pins the
    /// view to the newest message.
    pub fn set_viewport(&mut self, height: u16, width: u16) {
        if (height, width) != (self.viewport_height, self.wrap_width) {
            self.viewport_height = height;
            self.wrap_width = width;
            self.scroll_to_bottom();
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        // Fall back to a typical size before the first render
        let width = if self.wrap_width > 0 { self.wrap_width } else { 50 };
        let height = if self.viewport_height > 0 { self.viewport_height } else { 20 };
        self.scroll = scroll_to_bottom(wrapped_height(&self.lines(), width), height);
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.scroll = self.scroll.saturating_sub(rows);
    }

    pub fn scroll_down(&mut self, rows: u16) {
        let width = if self.wrap_width > 0 { self.wrap_width } else { 50 };
        let height = if self.viewport_height > 0 { self.viewport_height } else { 20 };
        let max = scroll_to_bottom(wrapped_height(&self.lines(), width), height);
        self.scroll = self.scroll.saturating_add(rows).min(max);
    }
}

/// A validated question waiting to be sent.
#[derive(Debug, Clone)]
pub struct PendingQuestion {
    pub token: LoadingToken,
    pub request: ChatRequest,
}

impl PendingQuestion {
    /// Send the question in the background; the answer arrives as
    /// `AppEvent::ChatResolved`.
    pub fn dispatch(self, client: &ManualsClient, events: &EventSender) {
        let client = client.clone();
        let events = events.clone();
        tokio::spawn(async move {
            let result = client.ask(&self.request).await;
            let _ = events.send(AppEvent::ChatResolved {
                token: self.token,
                result,
            });
        });
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    pub log: ChatLog,
    pub question: TextInput,
}

impl ChatSession {
    /// Validate and stage a question for `product`.
    ///
    /// On success the user's message and a loading indicator are in the log
    /// and the input is cleared. On failure nothing changes.
    pub fn submit(&mut self, product: &str) -> Result<PendingQuestion, ValidationError> {
        if product.is_empty() {
            return Err(ValidationError::MissingProduct);
        }
        let question = self.question.value().trim().to_string();
        if question.is_empty() {
            return Err(ValidationError::MissingQuestion);
        }

        self.log.push(ChatMessage::User { text: question.clone() });
        self.question.clear();
        let token = self.log.add_loading_indicator();

        Ok(PendingQuestion {
            token,
            request: ChatRequest {
                product: product.to_string(),
                question,
            },
        })
    }

    /// Replace the loading indicator for `token` with the answer, or with an
    /// error bubble if the request failed.
    pub fn resolve(&mut self, token: LoadingToken, result: Result<ChatResponse, ClientError>) {
        if !self.log.remove_loading_indicator(token) {
            tracing::warn!(?token, "answer for unknown or already resolved question");
            return;
        }

        match result {
            Ok(response) => {
                self.log.push(ChatMessage::Assistant {
                    answer: response.answer,
                    data_available: response.data_available.unwrap_or(true),
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "chat request failed");
                self.log.push(ChatMessage::Error {
                    message: SERVER_ERROR_MESSAGE.to_string(),
                });
            }
        }
    }
}
