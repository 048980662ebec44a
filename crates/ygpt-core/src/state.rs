//! UI-agnostic session state
//!
//! The transcript, the input buffer and the busy flag. A front end owns one
//! `Session` and feeds it every `ReplyEvent` in order; nothing else writes to
//! it.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::responder::{Answer, Responder};
use crate::reveal::ReplyEvent;

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
}

/// A reply that has been chosen but not yet revealed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    /// Position of the empty assistant placeholder in the transcript
    pub index: usize,
    pub answer: Answer,
}

#[derive(Debug, Default)]
pub struct Session {
    pub input: String,
    messages: Vec<ChatMessage>,
    // placeholder index of the reply in flight
    pending: Option<usize>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the transcript with an assistant greeting (skipped when empty)
    pub fn with_greeting(greeting: &str) -> Self {
        let mut session = Self::new();
        if !greeting.is_empty() {
            session.messages.push(ChatMessage::assistant(greeting));
        }
        session
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Submit the input buffer.
    ///
    /// Returns `None` and leaves everything untouched while a reply is in
    /// flight or when the buffer is blank.
    pub fn submit(&mut self, responder: &Responder) -> Option<PendingReply> {
        self.submit_with(responder, &mut rand::thread_rng())
    }

    pub fn submit_with<R: Rng + ?Sized>(
        &mut self,
        responder: &Responder,
        rng: &mut R,
    ) -> Option<PendingReply> {
        if self.pending.is_some() {
            tracing::debug!("reply in flight, ignoring submission");
            return None;
        }

        let text = self.input.trim().to_string();
        if text.is_empty() {
            return None;
        }
        self.input.clear();

        let answer = responder.respond_with(&text, rng);
        self.messages.push(ChatMessage::user(text));

        let index = self.messages.len();
        self.messages.push(ChatMessage::assistant(String::new()));
        self.pending = Some(index);

        Some(PendingReply { index, answer })
    }

    /// Apply reply progress. Events for anything but the reply in flight are
    /// dropped.
    pub fn apply(&mut self, event: ReplyEvent) {
        match event {
            ReplyEvent::Prefix { index, text } if self.pending == Some(index) => {
                if let Some(msg) = self.messages.get_mut(index) {
                    msg.content = text;
                }
            }
            ReplyEvent::Finished { index } if self.pending == Some(index) => {
                self.pending = None;
            }
            ReplyEvent::Prefix { index, .. } | ReplyEvent::Finished { index } => {
                tracing::warn!(index, pending = ?self.pending, "event for a reply that is not in flight");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::responder::AnswerKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn responder() -> Responder {
        Responder::new(&Config::default()).unwrap()
    }

    #[test]
    fn greeting_opens_the_transcript() {
        let session = Session::with_greeting("hello there");
        assert_eq!(session.messages(), &[ChatMessage::assistant("hello there")]);
        assert!(Session::with_greeting("").messages().is_empty());
    }

    #[test]
    fn submit_appends_user_message_and_placeholder() {
        let mut session = Session::with_greeting("hi");
        session.input = "  what is the weather  ".to_string();

        let reply = session
            .submit_with(&responder(), &mut StdRng::seed_from_u64(3))
            .unwrap();

        assert_eq!(reply.index, 2);
        assert!(matches!(reply.answer.kind, AnswerKind::Fallback(_)));
        assert!(session.is_busy());
        assert!(session.input.is_empty());
        assert_eq!(session.messages()[1], ChatMessage::user("what is the weather"));
        assert_eq!(session.messages()[2], ChatMessage::assistant(""));
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut session = Session::new();
        session.input = "   ".to_string();
        assert!(session.submit(&responder()).is_none());
        assert!(session.messages().is_empty());
        assert!(!session.is_busy());
        assert_eq!(session.input, "   ");
    }

    #[test]
    fn submissions_while_busy_are_dropped() {
        let responder = responder();
        let mut session = Session::new();
        session.input = "first".to_string();
        let reply = session.submit(&responder).unwrap();

        session.input = "second".to_string();
        assert!(session.submit(&responder).is_none());
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.input, "second");

        session.apply(ReplyEvent::Finished { index: reply.index });
        assert!(!session.is_busy());
        assert!(session.submit(&responder).is_some());
        assert_eq!(session.messages()[2], ChatMessage::user("second"));
    }

    #[test]
    fn prefixes_replace_placeholder_content() {
        let mut session = Session::new();
        session.input = "anything".to_string();
        let reply = session.submit(&responder()).unwrap();

        session.apply(ReplyEvent::Prefix { index: reply.index, text: "S".into() });
        session.apply(ReplyEvent::Prefix { index: reply.index, text: "So".into() });
        assert_eq!(session.messages()[reply.index].content, "So");
        assert!(session.is_busy());
    }

    #[test]
    fn events_for_other_messages_are_dropped() {
        let mut session = Session::new();
        session.input = "mine".to_string();
        session.submit(&responder()).unwrap();

        session.apply(ReplyEvent::Prefix { index: 0, text: "hijacked".into() });
        session.apply(ReplyEvent::Prefix { index: 99, text: "nowhere".into() });
        assert_eq!(session.messages()[0], ChatMessage::user("mine"));
    }

    #[test]
    fn stray_finished_keeps_the_reply_in_flight() {
        let responder = responder();
        let mut session = Session::new();
        session.input = "hello".to_string();
        let reply = session.submit(&responder).unwrap();
        assert_eq!(reply.index, 1);

        session.apply(ReplyEvent::Finished { index: 0 });
        assert!(session.is_busy());

        session.input = "again".to_string();
        assert!(session.submit(&responder).is_none());
        assert_eq!(session.messages().len(), 2);

        session.apply(ReplyEvent::Finished { index: reply.index });
        assert!(!session.is_busy());
    }

    #[test]
    fn late_prefix_cannot_overwrite_an_earlier_reply() {
        let responder = responder();
        let mut session = Session::with_greeting("welcome");
        session.input = "first".to_string();
        let first = session.submit(&responder).unwrap();
        session.apply(ReplyEvent::Prefix { index: first.index, text: "done".into() });
        session.apply(ReplyEvent::Finished { index: first.index });

        // greeting is an assistant message, but not the one in flight
        session.apply(ReplyEvent::Prefix { index: 0, text: "stale".into() });
        session.apply(ReplyEvent::Prefix { index: first.index, text: "stale".into() });
        assert_eq!(session.messages()[0], ChatMessage::assistant("welcome"));
        assert_eq!(session.messages()[first.index].content, "done");
    }
}
