// Chat session state machine
//
// One session exists per open chat view. It owns the ordered message list,
// gates sends (one in-flight request at a time), and applies exactly one
// outcome message per dispatched request.
//
// The send cycle is two-phase:
//   phase 1 (submit): synchronous, appends the user message optimistically
//   phase 2 (resolve): async, appends exactly one assistant message when
//   the network call settles - success text or an error description
//
// A generation counter guards phase 2 against stale completions: clear()
// and every new session take a fresh generation, so a reply that settles
// after the session was cleared or torn down is discarded instead of
// mutating history it no longer belongs to.

use crate::api::{ApiError, ChatReply};
use crate::catalog::{Topic, TopicId};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide generation source; never reused across sessions
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn fresh_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the transcript; immutable once appended
#[derive(Debug, Clone)]
pub struct Message {
    /// Per-session sequence number, strictly increasing
    pub id: u64,
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Source topic (assistant messages only)
    pub topic: Option<TopicId>,
    /// Server-reported processing time, when the backend sent one
    pub latency_seconds: Option<f64>,
}

/// What a submit call decided to do
#[derive(Debug)]
pub enum Submit {
    /// Dropped without touching the transcript (empty input, or a request
    /// is already pending)
    Rejected,
    /// Server not reachable: one local error message was appended, nothing
    /// was dispatched
    RejectedOffline,
    /// User message appended; the caller must run this against the network
    /// client and feed the outcome back through resolve()
    Dispatch(OutboundMessage),
}

/// A message handed to the network layer, tagged for stale detection
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub topic: TopicId,
    pub text: String,
    pub generation: u64,
}

/// Message history and pending-state for one open topic view
pub struct ChatSession {
    pub topic: &'static Topic,
    messages: Vec<Message>,
    pending: bool,
    last_error: Option<String>,
    generation: u64,
    next_id: u64,
}

impl ChatSession {
    /// Open a session for a topic, seeded with the greeting
    pub fn open(topic: &'static Topic) -> Self {
        let mut session = Self {
            topic,
            messages: Vec::new(),
            pending: false,
            last_error: None,
            generation: fresh_generation(),
            next_id: 1,
        };
        session.push_assistant(
            format!(
                "Hello! I'm **{}**. {} \n\nWhat can I help you with today?",
                topic.name, topic.description
            ),
            None,
        );
        session
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Dismiss the error banner without touching the transcript
    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    /// Submit user input, gated on pending-state and server reachability
    ///
    /// See the module docs for the two-phase contract. The online check is a
    /// snapshot: the caller passes whether the server was reachable at the
    /// moment of the keypress.
    pub fn submit(&mut self, text: &str, server_online: bool) -> Submit {
        let text = text.trim();
        if text.is_empty() || self.pending {
            return Submit::Rejected;
        }

        if !server_online {
            tracing::debug!(topic = %self.topic.id, "submit while server not reachable");
            self.push_assistant(
                "I can't reach the server right now, so your message wasn't sent. \
                 Please check your connection and try again."
                    .to_string(),
                None,
            );
            self.last_error =
                Some("Connection lost. Check your internet connection and try again.".to_string());
            return Submit::RejectedOffline;
        }

        self.push_message(Role::User, text.to_string(), None, None);
        self.pending = true;
        self.last_error = None;

        Submit::Dispatch(OutboundMessage {
            topic: self.topic.id,
            text: text.to_string(),
            generation: self.generation,
        })
    }

    /// Apply a settled network outcome (phase 2)
    ///
    /// Returns false when the completion is stale - its generation predates
    /// a clear() or belongs to a different session - in which case nothing
    /// is appended.
    pub fn resolve(&mut self, generation: u64, result: Result<ChatReply, ApiError>) -> bool {
        if generation != self.generation {
            tracing::debug!(
                stale = generation,
                current = self.generation,
                "discarding stale reply"
            );
            return false;
        }

        self.pending = false;
        match result {
            Ok(reply) => {
                self.push_assistant(reply.text, reply.latency_seconds);
            }
            Err(err) => {
                tracing::warn!(topic = %self.topic.id, "send failed: {}", err);
                self.push_assistant(
                    format!(
                        "Sorry, I ran into a problem handling that request. \
                         Please try again.\n\n*Error: {}*",
                        err
                    ),
                    None,
                );
                self.last_error = Some("Failed to get a response. Please try again.".to_string());
            }
        }
        true
    }

    /// Discard the history and reseed the greeting
    ///
    /// Takes a fresh generation so any in-flight reply is dropped on arrival.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.next_id = 1;
        self.pending = false;
        self.last_error = None;
        self.generation = fresh_generation();
        self.push_assistant(
            format!(
                "Hello again! I'm **{}**. How can I help you today?",
                self.topic.name
            ),
            None,
        );
    }

    /// Most recent assistant message, for clipboard copy
    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
    }

    fn push_assistant(&mut self, text: String, latency_seconds: Option<f64>) {
        self.push_message(Role::Assistant, text, Some(self.topic.id), latency_seconds);
    }

    fn push_message(
        &mut self,
        role: Role,
        text: String,
        topic: Option<TopicId>,
        latency_seconds: Option<f64>,
    ) {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message {
            id,
            role,
            text,
            created_at: Utc::now(),
            topic,
            latency_seconds,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{self, TopicId};

    fn open(id: TopicId) -> ChatSession {
        ChatSession::open(catalog::topic(id))
    }

    fn reply(text: &str, latency: Option<f64>) -> Result<ChatReply, ApiError> {
        Ok(ChatReply {
            text: text.to_string(),
            latency_seconds: latency,
        })
    }

    #[test]
    fn open_seeds_exactly_one_greeting() {
        let session = open(TopicId::Medical);
        assert_eq!(session.messages().len(), 1);
        let greeting = &session.messages()[0];
        assert_eq!(greeting.role, Role::Assistant);
        assert!(greeting.text.contains("Medical Assistant"));
        assert!(!session.is_pending());
        assert!(session.last_error().is_none());
    }

    #[test]
    fn submit_appends_one_user_message_then_one_reply() {
        let mut session = open(TopicId::Medical);

        let Submit::Dispatch(out) = session.submit("Hello", true) else {
            panic!("expected dispatch");
        };
        assert_eq!(out.topic, TopicId::Medical);
        assert_eq!(out.text, "Hello");
        // Phase 1: exactly one user message, synchronously
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[1].role, Role::User);
        assert!(session.is_pending());

        // Phase 2: exactly one assistant message
        assert!(session.resolve(out.generation, reply("Hi there", Some(0.8))));
        assert_eq!(session.messages().len(), 3);
        let answer = &session.messages()[2];
        assert_eq!(answer.role, Role::Assistant);
        assert_eq!(answer.text, "Hi there");
        assert_eq!(answer.latency_seconds, Some(0.8));
        assert_eq!(answer.topic, Some(TopicId::Medical));
        assert!(!session.is_pending());
    }

    #[test]
    fn message_ids_are_strictly_increasing() {
        let mut session = open(TopicId::General);
        let Submit::Dispatch(out) = session.submit("one", true) else {
            panic!("expected dispatch");
        };
        session.resolve(out.generation, reply("two", None));

        let ids: Vec<u64> = session.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn empty_and_whitespace_input_is_a_no_op() {
        let mut session = open(TopicId::Education);
        assert!(matches!(session.submit("", true), Submit::Rejected));
        assert!(matches!(session.submit("   \n\t", true), Submit::Rejected));
        // Transcript untouched - still just the greeting
        assert_eq!(session.messages().len(), 1);
        assert!(!session.is_pending());
    }

    #[test]
    fn second_submit_while_pending_is_dropped_not_queued() {
        let mut session = open(TopicId::Finance);
        let Submit::Dispatch(out) = session.submit("first", true) else {
            panic!("expected dispatch");
        };

        // Rapid second submit before the first settles
        assert!(matches!(session.submit("second", true), Submit::Rejected));
        // Only one new user message in the list
        assert_eq!(session.messages().len(), 2);

        // First completes normally afterwards
        assert!(session.resolve(out.generation, reply("done", None)));
        assert_eq!(session.messages().len(), 3);
        assert!(!session.is_pending());

        // And the session is interactive again
        assert!(matches!(session.submit("third", true), Submit::Dispatch(_)));
    }

    #[test]
    fn offline_submit_appends_one_local_error_message() {
        let mut session = open(TopicId::Career);
        let result = session.submit("Hello?", false);
        assert!(matches!(result, Submit::RejectedOffline));

        // Distinguished from the plain no-op: exactly one synthesized
        // assistant message, no user message, nothing dispatched
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[1].role, Role::Assistant);
        assert!(session.messages()[1].text.contains("can't reach the server"));
        assert!(session.last_error().is_some());
        assert!(!session.is_pending());
    }

    #[test]
    fn failed_send_is_visible_in_conversation_and_recoverable() {
        let mut session = open(TopicId::Legal);
        let Submit::Dispatch(out) = session.submit("Is this binding?", true) else {
            panic!("expected dispatch");
        };

        let err = ApiError::Transport { status: 502 };
        assert!(session.resolve(out.generation, Err(err)));

        // One assistant message embedding the error description
        assert_eq!(session.messages().len(), 3);
        let failure = &session.messages()[2];
        assert_eq!(failure.role, Role::Assistant);
        assert!(failure.text.contains("Error:"));
        assert!(failure.text.contains("502"));

        // Session returns to an interactive state with the banner set
        assert!(session.last_error().is_some());
        assert!(!session.is_pending());
        assert!(matches!(session.submit("retry", true), Submit::Dispatch(_)));
    }

    #[test]
    fn clear_leaves_exactly_one_greeting() {
        let mut session = open(TopicId::Developer);
        for text in ["a", "b", "c"] {
            let Submit::Dispatch(out) = session.submit(text, true) else {
                panic!("expected dispatch");
            };
            session.resolve(out.generation, reply("ok", None));
        }
        assert_eq!(session.messages().len(), 7);

        session.clear();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, Role::Assistant);
        assert!(session.last_error().is_none());
        assert!(!session.is_pending());
    }

    #[test]
    fn reply_settling_after_clear_is_discarded() {
        let mut session = open(TopicId::Entertainment);
        let Submit::Dispatch(out) = session.submit("recommend a film", true) else {
            panic!("expected dispatch");
        };

        session.clear();

        // The in-flight reply resolves against a bumped generation
        assert!(!session.resolve(out.generation, reply("stale", None)));
        assert_eq!(session.messages().len(), 1);
        assert!(!session
            .messages()
            .iter()
            .any(|m| m.text.contains("stale")));
    }

    #[test]
    fn generations_differ_across_sessions_on_the_same_topic() {
        let mut first = open(TopicId::Medical);
        let Submit::Dispatch(out) = first.submit("hi", true) else {
            panic!("expected dispatch");
        };
        drop(first);

        // Re-opened view on the same topic must not accept the old reply
        let mut second = open(TopicId::Medical);
        assert!(!second.resolve(out.generation, reply("ghost", None)));
        assert_eq!(second.messages().len(), 1);
    }

    #[test]
    fn last_assistant_message_skips_user_entries() {
        let mut session = open(TopicId::General);
        let Submit::Dispatch(out) = session.submit("question", true) else {
            panic!("expected dispatch");
        };
        session.resolve(out.generation, reply("answer", None));
        let Submit::Dispatch(_) = session.submit("follow-up", true) else {
            panic!("expected dispatch");
        };

        // Pending user message at the tail; copy still targets the answer
        assert_eq!(session.last_assistant_message().unwrap().text, "answer");
    }

    #[test]
    fn dismiss_error_clears_banner_only() {
        let mut session = open(TopicId::Legal);
        session.submit("x", false);
        assert!(session.last_error().is_some());
        let len = session.messages().len();

        session.dismiss_error();
        assert!(session.last_error().is_none());
        assert_eq!(session.messages().len(), len);
    }
}
