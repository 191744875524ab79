// TUI application state
//
// The App owns whichever session is open, the catalog browsing state, and
// the UI flags the views render from. Network dispatch is indirect: key
// handling stores an OutboundMessage in `pending_dispatch` and the event
// loop drains it into a spawned send task, keeping this module free of any
// async machinery.

use super::components::toast::Toast;
use crate::catalog::{self, CategoryFilter, Topic};
use crate::config::Config;
use crate::connectivity::ConnectivityState;
use crate::events::AppEvent;
use crate::logging::LogBuffer;
use crate::session::{ChatSession, OutboundMessage, Submit};
use crate::theme::Theme;
use crate::tui::markdown;

/// Spinner frames for the typing indicator
pub const SPINNER_FRAMES: [&str; 4] = ["⠋", "⠙", "⠸", "⠴"];

/// Different views the TUI can display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Assistant catalog with filter and search
    #[default]
    Catalog,
    /// One open chat session
    Chat,
}

/// Catalog browsing state: incremental search, category cycling, selection
#[derive(Debug, Default)]
pub struct CatalogState {
    pub search: String,
    /// 0 = All, then 1-based index into catalog::categories()
    pub category_index: usize,
    pub selected: usize,
}

impl CatalogState {
    pub fn category_filter(&self) -> CategoryFilter {
        if self.category_index == 0 {
            CategoryFilter::All
        } else {
            match catalog::categories().get(self.category_index - 1).copied() {
                Some(c) => CategoryFilter::Category(c),
                None => CategoryFilter::All,
            }
        }
    }

    pub fn category_label(&self) -> &'static str {
        match self.category_filter() {
            CategoryFilter::All => "All",
            CategoryFilter::Category(c) => c,
        }
    }
}

/// Main application state for the TUI
pub struct App {
    pub view: View,
    pub catalog: CatalogState,
    pub session: Option<ChatSession>,

    /// Chat input buffer (length-capped at max_message_len)
    pub input: String,

    /// Latest connectivity snapshot from the watcher
    pub connectivity: ConnectivityState,

    pub theme: Theme,
    pub toast: Option<Toast>,
    pub log_buffer: LogBuffer,
    pub show_logs: bool,

    /// Transcript scroll: 0 = follow the bottom
    pub scroll_from_bottom: usize,

    pub spinner_frame: usize,
    pub should_quit: bool,

    /// Dispatch handoff: set by key handling, drained by the event loop
    pub pending_dispatch: Option<OutboundMessage>,

    /// Re-probe handoff: set by Ctrl-R, drained by the event loop
    pub probe_requested: bool,

    max_message_len: usize,
}

impl App {
    pub fn new(config: &Config, log_buffer: LogBuffer) -> Self {
        Self {
            view: View::default(),
            catalog: CatalogState::default(),
            session: None,
            input: String::new(),
            connectivity: ConnectivityState::default(),
            theme: Theme::by_name(&config.theme),
            toast: None,
            log_buffer,
            show_logs: false,
            scroll_from_bottom: 0,
            spinner_frame: 0,
            should_quit: false,
            pending_dispatch: None,
            probe_requested: false,
            max_message_len: config.max_message_len,
        }
    }

    // ─── Catalog view ────────────────────────────────────────

    /// Topics matching the current filter and search, catalog order
    pub fn visible_topics(&self) -> Vec<&'static Topic> {
        catalog::filter_topics(self.catalog.category_filter(), &self.catalog.search)
    }

    pub fn select_next(&mut self) {
        let len = self.visible_topics().len();
        if len > 0 {
            self.catalog.selected = (self.catalog.selected + 1) % len;
        }
    }

    pub fn select_prev(&mut self) {
        let len = self.visible_topics().len();
        if len > 0 {
            self.catalog.selected = self.catalog.selected.checked_sub(1).unwrap_or(len - 1);
        }
    }

    /// Cycle the category filter: All -> cat1 -> ... -> All
    pub fn cycle_category(&mut self, backwards: bool) {
        let count = catalog::categories().len() + 1;
        self.catalog.category_index = if backwards {
            self.catalog.category_index.checked_sub(1).unwrap_or(count - 1)
        } else {
            (self.catalog.category_index + 1) % count
        };
        self.catalog.selected = 0;
    }

    pub fn push_search_char(&mut self, c: char) {
        self.catalog.search.push(c);
        self.catalog.selected = 0;
    }

    pub fn pop_search_char(&mut self) {
        self.catalog.search.pop();
        self.catalog.selected = 0;
    }

    /// Open a chat session for the selected topic
    pub fn open_selected(&mut self) {
        let topics = self.visible_topics();
        let Some(topic) = topics.get(self.catalog.selected).copied() else {
            return;
        };
        tracing::info!(topic = %topic.id, "opening chat session");
        self.session = Some(ChatSession::open(topic));
        self.input.clear();
        self.scroll_from_bottom = 0;
        self.view = View::Chat;
    }

    /// Tear the session down and return to the catalog
    ///
    /// The session's generation dies with it, so a reply that settles after
    /// this point is discarded by handle_app_event.
    pub fn back_to_catalog(&mut self) {
        if let Some(session) = &self.session {
            tracing::info!(topic = %session.topic.id, "closing chat session");
        }
        self.session = None;
        self.input.clear();
        self.view = View::Catalog;
    }

    // ─── Chat view ───────────────────────────────────────────

    pub fn push_input_char(&mut self, c: char) {
        if self.input.chars().count() < self.max_message_len {
            self.input.push(c);
        }
    }

    pub fn pop_input_char(&mut self) {
        self.input.pop();
    }

    pub fn input_char_count(&self) -> usize {
        self.input.chars().count()
    }

    pub fn max_message_len(&self) -> usize {
        self.max_message_len
    }

    /// Submit the input buffer to the open session
    ///
    /// On dispatch the input clears and the outbound message is parked for
    /// the event loop. Offline and no-op outcomes leave the buffer intact
    /// so the user can retry without retyping.
    pub fn submit_input(&mut self) {
        let Some(session) = &mut self.session else {
            return;
        };
        let online = self.connectivity.server.is_online();
        match session.submit(&self.input.clone(), online) {
            Submit::Dispatch(out) => {
                self.input.clear();
                self.scroll_from_bottom = 0;
                self.pending_dispatch = Some(out);
            }
            Submit::RejectedOffline => {
                self.scroll_from_bottom = 0;
            }
            Submit::Rejected => {}
        }
    }

    /// Apply a settled reply to the open session
    ///
    /// Replies for a torn-down session (or a cleared one) are dropped here:
    /// either there is no session, the topic doesn't match, or the session
    /// rejects the stale generation.
    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Reply {
                topic,
                generation,
                result,
            } => {
                let Some(session) = &mut self.session else {
                    tracing::debug!(topic = %topic, "reply after session teardown, dropping");
                    return;
                };
                if session.topic.id != topic {
                    tracing::debug!(topic = %topic, "reply for a different topic, dropping");
                    return;
                }
                if session.resolve(generation, result) {
                    self.scroll_from_bottom = 0;
                }
            }
        }
    }

    /// Clear the transcript back to a fresh greeting
    pub fn clear_chat(&mut self) {
        if let Some(session) = &mut self.session {
            session.clear();
            self.scroll_from_bottom = 0;
        }
    }

    /// Plain-text body of the most recent assistant message, for clipboard
    pub fn copy_last_reply_text(&self) -> Option<String> {
        let session = self.session.as_ref()?;
        let message = session.last_assistant_message()?;
        Some(markdown::plain_text(&message.text))
    }

    pub fn dismiss_error(&mut self) -> bool {
        if let Some(session) = &mut self.session {
            if session.last_error().is_some() {
                session.dismiss_error();
                return true;
            }
        }
        false
    }

    // ─── Shared ──────────────────────────────────────────────

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(lines);
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(message));
    }

    /// Advance spinner animation and expire stale toasts (called per tick)
    pub fn tick(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChatReply;
    use crate::catalog::TopicId;
    use crate::connectivity::ServerStatus;

    fn app() -> App {
        App::new(&Config::default(), LogBuffer::new())
    }

    fn online(app: &mut App) {
        app.connectivity.server = ServerStatus::Online;
    }

    #[test]
    fn starts_on_catalog_with_full_list() {
        let app = app();
        assert_eq!(app.view, View::Catalog);
        assert_eq!(app.visible_topics().len(), catalog::CATALOG.len());
    }

    #[test]
    fn search_narrows_and_resets_selection() {
        let mut app = app();
        app.catalog.selected = 4;
        for c in "legal".chars() {
            app.push_search_char(c);
        }
        assert_eq!(app.catalog.selected, 0);
        let visible = app.visible_topics();
        assert!(visible.iter().any(|t| t.id == TopicId::Legal));
        assert!(visible.len() < catalog::CATALOG.len());
    }

    #[test]
    fn category_cycle_wraps_both_ways() {
        let mut app = app();
        let count = catalog::categories().len() + 1;
        for _ in 0..count {
            app.cycle_category(false);
        }
        assert_eq!(app.catalog.category_index, 0);
        app.cycle_category(true);
        assert_eq!(app.catalog.category_index, count - 1);
    }

    #[test]
    fn open_selected_creates_session_and_switches_view() {
        let mut app = app();
        app.open_selected();
        assert_eq!(app.view, View::Chat);
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.topic.id, TopicId::Medical); // first catalog entry
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn submit_parks_dispatch_and_clears_input() {
        let mut app = app();
        online(&mut app);
        app.open_selected();
        app.input = "Hello".to_string();

        app.submit_input();

        let out = app.pending_dispatch.take().expect("dispatch parked");
        assert_eq!(out.text, "Hello");
        assert!(app.input.is_empty());
    }

    #[test]
    fn offline_submit_keeps_input_for_retry() {
        let mut app = app();
        app.connectivity.server = ServerStatus::Offline;
        app.open_selected();
        app.input = "Hello".to_string();

        app.submit_input();

        assert!(app.pending_dispatch.is_none());
        assert_eq!(app.input, "Hello");
        // The local error message landed in the transcript
        assert_eq!(app.session.as_ref().unwrap().messages().len(), 2);
    }

    #[test]
    fn reply_after_teardown_is_dropped() {
        let mut app = app();
        online(&mut app);
        app.open_selected();
        app.input = "Hello".to_string();
        app.submit_input();
        let out = app.pending_dispatch.take().unwrap();

        app.back_to_catalog();
        app.open_selected();

        app.handle_app_event(AppEvent::Reply {
            topic: out.topic,
            generation: out.generation,
            result: Ok(ChatReply {
                text: "ghost".to_string(),
                latency_seconds: None,
            }),
        });

        // Fresh session still holds only the greeting
        assert_eq!(app.session.as_ref().unwrap().messages().len(), 1);
    }

    #[test]
    fn input_respects_length_cap() {
        let mut app = App::new(
            &Config {
                max_message_len: 3,
                ..Config::default()
            },
            LogBuffer::new(),
        );
        for c in "abcdef".chars() {
            app.push_input_char(c);
        }
        assert_eq!(app.input, "abc");
    }
}
