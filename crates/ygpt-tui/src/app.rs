use ratatui::layout::Rect;
use ratatui::style::Color;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use ygpt_core::{present, Config, ConfigError, ReplyEvent, Responder, Reveal, Session};

use crate::tui::AppEvent;

pub struct App {
    // Core state
    pub should_quit: bool,
    pub config: Config,
    pub accent: Color,

    // Chat state
    pub session: Session,
    pub input_cursor: usize, // cursor position in session.input, in chars
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations
    // Stop following new output once the user scrolls up
    pub follow_output: bool,
    pub reply_task: Option<JoinHandle<()>>,

    // Animation state
    pub animation_frame: u8, // 0-2 for the typing dots

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,

    responder: Responder,
}

impl App {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let responder = Responder::new(&config)?;
        let accent = config.accent.parse::<Color>().unwrap_or_else(|_| {
            tracing::warn!(accent = %config.accent, "unknown accent colour, using green");
            Color::Green
        });

        Ok(Self {
            should_quit: false,
            accent,

            session: Session::with_greeting(&config.greeting),
            input_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            follow_output: true,
            reply_task: None,

            animation_frame: 0,

            chat_area: None,

            responder,
            config,
        })
    }

    /// Send the input buffer and start revealing the reply in the background.
    ///
    /// Does nothing while a reply is still being revealed.
    pub fn submit(&mut self, tx: mpsc::UnboundedSender<AppEvent>) {
        let Some(reply) = self.session.submit(&self.responder) else {
            return;
        };
        tracing::info!(kind = ?reply.answer.kind, "answering");

        self.input_cursor = 0;
        self.follow_output = true;
        self.scroll_chat_to_bottom();

        let reveal = Reveal::new(reply.answer.text, self.responder.stream_delay());
        self.reply_task = Some(tokio::spawn(present(reply.index, reveal, tx)));
    }

    pub fn apply_reply(&mut self, event: ReplyEvent) {
        if matches!(event, ReplyEvent::Finished { .. }) {
            self.reply_task = None;
        }
        self.session.apply(event);
        if self.follow_output {
            self.scroll_chat_to_bottom();
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn quit(&mut self) {
        if let Some(task) = self.reply_task.take() {
            task.abort();
        }
        self.should_quit = true;
    }

    /// Number of transcript lines once wrapped to the chat width
    pub fn chat_line_count(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.session.messages() {
            total_lines = total_lines.saturating_add(1); // Role line ("You:" or "Ygpt:")
            if msg.content.is_empty() {
                total_lines = total_lines.saturating_add(1); // reply placeholder
            }
            for line in msg.content.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                let wrapped = if char_count == 0 { 1 } else { char_count.div_ceil(wrap_width) };
                total_lines = total_lines.saturating_add(wrapped as u16);
            }
            total_lines = total_lines.saturating_add(1); // Blank line after message
        }

        if self.session.is_busy() {
            total_lines = total_lines.saturating_add(1); // typing dots
        }

        total_lines
    }

    pub fn max_chat_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.chat_line_count().saturating_sub(visible_height)
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = self.max_chat_scroll();
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_output = self.chat_scroll >= self.max_chat_scroll();
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.max_chat_scroll());
        self.follow_output = self.chat_scroll >= self.max_chat_scroll();
    }

    pub fn half_page(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }
}
