//! The session: everything one running client instance knows.
//!
//! All mutable client state lives here behind `&mut self` methods, so
//! there is exactly one writer and no global state. The navigation
//! engine in [`crate::nav`] mutates a session; the renderer only ever
//! borrows it.

use burrow_proto::uri::format_uri;
use burrow_types::error::{BurrowError, Result};
use burrow_types::item::{Element, ItemType};
use burrow_types::page::{Document, History};

use burrow_net::Transport;

use crate::config::Config;
use crate::search::SearchState;

pub struct Session {
    pub config: Config,
    pub transport: Transport,
    /// Where the loaded page came from. `None` until the first fetch,
    /// and server-less while a local page (help, history) is shown.
    pub current: Option<Element>,
    pub page: Document,
    pub history: History,
    pub search: SearchState,
    /// Index of the first visible element.
    pub scroll: usize,
}

impl Session {
    pub fn new(config: Config, transport: Transport) -> Self {
        Self {
            config,
            transport,
            current: None,
            page: Document::new(),
            history: History::new(),
            search: SearchState::new(),
            scroll: 0,
        }
    }

    /// The current location, if it points at a real server.
    pub fn remote_current(&self) -> Result<&Element> {
        self.current
            .as_ref()
            .filter(|element| element.is_remote())
            .ok_or(BurrowError::NotRemote)
    }

    pub fn is_remote_session(&self) -> bool {
        self.remote_current().is_ok()
    }

    // ---- local pages ----

    /// Replace the page with a locally generated one. The page we came
    /// from goes onto the history stack so `back` returns to it; local
    /// pages themselves are never recorded.
    fn enter_local_page(&mut self, title: &str, page: Document) {
        if let Some(prev) = self.current.take() {
            if prev.is_remote() {
                self.history.push(prev);
            }
        }
        self.current = Some(Element::new(ItemType::Info, title));
        self.page = page;
        self.search.clear();
        self.scroll = 0;
    }

    pub fn show_help(&mut self) {
        let mut page = Document::new();
        for line in HELP_LINES {
            page.push(Element::new(ItemType::Info, *line));
        }
        self.enter_local_page("help", page);
    }

    /// Present the history stack as a navigable page, oldest first.
    /// Entries keep their type, server, and selector, so following one
    /// by number refetches it.
    pub fn show_history(&mut self) {
        let mut page = Document::new();
        if self.history.is_empty() {
            page.push(Element::new(ItemType::Info, "history is empty"));
        }
        for entry in self.history.iter() {
            let mut element = entry.clone();
            if element.description.is_empty() {
                element.description = format_uri(&element);
            }
            page.push(element);
        }
        self.enter_local_page("history", page);
    }

    // ---- scrolling ----

    pub fn max_scroll(&self, view_height: usize) -> usize {
        self.page.len().saturating_sub(view_height)
    }

    pub fn scroll_down(&mut self, lines: usize, view_height: usize) {
        self.scroll = (self.scroll + lines).min(self.max_scroll(view_height));
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_top(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll_bottom(&mut self, view_height: usize) {
        self.scroll = self.max_scroll(view_height);
    }
}

const HELP_LINES: &[&str] = &[
    "burrow key bindings",
    "",
    ":       open location            +       show link URI",
    "a       append to selector       y       yank link URI",
    "1-9     follow link by number",
    "/       search forward           ?       search backward",
    "n       next match               N       previous match",
    "j, k    line down, up            ^D, ^U  half page down, up",
    "g, G    top, bottom",
    "<       back                     *       reload",
    "r       server root              H       history",
    "h       this help                q       quit",
];

// ---- tests ----
