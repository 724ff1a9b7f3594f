//! The modal input state machine.
//!
//! Keys are translated into [`Action`]s against a read-only view of the
//! session; executing an action (navigating, spawning the yanker,
//! scrolling) is the caller's job. `Normal` mode dispatches single-key
//! commands; `Collecting` mode accumulates an argument for a command
//! until Enter, Escape, or a numeric auto-submit.

use burrow_proto::uri::{format_uri, parse_uri};
use burrow_types::error::BurrowError;
use burrow_types::input::Key;
use burrow_types::item::Element;

use crate::session::Session;

/// What a committed `Collecting` buffer is an argument for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    GoToUri,
    ShowUri,
    AppendSelector,
    YankById,
    SearchForward,
    SearchBackward,
    LinkNumber,
}

impl Mode {
    /// The key that started this mode, echoed before the buffer on the
    /// status line. Number entry has no prefix.
    fn command_char(self) -> Option<char> {
        match self {
            Mode::GoToUri => Some(':'),
            Mode::ShowUri => Some('+'),
            Mode::AppendSelector => Some('a'),
            Mode::YankById => Some('y'),
            Mode::SearchForward => Some('/'),
            Mode::SearchBackward => Some('?'),
            Mode::LinkNumber => None,
        }
    }
}

#[derive(Debug)]
enum State {
    Normal,
    Collecting { mode: Mode, buffer: String },
}

/// What the caller should do in response to a key.
#[derive(Debug)]
pub enum Action {
    None,
    Redraw,
    Quit,
    ScrollLineDown,
    ScrollLineUp,
    ScrollHalfDown,
    ScrollHalfUp,
    ScrollTop,
    ScrollBottom,
    /// Fetch this element, recording history.
    Navigate(Element),
    Back,
    Reload,
    Root,
    ShowHelp,
    ShowHistory,
    /// Put a message in the status slot without doing anything else.
    ShowMessage(String),
    /// Hand this element's URI to the yank command.
    Yank(Element),
    Search { pattern: String, backward: bool },
    SearchRepeat { backward: bool },
    /// Report an error in the status slot.
    Fail(BurrowError),
}

pub struct InputState {
    state: State,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self {
            state: State::Normal,
        }
    }

    /// The pending command prefix and buffer, for status-line echo.
    pub fn echo(&self) -> Option<(Option<char>, &str)> {
        match &self.state {
            State::Normal => None,
            State::Collecting { mode, buffer } => Some((mode.command_char(), buffer)),
        }
    }

    pub fn is_collecting(&self) -> bool {
        matches!(self.state, State::Collecting { .. })
    }

    pub fn handle_key(&mut self, key: Key, session: &Session) -> Action {
        if self.is_collecting() {
            self.handle_collecting(key, session)
        } else {
            self.handle_normal(key, session)
        }
    }

    // ---- normal mode ----

    fn handle_normal(&mut self, key: Key, session: &Session) -> Action {
        match key {
            Key::Char(':') => self.start(Mode::GoToUri),
            Key::Char('+') => self.start(Mode::ShowUri),
            Key::Char('a') => self.start_remote(Mode::AppendSelector, session),
            Key::Char('y') => self.start_remote(Mode::YankById, session),
            Key::Char('/') => self.start(Mode::SearchForward),
            Key::Char('?') => self.start(Mode::SearchBackward),
            Key::Char(c) if c.is_ascii_digit() => {
                self.state = State::Collecting {
                    mode: Mode::LinkNumber,
                    buffer: String::new(),
                };
                self.push_digit(c, session)
            }
            Key::Char('n') => Action::SearchRepeat { backward: false },
            Key::Char('N') => Action::SearchRepeat { backward: true },
            Key::Char('j') | Key::Down => Action::ScrollLineDown,
            Key::Char('k') | Key::Up => Action::ScrollLineUp,
            Key::PageDown => Action::ScrollHalfDown,
            Key::PageUp => Action::ScrollHalfUp,
            Key::Char('g') => Action::ScrollTop,
            Key::Char('G') => Action::ScrollBottom,
            Key::Char('<') => Action::Back,
            Key::Char('*') => Self::remote_only(Action::Reload, session),
            Key::Char('r') => Self::remote_only(Action::Root, session),
            Key::Char('h') => Action::ShowHelp,
            Key::Char('H') => Action::ShowHistory,
            Key::Char('q') | Key::Quit => Action::Quit,
            Key::Resize => Action::Redraw,
            Key::Enter | Key::Backspace | Key::Esc => Action::None,
            Key::Char(_) => Action::Fail(BurrowError::NotBound),
        }
    }

    fn start(&mut self, mode: Mode) -> Action {
        self.state = State::Collecting {
            mode,
            buffer: String::new(),
        };
        Action::Redraw
    }

    /// Enter `mode` only when the session points at a real server.
    fn start_remote(&mut self, mode: Mode, session: &Session) -> Action {
        if !session.is_remote_session() {
            return Action::Fail(BurrowError::NotRemote);
        }
        self.start(mode)
    }

    fn remote_only(action: Action, session: &Session) -> Action {
        if !session.is_remote_session() {
            return Action::Fail(BurrowError::NotRemote);
        }
        action
    }

    // ---- collecting mode ----

    fn handle_collecting(&mut self, key: Key, session: &Session) -> Action {
        match key {
            Key::Esc => {
                self.state = State::Normal;
                Action::Redraw
            }
            Key::Backspace => {
                let State::Collecting { buffer, .. } = &mut self.state else {
                    return Action::None;
                };
                if buffer.pop().is_none() {
                    self.state = State::Normal;
                }
                Action::Redraw
            }
            Key::Enter => self.commit(session),
            Key::Char(c) => self.push_char(c, session),
            Key::Resize => Action::Redraw,
            Key::Quit => Action::Quit,
            _ => Action::None,
        }
    }

    fn push_char(&mut self, c: char, session: &Session) -> Action {
        let State::Collecting { mode, .. } = &self.state else {
            return Action::None;
        };
        if *mode == Mode::LinkNumber {
            return self.push_digit(c, session);
        }
        if c.is_control() {
            return Action::None;
        }
        let State::Collecting { buffer, .. } = &mut self.state else {
            return Action::None;
        };
        buffer.push(c);
        Action::Redraw
    }

    /// Append a digit to a link number, committing as soon as the value
    /// can no longer be a prefix of a valid id (value * 10 > last_id).
    fn push_digit(&mut self, c: char, session: &Session) -> Action {
        if !c.is_ascii_digit() {
            return Action::None;
        }
        let State::Collecting { buffer, .. } = &mut self.state else {
            return Action::None;
        };
        buffer.push(c);
        let value = buffer.parse::<u64>().unwrap_or(u64::MAX);
        if value.saturating_mul(10) > u64::from(session.page.last_id()) {
            return self.commit(session);
        }
        Action::Redraw
    }

    fn commit(&mut self, session: &Session) -> Action {
        let State::Collecting { mode, buffer } = std::mem::replace(&mut self.state, State::Normal)
        else {
            return Action::None;
        };
        match mode {
            Mode::GoToUri => match parse_uri(&buffer) {
                Ok(element) => Action::Navigate(element),
                Err(err) => Action::Fail(err),
            },
            Mode::ShowUri => match resolve_link(&buffer, session) {
                Ok(element) => Action::ShowMessage(format_uri(element)),
                Err(err) => Action::Fail(err),
            },
            Mode::AppendSelector => match session.remote_current() {
                Ok(current) => {
                    let mut element = current.clone();
                    element.selector.push_str(&buffer);
                    Action::Navigate(element)
                }
                Err(err) => Action::Fail(err),
            },
            Mode::YankById => {
                let resolved = if buffer.is_empty() {
                    session.remote_current()
                } else {
                    resolve_link(&buffer, session)
                };
                match resolved {
                    Ok(element) => Action::Yank(element.clone()),
                    Err(err) => Action::Fail(err),
                }
            }
            Mode::SearchForward => Action::Search {
                pattern: buffer,
                backward: false,
            },
            Mode::SearchBackward => Action::Search {
                pattern: buffer,
                backward: true,
            },
            Mode::LinkNumber => match resolve_link(&buffer, session) {
                Ok(element) => Action::Navigate(element.clone()),
                Err(err) => Action::Fail(err),
            },
        }
    }
}

/// A link id argument: a positive integer no greater than the highest
/// assigned id.
fn resolve_link<'a>(buffer: &str, session: &'a Session) -> Result<&'a Element, BurrowError> {
    let id = buffer.parse::<u32>().ok().filter(|&id| id >= 1);
    id.and_then(|id| session.page.by_id(id))
        .ok_or_else(|| BurrowError::NoSuchLink(buffer.to_owned()))
}

// ---- tests ----
