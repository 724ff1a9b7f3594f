//! Terminal front end, built on crossterm.
//!
//! The page fills every row but the last; the last row is the status
//! bar (current location plus any pending command input) or, when set,
//! the one-slot notice. Raw mode and the alternate screen are restored
//! on drop and temporarily handed back to foreground children via
//! [`suspended`].

use std::io::{self, Stdout, Write as _};
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use burrow_core::collab::Prompter;
use burrow_core::input::InputState;
use burrow_core::session::Session;
use burrow_proto::uri::format_uri;
use burrow_types::error::Result;
use burrow_types::input::Key;
use burrow_types::item::{DisplayKind, Element, ItemType};

/// Separates the type label from the description.
const SEPARATOR: &str = "│";
/// Marks a line cut off at the right edge.
const TOO_LONG: &str = ">";

enum Notice {
    Error(String),
    Message(String),
}

pub struct Tui {
    out: Stdout,
    notice: Option<Notice>,
}

impl Tui {
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, cursor::Hide)?;
        Ok(Self { out, notice: None })
    }

    /// Rows available for the page (everything above the bar).
    pub fn view_height(&self) -> Result<usize> {
        let (_, rows) = terminal::size()?;
        Ok(usize::from(rows).saturating_sub(1))
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice::Error(message.into()));
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice::Message(message.into()));
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Wait up to `tick` for a key. `None` means the tick elapsed.
    pub fn poll_key(&mut self, tick: Duration) -> Result<Option<Key>> {
        if !event::poll(tick)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(translate_key(key)),
            Event::Resize(_, _) => Ok(Some(Key::Resize)),
            _ => Ok(None),
        }
    }

    pub fn draw(&mut self, session: &Session, input: &InputState) -> Result<()> {
        let (cols, rows) = terminal::size()?;
        let width = usize::from(cols);
        let height = usize::from(rows).saturating_sub(1);

        queue!(self.out, cursor::Hide, Clear(ClearType::All))?;
        for (row, element) in session
            .page
            .iter()
            .skip(session.scroll)
            .take(height)
            .enumerate()
        {
            queue!(self.out, cursor::MoveTo(0, row as u16))?;
            self.draw_line(element, session, width)?;
        }
        self.draw_bar(session, input, width, rows)?;
        self.out.flush()?;
        Ok(())
    }

    /// ` NN LABEL │ description`, after zygo's layout.
    fn draw_line(&mut self, element: &Element, session: &Session, width: usize) -> Result<()> {
        match element.id {
            Some(id) => queue!(
                self.out,
                SetForegroundColor(Color::DarkBlue),
                Print(format!("{id:>3} ")),
                ResetColor
            )?,
            None => queue!(self.out, Print("    "))?,
        }

        let (label, label_color) = scheme(element);
        match label_color {
            Some(color) => queue!(
                self.out,
                SetForegroundColor(color),
                Print(label),
                ResetColor
            )?,
            None => queue!(self.out, Print(label))?,
        }
        queue!(self.out, Print(format!(" {SEPARATOR} ")))?;

        let used = 4 + label.chars().count() + 3;
        let (text, truncated) = clip(&element.description, width.saturating_sub(used));

        let text_color = match element.display_kind(session.config.markdown_headers) {
            DisplayKind::MdHeader(level) => Some(header_color(level)),
            _ => None,
        };
        if session.search.matches(&element.description) {
            queue!(self.out, SetAttribute(Attribute::Reverse))?;
        }
        if let Some(color) = text_color {
            queue!(self.out, SetForegroundColor(color))?;
        }
        queue!(self.out, Print(text))?;
        if truncated {
            queue!(self.out, Print(TOO_LONG))?;
        }
        queue!(self.out, ResetColor, SetAttribute(Attribute::Reset))?;
        Ok(())
    }

    fn draw_bar(
        &mut self,
        session: &Session,
        input: &InputState,
        width: usize,
        rows: u16,
    ) -> Result<()> {
        queue!(
            self.out,
            cursor::MoveTo(0, rows.saturating_sub(1)),
            Clear(ClearType::CurrentLine)
        )?;

        match &self.notice {
            Some(Notice::Error(message)) => {
                queue!(
                    self.out,
                    SetForegroundColor(Color::AnsiValue(160)),
                    Print(format!(" error: {message} ")),
                    ResetColor
                )?;
                return Ok(());
            }
            Some(Notice::Message(message)) => {
                queue!(
                    self.out,
                    SetAttribute(Attribute::Reverse),
                    Print(format!(" {message} ")),
                    SetAttribute(Attribute::Reset)
                )?;
                return Ok(());
            }
            None => {}
        }

        let echo = input.echo();
        let echo_len = echo
            .map(|(command, buffer)| usize::from(command.is_some()) + buffer.chars().count())
            .unwrap_or(0);
        let location = location_of(session);
        let (location, _) = clip(&location, width.saturating_sub(echo_len + 4));
        queue!(
            self.out,
            SetAttribute(Attribute::Reverse),
            Print(format!(" {location} ")),
            SetAttribute(Attribute::Reset),
            Print(" ")
        )?;
        if let Some((command, buffer)) = echo {
            if let Some(c) = command {
                queue!(
                    self.out,
                    SetAttribute(Attribute::Bold),
                    Print(c),
                    SetAttribute(Attribute::Reset)
                )?;
            }
            queue!(self.out, Print(buffer), cursor::Show)?;
        }
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = execute!(self.out, LeaveAlternateScreen, cursor::Show);
        let _ = terminal::disable_raw_mode();
    }
}

impl Prompter for Tui {
    fn prompt_line(&mut self, label: &str) -> Option<String> {
        let mut buffer = String::new();
        loop {
            if self.draw_prompt(label, &buffer).is_err() {
                return None;
            }
            let Ok(event) = event::read() else {
                return None;
            };
            let Event::Key(key) = event else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match (key.modifiers.contains(KeyModifiers::CONTROL), key.code) {
                (true, KeyCode::Char('c')) => return None,
                (false, KeyCode::Char(c)) => buffer.push(c),
                (_, KeyCode::Enter) => return Some(buffer),
                (_, KeyCode::Esc) => return None,
                (_, KeyCode::Backspace) => {
                    buffer.pop();
                }
                _ => {}
            }
        }
    }

    fn confirm(&mut self, question: &str, timeout: Duration) -> bool {
        if self.draw_question(question).is_err() {
            return false;
        }
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match event::poll(remaining) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        return matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'));
                    }
                    Ok(_) => {}
                    Err(_) => return false,
                },
                Ok(false) => return false,
                Err(_) => return false,
            }
        }
    }
}

impl Tui {
    fn draw_prompt(&mut self, label: &str, buffer: &str) -> Result<()> {
        let (_, rows) = terminal::size()?;
        queue!(
            self.out,
            cursor::MoveTo(0, rows.saturating_sub(1)),
            Clear(ClearType::CurrentLine),
            SetAttribute(Attribute::Bold),
            Print(format!("{label}: ")),
            SetAttribute(Attribute::Reset),
            Print(buffer),
            cursor::Show
        )?;
        self.out.flush()?;
        Ok(())
    }

    fn draw_question(&mut self, question: &str) -> Result<()> {
        let (_, rows) = terminal::size()?;
        queue!(
            self.out,
            cursor::MoveTo(0, rows.saturating_sub(1)),
            Clear(ClearType::CurrentLine),
            SetAttribute(Attribute::Bold),
            Print(format!("{question} ")),
            SetAttribute(Attribute::Reset)
        )?;
        self.out.flush()?;
        Ok(())
    }
}

/// Hand the terminal to another program for the duration of `f`.
pub fn suspended<T>(f: impl FnOnce() -> T) -> Result<T> {
    let mut out = io::stdout();
    execute!(out, LeaveAlternateScreen, cursor::Show)?;
    terminal::disable_raw_mode()?;
    let value = f();
    terminal::enable_raw_mode()?;
    execute!(out, EnterAlternateScreen, cursor::Hide)?;
    Ok(value)
}

fn location_of(session: &Session) -> String {
    match &session.current {
        Some(current) if current.is_remote() => format_uri(current),
        Some(current) => current.description.clone(),
        None => String::new(),
    }
}

fn translate_key(key: KeyEvent) -> Option<Key> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Key::Quit),
            KeyCode::Char('d') | KeyCode::Char('f') => Some(Key::PageDown),
            KeyCode::Char('u') | KeyCode::Char('b') => Some(Key::PageUp),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Esc => Some(Key::Esc),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::PageUp => Some(Key::PageUp),
        KeyCode::PageDown => Some(Key::PageDown),
        _ => None,
    }
}

/// Type label and its color, after zygo's palette. Types zygo did not
/// list fall through to `????`.
fn scheme(element: &Element) -> (&'static str, Option<Color>) {
    if element.display_kind(false) == DisplayKind::ExtractedUrl {
        return ("Extr", Some(Color::DarkMagenta));
    }
    match element.item_type {
        ItemType::Info => ("    ", None),
        ItemType::Document => ("Text", None),
        ItemType::Menu => ("Dir ", Some(Color::DarkGreen)),
        ItemType::Ccso => ("CCSO", Some(Color::DarkYellow)),
        ItemType::BinHex | ItemType::Dos | ItemType::Binary => ("Bin ", Some(Color::DarkBlue)),
        ItemType::Search => ("Srch", Some(Color::DarkYellow)),
        ItemType::Telnet | ItemType::Tn3270 => ("Teln", Some(Color::DarkMagenta)),
        ItemType::Redundant => ("Alt ", Some(Color::DarkMagenta)),
        ItemType::Image | ItemType::Gif => ("Img ", Some(Color::DarkCyan)),
        ItemType::Html => ("HTML", Some(Color::DarkMagenta)),
        ItemType::Sound => ("Snd ", Some(Color::Grey)),
        ItemType::Doc => ("Doc ", Some(Color::DarkGrey)),
        ItemType::Error => ("ERR ", Some(Color::DarkRed)),
        ItemType::Uuencoded | ItemType::Other(_) => ("????", Some(Color::DarkGrey)),
    }
}

/// Markdown header text colors, level 1 through 4.
fn header_color(level: u8) -> Color {
    match level {
        1 => Color::DarkCyan,
        2 => Color::DarkMagenta,
        3 => Color::DarkBlue,
        _ => Color::DarkYellow,
    }
}

/// Cut `text` to fit `max` columns, leaving room for the overflow mark.
fn clip(text: &str, max: usize) -> (&str, bool) {
    if text.chars().count() <= max {
        return (text, false);
    }
    let keep = max.saturating_sub(1);
    let end = text
        .char_indices()
        .nth(keep)
        .map_or(text.len(), |(index, _)| index);
    (&text[..end], true)
}

// ---- tests ----
