//! The navigation engine: fetch a target, replace the page.
//!
//! A navigation either succeeds completely or leaves the session
//! untouched. The page, current location, search state, and scroll
//! position are only replaced after the whole response has been read,
//! so a refused connection or a mid-transfer error never clobbers what
//! the user is looking at.

use burrow_net::Transport;
use burrow_proto::menu::parse_menu_line;
use burrow_proto::uri::format_uri;
use burrow_types::error::{BurrowError, Result};
use burrow_types::item::{Element, ItemType};
use burrow_types::page::Document;

use crate::collab::{Plumber, Prompter};
use crate::session::Session;

/// Placed at the end of a menu whose terminator never arrived.
const INCOMPLETE_TRANSFER: &str = "incomplete transfer";

/// How a navigation request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The page was replaced and Current updated.
    Loaded,
    /// The item was handed to the plumber; nothing changed.
    Plumbed,
    /// The user cancelled a prompt; nothing changed.
    Cancelled,
}

/// Whether the next connection attempt uses TLS, and on whose say-so.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TlsAttempt {
    /// The target asked for TLS (`gophers://` or an inherited flag).
    Explicit,
    /// Nothing asked for TLS; we are probing because `auto_tls` is on.
    Opportunistic,
    Plain,
}

impl TlsAttempt {
    fn uses_tls(self) -> bool {
        !matches!(self, TlsAttempt::Plain)
    }

    /// Opportunistic probes fail silently; everything else reports.
    fn is_silent(self) -> bool {
        matches!(self, TlsAttempt::Opportunistic)
    }
}

/// Fetch `target` and make it the current page.
///
/// Non-navigable items are handed to the plumber instead. A search
/// item without a query prompts for one first. TLS failures fall back
/// to cleartext: silently when the TLS attempt was only opportunistic,
/// after user confirmation when the target asked for TLS itself.
pub fn navigate(
    session: &mut Session,
    target: Element,
    record_history: bool,
    suppress_autotls: bool,
    prompter: &mut dyn Prompter,
    plumber: &mut dyn Plumber,
) -> Result<Outcome> {
    if !target.item_type.navigable() {
        plumber.plumb(&format_uri(&target))?;
        return Ok(Outcome::Plumbed);
    }

    let mut target = target;
    if target.item_type == ItemType::Search && !target.selector.contains('\t') {
        let Some(query) = prompter.prompt_line("search query") else {
            return Ok(Outcome::Cancelled);
        };
        target.selector.push('\t');
        target.selector.push_str(&query);
    }

    let mut attempt = initial_attempt(session, &target, suppress_autotls);
    loop {
        let mut fetch = target.clone();
        fetch.use_tls = attempt.uses_tls();
        match session.transport.connect(&fetch, attempt.is_silent()) {
            Ok(()) => {
                target.use_tls = fetch.use_tls;
                break;
            }
            Err(err) => match attempt {
                TlsAttempt::Opportunistic => {
                    log::debug!("TLS probe of {} failed ({err}), retrying cleartext", target.server);
                    attempt = TlsAttempt::Plain;
                }
                TlsAttempt::Explicit => {
                    let retry =
                        prompter.confirm("Try again in cleartext?", session.config.prompt_timeout());
                    if retry {
                        attempt = TlsAttempt::Plain;
                    } else {
                        return Err(err);
                    }
                }
                TlsAttempt::Plain => return Err(err),
            },
        }
    }

    // Close on every path, including a mid-transfer failure.
    let page = fetch_page(&mut session.transport, &target);
    session.transport.close();
    let page = page?;

    if record_history {
        if let Some(prev) = session.current.take() {
            if prev.is_remote() {
                session.history.push(prev);
            }
        }
    }
    session.current = Some(target);
    session.page = page;
    session.search.clear();
    session.scroll = 0;
    Ok(Outcome::Loaded)
}

/// Pop the most recent history entry and go there. The entry is
/// consumed either way, and the page we leave is not re-recorded.
pub fn back(
    session: &mut Session,
    prompter: &mut dyn Prompter,
    plumber: &mut dyn Plumber,
) -> Result<Outcome> {
    let Some(previous) = session.history.pop() else {
        return Err(BurrowError::NoHistory);
    };
    navigate(session, previous, false, false, prompter, plumber)
}

/// Refetch the current location without touching history.
pub fn reload(
    session: &mut Session,
    prompter: &mut dyn Prompter,
    plumber: &mut dyn Plumber,
) -> Result<Outcome> {
    let target = session.remote_current()?.clone();
    navigate(session, target, false, false, prompter, plumber)
}

/// Go to the top-level menu of the current server.
pub fn root(
    session: &mut Session,
    prompter: &mut dyn Prompter,
    plumber: &mut dyn Plumber,
) -> Result<Outcome> {
    let mut target = session.remote_current()?.clone();
    target.item_type = ItemType::Menu;
    target.selector.clear();
    navigate(session, target, true, false, prompter, plumber)
}

fn initial_attempt(session: &Session, target: &Element, suppress_autotls: bool) -> TlsAttempt {
    if target.use_tls {
        TlsAttempt::Explicit
    } else if session.config.auto_tls
        && !suppress_autotls
        && session
            .current
            .as_ref()
            .is_none_or(|current| current.server != target.server)
    {
        TlsAttempt::Opportunistic
    } else {
        TlsAttempt::Plain
    }
}

/// Send the selector and read the response on an open transport.
fn fetch_page(transport: &mut Transport, target: &Element) -> Result<Document> {
    transport.write_all(format!("{}\r\n", target.selector).as_bytes())?;
    read_page(transport, target)
}

/// Read lines until the `.` terminator or EOF. Menu-typed responses
/// are parsed line by line; document responses become plain info
/// elements. A menu that ends without its terminator gets a trailing
/// error element so the truncation is visible.
fn read_page(transport: &mut Transport, source: &Element) -> Result<Document> {
    let as_document = source.item_type == ItemType::Document;
    let mut elements = Vec::new();
    let mut lines = LineReader::new();
    let mut terminated = false;
    while let Some(line) = lines.next_line(transport)? {
        if line == "." {
            terminated = true;
            break;
        }
        if as_document {
            elements.push(Element::new(ItemType::Info, line));
        } else {
            elements.push(parse_menu_line(&line, Some(source)));
        }
    }
    if !terminated && !as_document {
        elements.push(Element::new(ItemType::Error, INCOMPLETE_TRANSFER));
    }
    Ok(Document::from_elements(elements))
}

/// Splits a byte stream into lines. Lines end at `\n`; a trailing
/// `\r` is stripped. Data after the last newline still counts as a
/// final line at EOF.
struct LineReader {
    buf: Vec<u8>,
    pos: usize,
    eof: bool,
}

impl LineReader {
    fn new() -> Self {
        Self {
            buf: Vec::new(),
            pos: 0,
            eof: false,
        }
    }

    fn next_line(&mut self, transport: &mut Transport) -> Result<Option<String>> {
        loop {
            if let Some(offset) = self.buf[self.pos..].iter().position(|&b| b == b'\n') {
                let end = self.pos + offset;
                let line = Self::to_line(&self.buf[self.pos..end]);
                self.pos = end + 1;
                return Ok(Some(line));
            }
            if self.eof {
                if self.pos < self.buf.len() {
                    let line = Self::to_line(&self.buf[self.pos..]);
                    self.pos = self.buf.len();
                    return Ok(Some(line));
                }
                return Ok(None);
            }
            let mut chunk = [0u8; 4096];
            let n = transport.read(&mut chunk)?;
            if n == 0 {
                self.eof = true;
            } else {
                self.buf.extend_from_slice(&chunk[..n]);
            }
        }
    }

    fn to_line(bytes: &[u8]) -> String {
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
        String::from_utf8_lossy(bytes).into_owned()
    }
}

// ---- tests ----
