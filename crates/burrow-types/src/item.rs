//! Gopher item types and the element value type.
//!
//! An [`Element`] is one line of a menu (or one synthesized entry): an item
//! type, a description, and (for remote entries) the selector/server/port
//! triple needed to fetch it. Elements are owned values and are cloned
//! whenever they move between the page, the current location, and history;
//! nothing ever holds a reference into another container.

/// Gopher item type, from the single-character code leading each menu line.
///
/// The set is closed over the types this client knows how to label;
/// anything else is carried through [`ItemType::Other`] so unknown types
/// still render and still reach the plumber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    /// `'0'`: plain text document, rendered in-client.
    Document,
    /// `'1'`: menu (directory listing).
    Menu,
    /// `'2'`: CCSO nameserver.
    Ccso,
    /// `'3'`: error entry.
    Error,
    /// `'4'`: BinHex file.
    BinHex,
    /// `'5'`: DOS binary.
    Dos,
    /// `'6'`: uuencoded file.
    Uuencoded,
    /// `'7'`: search service; selector carries the query after a tab.
    Search,
    /// `'8'`: telnet session.
    Telnet,
    /// `'9'`: binary file.
    Binary,
    /// `'+'`: redundant server for the current menu.
    Redundant,
    /// `'T'`: tn3270 session.
    Tn3270,
    /// `'g'`: GIF image.
    Gif,
    /// `'I'`: image.
    Image,
    /// `'i'`: informational text, not selectable.
    Info,
    /// `'h'`: HTML document; selectors starting `URL:` embed a web URL.
    Html,
    /// `'s'`: sound file.
    Sound,
    /// `'d'`: document (PDF and friends).
    Doc,
    /// Any code not listed above.
    Other(char),
}

impl ItemType {
    pub fn from_char(c: char) -> Self {
        match c {
            '0' => ItemType::Document,
            '1' => ItemType::Menu,
            '2' => ItemType::Ccso,
            '3' => ItemType::Error,
            '4' => ItemType::BinHex,
            '5' => ItemType::Dos,
            '6' => ItemType::Uuencoded,
            '7' => ItemType::Search,
            '8' => ItemType::Telnet,
            '9' => ItemType::Binary,
            '+' => ItemType::Redundant,
            'T' => ItemType::Tn3270,
            'g' => ItemType::Gif,
            'I' => ItemType::Image,
            'i' => ItemType::Info,
            'h' => ItemType::Html,
            's' => ItemType::Sound,
            'd' => ItemType::Doc,
            other => ItemType::Other(other),
        }
    }

    pub fn as_char(self) -> char {
        match self {
            ItemType::Document => '0',
            ItemType::Menu => '1',
            ItemType::Ccso => '2',
            ItemType::Error => '3',
            ItemType::BinHex => '4',
            ItemType::Dos => '5',
            ItemType::Uuencoded => '6',
            ItemType::Search => '7',
            ItemType::Telnet => '8',
            ItemType::Binary => '9',
            ItemType::Redundant => '+',
            ItemType::Tn3270 => 'T',
            ItemType::Gif => 'g',
            ItemType::Image => 'I',
            ItemType::Info => 'i',
            ItemType::Html => 'h',
            ItemType::Sound => 's',
            ItemType::Doc => 'd',
            ItemType::Other(c) => c,
        }
    }

    /// Types the navigation engine fetches itself. Everything else goes to
    /// the plumber.
    pub fn navigable(self) -> bool {
        matches!(
            self,
            ItemType::Document | ItemType::Menu | ItemType::Search | ItemType::Redundant
        )
    }

    /// Types that receive a link id. Info and error lines are display-only
    /// and are never jump targets.
    pub fn carries_id(self) -> bool {
        !matches!(self, ItemType::Info | ItemType::Error)
    }

    pub fn is_telnet(self) -> bool {
        matches!(self, ItemType::Telnet | ItemType::Tn3270)
    }
}

/// How an element should be presented, beyond its item type. Derived at
/// render time, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
    Plain,
    /// HTML element whose selector embeds a web URL (`URL:...`).
    ExtractedUrl,
    /// Markdown-style header in an info line, level 1-4. Only produced when
    /// the markdown option is on.
    MdHeader(u8),
}

/// One navigable or informational entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub item_type: ItemType,
    pub description: String,
    pub selector: String,
    pub server: String,
    pub port: String,
    pub use_tls: bool,
    /// Assigned by [`Document::push`](crate::page::Document::push) for
    /// id-bearing types; `None` otherwise.
    pub id: Option<u32>,
}

impl Element {
    /// A bare element with no remote coordinates.
    pub fn new(item_type: ItemType, description: impl Into<String>) -> Self {
        Element {
            item_type,
            description: description.into(),
            selector: String::new(),
            server: String::new(),
            port: String::new(),
            use_tls: false,
            id: None,
        }
    }

    /// True when this element points at a server, i.e. commands that
    /// re-contact the remote side (reload, root, append, yank) make sense.
    pub fn is_remote(&self) -> bool {
        !self.server.is_empty() && !self.port.is_empty()
    }

    pub fn display_kind(&self, markdown_headers: bool) -> DisplayKind {
        if self.item_type == ItemType::Html && self.selector.contains("URL:") {
            return DisplayKind::ExtractedUrl;
        }
        if markdown_headers && self.item_type == ItemType::Info {
            let level = self.description.chars().take_while(|&c| c == '#').count();
            if (1..=4).contains(&level)
                && self.description[level..].starts_with(' ')
            {
                return DisplayKind::MdHeader(level as u8);
            }
        }
        DisplayKind::Plain
    }
}
