//! Menu-line codec.
//!
//! One response line `<type><description>\t<selector>\t<server>\t<port>`
//! becomes an element. Parse problems never escape as errors: a malformed
//! line turns into a synthetic error element, so one bad line cannot take
//! down a whole menu.

use burrow_types::item::{Element, ItemType};

/// Description carried by elements synthesized from unparseable lines.
pub const INVALID_LINE: &str = "invalid gopher menu element";

/// Selector/server/port placeholder on synthesized error elements.
const PLACEHOLDER: &str = "Err";

/// Decode one menu line (CR/LF already stripped).
///
/// `source` is the element whose fetch produced this line. A line pointing
/// back at the same server and port inherits the source's TLS flag; links
/// to any other server are never implicitly upgraded.
pub fn parse_menu_line(line: &str, source: Option<&Element>) -> Element {
    let Some((type_char, description, selector, server, port)) = split_line(line) else {
        return invalid_element();
    };

    let mut element = Element::new(ItemType::from_char(type_char), description);
    element.use_tls =
        source.is_some_and(|src| src.use_tls && src.server == server && src.port == port);
    element.selector = selector;
    element.server = server;
    element.port = port;
    element
}

/// The element standing in for a line that would not parse.
pub fn invalid_element() -> Element {
    let mut element = Element::new(ItemType::Error, INVALID_LINE);
    element.selector = PLACEHOLDER.into();
    element.server = PLACEHOLDER.into();
    element.port = PLACEHOLDER.into();
    element
}

fn split_line(line: &str) -> Option<(char, String, String, String, String)> {
    let type_char = line.chars().next()?;
    let rest = &line[type_char.len_utf8()..];

    let mut fields = rest.split('\t');
    let description = fields.next()?;
    let selector = fields.next()?;
    let server = fields.next()?;
    let port = fields.next()?;

    // Gopher+ marks itself with a fifth field starting '+' or '?', which is
    // tolerated and discarded. Any other text after the port is malformed.
    if let Some(extra) = fields.next() {
        if !extra.starts_with('+') && !extra.starts_with('?') {
            return None;
        }
    }

    Some((
        type_char,
        description.to_string(),
        selector.to_string(),
        server.to_string(),
        port.to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(server: &str, port: &str, use_tls: bool) -> Element {
        let mut e = Element::new(ItemType::Menu, "source");
        e.server = server.into();
        e.port = port.into();
        e.use_tls = use_tls;
        e
    }

    #[test]
    fn well_formed_line() {
        let e = parse_menu_line("1Dir\t/dir\texample.com\t70", None);
        assert_eq!(e.item_type, ItemType::Menu);
        assert_eq!(e.description, "Dir");
        assert_eq!(e.selector, "/dir");
        assert_eq!(e.server, "example.com");
        assert_eq!(e.port, "70");
        assert!(!e.use_tls);
    }

    #[test]
    fn missing_fields_become_error_element() {
        let e = parse_menu_line("1Dir\t/dir", None);
        assert_eq!(e.item_type, ItemType::Error);
        assert_eq!(e.description, INVALID_LINE);
        assert_eq!(e.selector, "Err");
        assert_eq!(e.server, "Err");
        assert_eq!(e.port, "Err");
    }

    #[test]
    fn empty_line_is_invalid() {
        let e = parse_menu_line("", None);
        assert_eq!(e.item_type, ItemType::Error);
        assert_eq!(e.description, INVALID_LINE);
    }

    #[test]
    fn empty_description_is_fine() {
        let e = parse_menu_line("i\t\tnull.host\t1", None);
        assert_eq!(e.item_type, ItemType::Info);
        assert_eq!(e.description, "");
    }

    #[test]
    fn gopher_plus_field_tolerated() {
        let e = parse_menu_line("1Dir\t/dir\texample.com\t70\t+", None);
        assert_eq!(e.item_type, ItemType::Menu);
        assert_eq!(e.port, "70");

        let e = parse_menu_line("7Find\t/find\texample.com\t70\t?", None);
        assert_eq!(e.item_type, ItemType::Search);
        assert_eq!(e.port, "70");
    }

    #[test]
    fn other_text_after_port_is_invalid() {
        let e = parse_menu_line("1Dir\t/dir\texample.com\t70\tmore", None);
        assert_eq!(e.item_type, ItemType::Error);
        assert_eq!(e.description, INVALID_LINE);
    }

    #[test]
    fn tls_inherited_for_same_server_and_port() {
        let src = source("example.com", "70", true);
        let e = parse_menu_line("1Dir\t/dir\texample.com\t70", Some(&src));
        assert!(e.use_tls);
    }

    #[test]
    fn tls_not_inherited_across_servers() {
        let src = source("example.com", "70", true);
        let e = parse_menu_line("1Dir\t/dir\tother.org\t70", Some(&src));
        assert!(!e.use_tls);
    }

    #[test]
    fn tls_not_inherited_across_ports() {
        let src = source("example.com", "70", true);
        let e = parse_menu_line("1Dir\t/dir\texample.com\t7070", Some(&src));
        assert!(!e.use_tls);
    }

    #[test]
    fn cleartext_source_never_upgrades() {
        let src = source("example.com", "70", false);
        let e = parse_menu_line("1Dir\t/dir\texample.com\t70", Some(&src));
        assert!(!e.use_tls);
    }

    #[test]
    fn unknown_type_char_preserved() {
        let e = parse_menu_line("zWeird\t/z\texample.com\t70", None);
        assert_eq!(e.item_type, ItemType::Other('z'));
        assert_eq!(e.description, "Weird");
    }

    #[test]
    fn description_with_spaces_kept_verbatim() {
        let e = parse_menu_line("0A longer title here\t/doc\texample.com\t70", None);
        assert_eq!(e.description, "A longer title here");
        assert_eq!(e.item_type, ItemType::Document);
    }
}
