//! Location codec: URI text to element and back.
//!
//! The accepted shape is `gopher://server[:port][/type[selector]]`, with
//! `gophers://` marking TLS. A tab anywhere jumps straight to the selector
//! and is carried verbatim from there on (search queries embed one).
//! Bracketed IPv6 literals and bare multi-colon IPv6 text both work as the
//! server.

use burrow_types::error::{BurrowError, Result};
use burrow_types::item::{Element, ItemType};

// ---- parsing ----

/// Parse a location string into an element.
///
/// Any scheme other than `gopher://`/`gophers://` is rejected. The server
/// must be non-empty; the item type defaults to menu, the port to 70, the
/// selector to empty.
pub fn parse_uri(uri: &str) -> Result<Element> {
    let (rest, use_tls) = strip_scheme(uri)?;

    // The authority runs to the first '/' or tab: a server plus an optional
    // port after a closing IPv6 bracket or a single unambiguous colon.
    let authority_end = rest.find(['/', '\t']).unwrap_or(rest.len());
    let (server, port) = split_authority(&rest[..authority_end], uri)?;

    let mut element = Element::new(ItemType::Menu, "");
    element.use_tls = use_tls;
    element.server = server;
    element.port = port.unwrap_or_else(|| String::from("70"));

    match rest.as_bytes().get(authority_end) {
        None => {}
        Some(b'\t') => {
            // Tab before any type segment: the rest, tab included, is the
            // selector, and the type keeps its menu default.
            element.selector = rest[authority_end..].to_string();
        }
        Some(_) => {
            // '/' by construction of authority_end.
            let after = &rest[authority_end + 1..];
            match after.chars().next() {
                None => {}
                Some('\t') => element.selector = after.to_string(),
                Some(type_char) => {
                    element.item_type = ItemType::from_char(type_char);
                    element.selector = after[type_char.len_utf8()..].to_string();
                }
            }
        }
    }

    Ok(element)
}

fn strip_scheme(uri: &str) -> Result<(&str, bool)> {
    if let Some(rest) = uri.strip_prefix("gopher://") {
        Ok((rest, false))
    } else if let Some(rest) = uri.strip_prefix("gophers://") {
        Ok((rest, true))
    } else if uri.contains("://") {
        Err(BurrowError::UnsupportedScheme(uri.to_string()))
    } else {
        Ok((uri, false))
    }
}

fn split_authority(authority: &str, uri: &str) -> Result<(String, Option<String>)> {
    if authority.is_empty() {
        return Err(BurrowError::InvalidUri(format!("no server in {uri:?}")));
    }

    // Bracketed IPv6 literal, optionally followed by :port.
    if let Some(inner) = authority.strip_prefix('[') {
        let Some((server, after)) = inner.split_once(']') else {
            return Err(BurrowError::InvalidUri(format!(
                "unclosed bracket in {uri:?}"
            )));
        };
        if server.is_empty() {
            return Err(BurrowError::InvalidUri(format!("no server in {uri:?}")));
        }
        let port = if let Some(p) = after.strip_prefix(':') {
            Some(p.to_string())
        } else if after.is_empty() {
            None
        } else {
            return Err(BurrowError::InvalidUri(format!(
                "text after address in {uri:?}"
            )));
        };
        return Ok((server.to_string(), port));
    }

    // Exactly one colon splits server:port. More than one means a bare
    // IPv6 address, which is all server.
    if authority.bytes().filter(|&b| b == b':').count() == 1 {
        if let Some((server, port)) = authority.split_once(':') {
            if server.is_empty() {
                return Err(BurrowError::InvalidUri(format!("no server in {uri:?}")));
            }
            return Ok((server.to_string(), Some(port.to_string())));
        }
    }

    Ok((authority.to_string(), None))
}

// ---- formatting ----

/// Render an element back into a location string.
///
/// Telnet types use the `teln://` pseudo-scheme. HTML elements whose
/// selector embeds a web URL (`URL:` or `/URL:` prefix) yield that URL
/// directly, server and port ignored. Everything else is `gopher://` or
/// `gophers://` + server + port (omitted when 70) + `/` + type char +
/// selector (omitted when empty or exactly `/`).
pub fn format_uri(element: &Element) -> String {
    if element.item_type == ItemType::Html {
        if let Some(url) = element
            .selector
            .strip_prefix("URL:")
            .or_else(|| element.selector.strip_prefix("/URL:"))
        {
            return url.to_string();
        }
    }

    let scheme = if element.item_type.is_telnet() {
        "teln://"
    } else if element.use_tls {
        "gophers://"
    } else {
        "gopher://"
    };

    let mut uri = String::from(scheme);
    if element.server.contains(':') {
        // Re-bracket IPv6 so the port stays unambiguous on the way back in.
        uri.push('[');
        uri.push_str(&element.server);
        uri.push(']');
    } else {
        uri.push_str(&element.server);
    }
    if element.port != "70" {
        uri.push(':');
        uri.push_str(&element.port);
    }
    uri.push('/');
    uri.push(element.item_type.as_char());
    if !element.selector.is_empty() && element.selector != "/" {
        uri.push_str(&element.selector);
    }
    uri
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_uri_parses() {
        let e = parse_uri("gopher://example.com:7070/0/docs/readme.txt").unwrap();
        assert_eq!(e.item_type, ItemType::Document);
        assert_eq!(e.server, "example.com");
        assert_eq!(e.port, "7070");
        assert_eq!(e.selector, "/docs/readme.txt");
        assert!(!e.use_tls);
    }

    #[test]
    fn defaults_fill_in() {
        let e = parse_uri("gopher://example.com").unwrap();
        assert_eq!(e.item_type, ItemType::Menu);
        assert_eq!(e.port, "70");
        assert_eq!(e.selector, "");
    }

    #[test]
    fn bare_host_without_scheme() {
        let e = parse_uri("example.com/1/files").unwrap();
        assert_eq!(e.server, "example.com");
        assert_eq!(e.selector, "/files");
    }

    #[test]
    fn gophers_sets_tls() {
        let e = parse_uri("gophers://example.com").unwrap();
        assert!(e.use_tls);
    }

    #[test]
    fn foreign_scheme_rejected() {
        let err = parse_uri("https://example.com").unwrap_err();
        assert!(matches!(err, BurrowError::UnsupportedScheme(_)));
    }

    #[test]
    fn port_without_path() {
        let e = parse_uri("gopher://example.com:7070").unwrap();
        assert_eq!(e.server, "example.com");
        assert_eq!(e.port, "7070");
        assert_eq!(e.selector, "");
    }

    #[test]
    fn tab_jumps_to_selector() {
        let e = parse_uri("gopher://example.com\tquery").unwrap();
        assert_eq!(e.server, "example.com");
        assert_eq!(e.selector, "\tquery");
        assert_eq!(e.item_type, ItemType::Menu);
    }

    #[test]
    fn tab_after_port_keeps_port() {
        let e = parse_uri("gopher://example.com:7070\tq").unwrap();
        assert_eq!(e.port, "7070");
        assert_eq!(e.selector, "\tq");
    }

    #[test]
    fn search_query_rides_in_selector() {
        let e = parse_uri("gopher://example.com/7/search\tfoo bar").unwrap();
        assert_eq!(e.item_type, ItemType::Search);
        assert_eq!(e.selector, "/search\tfoo bar");
    }

    #[test]
    fn bracketed_ipv6() {
        let e = parse_uri("gopher://[::1]/1/files").unwrap();
        assert_eq!(e.server, "::1");
        assert_eq!(e.port, "70");
        assert_eq!(e.selector, "/files");
    }

    #[test]
    fn bracketed_ipv6_with_port() {
        let e = parse_uri("gopher://[2001:db8::1]:7070").unwrap();
        assert_eq!(e.server, "2001:db8::1");
        assert_eq!(e.port, "7070");
    }

    #[test]
    fn bare_ipv6_is_all_server() {
        let e = parse_uri("gopher://2001:db8::1/1").unwrap();
        assert_eq!(e.server, "2001:db8::1");
        assert_eq!(e.port, "70");
    }

    #[test]
    fn empty_server_rejected() {
        assert!(parse_uri("gopher://").is_err());
        assert!(parse_uri("").is_err());
        assert!(parse_uri("gopher://:7070/1").is_err());
        assert!(parse_uri("gopher://[]/1").is_err());
    }

    #[test]
    fn trailing_slash_means_default_type() {
        let e = parse_uri("gopher://example.com/").unwrap();
        assert_eq!(e.item_type, ItemType::Menu);
        assert_eq!(e.selector, "");
    }

    #[test]
    fn unknown_type_char_carried() {
        let e = parse_uri("gopher://example.com/w/sel").unwrap();
        assert_eq!(e.item_type, ItemType::Other('w'));
        assert_eq!(e.selector, "/sel");
    }

    #[test]
    fn format_omits_port_70() {
        let mut e = Element::new(ItemType::Menu, "");
        e.server = "example.com".into();
        e.port = "70".into();
        assert_eq!(format_uri(&e), "gopher://example.com/1");

        e.port = "7070".into();
        assert_eq!(format_uri(&e), "gopher://example.com:7070/1");
    }

    #[test]
    fn format_slash_selector_omitted() {
        let mut e = Element::new(ItemType::Menu, "");
        e.server = "example.com".into();
        e.port = "70".into();
        e.selector = "/".into();
        assert_eq!(format_uri(&e), "gopher://example.com/1");
    }

    #[test]
    fn format_tls_scheme() {
        let mut e = Element::new(ItemType::Document, "");
        e.server = "example.com".into();
        e.port = "70".into();
        e.selector = "/x".into();
        e.use_tls = true;
        assert_eq!(format_uri(&e), "gophers://example.com/0/x");
    }

    #[test]
    fn format_telnet_scheme() {
        let mut e = Element::new(ItemType::Telnet, "");
        e.server = "example.com".into();
        e.port = "23".into();
        assert_eq!(format_uri(&e), "teln://example.com:23/8");
    }

    #[test]
    fn format_extracted_url() {
        let mut e = Element::new(ItemType::Html, "web");
        e.server = "example.com".into();
        e.port = "70".into();
        e.selector = "URL:https://example.org/page".into();
        assert_eq!(format_uri(&e), "https://example.org/page");

        e.selector = "/URL:https://example.org/page".into();
        assert_eq!(format_uri(&e), "https://example.org/page");
    }

    #[test]
    fn format_rebrackets_ipv6() {
        let mut e = Element::new(ItemType::Menu, "");
        e.server = "::1".into();
        e.port = "7070".into();
        assert_eq!(format_uri(&e), "gopher://[::1]:7070/1");

        let back = parse_uri(&format_uri(&e)).unwrap();
        assert_eq!(back.server, "::1");
        assert_eq!(back.port, "7070");
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Formatting then parsing gives back the same location.
            #[test]
            fn round_trip(
                server in "[a-z][a-z0-9]{0,8}(\\.[a-z]{2,4})?",
                port in "[1-9][0-9]{0,3}",
                type_char in prop_oneof![
                    Just('0'), Just('1'), Just('7'), Just('9'), Just('I'), Just('s')
                ],
                selector in prop_oneof![
                    Just(String::new()),
                    "/[a-z0-9._-]{1,12}",
                ],
                use_tls in proptest::bool::ANY,
            ) {
                let mut e = Element::new(ItemType::from_char(type_char), "");
                e.server = server;
                e.port = port;
                e.selector = selector;
                e.use_tls = use_tls;

                let parsed = parse_uri(&format_uri(&e)).unwrap();
                prop_assert_eq!(parsed.item_type, e.item_type);
                prop_assert_eq!(parsed.server, e.server);
                prop_assert_eq!(parsed.port, e.port);
                prop_assert_eq!(parsed.selector, e.selector);
                prop_assert_eq!(parsed.use_tls, e.use_tls);
            }
        }
    }
}
