//! In-page regex search.
//!
//! A search runs over element descriptions only; selectors, servers,
//! and ports are never matched. The compiled pattern survives scrolling
//! and repeat jumps, and is dropped on every navigation.

use regex::{Regex, RegexBuilder};

use burrow_types::error::{BurrowError, Result};
use burrow_types::page::Document;

#[derive(Debug, Default)]
pub struct SearchState {
    pattern: Option<Regex>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.pattern.is_some()
    }

    /// Whether `line` matches the active pattern. Used for highlighting.
    pub fn matches(&self, line: &str) -> bool {
        self.pattern.as_ref().is_some_and(|re| re.is_match(line))
    }

    pub fn clear(&mut self) {
        self.pattern = None;
    }

    /// Compile a new pattern, replacing any previous one. A pattern
    /// that fails to compile leaves the previous one untouched.
    pub fn compile(&mut self, pattern: &str, ignore_case: bool) -> Result<()> {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(ignore_case)
            .build()
            .map_err(|err| BurrowError::BadPattern(err.to_string()))?;
        self.pattern = Some(re);
        Ok(())
    }

    /// Find the next match relative to `scroll` and return its element
    /// index. Forward searches take the nearest match strictly after
    /// `scroll`, wrapping to the first match in the page; backward
    /// searches take the nearest strictly before, wrapping to the last.
    pub fn find(&self, page: &Document, scroll: usize, backward: bool) -> Result<usize> {
        let Some(re) = self.pattern.as_ref() else {
            return Err(BurrowError::NoActiveSearch);
        };

        let mut first = None;
        let mut last = None;
        let mut nearest = None;
        for (index, element) in page.iter().enumerate() {
            if !re.is_match(&element.description) {
                continue;
            }
            if first.is_none() {
                first = Some(index);
            }
            last = Some(index);
            if backward {
                if index < scroll {
                    nearest = Some(index);
                }
            } else if index > scroll && nearest.is_none() {
                nearest = Some(index);
            }
        }

        if let Some(index) = nearest {
            return Ok(index);
        }
        let wrapped = if backward { last } else { first };
        wrapped.ok_or(BurrowError::NoMatch)
    }
}

// ---- tests ----
