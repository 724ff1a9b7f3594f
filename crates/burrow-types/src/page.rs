//! Page and history containers.
//!
//! A [`Document`] is the currently displayed page: elements in arrival
//! order, with link ids handed out as they are pushed. It is replaced
//! wholesale on every successful navigation. [`History`] is the back-stack
//! of previously current locations; every entry is an independent copy.

use crate::item::Element;

/// Ordered element collection with stable link ids.
///
/// Ids are unique within one document, contiguous from 1, and assigned in
/// arrival order to id-bearing types only. `last_id` is therefore also the
/// count of selectable entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    elements: Vec<Element>,
    last_id: u32,
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    pub fn from_elements(elements: Vec<Element>) -> Self {
        let mut doc = Document::new();
        for e in elements {
            doc.push(e);
        }
        doc
    }

    /// Append an element, assigning the next id if its type carries one.
    /// Any id already on the element is discarded.
    pub fn push(&mut self, mut element: Element) {
        if element.item_type.carries_id() {
            self.last_id += 1;
            element.id = Some(self.last_id);
        } else {
            element.id = None;
        }
        self.elements.push(element);
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    /// Look up an element by link id. Ids start at 1.
    pub fn by_id(&self, id: u32) -> Option<&Element> {
        if id == 0 || id > self.last_id {
            return None;
        }
        self.elements.iter().find(|e| e.id == Some(id))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn last_id(&self) -> u32 {
        self.last_id
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.elements.iter()
    }
}

/// Back-stack of previously current locations, oldest first.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<Element>,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    pub fn push(&mut self, element: Element) {
        self.entries.push(element);
    }

    /// Remove and return the most recent entry.
    pub fn pop(&mut self) -> Option<Element> {
        self.entries.pop()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.entries.iter()
    }
}
