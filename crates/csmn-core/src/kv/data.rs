//! Shared in-process representation of scalars and lists
//!
//! Both the memory and the file store keep their data in [`KvData`] so the
//! list semantics (Redis-style ranges, empty lists vanish) live in one place.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct KvData {
    #[serde(default)]
    pub scalars: HashMap<String, String>,
    #[serde(default)]
    pub lists: HashMap<String, VecDeque<String>>,
}

impl KvData {
    pub fn get(&self, key: &str) -> Option<String> {
        self.scalars.get(key).cloned()
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.scalars.insert(key.to_string(), value.to_string());
    }

    pub fn range(&self, key: &str, start: isize, end: isize) -> Vec<String> {
        let Some(list) = self.lists.get(key) else {
            return Vec::new();
        };
        match normalize_range(list.len(), start, end) {
            Some((from, to)) => list.range(from..=to).cloned().collect(),
            None => Vec::new(),
        }
    }

    pub fn push_tail(&mut self, key: &str, value: &str) -> usize {
        let list = self.lists.entry(key.to_string()).or_default();
        list.push_back(value.to_string());
        list.len()
    }

    pub fn push_head(&mut self, key: &str, value: &str) -> usize {
        let list = self.lists.entry(key.to_string()).or_default();
        list.push_front(value.to_string());
        list.len()
    }

    pub fn pop_head(&mut self, key: &str) -> Option<String> {
        let list = self.lists.get_mut(key)?;
        let head = list.pop_front();
        if list.is_empty() {
            self.lists.remove(key);
        }
        head
    }

    pub fn set_at(&mut self, key: &str, index: usize, value: &str) -> Result<(), Error> {
        let slot = self
            .lists
            .get_mut(key)
            .and_then(|list| list.get_mut(index))
            .ok_or_else(|| Error::out_of_range(key, index))?;
        *slot = value.to_string();
        Ok(())
    }

    pub fn len(&self, key: &str) -> usize {
        self.lists.get(key).map_or(0, VecDeque::len)
    }

    pub fn key_count(&self) -> usize {
        self.scalars.len() + self.lists.len()
    }
}

/// Resolve Redis-style inclusive bounds against a list of `len` elements.
fn normalize_range(len: usize, start: isize, end: isize) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let len = len as isize;
    let start = if start < 0 { (start + len).max(0) } else { start };
    let end = if end < 0 { end + len } else { end.min(len - 1) };
    if start > end || start >= len {
        return None;
    }
    Some((start as usize, end as usize))
}
