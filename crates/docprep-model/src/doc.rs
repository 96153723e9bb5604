//! The canonical sequence every transformation consumes and produces.
//!
//! A [`DocSeries`] is an ordered list of document slots. Each slot is a
//! [`Doc`]: either a string or an explicit absent marker (`None`). Positions
//! are indexed from `start`, so a slice taken out of a larger sequence keeps
//! the positions it had in the original.

use std::ops::Range;

/// A single document slot.
pub type Doc = Option<String>;

/// Ordered, positionally indexed sequence of optional documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocSeries {
    name: Option<String>,
    start: usize,
    docs: Vec<Doc>,
}

impl DocSeries {
    /// Creates an unnamed sequence indexed from zero.
    pub fn new(docs: Vec<Doc>) -> Self {
        Self {
            name: None,
            start: 0,
            docs,
        }
    }

    /// Creates a named sequence indexed from zero.
    pub fn named(name: impl Into<String>, docs: Vec<Doc>) -> Self {
        Self {
            name: Some(name.into()),
            start: 0,
            docs,
        }
    }

    /// Sets the position of the first slot.
    #[must_use]
    pub fn with_start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    /// Sets or clears the sequence name.
    #[must_use]
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// Positions covered by this sequence.
    pub fn index(&self) -> Range<usize> {
        self.start..self.start + self.docs.len()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn docs(&self) -> &[Doc] {
        &self.docs
    }

    pub fn into_docs(self) -> Vec<Doc> {
        self.docs
    }

    pub fn get(&self, offset: usize) -> Option<&str> {
        self.docs.get(offset).and_then(|doc| doc.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.docs.iter().map(|doc| doc.as_deref())
    }

    /// Number of absent slots.
    pub fn absent_count(&self) -> usize {
        self.docs.iter().filter(|doc| doc.is_none()).count()
    }

    /// Replaces the slots while keeping name and index.
    #[must_use]
    pub fn with_docs(self, docs: Vec<Doc>) -> Self {
        Self {
            name: self.name,
            start: self.start,
            docs,
        }
    }

    /// Applies `f` to every present document. Absent slots stay absent.
    #[must_use]
    pub fn map_present<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> String,
    {
        let docs = self
            .docs
            .iter()
            .map(|doc| doc.as_deref().map(&f))
            .collect();
        self.with_docs(docs)
    }

    /// Fallible [`DocSeries::map_present`]; stops at the first error.
    pub fn try_map_present<F, E>(self, f: F) -> Result<Self, E>
    where
        F: Fn(&str) -> Result<String, E>,
    {
        let docs = self
            .docs
            .iter()
            .map(|doc| doc.as_deref().map(&f).transpose())
            .collect::<Result<Vec<_>, E>>()?;
        Ok(self.with_docs(docs))
    }

    /// Applies `f` to every slot, present or not.
    #[must_use]
    pub fn map_slots<F>(self, f: F) -> Self
    where
        F: Fn(Option<&str>) -> Doc,
    {
        let docs = self.docs.iter().map(|doc| f(doc.as_deref())).collect();
        self.with_docs(docs)
    }

    /// Copies `range` (relative offsets) into a new sequence whose start
    /// reflects the original positions.
    pub fn slice(&self, range: Range<usize>) -> Self {
        let end = range.end.min(self.docs.len());
        let begin = range.start.min(end);
        Self {
            name: self.name.clone(),
            start: self.start + begin,
            docs: self.docs[begin..end].to_vec(),
        }
    }

    /// Concatenates parts in order. The result takes its name and start
    /// from the first part.
    pub fn concat(parts: Vec<DocSeries>) -> Self {
        let mut iter = parts.into_iter();
        let Some(mut first) = iter.next() else {
            return Self::default();
        };
        for part in iter {
            first.docs.extend(part.docs);
        }
        first
    }
}

impl From<Vec<Doc>> for DocSeries {
    fn from(docs: Vec<Doc>) -> Self {
        Self::new(docs)
    }
}

impl From<Vec<&str>> for DocSeries {
    fn from(docs: Vec<&str>) -> Self {
        Self::new(docs.into_iter().map(|doc| Some(doc.to_string())).collect())
    }
}

impl From<Vec<Option<&str>>> for DocSeries {
    fn from(docs: Vec<Option<&str>>) -> Self {
        Self::new(docs.into_iter().map(|doc| doc.map(str::to_string)).collect())
    }
}

impl FromIterator<Doc> for DocSeries {
    fn from_iter<I: IntoIterator<Item = Doc>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for DocSeries {
    type Item = Doc;
    type IntoIter = std::vec::IntoIter<Doc>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_present_keeps_absent_slots() {
        let docs = DocSeries::from(vec![Some("a"), None, Some("b")]);
        let upper = docs.map_present(str::to_uppercase);
        assert_eq!(
            upper.docs(),
            &[Some("A".to_string()), None, Some("B".to_string())]
        );
    }

    #[test]
    fn slice_keeps_positions() {
        let docs = DocSeries::named("docs", vec![None; 5]).with_start(10);
        let part = docs.slice(2..4);
        assert_eq!(part.index(), 12..14);
        assert_eq!(part.name(), Some("docs"));

        let tail = docs.slice(4..9);
        assert_eq!(tail.len(), 1);
        assert_eq!(tail.start(), 14);
    }

    #[test]
    fn concat_restores_order() {
        let docs = DocSeries::from(vec!["a", "b", "c", "d", "e"]);
        let parts = vec![docs.slice(0..2), docs.slice(2..4), docs.slice(4..5)];
        assert_eq!(DocSeries::concat(parts), docs);
        assert!(DocSeries::concat(Vec::new()).is_empty());
    }
}
