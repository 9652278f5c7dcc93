//! Keyword tables and the classifier.
//!
//! A table maps category name -> keywords. Matching is a case-insensitive
//! substring test; the first category (in declaration order) with any
//! matching keyword wins.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One independent classification dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Product line (car model).
    Product,
    /// Geographic region.
    Region,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Product => f.write_str("product"),
            Axis::Region => f.write_str("region"),
        }
    }
}

/// Ordered category -> keywords table.
///
/// Order is significant: it is the tie-breaker when several categories match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeywordTable {
    categories: Vec<(String, Vec<String>)>,
}

impl KeywordTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`KeywordTable::insert`].
    pub fn with_category<I, K>(mut self, category: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.insert(category, keywords);
        self
    }

    /// Set the keywords of `category`. A new category goes last; an existing
    /// one keeps its position.
    pub fn insert<I, K>(&mut self, category: impl Into<String>, keywords: I)
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let category = category.into();
        let keywords: Vec<String> = keywords.into_iter().map(Into::into).collect();
        match self.categories.iter_mut().find(|(name, _)| *name == category) {
            Some(entry) => entry.1 = keywords,
            None => self.categories.push((category, keywords)),
        }
    }

    /// Categories in declaration order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.categories
            .iter()
            .map(|(name, keywords)| (name.as_str(), keywords.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total keywords across all categories.
    pub fn keyword_count(&self) -> usize {
        self.categories.iter().map(|(_, k)| k.len()).sum()
    }
}

impl Serialize for KeywordTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for (name, keywords) in &self.categories {
            map.serialize_entry(name, keywords)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for KeywordTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = KeywordTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of category name to keyword list")
            }

            // Visits entries in document order, which becomes match priority.
            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut table = KeywordTable::new();
                while let Some((name, keywords)) = access.next_entry::<String, Vec<String>>()? {
                    table.insert(name, keywords);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// Classify `text` against one table.
///
/// Returns the first category (table order, then keyword order) that has a
/// keyword occurring in the lower-cased text. Empty text and empty keywords
/// never match.
pub fn classify(text: &str, table: &KeywordTable) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let haystack = text.to_lowercase();
    table
        .categories()
        .find(|(_, keywords)| {
            keywords
                .iter()
                .filter(|k| !k.is_empty())
                .any(|k| haystack.contains(&k.to_lowercase()))
        })
        .map(|(name, _)| name.to_string())
}

/// Outcome of classifying one post on both axes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    pub product: Option<String>,
    pub region: Option<String>,
}

impl Classification {
    /// Category matched on `axis`.
    pub fn category(&self, axis: Axis) -> Option<&str> {
        match axis {
            Axis::Product => self.product.as_deref(),
            Axis::Region => self.region.as_deref(),
        }
    }

    /// Whether either axis matched.
    pub fn is_match(&self) -> bool {
        self.product.is_some() || self.region.is_some()
    }
}

/// Run both axes independently.
pub fn classify_both(text: &str, products: &KeywordTable, regions: &KeywordTable) -> Classification {
    Classification {
        product: classify(text, products),
        region: classify(text, regions),
    }
}
