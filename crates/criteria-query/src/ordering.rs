//! Ordering types.
//!
//! Provides [`Dir`] for sort direction, [`OrderBy`] for a single ordering
//! entry and [`Sort`], the ordered field path → direction map a caller
//! passes to `find_by`.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};

use crate::error::{CriteriaError, Result};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Parses a direction, ignoring ASCII case.
    ///
    /// ```
    /// use criteria_query::Dir;
    ///
    /// assert_eq!(Dir::parse("desc").unwrap(), Dir::Desc);
    /// assert!(Dir::parse("sideways").is_err());
    /// ```
    pub fn parse(dir: &str) -> Result<Self> {
        if dir.eq_ignore_ascii_case("asc") {
            Ok(Dir::Asc)
        } else if dir.eq_ignore_ascii_case("desc") {
            Ok(Dir::Desc)
        } else {
            Err(CriteriaError::InvalidDirection(dir.to_string()))
        }
    }

    /// Returns `true` if this is ascending order.
    pub fn is_asc(self) -> bool {
        matches!(self, Dir::Asc)
    }

    /// Returns `true` if this is descending order.
    pub fn is_desc(self) -> bool {
        matches!(self, Dir::Desc)
    }

    /// Returns the query spelling of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "ASC",
            Dir::Desc => "DESC",
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single ordering entry: a field and a direction.
///
/// In a [`Sort`] the field is a field path (`address.city`); once
/// translated it is an aliased field (`_t1.city`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// The field to sort by.
    pub field: String,
    /// The sort direction.
    pub dir: Dir,
}

impl OrderBy {
    /// Creates a new ordering with the given direction.
    pub fn new(field: impl Into<String>, dir: Dir) -> Self {
        OrderBy {
            field: field.into(),
            dir,
        }
    }

    /// Creates a new ascending ordering for the given field.
    pub fn asc(field: impl Into<String>) -> Self {
        OrderBy::new(field, Dir::Asc)
    }

    /// Creates a new descending ordering for the given field.
    pub fn desc(field: impl Into<String>) -> Self {
        OrderBy::new(field, Dir::Desc)
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.dir)
    }
}

/// Ordered field path → direction map.
///
/// Setting a path twice keeps its original position and takes the new
/// direction.
///
/// ```
/// use criteria_query::{Dir, Sort};
///
/// let sort = Sort::new().desc("createdAt").asc("address.city").asc("createdAt");
/// let entries: Vec<_> = sort.iter().map(|o| (o.field.as_str(), o.dir)).collect();
/// assert_eq!(entries, [("createdAt", Dir::Asc), ("address.city", Dir::Asc)]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sort {
    entries: Vec<OrderBy>,
}

impl Sort {
    /// Creates an empty sort.
    pub fn new() -> Self {
        Sort::default()
    }

    /// Sets the direction for a field path.
    pub fn by(mut self, field: &str, dir: Dir) -> Self {
        match self.entries.iter_mut().find(|entry| entry.field == field) {
            Some(entry) => entry.dir = dir,
            None => self.entries.push(OrderBy::new(field, dir)),
        }
        self
    }

    /// Sorts ascending by a field path.
    pub fn asc(self, field: &str) -> Self {
        self.by(field, Dir::Asc)
    }

    /// Sorts descending by a field path.
    pub fn desc(self, field: &str) -> Self {
        self.by(field, Dir::Desc)
    }

    /// Iterates over the entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &OrderBy> {
        self.entries.iter()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<'de> Deserialize<'de> for Sort {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SortVisitor;

        impl<'de> Visitor<'de> for SortVisitor {
            type Value = Sort;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field paths to \"ASC\" or \"DESC\"")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Sort, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut sort = Sort::new();
                while let Some((field, dir)) = map.next_entry::<String, String>()? {
                    let dir = Dir::parse(&dir).map_err(de::Error::custom)?;
                    sort = sort.by(&field, dir);
                }
                Ok(sort)
            }
        }

        deserializer.deserialize_map(SortVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_parse() {
        assert_eq!(Dir::parse("ASC").unwrap(), Dir::Asc);
        assert_eq!(Dir::parse("Desc").unwrap(), Dir::Desc);
        assert_eq!(
            Dir::parse("ASC; DROP TABLE users").unwrap_err(),
            CriteriaError::InvalidDirection("ASC; DROP TABLE users".into())
        );
    }

    #[test]
    fn dir_checks() {
        assert!(Dir::Asc.is_asc());
        assert!(!Dir::Asc.is_desc());
        assert!(Dir::Desc.is_desc());
        assert_eq!(Dir::default(), Dir::Asc);
    }

    #[test]
    fn order_by_display() {
        assert_eq!(OrderBy::asc("_t0.name").to_string(), "_t0.name ASC");
        assert_eq!(OrderBy::desc("_t1.city").to_string(), "_t1.city DESC");
    }

    #[test]
    fn sort_keeps_first_position() {
        let sort = Sort::new().asc("a").desc("b").desc("a");
        assert_eq!(sort.len(), 2);
        let entries: Vec<_> = sort.iter().cloned().collect();
        assert_eq!(entries, [OrderBy::desc("a"), OrderBy::desc("b")]);
    }

    #[test]
    fn sort_deserializes_in_order() {
        let sort: Sort = serde_json::from_str(r#"{"name": "desc", "id": "ASC"}"#).unwrap();
        assert_eq!(sort, Sort::new().desc("name").asc("id"));
    }

    #[test]
    fn sort_rejects_bad_direction() {
        let err = serde_json::from_str::<Sort>(r#"{"name": "up"}"#).unwrap_err();
        assert!(err.to_string().contains("Invalid order direction: up"));
    }
}
