//! Alias generation and join deduplication.

use std::collections::HashMap;

/// Generates `<prefix>0`, `<prefix>1`, ... for a single query.
#[derive(Debug, Clone)]
pub struct AliasGenerator {
    prefix: String,
    next: usize,
}

impl AliasGenerator {
    /// Creates a generator starting at index 0.
    pub fn new(prefix: impl Into<String>) -> Self {
        AliasGenerator {
            prefix: prefix.into(),
            next: 0,
        }
    }

    /// Returns the next unused alias.
    pub fn next_alias(&mut self) -> String {
        let alias = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        alias
    }
}

/// A newly registered inner join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJoin {
    /// `parent_alias.association`
    pub join: String,
    /// Alias assigned to the joined entity.
    pub alias: String,
}

/// Association path → alias map for one query.
///
/// The root entity takes the first alias. Each association path, spelled
/// from the root (`address`, `address.city`), is joined at most once;
/// different paths that reach the same entity get different aliases.
///
/// ```
/// use criteria_query::JoinRegistry;
///
/// let mut joins = JoinRegistry::new("_t");
/// assert_eq!(joins.root_alias(), "_t0");
///
/// let (alias, created) = joins.join("address", "_t0", "address");
/// assert_eq!((alias.as_str(), created.is_some()), ("_t1", true));
///
/// let (alias, created) = joins.join("address", "_t0", "address");
/// assert_eq!((alias.as_str(), created.is_some()), ("_t1", false));
/// ```
#[derive(Debug, Clone)]
pub struct JoinRegistry {
    aliases: AliasGenerator,
    root: String,
    joins: HashMap<String, String>,
}

impl JoinRegistry {
    /// Creates a registry and assigns the root alias.
    pub fn new(alias_prefix: &str) -> Self {
        let mut aliases = AliasGenerator::new(alias_prefix);
        let root = aliases.next_alias();
        JoinRegistry {
            aliases,
            root,
            joins: HashMap::new(),
        }
    }

    /// Alias of the root entity.
    pub fn root_alias(&self) -> &str {
        &self.root
    }

    /// Alias already assigned to an association path.
    pub fn alias_for(&self, path: &str) -> Option<&str> {
        self.joins.get(path).map(String::as_str)
    }

    /// Returns the alias for `path`, registering a join of
    /// `parent_alias.association` the first time the path is seen.
    ///
    /// The second element is `Some` only when a join was registered by
    /// this call; the caller must then emit it.
    pub fn join(
        &mut self,
        path: &str,
        parent_alias: &str,
        association: &str,
    ) -> (String, Option<NewJoin>) {
        if let Some(alias) = self.joins.get(path) {
            return (alias.clone(), None);
        }

        let alias = self.aliases.next_alias();
        self.joins.insert(path.to_string(), alias.clone());
        let join = NewJoin {
            join: format!("{parent_alias}.{association}"),
            alias: alias.clone(),
        };
        (alias, Some(join))
    }

    /// Number of registered joins.
    pub fn len(&self) -> usize {
        self.joins.len()
    }

    /// Returns `true` if no join has been registered.
    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_counts_up() {
        let mut aliases = AliasGenerator::new("e");
        assert_eq!(aliases.next_alias(), "e0");
        assert_eq!(aliases.next_alias(), "e1");
        assert_eq!(aliases.next_alias(), "e2");
    }

    #[test]
    fn registry_dedupes_paths() {
        let mut joins = JoinRegistry::new("_t");
        let (address, created) = joins.join("address", "_t0", "address");
        assert_eq!(
            created,
            Some(NewJoin {
                join: "_t0.address".into(),
                alias: "_t1".into()
            })
        );

        let (city, created) = joins.join("address.city", &address, "city");
        assert_eq!(city, "_t2");
        assert_eq!(created.unwrap().join, "_t1.city");

        let (again, created) = joins.join("address.city", &address, "city");
        assert_eq!(again, "_t2");
        assert!(created.is_none());

        assert_eq!(joins.len(), 2);
        assert_eq!(joins.alias_for("address"), Some("_t1"));
        assert_eq!(joins.alias_for("city"), None);
    }

    #[test]
    fn distinct_paths_to_same_entity_get_distinct_aliases() {
        let mut joins = JoinRegistry::new("_t");
        let (billing, _) = joins.join("billingAddress", "_t0", "billingAddress");
        let (shipping, _) = joins.join("shippingAddress", "_t0", "shippingAddress");
        assert_ne!(billing, shipping);
    }

    #[test]
    fn fresh_registry_is_empty() {
        let joins = JoinRegistry::new("x");
        assert!(joins.is_empty());
        assert_eq!(joins.root_alias(), "x0");
    }
}
