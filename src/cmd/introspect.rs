//! Method introspection: which methods of a collection are sub-commands.

use crate::collections::Collection;

/// Where a method table entry comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Defined by the collection itself.
    Own,
    /// Provided by shared collection plumbing; never a sub-command.
    #[cfg(test)]
    Inherited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: &'static str,
    pub doc: &'static str,
    pub origin: Origin,
}

impl MethodInfo {
    /// Own, public, not a constructor.
    pub fn is_command(&self) -> bool {
        self.origin == Origin::Own
            && !self.name.is_empty()
            && !self.name.starts_with('_')
            && self.name != "new"
    }
}

/// Sub-command names of `collection`, sorted and de-duplicated.
///
/// Zero eligible methods yields an empty list; the dispatcher decides what
/// that means for the user.
pub fn list_methods(collection: &dyn Collection) -> Vec<String> {
    let mut names: Vec<String> = collection
        .methods()
        .into_iter()
        .filter(MethodInfo::is_command)
        .map(|m| m.name.to_string())
        .collect();
    names.sort();
    names.dedup();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::test_support::{Bare, Zoo};

    #[test]
    fn lists_only_own_public_methods_sorted() {
        assert_eq!(list_methods(&Zoo::default()), ["feed", "list", "open"]);
    }

    #[test]
    fn listing_is_stable() {
        let zoo = Zoo::default();
        assert_eq!(list_methods(&zoo), list_methods(&zoo));
    }

    #[test]
    fn no_eligible_methods_is_empty_not_error() {
        assert!(list_methods(&Bare::default()).is_empty());
    }

    #[test]
    fn builtin_collections_expose_their_verbs() {
        let names = list_methods(&crate::collections::providers::Providers::default());
        assert_eq!(names, ["create", "delete", "edit", "query", "refresh"]);
    }
}
