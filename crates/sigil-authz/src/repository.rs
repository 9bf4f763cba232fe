//! Compiled per-principal grants.

use indexmap::{IndexMap, IndexSet};
use tracing::trace;

use crate::ability::{Ability, WILDCARD};
use crate::nested::Nested;
use crate::principal::Principal;

/// A principal's abilities and roles, compiled once for lookup.
///
/// Grouped abilities map a group to its ordered, distinct actions. Bare
/// abilities and roles are flat sets of identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationRepository {
    abilities: IndexMap<String, IndexSet<String>>,
    bare: IndexSet<String>,
    roles: IndexSet<String>,
}

impl AuthorizationRepository {
    /// Compile raw grants.
    ///
    /// Abilities are canonicalized and split on their last `.`. Roles are
    /// canonicalized and kept only when bare; a role carrying an action is
    /// dropped.
    #[must_use]
    pub fn build(abilities: &Nested<String>, roles: &Nested<String>) -> Self {
        let mut repo = Self::default();

        for raw in abilities.flatten() {
            match Ability::split(raw) {
                (key, _) if key.is_empty() => {},
                (key, None) => {
                    repo.bare.insert(key);
                },
                (group, Some(action)) => {
                    repo.abilities.entry(group).or_default().insert(action);
                },
            }
        }

        for raw in roles.flatten() {
            let role = Ability::format(raw);
            if role.is_empty() || role.contains('.') {
                trace!(role = %role, "ignoring non-bare role");
                continue;
            }
            repo.roles.insert(role);
        }

        repo
    }

    /// Compile the grants of `principal`.
    #[must_use]
    pub fn from_principal<P: Principal + ?Sized>(principal: &P) -> Self {
        Self::build(&principal.permissions(), &principal.roles())
    }

    /// Whether every identifier in `abilities` is granted.
    ///
    /// A bare identifier holds if it is a role or a bare ability. A grouped
    /// identifier holds if its group exists and either the requested or a
    /// granted action is `*`, or the action was granted. An empty request
    /// holds nothing.
    #[must_use]
    pub fn has(&self, abilities: &Nested<String>) -> bool {
        let requested = abilities.flatten();
        !requested.is_empty() && requested.into_iter().all(|raw| self.holds(raw))
    }

    fn holds(&self, raw: &str) -> bool {
        match Ability::split(raw) {
            (key, _) if key.is_empty() => false,
            (key, None) => self.roles.contains(&key) || self.bare.contains(&key),
            (group, Some(action)) => self.abilities.get(&group).is_some_and(|actions| {
                action == WILDCARD || actions.contains(WILDCARD) || actions.contains(&action)
            }),
        }
    }

    /// Grouped abilities.
    #[must_use]
    pub fn abilities(&self) -> &IndexMap<String, IndexSet<String>> {
        &self.abilities
    }

    /// Abilities granted without an action.
    #[must_use]
    pub fn bare_abilities(&self) -> &IndexSet<String> {
        &self.bare
    }

    /// Roles.
    #[must_use]
    pub fn roles(&self) -> &IndexSet<String> {
        &self.roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(abilities: &[&str], roles: &[&str]) -> AuthorizationRepository {
        AuthorizationRepository::build(&abilities.to_vec().into(), &roles.to_vec().into())
    }

    fn has(repo: &AuthorizationRepository, ability: &str) -> bool {
        repo.has(&ability.into())
    }

    #[test]
    fn test_wildcard_grant() {
        let repo = repo(&["users.create", "users.*"], &[]);

        assert!(has(&repo, "users.delete"));
        assert!(has(&repo, "users.create"));
        assert!(!has(&repo, "posts.create"));
    }

    #[test]
    fn test_wildcard_request_needs_known_group() {
        let repo = repo(&["posts.read"], &[]);

        assert!(has(&repo, "posts.*"));
        assert!(!has(&repo, "users.*"));
    }

    #[test]
    fn test_roles() {
        let repo = repo(&[], &["admin"]);

        assert!(has(&repo, "admin"));
        assert!(has(&repo, "Admin"));
        assert!(!has(&repo, "editor"));
    }

    #[test]
    fn test_bare_ability() {
        let repo = repo(&["reports", "posts.read"], &[]);

        assert!(has(&repo, "reports"));
        assert_eq!(repo.bare_abilities().len(), 1);
    }

    #[test]
    fn test_actions_are_distinct_and_ordered() {
        let repo = repo(
            &["posts.write", "Posts:Read", "posts.write", "posts.read"],
            &[],
        );

        let actions: Vec<&str> = repo.abilities()["posts"].iter().map(String::as_str).collect();
        assert_eq!(actions, vec!["write", "read"]);
    }

    #[test]
    fn test_nested_input_is_flattened() {
        let abilities = Nested::List(vec![
            "a.read".into(),
            Nested::List(vec!["b.read".into(), Nested::List(vec!["c.read".into()])]),
        ]);
        let repo = AuthorizationRepository::build(&abilities, &Nested::empty());

        assert!(repo.has(&vec!["a.read", "b.read", "c.read"].into()));
    }

    #[test]
    fn test_has_list_is_and() {
        let repo = repo(&["posts.read"], &["admin"]);

        assert!(repo.has(&vec!["posts.read", "admin"].into()));
        assert!(!repo.has(&vec!["posts.read", "editor"].into()));
        assert!(!repo.has(&vec!["editor", "posts.read"].into()));
    }

    #[test]
    fn test_dotted_groups() {
        let repo = repo(&["admin.users.create"], &[]);

        assert_eq!(repo.abilities().keys().collect::<Vec<_>>(), vec!["admin.users"]);
        assert!(has(&repo, "Admin:Users:create"));
        assert!(!has(&repo, "admin.create"));
    }

    #[test]
    fn test_roles_with_action_are_dropped() {
        let repo = repo(&[], &["admin", "team.lead", "admin", ""]);

        assert_eq!(repo.roles().len(), 1);
        assert!(!has(&repo, "team.lead"));
    }

    #[test]
    fn test_empty_grants_hold_nothing() {
        let repo = AuthorizationRepository::default();

        assert!(!has(&repo, "users.read"));
        assert!(!has(&repo, "admin"));
        assert!(!has(&repo, ""));
        assert!(!repo.has(&Nested::empty()));
    }
}
