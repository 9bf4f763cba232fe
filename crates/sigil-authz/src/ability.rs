//! Canonical ability identifiers.
//!
//! An ability is `group.action` or a bare identifier. The canonical form is
//! lowercase snake case with `.` as the only separator between group and
//! action; the last `.` splits them, so groups may themselves be dotted.

use convert_case::{Boundary, Case, Converter};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::inflect::pluralize;

/// Action matching every action within its group.
pub const WILDCARD: &str = "*";

/// A canonical ability identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ability(String);

impl Ability {
    /// Canonicalize `raw`.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(Self::format(raw))
    }

    /// Canonical form of `raw`.
    ///
    /// `-` becomes `_` and `:` becomes `.`; each `.`-separated segment is
    /// then snake-cased, with whitespace treated as a separator and runs of
    /// underscores collapsed. Idempotent.
    ///
    /// ```
    /// use sigil_authz::Ability;
    ///
    /// assert_eq!(Ability::format("Users:Create"), "users.create");
    /// assert_eq!(Ability::format("BlogPost.publishNow"), "blog_post.publish_now");
    /// assert_eq!(Ability::format("users.*"), "users.*");
    /// ```
    #[must_use]
    pub fn format(raw: &str) -> String {
        let converter = Converter::new()
            .set_boundaries(&[
                Boundary::Underscore,
                Boundary::Hyphen,
                Boundary::Space,
                Boundary::LowerUpper,
                Boundary::Acronym,
            ])
            .to_case(Case::Snake);

        let translated: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                '-' => '_',
                ':' => '.',
                c if c.is_whitespace() => ' ',
                c => c,
            })
            .collect();

        translated
            .split('.')
            .map(|segment| collapse_underscores(&converter.convert(segment)))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Split `raw` into `(group, action)` on its last `.`; a bare identifier
    /// has no action.
    ///
    /// ```
    /// use sigil_authz::Ability;
    ///
    /// assert_eq!(
    ///     Ability::split("Admin.Users:create"),
    ///     ("admin.users".to_owned(), Some("create".to_owned()))
    /// );
    /// assert_eq!(Ability::split("editor"), ("editor".to_owned(), None));
    /// ```
    #[must_use]
    pub fn split(raw: &str) -> (String, Option<String>) {
        let ability = Self::format(raw);
        match ability.rsplit_once('.') {
            Some((group, action)) => (group.to_owned(), Some(action.to_owned())),
            None => (ability, None),
        }
    }

    /// Ability for a route.
    ///
    /// An explicit route name is returned verbatim. Otherwise the feature is
    /// derived from the handler's namespace path (the last segment left after
    /// stripping `controller`, pluralized) and joined with the method. Empty
    /// when there is nothing to derive from.
    ///
    /// ```
    /// use sigil_authz::Ability;
    ///
    /// let ability = Ability::from_route_metadata(
    ///     None,
    ///     Some(r"App\Http\Controllers\UserController"),
    ///     Some("store"),
    /// );
    /// assert_eq!(ability, "users.store");
    /// ```
    #[must_use]
    pub fn from_route_metadata(
        explicit_name: Option<&str>,
        controller_path: Option<&str>,
        method: Option<&str>,
    ) -> String {
        if let Some(name) = explicit_name.filter(|n| !n.is_empty()) {
            return name.to_owned();
        }

        let (Some(controller), Some(method)) = (controller_path, method.filter(|m| !m.is_empty()))
        else {
            return String::new();
        };

        let controller = controller.to_lowercase();
        let feature = controller
            .split('\\')
            .map(strip_controller)
            .filter(|segment| !segment.is_empty())
            .last();

        match feature {
            Some(feature) => format!("{}.{method}", pluralize(feature)),
            None => String::new(),
        }
    }

    /// The canonical string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Group and action of this ability.
    #[must_use]
    pub fn parts(&self) -> (&str, Option<&str>) {
        match self.0.rsplit_once('.') {
            Some((group, action)) => (group, Some(action)),
            None => (&self.0, None),
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ability {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Ability {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Routing metadata an ability can be derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMetadata {
    /// Explicit route name.
    pub name: Option<String>,
    /// Handler as `Namespace\Controller@method`.
    pub action: Option<String>,
}

impl RouteMetadata {
    /// A named route.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            action: None,
        }
    }

    /// An unnamed route handled by `action`.
    #[must_use]
    pub fn handled_by(action: impl Into<String>) -> Self {
        Self {
            name: None,
            action: Some(action.into()),
        }
    }

    /// The ability this route maps to; empty if none.
    #[must_use]
    pub fn ability(&self) -> String {
        let handler = self
            .action
            .as_deref()
            .and_then(|action| action.split_once('@'))
            .filter(|(_, method)| !method.contains('@'));

        Ability::from_route_metadata(
            self.name.as_deref(),
            handler.map(|(controller, _)| controller),
            handler.map(|(_, method)| method),
        )
    }
}

/// Feature candidate of one lowercase namespace segment.
///
/// `usercontroller` yields `user`; a segment that starts with `controller`
/// yields nothing; a segment split into several pieces yields the first.
fn strip_controller(segment: &str) -> &str {
    segment.split("controller").next().unwrap_or_default()
}

fn collapse_underscores(segment: &str) -> String {
    segment
        .split('_')
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
