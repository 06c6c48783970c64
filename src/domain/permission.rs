//! Permission checks delegated to an explicitly configured capability.

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

pub const SELECT: &str = "select";
pub const INSERT: &str = "insert";
pub const UPDATE: &str = "update";
pub const DELETE: &str = "delete";

/// Wildcard entity name in permission grants.
pub const ANY_ENTITY: &str = "*";

/// What a permission is asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target<'a> {
    /// The entity type as a whole, e.g. listing or creating.
    Type(&'a str),
    /// One instance; `key` is `None` for values not yet persisted.
    Instance { entity: &'a str, key: Option<i64> },
}

impl Target<'_> {
    pub fn entity(&self) -> &str {
        match self {
            Target::Type(entity) => entity,
            Target::Instance { entity, .. } => entity,
        }
    }
}

/// Grant decision for a permission on a target. Implementations must be
/// side-effect free.
pub trait Authorizer {
    fn has_permission(&self, target: &Target<'_>, permission: &str) -> bool;
}

type Rule = Box<dyn Fn(&Target<'_>) -> bool + Send + Sync>;

/// Rules registered per permission name. A permission without rules is
/// denied; otherwise it is granted if any of its rules accepts the target.
#[derive(Default)]
pub struct PermissionRegistry {
    rules: HashMap<String, Vec<Rule>>,
}

impl PermissionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(mut self, permission: impl Into<String>, rule: F) -> Self
    where
        F: Fn(&Target<'_>) -> bool + Send + Sync + 'static,
    {
        self.rules
            .entry(permission.into())
            .or_default()
            .push(Box::new(rule));
        self
    }

    /// Grants `permission` on every target of the listed entities.
    pub fn allow<I, S>(self, permission: impl Into<String>, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entities: Vec<String> = entities.into_iter().map(Into::into).collect();
        self.register(permission, move |target| {
            entities
                .iter()
                .any(|entity| entity == ANY_ENTITY || entity == target.entity())
        })
    }

    /// Builds the registry from a `permission -> [entity]` map.
    pub fn from_grants(grants: &HashMap<String, Vec<String>>) -> Self {
        grants
            .iter()
            .fold(Self::new(), |registry, (permission, entities)| {
                registry.allow(permission.as_str(), entities.iter().cloned())
            })
    }
}

impl Debug for PermissionRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionRegistry")
            .field("permissions", &self.rules.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Authorizer for PermissionRegistry {
    fn has_permission(&self, target: &Target<'_>, permission: &str) -> bool {
        self.rules
            .get(permission)
            .is_some_and(|rules| rules.iter().any(|rule| rule(target)))
    }
}
