// permission.rs - read/write authorization over an instance's permission map

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::Instance;

/// Key granting access to every caller that has no entry of its own.
pub const PUBLIC_KEY: &str = "*";

/// A single `{read, write}` grant. Missing flags deny.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Permission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write: Option<bool>,
}

impl Permission {
    pub fn read_write() -> Self {
        Self { read: Some(true), write: Some(true) }
    }

    pub fn can_read(&self) -> bool {
        self.read.unwrap_or(false)
    }

    pub fn can_write(&self) -> bool {
        self.write.unwrap_or(false)
    }
}

/// User id (or `*`) to grant.
pub type PermissionMap = BTreeMap<String, Permission>;

/// Map granting `user_id` read and write, and nobody else anything.
pub fn owner_only(user_id: &str) -> PermissionMap {
    let mut map = PermissionMap::new();
    map.insert(user_id.to_string(), Permission::read_write());
    map
}

/// The entry that decides for `user_id`: its own entry when present, otherwise
/// the public one. The two are never merged.
fn effective_entry<'a>(map: &'a PermissionMap, user_id: &str) -> Option<&'a Permission> {
    map.get(user_id).or_else(|| map.get(PUBLIC_KEY))
}

pub fn can_read(permissions: Option<&PermissionMap>, user_id: &str) -> bool {
    match permissions {
        None => true,
        Some(map) => effective_entry(map, user_id).is_some_and(Permission::can_read),
    }
}

pub fn can_write(permissions: Option<&PermissionMap>, user_id: &str) -> bool {
    match permissions {
        None => true,
        Some(map) => effective_entry(map, user_id).is_some_and(Permission::can_write),
    }
}

pub fn has_read_permission(instance: &Instance, user_id: &str) -> bool {
    can_read(instance.permissions.as_ref(), user_id)
}

pub fn has_write_permission(instance: &Instance, user_id: &str) -> bool {
    can_write(instance.permissions.as_ref(), user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, Permission)]) -> PermissionMap {
        entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn grant(read: bool, write: bool) -> Permission {
        Permission { read: Some(read), write: Some(write) }
    }

    #[test]
    fn absent_map_is_public() {
        assert!(can_read(None, "u1"));
        assert!(can_write(None, "u1"));
    }

    #[test]
    fn user_entry_decides() {
        let p = map(&[("u1", grant(true, false))]);
        assert!(can_read(Some(&p), "u1"));
        assert!(!can_write(Some(&p), "u1"));
    }

    #[test]
    fn no_entry_and_no_wildcard_denies() {
        let p = map(&[("u1", grant(true, true))]);
        assert!(!can_read(Some(&p), "u2"));
        assert!(!can_write(Some(&p), "u2"));

        let empty = PermissionMap::new();
        assert!(!can_read(Some(&empty), "u2"));
    }

    #[test]
    fn wildcard_applies_without_user_entry() {
        let p = map(&[("*", grant(true, false))]);
        assert!(can_read(Some(&p), "anyone"));
        assert!(!can_write(Some(&p), "anyone"));
    }

    #[test]
    fn user_entry_shadows_wildcard_even_when_empty() {
        let p = map(&[("*", grant(true, true)), ("u1", Permission::default())]);
        assert!(!can_read(Some(&p), "u1"));
        assert!(!can_write(Some(&p), "u1"));
        assert!(can_read(Some(&p), "u2"));
    }

    #[test]
    fn partial_entry_serializes_without_missing_flags() {
        let p = Permission { read: Some(true), write: None };
        assert_eq!(serde_json::to_value(&p).unwrap(), serde_json::json!({"read": true}));
    }

    #[test]
    fn owner_only_grants_single_user() {
        let p = owner_only("abc");
        assert_eq!(p.len(), 1);
        assert!(can_write(Some(&p), "abc"));
        assert!(!can_read(Some(&p), "other"));
    }
}
