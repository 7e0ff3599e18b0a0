use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{EntityStore, StoreError};
use crate::entity::{EntityRegistry, Instance};
use crate::filter::filter_order::FilterOrder;
use crate::filter::filter_where::FilterWhere;
use crate::filter::FilterData;
use crate::permission;

type Collection = BTreeMap<String, Instance>;

/// In-process entity store with unique indexes derived from the registry.
pub struct MemoryStore {
    registry: Arc<EntityRegistry>,
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new(registry: Arc<EntityRegistry>) -> Self {
        Self {
            registry,
            collections: RwLock::new(HashMap::new()),
        }
    }

    fn collection_of(&self, instance: &Instance) -> Result<String, StoreError> {
        self.registry
            .get(&instance.entity)
            .map(|entity_type| entity_type.root.clone())
            .ok_or_else(|| StoreError::Backend(format!("unregistered entity '{}'", instance.entity)))
    }

    /// Reject `instance` if another document in the collection holds the same
    /// non-null value on any of its unique attributes.
    fn check_unique(&self, collection: &Collection, instance: &Instance) -> Result<(), StoreError> {
        let Some(entity_type) = self.registry.get(&instance.entity) else {
            return Ok(());
        };

        for field in entity_type.unique_attributes() {
            let value = match instance.attributes.get(field) {
                None | Some(Value::Null) => continue,
                Some(value) => value,
            };
            let taken = collection
                .values()
                .any(|other| other.id != instance.id && other.attributes.get(field) == Some(value));
            if taken {
                return Err(StoreError::Duplicate { field: field.to_string() });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn insert(&self, instance: &Instance) -> Result<(), StoreError> {
        let name = self.collection_of(instance)?;
        let mut collections = self.collections.write().await;
        let collection = collections.entry(name).or_default();

        if collection.contains_key(&instance.id) {
            return Err(StoreError::Duplicate { field: "_id".to_string() });
        }
        self.check_unique(collection, instance)?;

        collection.insert(instance.id.clone(), instance.clone());
        Ok(())
    }

    async fn update(&self, instance: &Instance) -> Result<(), StoreError> {
        let name = self.collection_of(instance)?;
        let mut collections = self.collections.write().await;
        let Some(collection) = collections.get_mut(&name).filter(|c| c.contains_key(&instance.id)) else {
            return Err(StoreError::NotFound { id: instance.id.clone() });
        };

        self.check_unique(collection, instance)?;

        collection.insert(instance.id.clone(), instance.clone());
        Ok(())
    }

    async fn find(&self, filter: &FilterData) -> Result<Vec<Instance>, StoreError> {
        // Reject malformed clauses even when the collection is empty.
        FilterWhere::validate(&filter.where_clause)?;

        let collections = self.collections.read().await;
        let Some(collection) = collections.get(&filter.collection) else {
            return Ok(vec![]);
        };

        let mut matched = Vec::new();
        for instance in collection.values() {
            if let Some(user_id) = &filter.readable_by {
                if !permission::has_read_permission(instance, user_id) {
                    continue;
                }
            }
            let document = instance.to_storage_document();
            if FilterWhere::matches(&filter.where_clause, &document)? {
                matched.push((document, instance));
            }
        }

        matched.sort_by(|(a, _), (b, _)| FilterOrder::compare(a, b, &filter.order));

        let limit = filter.limit.unwrap_or(usize::MAX);
        Ok(matched
            .into_iter()
            .skip(filter.offset)
            .take(limit)
            .map(|(_, instance)| instance.clone())
            .collect())
    }

    async fn delete(&self, instance: &Instance) -> Result<bool, StoreError> {
        let name = self.collection_of(instance)?;
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(&name)
            .and_then(|collection| collection.remove(&instance.id))
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{AttributeSpec, AttributeType, EntitySpec};
    use crate::filter::Filter;
    use crate::permission::{Permission, PermissionMap};
    use serde_json::json;

    fn registry() -> Arc<EntityRegistry> {
        Arc::new(
            EntityRegistry::builder()
                .entity(
                    EntitySpec::new("City")
                        .attribute("name", AttributeSpec::new(AttributeType::String))
                        .attribute("streets", AttributeSpec::new(AttributeType::Number)),
                )
                .entity(EntitySpec::new("District").specializes("City"))
                .build()
                .unwrap(),
        )
    }

    fn instance(registry: &EntityRegistry, entity: &str, body: Value) -> Instance {
        Instance::from_body(registry.get(entity).unwrap(), &body).unwrap()
    }

    async fn seeded() -> (Arc<EntityRegistry>, MemoryStore) {
        let registry = registry();
        let store = MemoryStore::new(Arc::clone(&registry));
        for body in [
            json!({"id": "c1", "name": "Sjc", "streets": 3000}),
            json!({"id": "c2", "name": "Sp", "streets": 10000}),
        ] {
            store.insert(&instance(&registry, "City", body)).await.unwrap();
        }
        store
            .insert(&instance(&registry, "District", json!({"id": "d1", "name": "Centro", "streets": 800})))
            .await
            .unwrap();
        (registry, store)
    }

    #[tokio::test]
    async fn find_covers_specializations_only_downwards() {
        let (registry, store) = seeded().await;

        let cities = store.find(&Filter::new(registry.get("City").unwrap()).build()).await.unwrap();
        assert_eq!(cities.len(), 3);

        let districts = store.find(&Filter::new(registry.get("District").unwrap()).build()).await.unwrap();
        let ids: Vec<_> = districts.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["d1"]);
    }

    #[tokio::test]
    async fn find_sorts_and_pages() {
        let (registry, store) = seeded().await;
        let mut filter = Filter::new(registry.get("City").unwrap())
            .order_param(Some("-streets"))
            .build();
        filter.limit = Some(2);
        filter.offset = 1;

        let page = store.find(&filter).await.unwrap();
        let ids: Vec<_> = page.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["c1", "d1"]);
    }

    #[tokio::test]
    async fn unique_attributes_are_enforced() {
        let registry = registry();
        let store = MemoryStore::new(Arc::clone(&registry));
        let user = |id: &str, name: &str| {
            instance(&registry, "User", json!({"id": id, "username": name, "password": "x"}))
        };

        store.insert(&user("u1", "alice")).await.unwrap();
        let err = store.insert(&user("u2", "alice")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { ref field } if field == "username"));

        let err = store.insert(&user("u1", "bob")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { ref field } if field == "_id"));

        // Updating a document never collides with itself.
        store.update(&user("u1", "alice")).await.unwrap();
    }

    #[tokio::test]
    async fn readable_by_filters_before_paging() {
        let registry = registry();
        let store = MemoryStore::new(Arc::clone(&registry));
        let mut hidden = instance(&registry, "City", json!({"id": "a", "name": "A", "streets": 1}));
        let mut denied = PermissionMap::new();
        denied.insert("u1".into(), Permission { read: Some(false), write: None });
        hidden.permissions = Some(denied);
        store.insert(&hidden).await.unwrap();
        store
            .insert(&instance(&registry, "City", json!({"id": "b", "name": "B", "streets": 2})))
            .await
            .unwrap();

        let mut filter = Filter::new(registry.get("City").unwrap()).readable_by(Some("u1")).build();
        filter.limit = Some(1);
        let page = store.find(&filter).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "b");
    }

    #[tokio::test]
    async fn delete_reports_whether_removed() {
        let (registry, store) = seeded().await;
        let city = instance(&registry, "City", json!({"id": "c1"}));
        assert!(store.delete(&city).await.unwrap());
        assert!(!store.delete(&city).await.unwrap());
    }

    #[tokio::test]
    async fn update_does_not_resurrect_deleted_instances() {
        let (registry, store) = seeded().await;
        let city = instance(&registry, "City", json!({"id": "c1", "name": "Renamed"}));
        assert!(store.delete(&city).await.unwrap());

        let err = store.update(&city).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref id } if id == "c1"));

        let filter = Filter::new(registry.get("City").unwrap()).id("c1").build();
        assert!(store.find_one(&filter).await.unwrap().is_none());

        let fresh = MemoryStore::new(Arc::clone(&registry));
        assert!(matches!(fresh.update(&city).await, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn invalid_clause_is_rejected_on_empty_store() {
        let registry = registry();
        let store = MemoryStore::new(Arc::clone(&registry));
        let mut filter = Filter::new(registry.get("City").unwrap()).build();
        filter.where_clause = json!({"name": {"$regex": "x"}});
        assert!(matches!(store.find(&filter).await, Err(StoreError::InvalidQuery(_))));
    }
}
