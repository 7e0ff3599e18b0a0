use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::error::ValidationError;
use super::schema::EntityType;
use crate::permission::PermissionMap;

/// Body keys that address the instance itself rather than an attribute
const ID_FIELD: &str = "id";
const ENTITY_FIELD: &str = "Entity";
const PERMISSIONS_FIELD: &str = "permissions";

/// Storage-side name of the identifier
pub const STORAGE_ID_FIELD: &str = "_id";

/// A single entity instance: identity, concrete type, attribute values and
/// optional access control. Built per request and dropped after the response.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub id: String,
    /// Concrete type name; may be a specialization of the type it was queried by
    pub entity: String,
    pub attributes: Map<String, Value>,
    /// `None` means public read/write
    pub permissions: Option<PermissionMap>,
}

impl Instance {
    /// Build a new instance of `entity_type` from a request body. A string `id`
    /// in the body is kept, otherwise a fresh one is assigned.
    pub fn from_body(entity_type: &EntityType, body: &Value) -> Result<Self, ValidationError> {
        let fields = body.as_object().ok_or(ValidationError::NotAnObject)?;

        let id = match fields.get(ID_FIELD) {
            None | Some(Value::Null) => Uuid::new_v4().to_string(),
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(_) => return Err(ValidationError::InvalidId),
        };

        let mut instance = Self {
            id,
            entity: entity_type.name.clone(),
            attributes: Map::new(),
            permissions: None,
        };
        instance.merge(body)?;
        Ok(instance)
    }

    /// Overwrite attributes with every field of `body`. Identity fields are
    /// ignored. Returns the names of attributes whose value changed.
    pub fn merge(&mut self, body: &Value) -> Result<Vec<String>, ValidationError> {
        let fields = body.as_object().ok_or(ValidationError::NotAnObject)?;
        let mut changed = Vec::new();

        for (key, value) in fields {
            match key.as_str() {
                ID_FIELD | ENTITY_FIELD => {}
                PERMISSIONS_FIELD => self.permissions = parse_permissions(value)?,
                _ => {
                    if self.attributes.get(key) != Some(value) {
                        changed.push(key.clone());
                    }
                    self.attributes.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(changed)
    }

    /// Replace every association value with a bare reference `{Entity, id}`.
    /// Accepts an id string or any object carrying a string `id`; anything else
    /// is left for validation to reject.
    pub fn resolve_associations(&mut self, entity_type: &EntityType) {
        for (name, spec) in &entity_type.attributes {
            let Some(target) = spec.target() else { continue };
            let Some(value) = self.attributes.get_mut(name) else { continue };

            match value {
                Value::Array(items) if spec.multiplicity.is_collection() => {
                    for item in items.iter_mut() {
                        if let Some(reference) = reference_to(target, item) {
                            *item = reference;
                        }
                    }
                }
                _ => {
                    if let Some(reference) = reference_to(target, value) {
                        *value = reference;
                    }
                }
            }
        }
    }

    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    /// Wire representation: every declared attribute (null when unset), plus
    /// `id`, `Entity` and `permissions`.
    pub fn to_document(&self, entity_type: &EntityType) -> Value {
        let mut document = Map::new();
        document.insert(ID_FIELD.to_string(), Value::String(self.id.clone()));
        for name in entity_type.attributes.keys() {
            let value = self.attributes.get(name).cloned().unwrap_or(Value::Null);
            document.insert(name.clone(), value);
        }
        document.insert(ENTITY_FIELD.to_string(), Value::String(self.entity.clone()));
        document.insert(PERMISSIONS_FIELD.to_string(), self.permissions_value());
        Value::Object(document)
    }

    /// Storage representation queries and sorts are evaluated against.
    pub fn to_storage_document(&self) -> Value {
        let mut document = self.attributes.clone();
        document.insert(STORAGE_ID_FIELD.to_string(), Value::String(self.id.clone()));
        document.insert(ENTITY_FIELD.to_string(), Value::String(self.entity.clone()));
        document.insert(PERMISSIONS_FIELD.to_string(), self.permissions_value());
        Value::Object(document)
    }

    fn permissions_value(&self) -> Value {
        self.permissions
            .as_ref()
            .and_then(|p| serde_json::to_value(p).ok())
            .unwrap_or(Value::Null)
    }
}

fn reference_to(target: &str, value: &Value) -> Option<Value> {
    let id = match value {
        Value::String(id) => id,
        Value::Object(obj) => obj.get(ID_FIELD)?.as_str()?,
        _ => return None,
    };
    Some(json!({ "Entity": target, "id": id }))
}

fn parse_permissions(value: &Value) -> Result<Option<PermissionMap>, ValidationError> {
    if value.is_null() {
        return Ok(None);
    }
    serde_json::from_value(value.clone())
        .map(Some)
        .map_err(|e| ValidationError::InvalidPermissions(e.to_string()))
}
