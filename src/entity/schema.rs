use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{RegistryError, ValidationError};
use super::instance::Instance;

/// Name of the built-in user type every registry carries.
pub const USER_ENTITY: &str = "User";
pub const USERNAME_ATTRIBUTE: &str = "username";
pub const PASSWORD_ATTRIBUTE: &str = "password";
pub const EMAIL_ATTRIBUTE: &str = "email";

/// Keys the router owns on every document; they can't be declared as attributes.
pub const RESERVED_ATTRIBUTES: [&str; 4] = ["id", "_id", "Entity", "permissions"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AttributeType {
    String,
    Number,
    Boolean,
    Date,
    Object,
    /// Reference to an instance of the named entity type.
    Association(String),
}

impl From<String> for AttributeType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "String" => AttributeType::String,
            "Number" => AttributeType::Number,
            "Boolean" => AttributeType::Boolean,
            "Date" => AttributeType::Date,
            "Object" => AttributeType::Object,
            _ => AttributeType::Association(name),
        }
    }
}

impl From<AttributeType> for String {
    fn from(kind: AttributeType) -> Self {
        kind.name().to_string()
    }
}

impl AttributeType {
    pub fn name(&self) -> &str {
        match self {
            AttributeType::String => "String",
            AttributeType::Number => "Number",
            AttributeType::Boolean => "Boolean",
            AttributeType::Date => "Date",
            AttributeType::Object => "Object",
            AttributeType::Association(target) => target,
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            AttributeType::String => value.is_string(),
            AttributeType::Number => value.is_number(),
            AttributeType::Boolean => value.is_boolean(),
            AttributeType::Date => value
                .as_str()
                .is_some_and(|s| DateTime::parse_from_rfc3339(s).is_ok()),
            AttributeType::Object => value.is_object(),
            AttributeType::Association(_) => value
                .as_object()
                .and_then(|obj| obj.get("id"))
                .is_some_and(Value::is_string),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Multiplicity {
    #[default]
    #[serde(rename = "1")]
    One,
    #[serde(rename = "0..1")]
    Optional,
    #[serde(rename = "*")]
    Many,
    #[serde(rename = "1..*")]
    OneOrMore,
}

impl Multiplicity {
    pub fn is_collection(&self) -> bool {
        matches!(self, Multiplicity::Many | Multiplicity::OneOrMore)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSpec {
    #[serde(rename = "type")]
    pub kind: AttributeType,
    #[serde(default)]
    pub multiplicity: Multiplicity,
    /// Enforced by the store; null values never collide.
    #[serde(default)]
    pub unique: bool,
}

impl AttributeSpec {
    pub fn new(kind: AttributeType) -> Self {
        Self { kind, multiplicity: Multiplicity::One, unique: false }
    }

    pub fn multiplicity(mut self, multiplicity: Multiplicity) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn target(&self) -> Option<&str> {
        match &self.kind {
            AttributeType::Association(target) => Some(target),
            _ => None,
        }
    }

    fn check(&self, name: &str, value: Option<&Value>) -> Result<(), ValidationError> {
        let value = value.filter(|v| !v.is_null());
        match (self.multiplicity, value) {
            (Multiplicity::One | Multiplicity::OneOrMore, None) => {
                Err(ValidationError::Missing(name.to_string()))
            }
            (Multiplicity::Optional | Multiplicity::Many, None) => Ok(()),
            (Multiplicity::One | Multiplicity::Optional, Some(v)) => self.check_single(name, v),
            (Multiplicity::Many | Multiplicity::OneOrMore, Some(v)) => {
                let items = v
                    .as_array()
                    .ok_or_else(|| ValidationError::Multiplicity(name.to_string()))?;
                if self.multiplicity == Multiplicity::OneOrMore && items.is_empty() {
                    return Err(ValidationError::Multiplicity(name.to_string()));
                }
                items.iter().try_for_each(|item| self.check_single(name, item))
            }
        }
    }

    fn check_single(&self, name: &str, value: &Value) -> Result<(), ValidationError> {
        if self.kind.accepts(value) {
            Ok(())
        } else {
            Err(ValidationError::TypeMismatch {
                attribute: name.to_string(),
                expected: self.kind.name().to_string(),
            })
        }
    }
}

/// Declaration of an entity type, as written in code or in a schema file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpec {
    pub name: String,
    #[serde(default)]
    pub specializes: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeSpec>,
}

impl EntitySpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), specializes: None, attributes: BTreeMap::new() }
    }

    pub fn specializes(mut self, parent: impl Into<String>) -> Self {
        self.specializes = Some(parent.into());
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, spec: AttributeSpec) -> Self {
        self.attributes.insert(name.into(), spec);
        self
    }

    fn user() -> Self {
        Self::new(USER_ENTITY)
            .attribute(USERNAME_ATTRIBUTE, AttributeSpec::new(AttributeType::String).unique())
            .attribute(
                EMAIL_ATTRIBUTE,
                AttributeSpec::new(AttributeType::String)
                    .multiplicity(Multiplicity::Optional)
                    .unique(),
            )
            .attribute(PASSWORD_ATTRIBUTE, AttributeSpec::new(AttributeType::String))
    }
}

/// A registered type with everything resolved: inherited attributes, the
/// collection it lives in, and every type a query for it must match.
#[derive(Debug, Clone)]
pub struct EntityType {
    pub name: String,
    pub root: String,
    pub attributes: BTreeMap<String, AttributeSpec>,
    hierarchy: Vec<String>,
}

impl EntityType {
    /// This type followed by all of its transitive specializations.
    pub fn hierarchy(&self) -> &[String] {
        &self.hierarchy
    }

    pub fn unique_attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .iter()
            .filter(|(_, spec)| spec.unique)
            .map(|(name, _)| name.as_str())
    }

    /// Type and multiplicity checks for every declared attribute, and rejection
    /// of anything undeclared.
    pub fn validate(&self, instance: &Instance) -> Result<(), ValidationError> {
        if let Some(unknown) = instance
            .attributes
            .keys()
            .find(|key| !self.attributes.contains_key(key.as_str()))
        {
            return Err(ValidationError::UnknownAttribute(unknown.clone()));
        }

        for (name, spec) in &self.attributes {
            spec.check(name, instance.attributes.get(name))?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct EntityRegistryBuilder {
    specs: Vec<EntitySpec>,
}

impl EntityRegistryBuilder {
    pub fn entity(mut self, spec: EntitySpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn entities(mut self, specs: impl IntoIterator<Item = EntitySpec>) -> Self {
        self.specs.extend(specs);
        self
    }

    pub fn build(self) -> Result<EntityRegistry, RegistryError> {
        let mut specs: HashMap<String, EntitySpec> = HashMap::new();
        for spec in std::iter::once(EntitySpec::user()).chain(self.specs) {
            if let Some(reserved) = spec
                .attributes
                .keys()
                .find(|k| RESERVED_ATTRIBUTES.contains(&k.as_str()))
            {
                return Err(RegistryError::ReservedAttribute {
                    entity: spec.name.clone(),
                    attribute: reserved.clone(),
                });
            }
            if specs.contains_key(&spec.name) {
                return Err(RegistryError::Duplicate(spec.name));
            }
            specs.insert(spec.name.clone(), spec);
        }

        for spec in specs.values() {
            if let Some(parent) = &spec.specializes {
                if !specs.contains_key(parent) {
                    return Err(RegistryError::UnknownParent {
                        entity: spec.name.clone(),
                        parent: parent.clone(),
                    });
                }
            }
            for (attribute, attr) in &spec.attributes {
                if let Some(target) = attr.target() {
                    if !specs.contains_key(target) {
                        return Err(RegistryError::UnknownAssociation {
                            entity: spec.name.clone(),
                            attribute: attribute.clone(),
                            target: target.to_string(),
                        });
                    }
                }
            }
        }

        // Ancestor chains, root first.
        let mut chains: HashMap<String, Vec<String>> = HashMap::new();
        for name in specs.keys() {
            let mut chain = vec![name.clone()];
            let mut seen = BTreeSet::from([name.clone()]);
            let mut current = name;
            while let Some(parent) = specs[current].specializes.as_ref() {
                if !seen.insert(parent.clone()) {
                    return Err(RegistryError::Cycle(name.clone()));
                }
                chain.push(parent.clone());
                current = parent;
            }
            chain.reverse();
            chains.insert(name.clone(), chain);
        }

        let mut types = HashMap::new();
        for (name, chain) in &chains {
            let mut attributes = BTreeMap::new();
            for ancestor in chain {
                attributes.extend(specs[ancestor].attributes.clone());
            }

            let mut specializations: Vec<String> = chains
                .iter()
                .filter(|(other, other_chain)| *other != name && other_chain.contains(name))
                .map(|(other, _)| other.clone())
                .collect();
            specializations.sort();

            let mut hierarchy = vec![name.clone()];
            hierarchy.extend(specializations);

            types.insert(
                name.clone(),
                EntityType {
                    name: name.clone(),
                    root: chain[0].clone(),
                    attributes,
                    hierarchy,
                },
            );
        }

        tracing::debug!("Entity registry built with {} types", types.len());
        Ok(EntityRegistry { types })
    }
}

/// Every entity type the gateway serves, resolved once at startup.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    types: HashMap<String, EntityType>,
}

impl EntityRegistry {
    pub fn builder() -> EntityRegistryBuilder {
        EntityRegistryBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&EntityType> {
        self.types.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// True for `User` and every type specializing it.
    pub fn is_user(&self, name: &str) -> bool {
        self.types
            .get(USER_ENTITY)
            .is_some_and(|user| user.hierarchy().iter().any(|n| n == name))
    }
}
