// entity/mod.rs - the entity model the gateway serves
//
// Types are declared once (in code or a YAML schema file), resolved into an
// `EntityRegistry`, and instances are validated against them per request.

pub mod error;
pub mod instance;
pub mod schema;

pub use error::{RegistryError, ValidationError};
pub use instance::Instance;
pub use schema::{
    AttributeSpec, AttributeType, EntityRegistry, EntitySpec, EntityType, Multiplicity,
    PASSWORD_ATTRIBUTE, USERNAME_ATTRIBUTE, USER_ENTITY,
};
