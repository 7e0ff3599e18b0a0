use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Instance id must be a string")]
    InvalidId,

    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Missing required attribute: {0}")]
    Missing(String),

    #[error("Attribute '{attribute}' expects {expected}")]
    TypeMismatch { attribute: String, expected: String },

    #[error("Attribute '{0}' has the wrong multiplicity")]
    Multiplicity(String),

    #[error("Invalid permissions: {0}")]
    InvalidPermissions(String),
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Entity '{0}' is declared more than once")]
    Duplicate(String),

    #[error("Entity '{entity}' specializes unknown entity '{parent}'")]
    UnknownParent { entity: String, parent: String },

    #[error("Attribute '{entity}.{attribute}' references unknown entity '{target}'")]
    UnknownAssociation { entity: String, attribute: String, target: String },

    #[error("Attribute name '{attribute}' on '{entity}' is reserved")]
    ReservedAttribute { entity: String, attribute: String },

    #[error("Specialization cycle through '{0}'")]
    Cycle(String),
}
