use serde_json::{Map, Value};

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_page::FilterPage;
use super::filter_where::FilterWhere;
use super::types::FilterData;
use crate::entity::instance::STORAGE_ID_FIELD;
use crate::entity::EntityType;

/// Builds the storage query for a request against one entity type. Every
/// query is confined to the type and its specializations.
pub struct Filter<'a> {
    entity_type: &'a EntityType,
    conditions: Value,
    data: FilterData,
}

impl<'a> Filter<'a> {
    pub fn new(entity_type: &'a EntityType) -> Self {
        Self {
            entity_type,
            conditions: Value::Object(Map::new()),
            data: FilterData::new(&entity_type.root),
        }
    }

    /// Select a single instance by id.
    pub fn id(mut self, id: &str) -> Self {
        let mut conditions = Map::new();
        conditions.insert(STORAGE_ID_FIELD.to_string(), Value::String(id.to_string()));
        self.conditions = Value::Object(conditions);
        self
    }

    /// Match on an already-built where clause.
    pub fn conditions(mut self, conditions: Value) -> Self {
        self.conditions = conditions;
        self
    }

    /// Apply the optional `query` URL parameter.
    pub fn where_param(mut self, raw: Option<&str>) -> Result<Self, FilterError> {
        if let Some(raw) = raw {
            self.conditions = FilterWhere::parse_param(raw)?;
        }
        Ok(self)
    }

    pub fn order_param(mut self, raw: Option<&str>) -> Self {
        self.data.order = FilterOrder::parse(raw);
        self
    }

    pub fn page(mut self, page: FilterPage) -> Self {
        self.data.limit = Some(page.limit);
        self.data.offset = page.skip;
        self
    }

    /// Drop instances `user_id` may not read before paging.
    pub fn readable_by(mut self, user_id: Option<&str>) -> Self {
        self.data.readable_by = user_id.map(str::to_string);
        self
    }

    pub fn build(self) -> FilterData {
        let mut data = self.data;
        data.where_clause = FilterWhere::scoped(self.entity_type.hierarchy(), self.conditions);
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaginationConfig;
    use crate::entity::{AttributeSpec, AttributeType, EntityRegistry, EntitySpec};
    use serde_json::json;

    fn registry() -> EntityRegistry {
        EntityRegistry::builder()
            .entity(EntitySpec::new("City").attribute("name", AttributeSpec::new(AttributeType::String)))
            .entity(EntitySpec::new("District").specializes("City"))
            .build()
            .unwrap()
    }

    #[test]
    fn build_scopes_to_hierarchy_and_root_collection() {
        let registry = registry();
        let data = Filter::new(registry.get("District").unwrap()).id("d1").build();

        assert_eq!(data.collection, "City");
        assert_eq!(
            data.where_clause,
            json!({"$and": [{"Entity": {"$in": ["District"]}}, {"_id": "d1"}]})
        );
        assert_eq!(data.limit, None);
    }

    #[test]
    fn params_feed_order_page_and_reader() {
        let registry = registry();
        let page = FilterPage::from_params(Some("5"), None, Some("2"), &PaginationConfig::default());
        let data = Filter::new(registry.get("City").unwrap())
            .where_param(Some(r#"{"name":"Sjc"}"#))
            .unwrap()
            .order_param(Some("-name"))
            .page(page)
            .readable_by(Some("u1"))
            .build();

        assert_eq!(data.order, vec![crate::filter::FilterOrderInfo::desc("name")]);
        assert_eq!((data.limit, data.offset), (Some(5), 10));
        assert_eq!(data.readable_by.as_deref(), Some("u1"));
        assert_eq!(
            data.where_clause,
            json!({"$and": [{"Entity": {"$in": ["City", "District"]}}, {"name": "Sjc"}]})
        );
    }

    #[test]
    fn bad_where_param_is_an_error() {
        let registry = registry();
        assert!(Filter::new(registry.get("City").unwrap()).where_param(Some("nope")).is_err());
    }
}
