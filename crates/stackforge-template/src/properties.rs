use std::collections::BTreeMap;

/// Declared type of one resource property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyType {
    String,
    Integer,
    Number,
    Boolean,
    /// List with an optional element type.
    List(Option<Box<PropertyType>>),
    /// Map with an optional schema for its keys.
    Map(Option<PropertySchema>),
}

impl PropertyType {
    pub fn list_of(element: PropertyType) -> Self {
        PropertyType::List(Some(Box::new(element)))
    }

    pub fn map_of(schema: PropertySchema) -> Self {
        PropertyType::Map(Some(schema))
    }

    /// Schema that applies below this property: a map's own schema, or the
    /// schema of a list's map elements.
    pub fn nested(&self) -> Option<&PropertySchema> {
        match self {
            PropertyType::Map(schema) => schema.as_ref(),
            PropertyType::List(Some(element)) => element.nested(),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, PropertyType::List(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, PropertyType::Map(_))
    }
}

/// Property types of a resource, keyed by property name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySchema {
    properties: BTreeMap<String, PropertyType>,
}

impl PropertySchema {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: &str, ty: PropertyType) -> Self {
        self.properties.insert(name.to_owned(), ty);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropertyType> {
        self.properties.get(name)
    }

    /// Schema below `name`, if declared.
    pub fn child(&self, name: &str) -> Option<&PropertySchema> {
        self.get(name).and_then(PropertyType::nested)
    }
}
