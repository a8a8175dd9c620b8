use serde_json::{Map, Value as Json};

/// A requested field with its arguments and nested fields.
///
/// The root selection names the queried table or mutation; its children
/// name columns and relations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub name: String,

    /// Key the field is reported under when different from `name`
    pub alias: Option<String>,

    pub arguments: Map<String, Json>,

    pub selection: Vec<Selection>,
}

impl Selection {
    pub fn new(name: impl Into<String>) -> Selection {
        Selection {
            name: name.into(),
            ..Selection::default()
        }
    }

    /// Key of the field in the response object.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Selection {
        self.alias = Some(alias.into());
        self
    }

    pub fn argument(mut self, name: impl Into<String>, value: Json) -> Selection {
        self.arguments.insert(name.into(), value);
        self
    }

    /// Adds a nested field.
    pub fn select(mut self, field: impl Into<Selection>) -> Selection {
        self.selection.push(field.into());
        self
    }

    /// Adds nested scalar fields.
    pub fn fields<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Selection {
        self.selection.extend(names.into_iter().map(Selection::new));
        self
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        Selection::new(value)
    }
}
