use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Boolean,
    Date,
    Enum,
    Reference,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    #[default]
    ToOne,
    ToMany,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::ToOne => "to_one",
            ReferenceType::ToMany => "to_many",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references_model: Option<String>,
    /// Informational only; references always resolve against record ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_type: Option<ReferenceType>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            field_type,
            ..Default::default()
        }
    }

    pub fn reference(
        name: impl Into<String>,
        target: impl Into<String>,
        reference_type: ReferenceType,
    ) -> Self {
        Self {
            references_model: Some(target.into()),
            reference_type: Some(reference_type),
            ..Self::new(name, FieldType::Reference)
        }
    }

    pub fn with_enum_values(mut self, values: &[&str]) -> Self {
        self.enum_values = values.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Target model and cardinality when this is a reference field with a target.
    /// A missing `referenceType` reads as to_one.
    pub fn reference_target(&self) -> Option<(&str, ReferenceType)> {
        if self.field_type != FieldType::Reference {
            return None;
        }
        let target = self.references_model.as_deref()?;
        Some((target, self.reference_type.unwrap_or_default()))
    }

    pub fn label(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.name
        } else {
            &self.title
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModelDefinition {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub display_fields: Vec<String>,
}

impl ModelDefinition {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDefinition>) -> Self {
        Self {
            name: name.into(),
            fields,
            display_fields: Vec::new(),
        }
    }

    pub fn reference_fields(&self) -> impl Iterator<Item = (&FieldDefinition, &str, ReferenceType)> {
        self.fields
            .iter()
            .filter_map(|f| f.reference_target().map(|(target, rt)| (f, target, rt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_schema() {
        let raw = r#"{
            "name": "Pet",
            "fields": [
                {"name": "name", "title": "Name", "type": "text", "required": true},
                {"name": "kind", "type": "enum", "enumValues": ["cat", "dog"]},
                {"name": "owner", "type": "reference", "referencesModel": "Owner",
                 "referencesField": "id", "referenceType": "to_one"},
                {"name": "notes"}
            ]
        }"#;
        let model: ModelDefinition = serde_json::from_str(raw).unwrap();
        assert_eq!(model.fields.len(), 4);
        assert_eq!(model.fields[1].enum_values, vec!["cat", "dog"]);
        assert_eq!(
            model.fields[2].reference_target(),
            Some(("Owner", ReferenceType::ToOne))
        );
        assert_eq!(model.fields[3].field_type, FieldType::Text);
        assert!(model.display_fields.is_empty());
    }

    #[test]
    fn reference_without_cardinality_is_to_one() {
        let mut field = FieldDefinition::new("owner", FieldType::Reference);
        field.references_model = Some("Owner".to_string());
        assert_eq!(field.reference_target(), Some(("Owner", ReferenceType::ToOne)));
    }

    #[test]
    fn reference_without_target_is_not_a_reference() {
        let field = FieldDefinition::new("owner", FieldType::Reference);
        assert!(field.reference_target().is_none());
    }
}
