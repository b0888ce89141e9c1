//! Sub-field projection: map an extraction outcome onto the schema's
//! enabled sub-fields.

use satchel_extractors::ExtractedContent;

use crate::document::{DocumentBuilder, FieldValue};
use crate::payload::AttachmentInput;
use crate::schema::{AttachmentFieldSchema, SubField};

/// Sub-field values produced for one attachment, in projection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectedFields {
    entries: Vec<(String, FieldValue)>,
}

impl ProjectedFields {
    fn push(&mut self, name: &str, value: FieldValue) {
        self.entries.push((name.to_string(), value));
    }

    /// Value projected under the target name `name`.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// Target names of the produced sub-fields.
    pub fn produced(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hand every value to `builder`, once per produced sub-field.
    pub fn apply_to<B: DocumentBuilder + ?Sized>(&self, builder: &mut B) {
        for (name, value) in &self.entries {
            builder.set_field(name, value.clone());
        }
    }
}

/// Project `extracted` (or nothing, for a tolerated parse fault) onto the
/// sub-fields `schema` enables.
///
/// The content sub-field is always produced, empty when nothing was
/// extracted. Other sub-fields are produced only when a value exists.
pub fn project(
    schema: &AttachmentFieldSchema,
    input: &AttachmentInput,
    extracted: Option<&ExtractedContent>,
) -> ProjectedFields {
    let mut fields = ProjectedFields::default();

    for (sub, options) in schema.enabled() {
        let value = match sub {
            SubField::Content => Some(FieldValue::Text(
                extracted.map(|c| c.text.clone()).unwrap_or_default(),
            )),
            SubField::Title => extracted.and_then(|c| c.title.clone()).map(FieldValue::Text),
            SubField::Name => input.name.clone().map(FieldValue::Text),
            SubField::Author => extracted.and_then(|c| c.author.clone()).map(FieldValue::Text),
            SubField::Keywords => extracted.and_then(|c| c.keywords.clone()).map(FieldValue::Text),
            SubField::ContentType => extracted
                .and_then(|c| c.content_type.clone())
                .or_else(|| input.content_type.clone())
                .map(FieldValue::Text),
            SubField::ContentLength => Some(FieldValue::Long(input.len() as u64)),
            SubField::Language => input
                .language
                .clone()
                .or_else(|| extracted.and_then(|c| c.language.clone()))
                .map(FieldValue::Text),
            SubField::Date => extracted.and_then(|c| c.date).map(FieldValue::Date),
        };

        if let Some(value) = value {
            fields.push(&options.name, value);
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapperSettings;
    use crate::document::MockDocumentBuilder;
    use chrono::{TimeZone, Utc};
    use mockall::predicate::eq;
    use satchel_extractors::Modality;
    use serde_json::json;

    fn schema(definition: serde_json::Value) -> AttachmentFieldSchema {
        AttachmentFieldSchema::parse("file", &definition, &MapperSettings::default()).unwrap()
    }

    fn extracted() -> ExtractedContent {
        ExtractedContent::new("XHTML body text".to_string(), Modality::Html)
            .with_title(Some("XHTML test document".to_string()))
            .with_author(Some("kimchy".to_string()))
            .with_keywords(Some("elasticsearch,cool,bonsai".to_string()))
            .with_content_type("text/html")
            .with_date(Some(Utc.with_ymd_and_hms(2011, 2, 21, 0, 0, 0).unwrap()))
            .with_language(Some("en".to_string()))
    }

    #[test]
    fn test_projects_all_enabled_values() {
        let input = AttachmentInput::new(b"<html>0123456789</html>".to_vec()).with_name("test.html");
        let fields = project(&schema(json!({"type": "attachment"})), &input, Some(&extracted()));

        assert_eq!(
            fields.produced(),
            vec![
                "file",
                "file.title",
                "file.name",
                "file.author",
                "file.keywords",
                "file.content_type",
                "file.content_length",
                "file.language",
                "file.date",
            ]
        );
        assert_eq!(fields.get("file.title").and_then(FieldValue::as_text), Some("XHTML test document"));
        assert_eq!(fields.get("file.content_length").and_then(FieldValue::as_long), Some(23));
    }

    #[test]
    fn test_disabled_sub_fields_are_never_produced() {
        let schema = schema(json!({
            "type": "attachment",
            "fields": {
                "author": {"enabled": false},
                "date": {"index": "no"},
                "title": {"name": "headline"}
            }
        }));
        let fields = project(&schema, &AttachmentInput::new(b"x".to_vec()), Some(&extracted()));

        assert!(fields.get("file.author").is_none());
        assert!(fields.get("file.date").is_none());
        assert!(fields.get("file.title").is_none());
        assert_eq!(fields.get("headline").and_then(FieldValue::as_text), Some("XHTML test document"));
    }

    #[test]
    fn test_absent_values_are_omitted() {
        let plain = ExtractedContent::new("just text".to_string(), Modality::Text);
        let fields = project(
            &schema(json!({"type": "attachment"})),
            &AttachmentInput::new(b"just text".to_vec()),
            Some(&plain),
        );

        assert_eq!(fields.produced(), vec!["file", "file.content_length"]);
    }

    #[test]
    fn test_empty_outcome_still_writes_content() {
        let input = AttachmentInput::new(b"ID3corrupt".to_vec())
            .with_content_type("audio/mpeg")
            .with_language("de");
        let fields = project(&schema(json!({"type": "attachment"})), &input, None);

        assert_eq!(fields.get("file").and_then(FieldValue::as_text), Some(""));
        assert_eq!(fields.get("file.content_type").and_then(FieldValue::as_text), Some("audio/mpeg"));
        assert_eq!(fields.get("file.language").and_then(FieldValue::as_text), Some("de"));
        assert!(fields.get("file.title").is_none());
    }

    #[test]
    fn test_language_override_wins() {
        let input = AttachmentInput::new(b"x".to_vec()).with_language("fr");
        let fields = project(&schema(json!({"type": "attachment"})), &input, Some(&extracted()));
        assert_eq!(fields.get("file.language").and_then(FieldValue::as_text), Some("fr"));
    }

    #[test]
    fn test_apply_sets_each_field_once() {
        let plain = ExtractedContent::new("body".to_string(), Modality::Text);
        let fields = project(
            &schema(json!({"type": "attachment"})),
            &AttachmentInput::new(b"body".to_vec()),
            Some(&plain),
        );

        let mut builder = MockDocumentBuilder::new();
        builder
            .expect_set_field()
            .with(eq("file"), eq(FieldValue::Text("body".to_string())))
            .times(1)
            .return_const(());
        builder
            .expect_set_field()
            .with(eq("file.content_length"), eq(FieldValue::Long(4)))
            .times(1)
            .return_const(());

        fields.apply_to(&mut builder);
    }
}
