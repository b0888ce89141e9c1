//! Attachment field schema: which sub-fields an attachment field produces
//! and how each one is indexed.
//!
//! A schema is parsed once, when the mapping is registered, and is
//! immutable afterwards. All mapping mistakes surface here as
//! [`SatchelError::Configuration`] so that no document is ever processed
//! against a bad definition.
//!
//! ```json
//! {
//!   "type": "attachment",
//!   "indexed_chars": 100000,
//!   "fields": {
//!     "title":   { "store": true, "analyzer": "en_stem" },
//!     "author":  { "index": "not_analyzed" },
//!     "date":    { "enabled": false }
//!   }
//! }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::MapperSettings;
use crate::error::{ErrorCode, SatchelError, SatchelResult};

/// The mapping type name that selects this field type.
pub const ATTACHMENT_TYPE: &str = "attachment";

/// Analyzers a sub-field may reference.
pub const KNOWN_ANALYZERS: &[&str] = &["default", "raw", "en_stem", "whitespace"];

/// A sub-field an attachment field can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubField {
    Content,
    Title,
    Name,
    Author,
    Keywords,
    ContentType,
    ContentLength,
    Language,
    Date,
}

/// Value family of a sub-field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubFieldKind {
    Text,
    Long,
    Date,
}

impl SubField {
    /// Every sub-field, in projection order.
    pub const ALL: [SubField; 9] = [
        SubField::Content,
        SubField::Title,
        SubField::Name,
        SubField::Author,
        SubField::Keywords,
        SubField::ContentType,
        SubField::ContentLength,
        SubField::Language,
        SubField::Date,
    ];

    /// Key used for this sub-field in mapping definitions.
    pub fn key(&self) -> &'static str {
        match self {
            SubField::Content => "content",
            SubField::Title => "title",
            SubField::Name => "name",
            SubField::Author => "author",
            SubField::Keywords => "keywords",
            SubField::ContentType => "content_type",
            SubField::ContentLength => "content_length",
            SubField::Language => "language",
            SubField::Date => "date",
        }
    }

    /// Look a sub-field up by its mapping key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    pub fn kind(&self) -> SubFieldKind {
        match self {
            SubField::ContentLength => SubFieldKind::Long,
            SubField::Date => SubFieldKind::Date,
            _ => SubFieldKind::Text,
        }
    }

    fn default_index(&self) -> IndexOption {
        match self {
            SubField::ContentType | SubField::Language => IndexOption::NotAnalyzed,
            _ => IndexOption::Analyzed,
        }
    }
}

impl fmt::Display for SubField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// How a sub-field is indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOption {
    /// Tokenized with the sub-field's analyzer.
    Analyzed,
    /// Indexed as a single token.
    NotAnalyzed,
    /// Not indexed.
    No,
}

impl IndexOption {
    fn parse(raw: &RawIndexOption) -> SatchelResult<Self> {
        match raw {
            RawIndexOption::Flag(true) => Ok(Self::Analyzed),
            RawIndexOption::Flag(false) => Ok(Self::No),
            RawIndexOption::Mode(mode) => match mode.as_str() {
                "analyzed" => Ok(Self::Analyzed),
                "not_analyzed" => Ok(Self::NotAnalyzed),
                "no" => Ok(Self::No),
                other => Err(SatchelError::configuration(
                    format!("unsupported index option [{}]", other),
                    ErrorCode::CfgUnsupportedOption,
                )),
            },
        }
    }
}

/// Resolved options for one enabled sub-field.
#[derive(Debug, Clone, PartialEq)]
pub struct SubFieldOptions {
    /// Target field name in the indexed document.
    pub name: String,
    pub index: IndexOption,
    pub store: bool,
    /// Analyzer for analyzed text sub-fields.
    pub analyzer: Option<String>,
}

impl SubFieldOptions {
    pub fn is_indexed(&self) -> bool {
        self.index != IndexOption::No
    }

    /// Tokenizer to register the sub-field with.
    pub fn tokenizer(&self) -> &str {
        match self.index {
            IndexOption::Analyzed => self.analyzer.as_deref().unwrap_or("default"),
            IndexOption::NotAnalyzed | IndexOption::No => "raw",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFieldDefinition {
    #[serde(rename = "type")]
    field_type: String,
    store: Option<bool>,
    indexed_chars: Option<i64>,
    detect_language: Option<bool>,
    ignore_errors: Option<bool>,
    #[serde(default)]
    fields: BTreeMap<String, RawSubFieldDefinition>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSubFieldDefinition {
    enabled: Option<bool>,
    store: Option<bool>,
    index: Option<RawIndexOption>,
    analyzer: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawIndexOption {
    Flag(bool),
    Mode(String),
}

/// Parse-time definition of one attachment field.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentFieldSchema {
    field: String,
    sub_fields: BTreeMap<SubField, SubFieldOptions>,
    indexed_chars: Option<i64>,
    detect_language: bool,
    ignore_errors: bool,
}

fn unsupported(message: String) -> SatchelError {
    SatchelError::configuration(message, ErrorCode::CfgUnsupportedOption)
}

fn conflicting(message: String) -> SatchelError {
    SatchelError::configuration(message, ErrorCode::CfgConflictingSettings)
}

impl AttachmentFieldSchema {
    /// Schema with every sub-field enabled under its default name and the
    /// given settings as defaults.
    pub fn with_defaults(field: impl Into<String>, settings: &MapperSettings) -> Self {
        let field = field.into();
        let sub_fields = SubField::ALL
            .into_iter()
            .map(|sub| {
                let options = SubFieldOptions {
                    name: default_name(&field, sub),
                    index: sub.default_index(),
                    store: false,
                    analyzer: None,
                };
                (sub, options)
            })
            .collect();

        Self {
            field,
            sub_fields,
            indexed_chars: settings.indexed_chars,
            detect_language: settings.detect_language,
            ignore_errors: settings.ignore_errors,
        }
    }

    /// Parse the definition registered for `field`.
    pub fn parse(field: &str, definition: &Value, settings: &MapperSettings) -> SatchelResult<Self> {
        let raw: RawFieldDefinition = serde_json::from_value(definition.clone())
            .map_err(|e| unsupported(format!("invalid mapping for field [{}]: {}", field, e)))?;

        if raw.field_type != ATTACHMENT_TYPE {
            return Err(unsupported(format!(
                "field [{}] has type [{}], expected [{}]",
                field, raw.field_type, ATTACHMENT_TYPE
            )));
        }

        for key in raw.fields.keys() {
            if SubField::from_key(key).is_none() {
                return Err(unsupported(format!(
                    "unsupported sub-field [{}] for attachment field [{}]",
                    key, field
                )));
            }
        }

        let default_store = raw.store.unwrap_or(false);
        let no_options = RawSubFieldDefinition::default();
        let mut sub_fields = BTreeMap::new();
        let mut names = HashSet::new();

        for sub in SubField::ALL {
            let options = raw.fields.get(sub.key()).unwrap_or(&no_options);
            let Some(resolved) = resolve_sub_field(field, sub, options, default_store)? else {
                debug!(field, sub_field = %sub, "Sub-field disabled");
                continue;
            };

            if !names.insert(resolved.name.clone()) {
                return Err(conflicting(format!(
                    "sub-field name [{}] is used twice in attachment field [{}]",
                    resolved.name, field
                )));
            }
            sub_fields.insert(sub, resolved);
        }

        Ok(Self {
            field: field.to_string(),
            sub_fields,
            indexed_chars: raw.indexed_chars.or(settings.indexed_chars),
            detect_language: raw.detect_language.unwrap_or(settings.detect_language),
            ignore_errors: raw.ignore_errors.unwrap_or(settings.ignore_errors),
        })
    }

    /// Parse every attachment field of a type mapping.
    ///
    /// Accepts `{"properties": {...}}`, optionally wrapped in a single type
    /// name. Properties of other types are left to the host.
    pub fn parse_mapping(mapping: &Value, settings: &MapperSettings) -> SatchelResult<Vec<Self>> {
        let properties = mapping_properties(mapping).ok_or_else(|| {
            unsupported("mapping has no [properties] object".to_string())
        })?;

        let mut schemas = Vec::new();
        for (field, definition) in properties {
            match definition.get("type").and_then(Value::as_str) {
                Some(ATTACHMENT_TYPE) => schemas.push(Self::parse(field, definition, settings)?),
                other => debug!(field = %field, field_type = ?other, "Skipping non-attachment property"),
            }
        }
        Ok(schemas)
    }

    /// Name of the mapped field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Options for `sub`, or `None` when it is disabled.
    pub fn sub_field(&self, sub: SubField) -> Option<&SubFieldOptions> {
        self.sub_fields.get(&sub)
    }

    pub fn is_enabled(&self, sub: SubField) -> bool {
        self.sub_fields.contains_key(&sub)
    }

    /// Enabled sub-fields in projection order.
    pub fn enabled(&self) -> impl Iterator<Item = (SubField, &SubFieldOptions)> {
        self.sub_fields.iter().map(|(sub, options)| (*sub, options))
    }

    /// Target name of the content sub-field.
    pub fn content_name(&self) -> &str {
        self.sub_fields
            .get(&SubField::Content)
            .map(|o| o.name.as_str())
            .unwrap_or(&self.field)
    }

    /// Default indexed-character limit. `None` or negative is unlimited.
    pub fn indexed_chars(&self) -> Option<i64> {
        self.indexed_chars
    }

    pub fn detect_language(&self) -> bool {
        self.detect_language
    }

    pub fn ignore_errors(&self) -> bool {
        self.ignore_errors
    }
}

fn default_name(field: &str, sub: SubField) -> String {
    match sub {
        SubField::Content => field.to_string(),
        other => format!("{}.{}", field, other.key()),
    }
}

fn mapping_properties(mapping: &Value) -> Option<&serde_json::Map<String, Value>> {
    if let Some(properties) = mapping.get("properties").and_then(Value::as_object) {
        return Some(properties);
    }
    let object = mapping.as_object()?;
    if object.len() != 1 {
        return None;
    }
    object.values().next()?.get("properties")?.as_object()
}

fn resolve_sub_field(
    field: &str,
    sub: SubField,
    raw: &RawSubFieldDefinition,
    default_store: bool,
) -> SatchelResult<Option<SubFieldOptions>> {
    let index = match &raw.index {
        Some(option) => IndexOption::parse(option)?,
        None => sub.default_index(),
    };
    let store = raw.store.unwrap_or(default_store);
    let enabled = raw.enabled.unwrap_or(true) && (index != IndexOption::No || store);

    if sub == SubField::Content && (!enabled || index == IndexOption::No) {
        return Err(conflicting(format!(
            "the content sub-field of attachment field [{}] must be indexed",
            field
        )));
    }
    if !enabled {
        return Ok(None);
    }

    let analyzer = match raw.analyzer.as_deref() {
        None => None,
        Some(_) if sub.kind() != SubFieldKind::Text => {
            return Err(conflicting(format!(
                "sub-field [{}] of [{}] is not a text field and cannot take an analyzer",
                sub, field
            )));
        }
        Some(_) if index != IndexOption::Analyzed => {
            return Err(conflicting(format!(
                "sub-field [{}] of [{}] is not analyzed and cannot take an analyzer",
                sub, field
            )));
        }
        Some(name) => Some(resolve_analyzer(name)?),
    };

    let name = match raw.name.as_deref().map(str::trim) {
        Some("") => {
            return Err(unsupported(format!(
                "sub-field [{}] of [{}] has an empty name",
                sub, field
            )));
        }
        Some(name) => name.to_string(),
        None => default_name(field, sub),
    };

    Ok(Some(SubFieldOptions {
        name,
        index,
        store,
        analyzer,
    }))
}

fn resolve_analyzer(name: &str) -> SatchelResult<String> {
    let name = match name {
        "standard" => "default",
        "keyword" => "raw",
        other => other,
    };
    if KNOWN_ANALYZERS.contains(&name) {
        Ok(name.to_string())
    } else {
        Err(SatchelError::configuration(
            format!("unknown analyzer [{}]", name),
            ErrorCode::CfgUnknownAnalyzer,
        ))
    }
}
