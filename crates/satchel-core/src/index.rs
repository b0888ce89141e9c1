//! Tantivy host index for attachment-mapped documents.
//!
//! Builds a tantivy schema from the registered attachment fields, maps
//! incoming JSON documents through their [`AttachmentMapper`]s and answers
//! count queries against the indexed sub-fields.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use serde_json::Value;
use tantivy::collector::{Count, TopDocs};
use tantivy::directory::MmapDirectory;
use tantivy::query::{AllQuery, QueryParser, TermQuery};
use tantivy::schema::{
    DateOptions, Field, FieldType, IndexRecordOption, NumericOptions, Schema, TextFieldIndexing,
    TextOptions, Value as _, STORED, STRING,
};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tracing::{debug, info, warn};

use crate::config::MapperSettings;
use crate::document::{DocumentBuilder, FieldValue};
use crate::error::{ErrorCode, SatchelError, SatchelResult};
use crate::mapper::AttachmentMapper;
use crate::schema::{SubFieldKind, SubFieldOptions};

/// Name of the document identifier field.
pub const ID_FIELD: &str = "_id";

/// Outcome of a bulk indexing request.
#[derive(Debug, Default)]
pub struct BulkReport {
    /// Number of documents added.
    pub indexed: usize,
    /// Documents rejected by their attachment mappers, by id.
    pub failures: Vec<(String, SatchelError)>,
}

impl BulkReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// [`DocumentBuilder`] that writes sub-field values into a tantivy document.
pub struct TantivyDocumentBuilder<'a> {
    fields: &'a HashMap<String, Field>,
    document: TantivyDocument,
}

impl<'a> TantivyDocumentBuilder<'a> {
    pub fn new(fields: &'a HashMap<String, Field>) -> Self {
        Self {
            fields,
            document: TantivyDocument::default(),
        }
    }

    pub fn into_document(self) -> TantivyDocument {
        self.document
    }
}

impl DocumentBuilder for TantivyDocumentBuilder<'_> {
    fn set_field(&mut self, name: &str, value: FieldValue) {
        let Some(&field) = self.fields.get(name) else {
            debug!(field = name, "No index field for sub-field, skipping");
            return;
        };

        match value {
            FieldValue::Text(text) => self.document.add_text(field, text),
            FieldValue::Long(n) => self.document.add_u64(field, n),
            FieldValue::Date(date) => self
                .document
                .add_date(field, tantivy::DateTime::from_timestamp_secs(date.timestamp())),
        }
    }
}

/// Full-text index over documents with attachment fields.
///
/// Thread-safe: the writer sits behind a Mutex and mapping runs outside it.
pub struct AttachmentIndex {
    index: Index,
    reader: IndexReader,
    writer: Mutex<IndexWriter>,
    id_field: Field,
    fields: HashMap<String, Field>,
    mappers: Vec<AttachmentMapper>,
}

impl AttachmentIndex {
    /// Create an index held in RAM.
    pub fn in_memory(mappers: Vec<AttachmentMapper>, settings: &MapperSettings) -> SatchelResult<Self> {
        let (schema, id_field, fields) = build_schema(&mappers)?;
        let index = Index::create_in_ram(schema);
        Self::with_index(index, id_field, fields, mappers, settings)
    }

    /// Create or open a persistent index in `path`.
    ///
    /// Opening fails if the index on disk was built from a different
    /// mapping.
    pub fn open_in_dir(
        path: &Path,
        mappers: Vec<AttachmentMapper>,
        settings: &MapperSettings,
    ) -> SatchelResult<Self> {
        let (schema, id_field, fields) = build_schema(&mappers)?;

        std::fs::create_dir_all(path)?;
        let directory = MmapDirectory::open(path)
            .map_err(|e| SatchelError::index(format!("Failed to open index dir: {}", e)))?;
        let index = Index::open_or_create(directory, schema)?;

        info!(path = %path.display(), "Opened attachment index");
        Self::with_index(index, id_field, fields, mappers, settings)
    }

    fn with_index(
        index: Index,
        id_field: Field,
        fields: HashMap<String, Field>,
        mappers: Vec<AttachmentMapper>,
        settings: &MapperSettings,
    ) -> SatchelResult<Self> {
        let writer = index.writer(settings.writer_heap_bytes)?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        Ok(Self {
            index,
            reader,
            writer: Mutex::new(writer),
            id_field,
            fields,
            mappers,
        })
    }

    /// Map and add one document.
    ///
    /// `source` is a JSON object; keys naming a registered attachment field
    /// are mapped, other keys are ignored. The document becomes searchable
    /// after [`commit`](Self::commit).
    pub fn index_document(&self, id: &str, source: &Value) -> SatchelResult<()> {
        let object = source.as_object().ok_or_else(|| {
            SatchelError::invalid_payload("_source", "document source must be an object", ErrorCode::PayWrongShape)
        })?;

        let mut builder = TantivyDocumentBuilder::new(&self.fields);
        for mapper in &self.mappers {
            if let Some(value) = object.get(mapper.field()) {
                mapper.apply(value, &mut builder)?;
            }
        }

        let mut document = builder.into_document();
        document.add_text(self.id_field, id);

        let writer = self
            .writer
            .lock()
            .map_err(|_| SatchelError::Internal("Failed to acquire writer lock".to_string()))?;
        writer.add_document(document)?;

        debug!(id, "Document added");
        Ok(())
    }

    /// Add many documents. A document rejected by its mapper is reported and
    /// skipped; the rest are still added.
    pub fn index_bulk<I>(&self, documents: I) -> SatchelResult<BulkReport>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut report = BulkReport::default();

        for (id, source) in documents {
            match self.index_document(&id, &source) {
                Ok(()) => report.indexed += 1,
                Err(e) if e.is_invalid_payload() => {
                    warn!(id = %id, error = %e, "Document rejected in bulk request");
                    report.failures.push((id, e));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }

    /// Commit pending changes and make them visible to queries.
    pub fn commit(&self) -> SatchelResult<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| SatchelError::Internal("Failed to acquire writer lock".to_string()))?;

        writer.commit()?;
        self.reader.reload()?;

        Ok(())
    }

    /// Count documents whose `field` matches `query` (query parser syntax).
    pub fn count(&self, field: &str, query: &str) -> SatchelResult<usize> {
        let field = self.indexed_text_field(field)?;
        let parser = QueryParser::for_index(&self.index, vec![field]);
        let query = parser.parse_query(query)?;

        Ok(self.reader.searcher().search(&query, &Count)?)
    }

    /// Count every document.
    pub fn count_all(&self) -> SatchelResult<usize> {
        Ok(self.reader.searcher().search(&AllQuery, &Count)?)
    }

    /// Get the number of indexed documents.
    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Stored text of `field` for document `id`, if both exist.
    pub fn stored_text(&self, id: &str, field: &str) -> SatchelResult<Option<String>> {
        let field = self.field(field)?;
        let searcher = self.reader.searcher();
        let query = TermQuery::new(
            Term::from_field_text(self.id_field, id),
            IndexRecordOption::Basic,
        );

        let Some((_, address)) = searcher.search(&query, &TopDocs::with_limit(1))?.into_iter().next() else {
            return Ok(None);
        };
        let document: TantivyDocument = searcher.doc(address)?;

        Ok(document
            .get_first(field)
            .and_then(|v| v.as_str())
            .map(str::to_string))
    }

    fn field(&self, name: &str) -> SatchelResult<Field> {
        self.fields.get(name).copied().ok_or_else(|| SatchelError::Index {
            message: format!("unknown field [{}]", name),
            code: ErrorCode::IdxUnknownField,
            source: None,
        })
    }

    fn indexed_text_field(&self, name: &str) -> SatchelResult<Field> {
        let field = self.field(name)?;
        match self.index.schema().get_field_entry(field).field_type() {
            FieldType::Str(options) if options.get_indexing_options().is_some() => Ok(field),
            _ => Err(SatchelError::Index {
                message: format!("field [{}] is not an indexed text field", name),
                code: ErrorCode::IdxUnknownField,
                source: None,
            }),
        }
    }
}

/// Tantivy schema for the sub-fields of every mapper, plus the id field.
fn build_schema(mappers: &[AttachmentMapper]) -> SatchelResult<(Schema, Field, HashMap<String, Field>)> {
    let mut builder = Schema::builder();
    let id_field = builder.add_text_field(ID_FIELD, STRING | STORED);
    let mut fields = HashMap::new();

    for mapper in mappers {
        for (sub, options) in mapper.schema().enabled() {
            if options.name == ID_FIELD || fields.contains_key(&options.name) {
                return Err(SatchelError::configuration(
                    format!(
                        "sub-field [{}] of attachment field [{}] collides with another field",
                        options.name,
                        mapper.field()
                    ),
                    ErrorCode::CfgConflictingSettings,
                ));
            }

            let field = match sub.kind() {
                SubFieldKind::Text => builder.add_text_field(&options.name, text_options(options)),
                SubFieldKind::Long => builder.add_u64_field(&options.name, numeric_options(options)),
                SubFieldKind::Date => builder.add_date_field(&options.name, date_options(options)),
            };
            fields.insert(options.name.clone(), field);
        }
    }

    Ok((builder.build(), id_field, fields))
}

fn text_options(options: &SubFieldOptions) -> TextOptions {
    let mut text = TextOptions::default();
    if options.is_indexed() {
        text = text.set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(options.tokenizer())
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        );
    }
    if options.store {
        text = text.set_stored();
    }
    text
}

fn numeric_options(options: &SubFieldOptions) -> NumericOptions {
    let mut numeric = NumericOptions::default();
    if options.is_indexed() {
        numeric = numeric.set_indexed();
    }
    if options.store {
        numeric = numeric.set_stored();
    }
    numeric
}

fn date_options(options: &SubFieldOptions) -> DateOptions {
    let mut date = DateOptions::default();
    if options.is_indexed() {
        date = date.set_indexed();
    }
    if options.store {
        date = date.set_stored();
    }
    date
}
