//! The attachment field mapper.
//!
//! Ties normalization, extraction and projection together for one
//! registered attachment field:
//!
//! ```text
//! field value -> payload::normalize -> ExtractionOrchestrator -> projector::project -> DocumentBuilder
//! ```

use std::sync::Arc;

use satchel_extractors::{ContentExtractor, ExtractionPipeline};
use serde_json::Value;
use tracing::debug;

use crate::config::MapperSettings;
use crate::document::DocumentBuilder;
use crate::error::{SatchelError, SatchelResult};
use crate::orchestrator::{Extraction, ExtractionOrchestrator};
use crate::payload::{self, AttachmentInput};
use crate::projector::{self, ProjectedFields};
use crate::schema::AttachmentFieldSchema;

/// Maps values of one attachment field into sub-field values.
///
/// Mapping is a synchronous, stateless transformation: a mapper can be
/// shared across threads and used for any number of documents at once.
#[derive(Clone)]
pub struct AttachmentMapper {
    schema: Arc<AttachmentFieldSchema>,
    orchestrator: ExtractionOrchestrator,
}

impl AttachmentMapper {
    pub fn new(schema: Arc<AttachmentFieldSchema>, extractor: Arc<dyn ContentExtractor>) -> Self {
        Self {
            schema,
            orchestrator: ExtractionOrchestrator::new(extractor),
        }
    }

    /// Mapper backed by every extractor compiled into `satchel-extractors`.
    pub fn with_default_extractors(schema: Arc<AttachmentFieldSchema>) -> Self {
        Self::new(schema, Arc::new(ExtractionPipeline::with_defaults()))
    }

    /// One mapper per attachment field of a type mapping, all sharing
    /// `extractor`.
    pub fn from_mapping(
        mapping: &Value,
        settings: &MapperSettings,
        extractor: Arc<dyn ContentExtractor>,
    ) -> SatchelResult<Vec<Self>> {
        Ok(AttachmentFieldSchema::parse_mapping(mapping, settings)?
            .into_iter()
            .map(|schema| Self::new(Arc::new(schema), Arc::clone(&extractor)))
            .collect())
    }

    pub fn schema(&self) -> &AttachmentFieldSchema {
        &self.schema
    }

    /// Name of the mapped field.
    pub fn field(&self) -> &str {
        self.schema.field()
    }

    /// Map a raw field value. Returns `Ok(None)` when the value is `null`.
    pub fn map_value(&self, value: &Value) -> SatchelResult<Option<ProjectedFields>> {
        match payload::normalize(self.field(), value)? {
            Some(input) => self.map_input(&input).map(Some),
            None => {
                debug!(field = self.field(), "Attachment field is null, skipping");
                Ok(None)
            }
        }
    }

    /// Map an already normalized attachment.
    pub fn map_input(&self, input: &AttachmentInput) -> SatchelResult<ProjectedFields> {
        let extracted = match self.orchestrator.extract(&self.schema, input) {
            Extraction::Success(content) => Some(content),
            Extraction::SuccessEmpty => None,
            Extraction::Fatal(err) => return Err(err),
        };

        let fields = projector::project(&self.schema, input, extracted.as_ref());
        debug!(
            field = self.field(),
            produced = fields.len(),
            "Mapped attachment field"
        );
        Ok(fields)
    }

    /// Map `value` and write the result into `builder`. Returns the names
    /// of the sub-fields that were set.
    pub fn apply<B: DocumentBuilder + ?Sized>(
        &self,
        value: &Value,
        builder: &mut B,
    ) -> SatchelResult<Vec<String>> {
        let Some(fields) = self.map_value(value)? else {
            return Ok(Vec::new());
        };
        fields.apply_to(builder);
        Ok(fields.produced().into_iter().map(str::to_string).collect())
    }

    /// Run [`map_value`](Self::map_value) on tokio's blocking pool.
    pub async fn map_blocking(&self, value: Value) -> SatchelResult<Option<ProjectedFields>> {
        let mapper = self.clone();
        tokio::task::spawn_blocking(move || mapper.map_value(&value))
            .await
            .map_err(|e| SatchelError::Internal(format!("Mapping task failed: {}", e)))?
    }
}
