//! satchel-core - Attachment field mapping for full-text indexing.
//!
//! A document field declared with type `attachment` carries a
//! base64-encoded binary file. This crate normalizes such values, runs
//! content extraction on the decoded bytes and projects the result onto
//! typed sub-fields (content, title, author, ...) that a host index stores
//! and searches.
//!
//! # Example
//!
//! ```ignore
//! use satchel_core::{AttachmentIndex, AttachmentMapper, MapperSettings};
//! use satchel_extractors::ExtractionPipeline;
//!
//! let settings = MapperSettings::from_env();
//! let mapping = serde_json::json!({
//!     "person": {"properties": {"file": {"type": "attachment"}}}
//! });
//! let mappers = AttachmentMapper::from_mapping(
//!     &mapping,
//!     &settings,
//!     Arc::new(ExtractionPipeline::with_defaults()),
//! )?;
//!
//! let index = AttachmentIndex::in_memory(mappers, &settings)?;
//! index.index_document("1", &serde_json::json!({"file": encoded_pdf}))?;
//! index.commit()?;
//! assert_eq!(index.count("file.title", "quarterly report")?, 1);
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod index;
pub mod logging;
pub mod mapper;
pub mod orchestrator;
pub mod payload;
pub mod projector;
pub mod schema;

// Re-export commonly used types
pub use config::MapperSettings;
pub use document::{DocumentBuilder, FieldValue, InMemoryDocument};
pub use error::{ErrorCode, SatchelError, SatchelResult};
pub use index::{AttachmentIndex, BulkReport, TantivyDocumentBuilder};
pub use mapper::AttachmentMapper;
pub use orchestrator::{Extraction, ExtractionOrchestrator};
pub use payload::{AttachmentInput, AttachmentOverrides, RawAttachment};
pub use projector::ProjectedFields;
pub use schema::{AttachmentFieldSchema, IndexOption, SubField, SubFieldKind, SubFieldOptions};

pub use satchel_extractors;
