//! Integration tests for indexing attachment fields end to end.
//!
//! Documents go through the real extraction pipeline into a tantivy index
//! and are checked with count queries on the sub-fields.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use satchel_core::satchel_extractors::ExtractionPipeline;
use satchel_core::{AttachmentIndex, AttachmentMapper, ErrorCode, MapperSettings};
use serde_json::{json, Value};

const XHTML: &[u8] = include_bytes!("fixtures/testXHTML.html");
const CONTENT_LENGTH: &[u8] = include_bytes!("fixtures/testContentLength.txt");

fn person_mapping() -> Value {
    json!({
        "person": {
            "properties": {
                "file": {"type": "attachment", "store": true}
            }
        }
    })
}

fn index_with(settings: &MapperSettings) -> AttachmentIndex {
    let mappers = AttachmentMapper::from_mapping(
        &person_mapping(),
        settings,
        Arc::new(ExtractionPipeline::with_defaults()),
    )
    .unwrap();
    AttachmentIndex::in_memory(mappers, settings).unwrap()
}

/// One-page PDF whose page shows `body`, with a title in its Info dictionary.
fn pdf_with_text(title: &str, body: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![72.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal(body)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(title.as_bytes().to_vec(), StringFormat::Literal),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// ID3v2 header followed by bytes that never form an MPEG frame.
fn corrupt_mp3() -> Vec<u8> {
    let mut bytes = b"ID3\x03\x00\x00\x00\x00\x00\x0a".to_vec();
    bytes.extend_from_slice(&[0u8; 10]);
    bytes.extend(std::iter::repeat(0x55).take(512));
    bytes
}

#[test]
fn test_xhtml_sub_fields_are_searchable() {
    let index = index_with(&MapperSettings::default());
    index
        .index_document("1", &json!({"file": STANDARD.encode(XHTML)}))
        .unwrap();
    index.commit().unwrap();

    assert_eq!(index.count("file.title", "test document").unwrap(), 1);
    assert_eq!(index.count("file", "\"tests the ability\"").unwrap(), 1);
    assert_eq!(index.count("file.author", "kimchy").unwrap(), 1);
    assert_eq!(index.count("file.keywords", "bonsai").unwrap(), 1);
    assert_eq!(
        index.count("file.content_type", "\"application/xhtml+xml\"").unwrap(),
        1
    );
}

#[test]
fn test_pdf_body_text_is_searchable() {
    let index = index_with(&MapperSettings::default());
    index
        .index_document(
            "1",
            &json!({"file": STANDARD.encode(pdf_with_text("Shipping manual", "cargo transport"))}),
        )
        .unwrap();
    index.commit().unwrap();

    assert_eq!(index.count("file", "\"cargo transport\"").unwrap(), 1);
    assert_eq!(index.count("file.title", "shipping").unwrap(), 1);
    assert_eq!(index.count("file.content_type", "\"application/pdf\"").unwrap(), 1);
    assert_eq!(
        index.stored_text("1", "file").unwrap().as_deref(),
        Some("cargo transport")
    );
}

#[test]
fn test_latin1_text_is_searchable() {
    let index = index_with(&MapperSettings::default());
    index
        .index_document(
            "1",
            &json!({"file": STANDARD.encode(b"Caf\xe9 BeforeLimit AfterLimit menu")}),
        )
        .unwrap();
    index.commit().unwrap();

    assert_eq!(index.count("file", "BeforeLimit").unwrap(), 1);
    assert_eq!(
        index.stored_text("1", "file").unwrap().as_deref(),
        Some("Café BeforeLimit AfterLimit menu")
    );
}

#[test]
fn test_document_limit_truncates_indexed_content() {
    let index = index_with(&MapperSettings::default());
    index
        .index_document(
            "1",
            &json!({"file": {"content": STANDARD.encode(CONTENT_LENGTH), "_indexed_chars": 20}}),
        )
        .unwrap();
    index.commit().unwrap();

    assert_eq!(index.count("file", "BeforeLimit").unwrap(), 1);
    assert_eq!(index.count("file", "AfterLimit").unwrap(), 0);
}

#[test]
fn test_negative_limit_indexes_everything() {
    let settings = MapperSettings::builder().indexed_chars(10).build();
    let index = index_with(&settings);
    index
        .index_document(
            "1",
            &json!({"file": {"content": STANDARD.encode(CONTENT_LENGTH), "_indexed_chars": -1}}),
        )
        .unwrap();
    index.commit().unwrap();

    assert_eq!(index.count("file", "Begin").unwrap(), 1);
    assert_eq!(index.count("file", "End").unwrap(), 1);
}

#[test]
fn test_settings_limit_applies_without_override() {
    let settings = MapperSettings::builder().indexed_chars(20).build();
    let index = index_with(&settings);
    index
        .index_document("1", &json!({"file": STANDARD.encode(CONTENT_LENGTH)}))
        .unwrap();
    index.commit().unwrap();

    assert_eq!(index.count("file", "BeforeLimit").unwrap(), 1);
    assert_eq!(index.count("file", "AfterLimit").unwrap(), 0);
}

#[test]
fn test_empty_object_is_rejected() {
    let index = index_with(&MapperSettings::default());
    let err = index.index_document("1", &json!({"file": {}})).unwrap_err();

    assert!(err.is_invalid_payload());
    assert_eq!(err.code(), ErrorCode::PayMissingContent);

    index.commit().unwrap();
    assert_eq!(index.count_all().unwrap(), 0);
}

#[test]
fn test_corrupt_audio_is_indexed_empty() {
    let index = index_with(&MapperSettings::default());
    index
        .index_document("1", &json!({"file": {"content": STANDARD.encode(corrupt_mp3()), "_name": "song.mp3"}}))
        .unwrap();
    index.commit().unwrap();

    assert_eq!(index.count_all().unwrap(), 1);
    assert_eq!(index.stored_text("1", "file").unwrap().as_deref(), Some(""));
    assert_eq!(index.count("file.name", "song.mp3").unwrap(), 1);
}

#[test]
fn test_corrupt_audio_is_rejected_when_errors_are_not_ignored() {
    let settings = MapperSettings::builder().ignore_errors(false).build();
    let index = index_with(&settings);

    let err = index
        .index_document("1", &json!({"file": STANDARD.encode(corrupt_mp3())}))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::PayExtractionFailed);
}

#[test]
fn test_bulk_failures_do_not_affect_other_documents() {
    let index = index_with(&MapperSettings::default());
    let report = index
        .index_bulk(vec![
            ("1".to_string(), json!({"file": STANDARD.encode(XHTML)})),
            ("2".to_string(), json!({"file": {"_name": "missing.pdf"}})),
            ("3".to_string(), json!({"file": "not base64 at all!"})),
            ("4".to_string(), json!({"file": STANDARD.encode(CONTENT_LENGTH)})),
            ("5".to_string(), json!({"file": null})),
        ])
        .unwrap();
    index.commit().unwrap();

    assert_eq!(report.indexed, 3);
    let failed: Vec<&str> = report.failures.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(failed, vec!["2", "3"]);
    assert_eq!(index.count_all().unwrap(), 3);
    assert_eq!(index.count("file", "AfterLimit").unwrap(), 1);
}

#[test]
fn test_on_disk_index_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let settings = MapperSettings::default();
    let mappers = || {
        AttachmentMapper::from_mapping(
            &person_mapping(),
            &settings,
            Arc::new(ExtractionPipeline::with_defaults()),
        )
        .unwrap()
    };

    {
        let index = AttachmentIndex::open_in_dir(dir.path(), mappers(), &settings).unwrap();
        index
            .index_document("1", &json!({"file": STANDARD.encode(XHTML)}))
            .unwrap();
        index.commit().unwrap();
    }

    let reopened = AttachmentIndex::open_in_dir(dir.path(), mappers(), &settings).unwrap();
    assert_eq!(reopened.num_docs(), 1);
    assert_eq!(reopened.count("file.title", "xhtml").unwrap(), 1);
}
