//! End-to-end tests: PDF bytes → FormDocument → SchemaPipeline → FormSchema.

mod common;

use std::cell::RefCell;
use std::io::Write;
use std::time::Duration;

use formschema::{
    EnrichError, EnrichedField, EnrichmentRequest, FieldEnricher, FieldType, FormDocument,
    FormError, HeuristicEnricher, SchemaPipeline, Sleeper, schema_to_json,
};

struct NoSleep;

impl Sleeper for NoSleep {
    fn sleep(&self, _duration: Duration) {}
}

/// Fails non-retryably for one field name, succeeds heuristically otherwise.
struct FailFor(&'static str);

impl FieldEnricher for FailFor {
    fn enrich(&self, request: &EnrichmentRequest<'_>) -> Result<EnrichedField, EnrichError> {
        if request.field_name == self.0 {
            Err(EnrichError::InvalidResponse("no JSON object in reply".into()))
        } else {
            HeuristicEnricher.enrich(request)
        }
    }

    fn name(&self) -> &str {
        "fail-for"
    }
}

/// Always rate limited for one field name.
struct RateLimitFor {
    name: &'static str,
    attempts: RefCell<usize>,
}

impl FieldEnricher for RateLimitFor {
    fn enrich(&self, request: &EnrichmentRequest<'_>) -> Result<EnrichedField, EnrichError> {
        if request.field_name == self.name {
            *self.attempts.borrow_mut() += 1;
            Err(EnrichError::RateLimited("429".into()))
        } else {
            HeuristicEnricher.enrich(request)
        }
    }

    fn name(&self) -> &str {
        "rate-limit-for"
    }
}

#[test]
fn two_pages_become_two_sections() {
    let doc = FormDocument::open(&common::two_page_application()).unwrap();
    let schema = SchemaPipeline::new(HeuristicEnricher::new())
        .with_sleeper(NoSleep)
        .build(&doc, "employee_application.pdf", "employee_application");

    assert_eq!(schema.form_id, "employee_application");
    assert_eq!(schema.title, "Employee Application");
    assert_eq!(schema.total_fields, 5);
    assert_eq!(schema.sections.len(), 2);

    let page1 = &schema.sections[0];
    assert_eq!(page1.section_id, "page_1");
    assert_eq!(page1.order, 1);
    assert_eq!(page1.title, "Page 1");
    let orders: Vec<usize> = page1.fields.iter().map(|f| f.order).collect();
    assert_eq!(orders, vec![1, 2, 3]);

    let page2 = &schema.sections[1];
    assert_eq!(page2.section_id, "page_2");
    assert_eq!(page2.order, 2);
    let ids: Vec<&str> = page2.fields.iter().map(|f| f.field_id.as_str()).collect();
    assert_eq!(ids, vec!["field_004", "field_005"]);

    assert_eq!(schema.metadata.pages, 2);
    assert_eq!(schema.metadata.failed_fields, 0);
    assert_eq!(schema.metadata.source_pdf, "employee_application.pdf");
    assert!(schema.metadata.extracted_at.ends_with('Z'));
}

#[test]
fn labels_and_heuristic_types_come_from_nearby_text() {
    let doc = FormDocument::open(&common::two_page_application()).unwrap();
    let schema = SchemaPipeline::new(HeuristicEnricher::new())
        .with_sleeper(NoSleep)
        .build(&doc, "a.pdf", "a");

    let fields: Vec<_> = schema.sections.iter().flat_map(|s| &s.fields).collect();
    assert_eq!(fields[0].label, "Full Name");
    assert_eq!(fields[0].field_type, FieldType::Text);
    assert_eq!(fields[1].label, "Date of Birth");
    assert_eq!(fields[1].field_type, FieldType::Date);
    assert_eq!(fields[1].placeholder.as_deref(), Some("MM/DD/YYYY"));
    assert_eq!(fields[2].label, "Email");
    assert_eq!(fields[3].label, "I agree to the terms");
    assert_eq!(fields[3].field_type, FieldType::Checkbox);
    assert_eq!(fields[4].label, "Signature");
    assert_eq!(fields[4].field_type, FieldType::Signature);
}

#[test]
fn fallback_keeps_agree_terms() {
    let doc = FormDocument::open(&common::two_page_application()).unwrap();
    let schema = SchemaPipeline::new(FailFor("agree_terms"))
        .with_sleeper(NoSleep)
        .build(&doc, "a.pdf", "a");

    assert_eq!(schema.total_fields, 5);
    assert_eq!(schema.metadata.failed_fields, 1);
    let agree = schema
        .sections
        .iter()
        .flat_map(|s| &s.fields)
        .find(|f| f.pdf_field_name == "agree_terms")
        .unwrap();
    assert_eq!(agree.label, "agree_terms");
    assert!(!agree.required);
    assert_eq!(agree.field_type, FieldType::Checkbox);
    assert_eq!(agree.order, 4);
}

#[test]
fn exhausted_retries_drop_the_field() {
    let doc = FormDocument::open(&common::two_page_application()).unwrap();
    let enricher = RateLimitFor {
        name: "dob",
        attempts: RefCell::new(0),
    };
    let pipeline = SchemaPipeline::new(&enricher).with_sleeper(NoSleep);
    let schema = pipeline.build(&doc, "a.pdf", "a");

    assert_eq!(*enricher.attempts.borrow(), 4);
    assert_eq!(schema.total_fields, 4);
    assert_eq!(schema.metadata.failed_fields, 1);
    let page1: Vec<&str> = schema.sections[0]
        .fields
        .iter()
        .map(|f| f.field_id.as_str())
        .collect();
    assert_eq!(page1, vec!["field_001", "field_003"]);
}

#[test]
fn document_without_fields_has_no_sections() {
    let bytes = common::form_pdf(vec![common::PageSpec {
        content: b"BT /F1 12 Tf 72 720 Td (Just text) Tj ET",
        widgets: vec![],
    }]);
    let doc = FormDocument::open(&bytes).unwrap();
    let schema = SchemaPipeline::new(HeuristicEnricher::new()).build(&doc, "plain.pdf", "plain");
    assert_eq!(schema.total_fields, 0);
    assert!(schema.sections.is_empty());
    assert_eq!(schema.metadata.pages, 1);
}

#[test]
fn run_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("W-9 Request.pdf");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(&common::two_page_application()).unwrap();
    drop(file);

    let schema = SchemaPipeline::new(HeuristicEnricher::new())
        .with_sleeper(NoSleep)
        .run(&path)
        .unwrap();
    assert_eq!(schema.form_id, "w_9_request");
    assert_eq!(schema.title, "W 9 Request");
    assert_eq!(schema.metadata.source_pdf, "W-9 Request.pdf");
}

#[test]
fn run_on_missing_file_fails() {
    let err = SchemaPipeline::new(HeuristicEnricher::new())
        .run("/no/such/form.pdf")
        .unwrap_err();
    assert!(matches!(err, FormError::NotFound(_)));
}

#[test]
fn schema_serializes_with_type_key() {
    let doc = FormDocument::open(&common::two_page_application()).unwrap();
    let schema = SchemaPipeline::new(HeuristicEnricher::new())
        .with_sleeper(NoSleep)
        .build(&doc, "a.pdf", "a");
    let json: serde_json::Value =
        serde_json::from_str(&schema_to_json(&schema, false).unwrap()).unwrap();

    let field = &json["sections"][1]["fields"][0];
    assert_eq!(field["type"], "checkbox");
    assert_eq!(field["field_id"], "field_004");
    assert!(field.get("placeholder").is_none());
    assert_eq!(json["metadata"]["failed_fields"], 0);
    assert_eq!(json["total_fields"], 5);
}
