//! File-backed tests: knowledge documents and inference configs on disk.

use metta_infer::classify::Classifier;
use metta_infer::config::InferenceConfig;
use metta_infer::knowledge::{MettaDocument, ValidationReport, read_document, write_document};
use metta_infer::resolver::{DescriptionTemplates, EntityResolver};

const PORT_DOCUMENT: &str = "\
; Smart port norms

; A moored vessel must pay the port
(= (pay-obligatory $e) (let* (($m (moored $e))) True))

; ========== STATE OF AFFAIRS ==========
; State of Affairs (Alexandra Maersk moors at MICT)
(ct-triple soa_ALEXANDRA_MAERSK type soaContainerVessel)
(ct-triple soa_emam type soaMoor)
(ct-triple soa_emam type rexist)
(ct-triple soa_emam soaHas_agent soa_ALEXANDRA_MAERSK)
(ct-triple soa_emam soaHas_location soa_MICT)
";

#[test]
fn document_survives_write_and_reread() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("port.metta");
    std::fs::write(&path, PORT_DOCUMENT).unwrap();

    let (doc, diagnostics) = read_document(&path).unwrap();
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(doc.norms.len(), 1);
    assert_eq!(doc.norms[0].description, "A moored vessel must pay the port");
    assert_eq!(doc.knowledge.description, "Alexandra Maersk moors at MICT");
    assert_eq!(doc.knowledge.facts.len(), 5);

    let copy = dir.path().join("copy.metta");
    write_document(&doc, &copy).unwrap();
    let (reread, _) = read_document(&copy).unwrap();
    assert_eq!(reread, doc);

    // Rendering is stable once canonical.
    assert_eq!(std::fs::read_to_string(&copy).unwrap(), reread.to_string());
}

#[test]
fn well_formed_document_validates() {
    let (doc, _) = MettaDocument::parse(PORT_DOCUMENT);
    let report = ValidationReport::of(&doc.knowledge);
    assert!(report.is_valid(), "{:?}", report.errors().collect::<Vec<_>>());
}

#[test]
fn misnamed_eventuality_on_disk_is_reported() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("bad.metta");
    std::fs::write(
        &path,
        "(ct-triple soa_ewrong type soaMoor)\n\
         (ct-triple soa_ewrong type rexist)\n\
         (ct-triple soa_ewrong soaHas_agent soa_ALEXANDRA_MAERSK)\n",
    )
    .unwrap();

    let (doc, _) = read_document(&path).unwrap();
    let report = ValidationReport::of(&doc.knowledge);
    assert!(!report.is_valid());
    assert!(report.errors().any(|e| e.contains("'soa_emam'")));
}

#[test]
fn json_config_drives_resolution() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("inference.json");
    std::fs::write(
        &path,
        r#"{
            "entity_mappings": {"soa_enpam": "LAURA MÆRSK"},
            "templates": {"compliance_fulfilled": "{obligation} satisfied by {action}"}
        }"#,
    )
    .unwrap();

    let config = InferenceConfig::load(&path).unwrap();
    let resolver = EntityResolver::with_config(&config).unwrap();
    let templates = DescriptionTemplates::with_config(&config);
    let metrics = Classifier::new(&resolver, &templates).metrics("[(soa_enpam soa_epam15k)]");

    assert_eq!(metrics.compliance_details[0].obligation, "LAURA MÆRSK");
    assert_eq!(metrics.compliance_details[0].description, "LAURA MÆRSK satisfied by epam15k");
}

#[test]
fn toml_config_round_trips_through_disk() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("inference.toml");
    let config = InferenceConfig::from_toml_str(
        r#"
[instrument_mappings]
soa_GBP = "Pound sterling"

[port_mappings]
soa_sptRotterdam = "Port of Rotterdam"
"#,
    )
    .unwrap();
    std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

    let loaded = InferenceConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
    let resolver = EntityResolver::with_config(&loaded).unwrap();
    assert_eq!(resolver.resolve_instrument("soa_GBP"), "Pound sterling");
    assert_eq!(resolver.resolve_port("soa_sptRotterdam"), "Port of Rotterdam");
}
