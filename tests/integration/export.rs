//! Document-store record batches built from a loaded collection.

use std::collections::HashMap;

use snipstack_cli::source::{FragmentSource, LocalSource};
use snipstack_cli::store::{RecordFilter, collection_records};

use crate::common::FixtureRepo;

#[tokio::test]
async fn batch_covers_every_group_and_stack() {
    let repo = FixtureRepo::new();
    let collection = LocalSource::new(repo.root(), "fixture").collection().await.unwrap();

    let records = collection_records(&collection).unwrap();
    // 1 panorama snippet + 4 panos snippets.
    assert_eq!(records.len(), 5);

    let panorama: Vec<_> = records.iter().filter(|r| r.device_type == "panorama").collect();
    assert_eq!(panorama.len(), 1);
    assert_eq!(panorama[0].name, "dns");
    assert_eq!(panorama[0].skillet, "fixture");
    assert_eq!(panorama[0].stack, "snippets");
}

#[tokio::test]
async fn records_keep_raw_templates() {
    let repo = FixtureRepo::new();
    let collection = LocalSource::new(repo.root(), "fixture").collection().await.unwrap();

    let records = collection_records(&collection).unwrap();
    let dns = records
        .iter()
        .find(|r| r.name == "dns" && r.device_type == "panos")
        .expect("panos dns record");
    assert!(dns.xml.contains("{{ DNS_1 }}"), "templates are stored unrendered");
}

#[tokio::test]
async fn serialized_records_use_the_wire_field_names() {
    let repo = FixtureRepo::new();
    let collection = LocalSource::new(repo.root(), "fixture").collection().await.unwrap();

    let records = collection_records(&collection).unwrap();
    let json = serde_json::to_value(&records).unwrap();
    let first = &json[0];
    for field in ["name", "path", "xml", "type", "stack", "skillet"] {
        assert!(first.get(field).is_some(), "record is missing '{field}'");
    }
}

#[tokio::test]
async fn filters_narrow_a_batch_to_allowed_fields_only() {
    let repo = FixtureRepo::new();
    let collection = LocalSource::new(repo.root(), "fixture").collection().await.unwrap();
    let records = collection_records(&collection).unwrap();

    let filter = RecordFilter::from_map(HashMap::from([
        ("type".to_string(), "panos".to_string()),
        // Not allow-listed; must be dropped rather than excluding everything.
        ("name".to_string(), "no-such-snippet".to_string()),
    ]));
    let matched: Vec<_> = records.iter().filter(|r| filter.matches(r)).collect();
    assert_eq!(matched.len(), 4);
    assert!(matched.iter().all(|r| r.device_type == "panos"));
}
