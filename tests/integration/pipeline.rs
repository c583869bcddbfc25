//! End-to-end load -> render -> select -> split behavior.

use std::collections::HashMap;

use snipstack_cli::collection::Collection;
use snipstack_cli::core::SnipstackError;
use snipstack_cli::source::{FragmentSource, LocalSource};
use snipstack_cli::splitter::{DEFAULT_SPLIT_THRESHOLD, Splitter};

use crate::common::{ADDRESS_ENTRY_COUNT, FixtureRepo, bulk_address_content};

async fn load_fixture(repo: &FixtureRepo) -> Collection {
    LocalSource::new(repo.root(), "fixture")
        .collection()
        .await
        .expect("fixture repository should load")
}

fn context() -> HashMap<String, String> {
    HashMap::from([
        ("DNS_1".to_string(), "1.1.1.1".to_string()),
        ("ADMIN_PW".to_string(), "secret".to_string()),
    ])
}

#[tokio::test]
async fn select_all_returns_whole_stack_in_declared_order() {
    let repo = FixtureRepo::new();
    let mut collection = load_fixture(&repo).await;

    let group = collection.group_mut("panos").unwrap();
    group.render_all(Some(&context())).unwrap();

    let result = group.select("snippets", &["all".to_string()], &Splitter::default()).unwrap();
    let names: Vec<_> = result.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["dns", "tag", "address", "users"]);
    assert_eq!(result.len(), group.stack("snippets").unwrap().fragments.len());

    // Sizes untouched: the 8000-byte address snippet comes back whole.
    let address = &result[2];
    assert_eq!(address.rendered_xml, bulk_address_content());
}

#[tokio::test]
async fn oversized_bulk_snippet_splits_into_forty_entries() {
    let repo = FixtureRepo::new();
    let mut collection = load_fixture(&repo).await;

    let group = collection.group_mut("panos").unwrap();
    group.render_all(Some(&context())).unwrap();

    let result =
        group.select("snippets", &["address".to_string()], &Splitter::default()).unwrap();
    assert_eq!(result.len(), ADDRESS_ENTRY_COUNT);
    for fragment in &result {
        assert_eq!(fragment.name, "address");
        assert_eq!(fragment.rendered_xpath, "/config/devices/entry/vsys/entry/address");
        assert!(fragment.rendered_xml.starts_with("<entry name=\"host-"));
        assert!(fragment.rendered_xml.ends_with("</entry>"));
        assert!(fragment.rendered_xml.len() < DEFAULT_SPLIT_THRESHOLD);
    }
}

#[tokio::test]
async fn threshold_is_exact() {
    let repo = FixtureRepo::new();
    let mut collection = load_fixture(&repo).await;
    let group = collection.group_mut("panos").unwrap();
    group.render_all(Some(&context())).unwrap();

    let content_len = bulk_address_content().len();

    // One byte above the content size: unsplit.
    let lenient = Splitter::with_threshold(content_len + 1);
    let whole = group.select("snippets", &["address".to_string()], &lenient).unwrap();
    assert_eq!(whole.len(), 1);

    // Exactly the content size: split engages.
    let exact = Splitter::with_threshold(content_len);
    let split = group.select("snippets", &["address".to_string()], &exact).unwrap();
    assert_eq!(split.len(), ADDRESS_ENTRY_COUNT);
}

#[tokio::test]
async fn sub_entry_selection_extracts_one_element() {
    let repo = FixtureRepo::new();
    let mut collection = load_fixture(&repo).await;
    let group = collection.group_mut("panos").unwrap();
    group.render_all(Some(&context())).unwrap();

    let result = group
        .select("snippets", &["tag/Outbound".to_string()], &Splitter::default())
        .unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].rendered_xml, r#"<entry name="Outbound"/>"#);
}

#[tokio::test]
async fn sub_entry_miss_is_fatal() {
    let repo = FixtureRepo::new();
    let mut collection = load_fixture(&repo).await;
    let group = collection.group_mut("panos").unwrap();
    group.render_all(Some(&context())).unwrap();

    let err = group
        .select("snippets", &["tag/Sideways".to_string()], &Splitter::default())
        .unwrap_err();
    assert!(
        matches!(err, SnipstackError::EntryNotFound { fragment, entry }
            if fragment == "tag" && entry == "Sideways")
    );
}

#[tokio::test]
async fn selection_respects_caller_order() {
    let repo = FixtureRepo::new();
    let mut collection = load_fixture(&repo).await;
    let group = collection.group_mut("panos").unwrap();
    group.render_all(Some(&context())).unwrap();

    let result = group
        .select(
            "snippets",
            &["tag".to_string(), "dns".to_string()],
            &Splitter::default(),
        )
        .unwrap();
    let names: Vec<_> = result.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["tag", "dns"]);
}

#[tokio::test]
async fn missing_variable_fails_the_render() {
    let repo = FixtureRepo::new();
    let mut collection = load_fixture(&repo).await;
    let group = collection.group_mut("panos").unwrap();

    // Explicit but empty context: defaults must not sneak in.
    let empty = HashMap::new();
    let err = group.render_all(Some(&empty)).unwrap_err();
    assert!(
        matches!(err, SnipstackError::MissingVariable { fragment, variable }
            if fragment == "dns" && variable == "DNS_1")
    );
}

#[tokio::test]
async fn absent_context_falls_back_to_descriptor_defaults() {
    let repo = FixtureRepo::new();
    let mut collection = load_fixture(&repo).await;
    let group = collection.group_mut("panorama").unwrap();
    group.render_all(None).unwrap();

    let stack = group.stack("snippets").unwrap();
    assert_eq!(
        stack.fragments[0].rendered_xml,
        "<dns-setting><servers><primary>8.8.8.8</primary></servers></dns-setting>"
    );
}

#[tokio::test]
async fn unknown_group_is_a_typed_error() {
    let repo = FixtureRepo::new();
    let collection = load_fixture(&repo).await;
    let err = collection.group("panos-ng").unwrap_err();
    assert!(matches!(err, SnipstackError::GroupNotFound { name } if name == "panos-ng"));
}

#[tokio::test]
async fn split_results_are_independent_of_the_tree() {
    let repo = FixtureRepo::new();
    let mut collection = load_fixture(&repo).await;
    let group = collection.group_mut("panos").unwrap();
    group.render_all(Some(&context())).unwrap();

    let mut result =
        group.select("snippets", &["address".to_string()], &Splitter::default()).unwrap();
    result[0].rendered_xml = "<mutated/>".to_string();

    // Neither the sibling copies nor the source fragment changed.
    assert!(result[1].rendered_xml.starts_with("<entry name=\"host-01\">"));
    let source = group.stack("snippets").unwrap().fragment("address").unwrap();
    assert_eq!(source.rendered_xml, bulk_address_content());
}
