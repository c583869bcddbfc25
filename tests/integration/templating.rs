//! Rendering behavior across the whole stack, including the credential
//! hashing filter.

use std::collections::HashMap;

use pwhash::md5_crypt;
use snipstack_cli::source::{FragmentSource, LocalSource};

use crate::common::FixtureRepo;

#[tokio::test]
async fn password_hash_renders_a_verifiable_crypt_string() {
    let repo = FixtureRepo::new();
    let mut collection =
        LocalSource::new(repo.root(), "fixture").collection().await.unwrap();

    // No explicit context: the descriptor default ADMIN_PW=admin applies.
    let group = collection.group_mut("panos").unwrap();
    group.render_all(None).unwrap();

    let users = group.stack("snippets").unwrap().fragment("users").unwrap();
    let rendered = &users.rendered_xml;

    let start = rendered.find("<phash>").unwrap() + "<phash>".len();
    let end = rendered.find("</phash>").unwrap();
    let hash = &rendered[start..end];

    assert!(hash.starts_with("$1$"), "expected an MD5-crypt hash, got {hash}");
    assert!(md5_crypt::verify("admin", hash));
}

#[tokio::test]
async fn two_renders_salt_differently_but_both_verify() {
    let repo = FixtureRepo::new();
    let mut first = LocalSource::new(repo.root(), "fixture").collection().await.unwrap();
    let mut second = LocalSource::new(repo.root(), "fixture").collection().await.unwrap();

    let ctx: HashMap<String, String> = HashMap::from([
        ("DNS_1".to_string(), "8.8.8.8".to_string()),
        ("ADMIN_PW".to_string(), "secret".to_string()),
    ]);
    first.group_mut("panos").unwrap().render_all(Some(&ctx)).unwrap();
    second.group_mut("panos").unwrap().render_all(Some(&ctx)).unwrap();

    let hash_of = |c: &snipstack_cli::collection::Collection| {
        let users =
            c.group("panos").unwrap().stack("snippets").unwrap().fragment("users").unwrap();
        let body = &users.rendered_xml;
        let start = body.find("<phash>").unwrap() + "<phash>".len();
        let end = body.find("</phash>").unwrap();
        body[start..end].to_string()
    };

    let (a, b) = (hash_of(&first), hash_of(&second));
    assert_ne!(a, b, "salts should be random per render");
    assert!(md5_crypt::verify("secret", &a));
    assert!(md5_crypt::verify("secret", &b));
}

#[tokio::test]
async fn rendered_output_is_stable_under_re_rendering() {
    let repo = FixtureRepo::new();
    let mut collection =
        LocalSource::new(repo.root(), "fixture").collection().await.unwrap();

    let ctx: HashMap<String, String> =
        HashMap::from([("DNS_1".to_string(), "9.9.9.9".to_string())]);
    let group = collection.group_mut("panorama").unwrap();
    group.render_all(Some(&ctx)).unwrap();

    let rendered = group.stack("snippets").unwrap().fragments[0].rendered_xml.clone();
    let again = snipstack_cli::templating::render("dns", &rendered, &ctx).unwrap();
    assert_eq!(rendered, again);
}
