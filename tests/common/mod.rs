//! Shared fixtures for the integration suite.
//!
//! Builds a miniature snippet repository on disk with the real layout:
//! `templates/<group>/<stack>/.meta-cnc.yaml` plus the XML files the
//! descriptor references.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// Byte size every generated `<entry>` in the bulk address snippet is padded
/// to, so tests can reason about total serialized size.
pub const ADDRESS_ENTRY_SIZE: usize = 200;

/// Number of entries in the bulk address snippet (40 x 200 = 8000 bytes).
pub const ADDRESS_ENTRY_COUNT: usize = 40;

const DESCRIPTOR: &str = r#"name: fixture_skillet
type: panos
variables:
  - name: DNS_1
    description: primary dns server
    default: 8.8.8.8
  - name: ADMIN_PW
    description: admin password
    default: admin
snippets:
  - name: dns
    file: dns.xml
    xpath: /config/devices/entry/deviceconfig/system
  - name: tag
    file: tag.xml
    xpath: /config/devices/entry/vsys/entry/tag
  - name: address
    file: address.xml
    xpath: /config/devices/entry/vsys/entry/address
  - name: users
    file: users.xml
    xpath: /config/mgt-config/users
"#;

const PANORAMA_DESCRIPTOR: &str = r#"name: fixture_skillet
type: panorama
variables:
  - name: DNS_1
    default: 8.8.8.8
snippets:
  - name: dns
    file: dns.xml
    xpath: /config/panorama/deviceconfig/system
"#;

/// A snippet repository checkout under a temp directory.
pub struct FixtureRepo {
    temp: TempDir,
}

impl FixtureRepo {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp dir");
        let root = temp.path();

        let panos = root.join("templates/panos/snippets");
        fs::create_dir_all(&panos).expect("create panos stack dir");
        fs::write(panos.join(".meta-cnc.yaml"), DESCRIPTOR).expect("write descriptor");
        fs::write(panos.join("dns.xml"), "<dns-setting><servers><primary>{{ DNS_1 }}</primary></servers></dns-setting>")
            .expect("write dns.xml");
        fs::write(panos.join("tag.xml"), r#"<entry name="Outbound"/><entry name="Inbound"/>"#)
            .expect("write tag.xml");
        fs::write(panos.join("address.xml"), bulk_address_content()).expect("write address.xml");
        fs::write(
            panos.join("users.xml"),
            r#"<entry name="admin"><phash>{{ ADMIN_PW | password_hash }}</phash></entry>"#,
        )
        .expect("write users.xml");

        let panorama = root.join("templates/panorama/snippets");
        fs::create_dir_all(&panorama).expect("create panorama stack dir");
        fs::write(panorama.join(".meta-cnc.yaml"), PANORAMA_DESCRIPTOR)
            .expect("write panorama descriptor");
        fs::write(
            panorama.join("dns.xml"),
            "<dns-setting><servers><primary>{{ DNS_1 }}</primary></servers></dns-setting>",
        )
        .expect("write panorama dns.xml");

        Self { temp }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }
}

/// 40 address entries, each padded to exactly [`ADDRESS_ENTRY_SIZE`] bytes.
pub fn bulk_address_content() -> String {
    (0..ADDRESS_ENTRY_COUNT)
        .map(|i| {
            let base = format!(
                "<entry name=\"host-{i:02}\"><ip-netmask>10.0.{i}.1/32</ip-netmask><description></description></entry>"
            );
            let padding = ADDRESS_ENTRY_SIZE
                .checked_sub(base.len())
                .expect("entry template exceeds the padded size");
            base.replace(
                "<description></description>",
                &format!("<description>{}</description>", "x".repeat(padding)),
            )
        })
        .collect()
}
