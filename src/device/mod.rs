//! Client for the device's XML configuration API.
//!
//! The device exposes an HTTPS endpoint at `https://<addr>/api` that accepts
//! form-encoded requests and answers with XML. Three calls are needed here:
//! `keygen` to trade credentials for an API key, an operational
//! `show system info` to learn the device model and software version, and
//! `config`/`set` to write a rendered snippet at its xpath.
//!
//! TLS verification is off unless the caller opts in, matching the
//! self-signed certificates these devices ship with; the CLI prints a
//! warning when verification is disabled.

use crate::core::{Result, SnipstackError};

/// Model-string patterns that identify a Panorama-class device. Anything
/// else is treated as a firewall.
const PANORAMA_MODEL_PATTERNS: &[&str] = &["panorama", "m-"];

/// A firewall or management appliance reachable over its XML API.
#[derive(Debug)]
pub struct Device {
    addr: String,
    url: String,
    client: reqwest::Client,
    key: String,
    sw_version: Option<String>,
}

impl Device {
    /// Use an existing API key, skipping keygen.
    pub fn with_key(addr: &str, key: &str, verify_tls: bool) -> Result<Self> {
        Ok(Self {
            addr: addr.to_string(),
            url: format!("https://{addr}/api"),
            client: build_client(verify_tls)?,
            key: key.to_string(),
            sw_version: None,
        })
    }

    /// Authenticate with username and password and retrieve an API key.
    pub async fn connect(addr: &str, user: &str, password: &str, verify_tls: bool) -> Result<Self> {
        let mut device = Self::with_key(addr, "", verify_tls)?;
        let body = device
            .send(&[("type", "keygen"), ("user", user), ("password", password)], "keygen")
            .await?;
        if let Err(reason) = response_status(&body) {
            return Err(SnipstackError::DeviceAuth { addr: addr.to_string(), reason });
        }
        device.key = element_text(&body, &["result", "key"]).ok_or_else(|| {
            SnipstackError::DeviceAuth {
                addr: addr.to_string(),
                reason: "keygen response carried no key".to_string(),
            }
        })?;
        Ok(device)
    }

    /// Device address as given at construction.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// The API key in use.
    pub fn api_key(&self) -> &str {
        &self.key
    }

    /// Software version, known after [`Device::device_group`] has run.
    pub fn sw_version(&self) -> Option<&str> {
        self.sw_version.as_deref()
    }

    /// Ask the device for its model and map it to the group identifier used
    /// in snippet repositories (`panos` or `panorama`, already lower case).
    pub async fn device_group(&mut self) -> Result<String> {
        let body = self
            .send(
                &[("type", "op"), ("cmd", "<show><system><info></info></system></show>")],
                "show system info",
            )
            .await?;
        if let Err(reason) = response_status(&body) {
            return Err(SnipstackError::DeviceApi {
                operation: "show system info".to_string(),
                reason,
            });
        }

        let model =
            element_text(&body, &["result", "system", "model"]).ok_or_else(|| {
                SnipstackError::DeviceApi {
                    operation: "show system info".to_string(),
                    reason: "response carried no model element".to_string(),
                }
            })?;
        self.sw_version = element_text(&body, &["result", "system", "sw-version"]);
        tracing::debug!(
            "device {} reports model {} ({})",
            self.addr,
            model,
            self.sw_version.as_deref().unwrap_or("unknown version")
        );

        Ok(model_to_group(&model).to_string())
    }

    /// Run a `set` action placing `element` at `xpath`.
    pub async fn set_at_xpath(&self, xpath: &str, element: &str) -> Result<()> {
        let sanitized = sanitize_element(element);
        let body = self
            .send(
                &[
                    ("type", "config"),
                    ("action", "set"),
                    ("xpath", xpath),
                    ("element", &sanitized),
                ],
                "set",
            )
            .await?;
        response_status(&body).map_err(|reason| SnipstackError::DeviceApi {
            operation: format!("set at {xpath}"),
            reason,
        })
    }

    async fn send(&self, params: &[(&str, &str)], operation: &str) -> Result<String> {
        let mut form: Vec<(&str, &str)> = params.to_vec();
        form.push(("key", self.key.as_str()));

        let api_err = |reason: String| SnipstackError::DeviceApi {
            operation: operation.to_string(),
            reason,
        };

        let response = self
            .client
            .post(&self.url)
            .form(&form)
            .send()
            .await
            .map_err(|e| api_err(e.to_string()))?;
        response.text().await.map_err(|e| api_err(e.to_string()))
    }
}

fn build_client(verify_tls: bool) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .danger_accept_invalid_certs(!verify_tls)
        .build()
        .map_err(|e| SnipstackError::DeviceApi {
            operation: "client setup".to_string(),
            reason: e.to_string(),
        })
}

/// Strip newlines and the indentation that follows them from a rendered
/// element. The device's `set` parser rejects payloads with literal
/// newlines inside the element parameter.
pub fn sanitize_element(element: &str) -> String {
    let mut out = String::with_capacity(element.len());
    for (i, line) in element.lines().enumerate() {
        out.push_str(if i == 0 { line } else { line.trim_start() });
    }
    out
}

/// Map a device model string to its repository group identifier.
fn model_to_group(model: &str) -> &'static str {
    let lowered = model.to_lowercase();
    if PANORAMA_MODEL_PATTERNS.iter().any(|p| lowered.contains(p)) {
        "panorama"
    } else {
        "panos"
    }
}

/// Check the `status` attribute of a response document.
///
/// `Ok(())` for `status="success"`, otherwise the response body text so the
/// device's own failure message reaches the user.
fn response_status(body: &str) -> std::result::Result<(), String> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(body);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => {
                let status = e
                    .try_get_attribute("status")
                    .ok()
                    .flatten()
                    .and_then(|a| a.unescape_value().ok())
                    .map(|v| v.into_owned());
                return match status.as_deref() {
                    Some("success") => Ok(()),
                    Some(other) => Err(format!("status={other}: {}", body.trim())),
                    None => Err(format!("response carried no status: {}", body.trim())),
                };
            }
            Ok(Event::Eof) => return Err(format!("empty response: {}", body.trim())),
            Ok(_) => continue,
            Err(e) => return Err(format!("unparseable response ({e}): {}", body.trim())),
        }
    }
}

/// Text content of the element addressed by `path`, relative to the
/// document root (e.g. `["result", "key"]` inside `<response>`).
fn element_text(body: &str, path: &[&str]) -> Option<String> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(body);
    let mut stack: Vec<String> = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                stack.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Text(t)) => {
                // Skip the root element when comparing against the path.
                if stack.len() == path.len() + 1
                    && stack[1..].iter().map(String::as_str).eq(path.iter().copied())
                {
                    let text = t.unescape().ok()?.trim().to_string();
                    if !text.is_empty() {
                        return Some(text);
                    }
                }
            }
            Ok(Event::Eof) => return None,
            Ok(_) => continue,
            Err(_) => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_collapses_pretty_printing() {
        let element = "<system>\n  <dns-setting>\n    <servers>\n      <primary>8.8.8.8</primary>\n    </servers>\n  </dns-setting>\n</system>";
        assert_eq!(
            sanitize_element(element),
            "<system><dns-setting><servers><primary>8.8.8.8</primary></servers></dns-setting></system>"
        );
    }

    #[test]
    fn sanitize_leaves_single_line_content_alone() {
        let element = "<tag><entry name=\"a b\"/></tag>";
        assert_eq!(sanitize_element(element), element);
    }

    #[test]
    fn model_mapping_covers_both_families() {
        assert_eq!(model_to_group("PA-3220"), "panos");
        assert_eq!(model_to_group("PA-VM"), "panos");
        assert_eq!(model_to_group("Panorama"), "panorama");
        assert_eq!(model_to_group("M-200"), "panorama");
    }

    #[test]
    fn success_status_is_ok() {
        assert!(response_status(r#"<response status="success"><result/></response>"#).is_ok());
    }

    #[test]
    fn error_status_carries_body() {
        let body = r#"<response status="error"><msg>bad xpath</msg></response>"#;
        let err = response_status(body).unwrap_err();
        assert!(err.contains("status=error"));
        assert!(err.contains("bad xpath"));
    }

    #[test]
    fn extracts_nested_element_text() {
        let body = r#"<response status="success"><result><system><model>PA-220</model><sw-version>9.1.0</sw-version></system></result></response>"#;
        assert_eq!(element_text(body, &["result", "system", "model"]).as_deref(), Some("PA-220"));
        assert_eq!(
            element_text(body, &["result", "system", "sw-version"]).as_deref(),
            Some("9.1.0")
        );
        assert_eq!(element_text(body, &["result", "key"]), None);
    }

    #[test]
    fn extracts_keygen_key() {
        let body = r#"<response status="success"><result><key>LUFRPT1=</key></result></response>"#;
        assert_eq!(element_text(body, &["result", "key"]).as_deref(), Some("LUFRPT1="));
    }
}
