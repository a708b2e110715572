//! A [`Page`] backed by a W3C WebDriver endpoint, such as a locally running chromedriver.
//!
//! Only the commands the scraper issues are implemented: session creation and deletion,
//! navigation, CSS element search, element text and attributes, click, and scrolling by script.

use anyhow::bail;
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::session::{Page, Scope, SessionError};

/// Key under which WebDriver serialises element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const SCROLL_INTO_VIEW: &str = "arguments[0].scrollIntoView(true);";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebDriverConfig {
    pub endpoint: String,
    pub browser: String,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
}
impl WebDriverConfig {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            bail!("WebDriver endpoint '{}' must be an http(s) URL", self.endpoint);
        }
        if self.browser.is_empty() {
            bail!("browser name cannot be empty");
        }
        if self.window_width == 0 || self.window_height == 0 {
            bail!("window dimensions must be positive");
        }
        Ok(())
    }

    fn capabilities(&self) -> Value {
        let mut args = vec![format!(
            "--window-size={},{}",
            self.window_width, self.window_height
        )];
        if self.headless {
            args.push("--headless=new".into());
        }
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": self.browser,
                    "goog:chromeOptions": { "args": args }
                }
            }
        })
    }
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9515".into(),
            browser: "chrome".into(),
            headless: false,
            window_width: 1200,
            window_height: 900,
        }
    }
}

/// An opaque reference to an element of a [`WebDriverPage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebElement {
    #[serde(rename = "element-6066-11e4-a52e-4f735466cecf")]
    id: String,
}
impl WebElement {
    fn to_json(&self) -> Value {
        json!({ ELEMENT_KEY: self.id })
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    value: Value,
}

#[derive(Debug, Deserialize)]
struct ErrorValue {
    error: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct NewSession {
    #[serde(rename = "sessionId")]
    session_id: String,
}

/// Unwraps the `value` of a WebDriver response, mapping error payloads to
/// [`SessionError::Protocol`].
pub fn decode(status: u16, body: &[u8]) -> Result<Value, SessionError> {
    let envelope: Envelope = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(_) if !(200..300).contains(&status) => {
            return Err(SessionError::Protocol {
                error: format!("HTTP {status}"),
                message: String::from_utf8_lossy(body).into_owned(),
            })
        }
        Err(err) => return Err(err.into()),
    };
    if let Ok(ErrorValue { error, message }) = ErrorValue::deserialize(&envelope.value) {
        return Err(SessionError::Protocol { error, message });
    }
    if !(200..300).contains(&status) {
        return Err(SessionError::Protocol {
            error: format!("HTTP {status}"),
            message: envelope.value.to_string(),
        });
    }
    Ok(envelope.value)
}

pub struct WebDriverPage {
    client: Client,
    endpoint: String,
    session_id: String,
}
impl WebDriverPage {
    /// Starts a new browser session.
    pub async fn connect(config: &WebDriverConfig) -> Result<Self, SessionError> {
        let client = Client::new();
        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        let value = send(
            &client,
            Method::POST,
            format!("{endpoint}/session"),
            Some(config.capabilities()),
        )
        .await?;
        let NewSession { session_id } = serde_json::from_value(value)?;
        debug!("started WebDriver session {session_id} at {endpoint}");
        Ok(Self {
            client,
            endpoint,
            session_id,
        })
    }

    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, SessionError> {
        let url = format!("{}/session/{}{path}", self.endpoint, self.session_id);
        send(&self.client, method, url, body).await
    }
}

async fn send(
    client: &Client,
    method: Method,
    url: String,
    body: Option<Value>,
) -> Result<Value, SessionError> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }
    let response = request.send().await?;
    let status = response.status().as_u16();
    let body = response.bytes().await?;
    decode(status, &body)
}

fn search_path(scope: Scope<'_, WebElement>) -> String {
    match scope {
        Scope::Document => "/elements".into(),
        Scope::Within(element) => format!("/element/{}/elements", element.id),
    }
}

impl Page for WebDriverPage {
    type Element = WebElement;

    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn find_all(
        &self,
        scope: Scope<'_, WebElement>,
        css: &str,
    ) -> Result<Vec<WebElement>, SessionError> {
        let value = self
            .command(
                Method::POST,
                &search_path(scope),
                Some(json!({ "using": "css selector", "value": css })),
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn text(&self, element: &WebElement) -> Result<String, SessionError> {
        let value = self
            .command(Method::GET, &format!("/element/{}/text", element.id), None)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn attribute(
        &self,
        element: &WebElement,
        name: &str,
    ) -> Result<Option<String>, SessionError> {
        let value = self
            .command(
                Method::GET,
                &format!("/element/{}/attribute/{name}", element.id),
                None,
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn click(&self, element: &WebElement) -> Result<(), SessionError> {
        self.command(
            Method::POST,
            &format!("/element/{}/click", element.id),
            Some(json!({})),
        )
        .await?;
        Ok(())
    }

    async fn scroll_into_view(&self, element: &WebElement) -> Result<(), SessionError> {
        self.command(
            Method::POST,
            "/execute/sync",
            Some(json!({ "script": SCROLL_INTO_VIEW, "args": [element.to_json()] })),
        )
        .await?;
        Ok(())
    }

    async fn close(self) -> Result<(), SessionError> {
        self.command(Method::DELETE, "", None).await?;
        debug!("deleted WebDriver session {}", self.session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_value() {
        let value = decode(200, br#"{"value": "12 / 3 / 7"}"#).unwrap();
        assert_eq!(json!("12 / 3 / 7"), value);

        let value = decode(200, br#"{"value": null}"#).unwrap();
        assert_eq!(Value::Null, value);
    }

    #[test]
    fn decode_elements() {
        let value = decode(
            200,
            br#"{"value": [{"element-6066-11e4-a52e-4f735466cecf": "a1"}, {"element-6066-11e4-a52e-4f735466cecf": "b2"}]}"#,
        )
        .unwrap();
        let elements: Vec<WebElement> = serde_json::from_value(value).unwrap();
        assert_eq!(
            vec![
                WebElement { id: "a1".into() },
                WebElement { id: "b2".into() }
            ],
            elements
        );
        assert_eq!(json!({ ELEMENT_KEY: "a1" }), elements[0].to_json());
    }

    #[test]
    fn decode_protocol_error() {
        let err = decode(
            404,
            br#"{"value": {"error": "no such element", "message": "Unable to locate element", "stacktrace": ""}}"#,
        )
        .unwrap_err();
        assert_eq!("no such element: Unable to locate element", err.to_string());
    }

    #[test]
    fn decode_http_error_without_envelope() {
        let err = decode(502, b"Bad Gateway").unwrap_err();
        assert_eq!("HTTP 502: Bad Gateway", err.to_string());
    }

    #[test]
    fn decode_malformed() {
        assert!(matches!(
            decode(200, b"not json"),
            Err(SessionError::Malformed(_))
        ));
    }

    #[test]
    fn search_paths() {
        assert_eq!("/elements", search_path(Scope::Document));
        let element = WebElement { id: "e7".into() };
        assert_eq!("/element/e7/elements", search_path(Scope::Within(&element)));
    }

    #[test]
    fn capabilities() {
        let config = WebDriverConfig {
            headless: true,
            ..WebDriverConfig::default()
        };
        assert_eq!(
            json!({
                "capabilities": {
                    "alwaysMatch": {
                        "browserName": "chrome",
                        "goog:chromeOptions": { "args": ["--window-size=1200,900", "--headless=new"] }
                    }
                }
            }),
            config.capabilities()
        );
    }

    #[test]
    fn config_validation() {
        WebDriverConfig::default().validate().unwrap();
        let config = WebDriverConfig {
            endpoint: "localhost:9515".into(),
            ..WebDriverConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
