#![forbid(unsafe_code)]

use std::time::Duration;

use anyhow::Result;
use log::{debug, warn};
use serde::Deserialize;

use crate::utils::errors::Errors;

// ***************************************************************************
//                                Constants
// ***************************************************************************
/// Returned whenever a fact cannot be retrieved, whatever the cause.
pub const FALLBACK_FUN_FACT : &str = "Could not retrieve a fun fact at this time.";

/// Replaced by the absolute value of the number in the fact url template.
pub const NUMBER_PLACEHOLDER : &str = "{number}";

// ***************************************************************************
//                               Fact Payload
// ***************************************************************************
// The numbers api also returns number and type fields, which we ignore.
#[derive(Debug, Deserialize)]
struct FactPayload {
    found: Option<bool>,
    text: Option<String>,
}

// ***************************************************************************
//                              FunFactClient
// ***************************************************************************
/** Client for the external numeric trivia service.  The underlying reqwest
 * client pools its connections, so a single instance is shared by all
 * requests.
 */
#[derive(Debug, Clone)]
pub struct FunFactClient {
    client: reqwest::Client,
    url_template: String,
}

impl FunFactClient {
    /// Create a client whose requests time out after the given duration.
    pub fn new(url_template: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {client, url_template: url_template.to_string()})
    }

    /// The lookup url for a number.  The sign never reaches the trivia service.
    pub fn fact_url(&self, n: i64) -> String {
        self.url_template.replace(NUMBER_PLACEHOLDER, &n.unsigned_abs().to_string())
    }

    // -----------------------------------------------------------------------
    // fun_fact:
    // -----------------------------------------------------------------------
    /** Retrieve a fun fact about the number.  This never fails: every error
     * is logged and replaced by the fallback text.
     */
    pub async fn fun_fact(&self, n: i64) -> String {
        match self.lookup(n).await {
            Ok(text) => text,
            Err(e) => {
                warn!("{}", e);
                FALLBACK_FUN_FACT.to_string()
            }
        }
    }

    async fn lookup(&self, n: i64) -> Result<String, Errors> {
        let url = self.fact_url(n);
        debug!("Requesting fun fact from {}", url);

        let resp = self.client.get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Errors::FactLookup(format!("{}: {}", url, e)))?;

        let payload: FactPayload = resp.json()
            .await
            .map_err(|e| Errors::FactLookup(format!("malformed payload from {}: {}", url, e)))?;

        match payload {
            FactPayload {found: Some(true), text: Some(text)} => Ok(text),
            _ => Err(Errors::FactLookup(format!("no fact found at {}", url))),
        }
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, timeout: Duration) -> FunFactClient {
        let template = format!("{}/{}/math?json", server.uri(), NUMBER_PLACEHOLDER);
        FunFactClient::new(&template, timeout).unwrap()
    }

    #[test]
    fn url_uses_absolute_value() {
        let client = FunFactClient::new("http://numbersapi.com/{number}/math?json",
                                        Duration::from_secs(1)).unwrap();
        assert_eq!(client.fact_url(-28), "http://numbersapi.com/28/math?json");
        assert_eq!(client.fact_url(i64::MIN),
                   "http://numbersapi.com/9223372036854775808/math?json");
    }

    #[tokio::test]
    async fn found_fact_is_returned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/153/math"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "text": "153 is a narcissistic number.",
                "number": 153,
                "found": true,
                "type": "math"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(2));
        assert_eq!(client.fun_fact(153).await, "153 is a narcissistic number.");
    }

    #[tokio::test]
    async fn negative_number_looks_up_absolute_value() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/7/math"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "text": "7 is prime.", "found": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(2));
        assert_eq!(client.fun_fact(-7).await, "7 is prime.");
    }

    #[tokio::test]
    async fn not_found_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "text": "123456 is an uninteresting number.", "found": false
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(2));
        assert_eq!(client.fun_fact(123456).await, FALLBACK_FUN_FACT);
    }

    #[tokio::test]
    async fn missing_text_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"found": true})))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(2));
        assert_eq!(client.fun_fact(6).await, FALLBACK_FUN_FACT);
    }

    #[tokio::test]
    async fn malformed_payload_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(2));
        assert_eq!(client.fun_fact(6).await, FALLBACK_FUN_FACT);
    }

    #[tokio::test]
    async fn server_error_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "text": "should be ignored", "found": true
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(2));
        assert_eq!(client.fun_fact(6).await, FALLBACK_FUN_FACT);
    }

    #[tokio::test]
    async fn timeout_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200)
                .set_body_json(json!({"text": "too late", "found": true}))
                .set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_millis(200));
        assert_eq!(client.fun_fact(6).await, FALLBACK_FUN_FACT);
    }

    #[tokio::test]
    async fn unreachable_host_falls_back() {
        let client = FunFactClient::new("http://127.0.0.1:9/{number}/math?json",
                                        Duration::from_secs(1)).unwrap();
        assert_eq!(client.fun_fact(6).await, FALLBACK_FUN_FACT);
    }
}
