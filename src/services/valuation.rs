use crate::config::ValuationSettings;
use crate::core::xml_to_json;
use crate::models::ValuationQuery;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the property valuation provider
#[derive(Debug, Error)]
pub enum ValuationError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Valuation API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Zillow `GetSearchResults` client
///
/// Always asks for the rent Zestimate next to the regular search results.
/// The provider answers in XML; the document is converted to JSON with the
/// root element dropped, so callers see `{ request, message, response }`.
pub struct ValuationClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl ValuationClient {
    /// Create a new valuation client from its settings
    pub fn new(settings: &ValuationSettings) -> Result<Self, ValuationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            client,
        })
    }

    /// Look up search results, including the rent estimate, for an address
    pub async fn rent_estimate(&self, query: &ValuationQuery) -> Result<Value, ValuationError> {
        let url = format!("{}/GetSearchResults.htm", self.base_url.trim_end_matches('/'));

        let address = query.address.as_deref().unwrap_or_default();
        let city_state_zip = query.city_state_zip.as_deref().unwrap_or_default();

        tracing::debug!("Requesting rent estimate for: {} / {}", address, city_state_zip);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("zws-id", self.api_key.as_str()),
                ("address", address),
                ("citystatezip", city_state_zip),
                ("rentzestimate", "true"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ValuationError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(ValuationError::ApiError(format!("{} - {}", status, body)));
        }

        let body = response.text().await?;
        let results = parse_search_results(&body)?;
        check_message_code(&results)?;

        Ok(results)
    }
}

/// Parse a search results body, XML or JSON
fn parse_search_results(body: &str) -> Result<Value, ValuationError> {
    if body.trim_start().starts_with('<') {
        let (_, value) = xml_to_json(body)
            .map_err(|e| ValuationError::InvalidResponse(format!("Failed to parse search results: {}", e)))?;
        return Ok(value);
    }

    serde_json::from_str(body)
        .map_err(|e| ValuationError::InvalidResponse(format!("Failed to parse search results: {}", e)))
}

/// Zillow reports failures with HTTP 200 and a non-zero `message.code`
fn check_message_code(results: &Value) -> Result<(), ValuationError> {
    let Some(message) = results.get("message") else {
        return Ok(());
    };

    let code = match message.get("code") {
        Some(Value::String(code)) => code.trim().to_string(),
        Some(Value::Number(code)) => code.to_string(),
        _ => return Ok(()),
    };

    if code == "0" {
        return Ok(());
    }

    let text = message.get("text").and_then(Value::as_str).unwrap_or_default();
    Err(ValuationError::ApiError(format!("{}: {}", code, text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::Server) -> ValuationClient {
        ValuationClient::new(&ValuationSettings {
            endpoint: server.url(),
            api_key: "zws-test".to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_rent_estimate_forwards_params() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{"response":{"results":{"result":[{"rentzestimate":{"amount":1850}}]}}}"#;
        let mock = server
            .mock("GET", "/GetSearchResults.htm")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("zws-id".into(), "zws-test".into()),
                Matcher::UrlEncoded("address".into(), "2114 Bigelow Ave".into()),
                Matcher::UrlEncoded("citystatezip".into(), "Seattle, WA".into()),
                Matcher::UrlEncoded("rentzestimate".into(), "true".into()),
            ]))
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let query = ValuationQuery {
            address: Some("2114 Bigelow Ave".to_string()),
            city_state_zip: Some("Seattle, WA".to_string()),
        };
        let value = client_for(&server).rent_estimate(&query).await.unwrap();

        mock.assert_async().await;
        assert_eq!(value["response"]["results"]["result"][0]["rentzestimate"]["amount"], 1850);
    }

    #[tokio::test]
    async fn test_missing_params_sent_empty() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/GetSearchResults.htm")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("address".into(), "".into()),
                Matcher::UrlEncoded("citystatezip".into(), "".into()),
            ]))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        client_for(&server)
            .rent_estimate(&ValuationQuery::default())
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/GetSearchResults.htm")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let err = client_for(&server)
            .rent_estimate(&ValuationQuery::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ValuationError::Unauthorized));
    }

    const SEARCH_RESULTS_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<SearchResults:searchresults xmlns:SearchResults="http://www.zillow.com/static/xsd/SearchResults.xsd">
  <request>
    <address>2114 Bigelow Ave</address>
    <citystatezip>Seattle, WA</citystatezip>
  </request>
  <message>
    <text>Request successfully processed</text>
    <code>0</code>
  </message>
  <response>
    <results>
      <result>
        <zpid>48749425</zpid>
        <rentzestimate>
          <amount currency="USD">3450</amount>
          <valuationRange>
            <low currency="USD">2760</low>
            <high currency="USD">4140</high>
          </valuationRange>
        </rentzestimate>
      </result>
    </results>
  </response>
</SearchResults:searchresults>"#;

    #[tokio::test]
    async fn test_xml_results_converted() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/GetSearchResults.htm")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "text/xml;charset=utf-8")
            .with_body(SEARCH_RESULTS_XML)
            .create_async()
            .await;

        let value = client_for(&server)
            .rent_estimate(&ValuationQuery::default())
            .await
            .unwrap();

        assert_eq!(value["message"]["code"], "0");
        assert_eq!(value["request"]["address"], "2114 Bigelow Ave");

        let rent = &value["response"]["results"]["result"]["rentzestimate"];
        assert_eq!(rent["amount"]["_"], "3450");
        assert_eq!(rent["amount"]["$"]["currency"], "USD");
        assert_eq!(rent["valuationRange"]["low"]["_"], "2760");
        assert_eq!(rent["valuationRange"]["high"]["_"], "4140");
    }

    #[tokio::test]
    async fn test_nonzero_message_code_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"<?xml version="1.0" encoding="utf-8"?>
<SearchResults:searchresults xmlns:SearchResults="http://www.zillow.com/static/xsd/SearchResults.xsd">
  <message>
    <text>Error: no exact match found for input address</text>
    <code>508</code>
  </message>
</SearchResults:searchresults>"#;
        server
            .mock("GET", "/GetSearchResults.htm")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let err = client_for(&server)
            .rent_estimate(&ValuationQuery::default())
            .await
            .unwrap_err();

        match err {
            ValuationError::ApiError(message) => {
                assert!(message.starts_with("508: "));
                assert!(message.contains("no exact match"));
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_truncated_xml_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/GetSearchResults.htm")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<SearchResults:searchresults><message><code>0</code>")
            .create_async()
            .await;

        let err = client_for(&server)
            .rent_estimate(&ValuationQuery::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ValuationError::InvalidResponse(_)));
    }

    #[test]
    fn test_message_code_check() {
        assert!(check_message_code(&serde_json::json!({})).is_ok());
        assert!(check_message_code(&serde_json::json!({ "message": { "code": 0 } })).is_ok());
        assert!(check_message_code(&serde_json::json!({ "message": { "code": "0" } })).is_ok());
        assert!(matches!(
            check_message_code(&serde_json::json!({ "message": { "code": 2, "text": "invalid zws-id" } })),
            Err(ValuationError::ApiError(m)) if m == "2: invalid zws-id"
        ));
    }
}
