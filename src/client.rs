use reqwest::multipart;
use tracing::{debug, info, warn};

use crate::error::PredictError;
use crate::models::{PredictReply, PredictResponse};
use crate::preview::{sniff_mime, SelectedFile, OCTET_STREAM};

const LOGGED_BODY_CHARS: usize = 500;

/// HTTP client for the external `POST /predict` service.
#[derive(Clone)]
pub struct PredictClient {
    http: reqwest::Client,
    endpoint: String,
}

impl PredictClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends the file as the multipart field `file`. An `error` field in the
    /// body is a reply, not a failure, whatever the status code.
    pub async fn predict(&self, file: &SelectedFile) -> Result<PredictReply, PredictError> {
        let form = multipart::Form::new().part("file", file_part(file)?);

        info!(
            "📤 Sending {} ({} bytes) to {}",
            file.name,
            file.bytes.len(),
            self.endpoint
        );

        let response = self.http.post(&self.endpoint).multipart(form).send().await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(%status, body = %truncate(&body, LOGGED_BODY_CHARS), "prediction service responded");

        let parsed: PredictResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(err) if status.is_success() => return Err(err.into()),
            Err(_) => {
                return Err(PredictError::Status {
                    status,
                    body: truncate(&body, LOGGED_BODY_CHARS),
                })
            }
        };

        parsed.into_reply().ok_or(PredictError::MissingPredictions)
    }
}

/// A declared type that does not parse is replaced by the sniffed one.
fn file_part(file: &SelectedFile) -> reqwest::Result<multipart::Part> {
    let part = || multipart::Part::bytes(file.bytes.clone()).file_name(file.name.clone());
    match part().mime_str(&file.mime) {
        Ok(part) => Ok(part),
        Err(err) => {
            warn!("Ignoring content type {:?} of {}: {}", file.mime, file.name, err);
            part().mime_str(sniff_mime(&file.bytes).unwrap_or(OCTET_STREAM))
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_file() -> SelectedFile {
        SelectedFile::new("pizza.jpg", vec![0xFF, 0xD8, 0xFF, 0xE0], Some("image/jpeg"))
    }

    fn client_for(server: &MockServer) -> PredictClient {
        PredictClient::new(format!("{}/predict", server.uri()))
    }

    #[tokio::test]
    async fn test_predict_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/predict"))
            .and(header_regex("content-type", "^multipart/form-data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "predictions": [["pizza", 0.8734], ["lasagna", 0.1]],
                "recipes": {
                    "pizza": [{"name": "Margherita", "ingredients": ["dough"], "instructions": ["bake"]}]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server).predict(&sample_file()).await.unwrap();
        let PredictReply::Predicted {
            predictions,
            catalog,
        } = reply
        else {
            panic!("expected predictions");
        };
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].label, "pizza");
        assert_eq!(catalog.unwrap().entries()[0].recipes[0].name, "Margherita");
    }

    #[tokio::test]
    async fn test_request_carries_file_field() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "predictions": []
            })))
            .mount(&server)
            .await;

        client_for(&server).predict(&sample_file()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains(r#"name="file""#), "body: {}", body);
        assert!(body.contains(r#"filename="pizza.jpg""#), "body: {}", body);
        assert!(body.contains("image/jpeg"), "body: {}", body);
    }

    #[tokio::test]
    async fn test_unparseable_declared_mime_falls_back_to_sniffed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "predictions": [["pizza", 0.9]]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let file = SelectedFile {
            name: "pizza.png".to_string(),
            mime: "garbage".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0],
        };
        let reply = client_for(&server).predict(&file).await.unwrap();
        assert!(matches!(reply, PredictReply::Predicted { .. }));

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("image/png"), "body: {}", body);
        assert!(!body.contains("garbage"), "body: {}", body);
    }

    #[tokio::test]
    async fn test_error_field_with_bad_request_is_rejected_reply() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(serde_json::json!({"error": "No file selected"})),
            )
            .mount(&server)
            .await;

        let reply = client_for(&server).predict(&sample_file()).await.unwrap();
        assert_eq!(reply, PredictReply::Rejected("No file selected".to_string()));
    }

    #[tokio::test]
    async fn test_non_json_gateway_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).predict(&sample_file()).await.unwrap_err();
        assert!(matches!(err, PredictError::Status { .. }));
        assert!(err.to_string().contains("502"), "error should mention status: {}", err);
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).predict(&sample_file()).await.unwrap_err();
        assert!(matches!(err, PredictError::Parse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/predict", listener.local_addr().unwrap());
        drop(listener);

        let err = PredictClient::new(endpoint)
            .predict(&sample_file())
            .await
            .unwrap_err();
        assert!(matches!(err, PredictError::Transport(_)));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
