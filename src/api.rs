use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{FormData, Headers, Request, RequestInit, Response};

use crate::config::AppConfig;
use crate::emotion::EmotionResult;
use crate::error::{AppError, ANALYSIS_FAILED};

const DETECT_BASE64_PATH: &str = "/detect-emotion-base64";
const DETECT_UPLOAD_PATH: &str = "/detect-emotion";
const HEALTH_PATH: &str = "/health";
const MODEL_INFO_PATH: &str = "/model-info";

#[derive(Serialize)]
struct Base64Request<'a> {
    image: &'a str,
}

#[derive(Deserialize, Default)]
struct DetectionBody {
    #[serde(default)]
    results: Option<Vec<EmotionResult>>,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Default)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.as_deref() == Some("healthy")
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ModelInfo {
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub input_shape: Option<serde_json::Value>,
    /// The service names this `labels`; older builds used `emotions`.
    #[serde(default, alias = "labels")]
    pub emotions: Option<Vec<String>>,
    #[serde(default)]
    pub message: Option<String>,
}

struct RawResponse {
    ok: bool,
    status: u16,
    body: String,
}

/// Client for the emotion detection service.
#[derive(Clone, Debug, PartialEq)]
pub struct EmotionApi {
    config: AppConfig,
}

impl EmotionApi {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Submits a captured frame as a data URL inside a JSON body.
    pub async fn detect_base64(
        &self,
        data_url: &str,
    ) -> Result<Option<Vec<EmotionResult>>, AppError> {
        let body = serde_json::to_string(&Base64Request { image: data_url })?;

        let init = RequestInit::new();
        init.set_method("POST");
        let headers = Headers::new()?;
        headers.set("Content-Type", "application/json")?;
        init.set_headers(&headers);
        init.set_body(&JsValue::from_str(&body));

        let url = self.config.endpoint(DETECT_BASE64_PATH);
        let response = send(Request::new_with_str_and_init(&url, &init)?).await?;
        interpret_detection(response.ok, &response.body)
    }

    /// Submits the selected file as multipart field `file`.
    pub async fn detect_upload(
        &self,
        file: &web_sys::File,
    ) -> Result<Option<Vec<EmotionResult>>, AppError> {
        let form = FormData::new()?;
        form.append_with_blob_and_filename("file", file, &file.name())?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_body(&form);

        let url = self.config.endpoint(DETECT_UPLOAD_PATH);
        let response = send(Request::new_with_str_and_init(&url, &init)?).await?;
        interpret_detection(response.ok, &response.body)
    }

    pub async fn health(&self) -> Result<HealthStatus, AppError> {
        self.get_json(HEALTH_PATH).await
    }

    pub async fn model_info(&self) -> Result<ModelInfo, AppError> {
        self.get_json(MODEL_INFO_PATH).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let url = self.config.endpoint(path);
        let response = send(Request::new_with_str(&url)?).await?;
        if !response.ok {
            return Err(AppError::Remote(format!(
                "{} returned HTTP {}",
                path, response.status
            )));
        }
        Ok(serde_json::from_str(&response.body)?)
    }
}

async fn send(request: Request) -> Result<RawResponse, AppError> {
    let window = web_sys::window().ok_or_else(|| AppError::Browser("no window".to_string()))?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| AppError::browser("fetch failed", e))?
        .dyn_into()?;
    let body = JsFuture::from(response.text()?)
        .await?
        .as_string()
        .unwrap_or_default();
    Ok(RawResponse {
        ok: response.ok(),
        status: response.status(),
        body,
    })
}

/// Turns a detection response into its result list or the message to show.
///
/// A successful body without `results` yields `Ok(None)`; the renderer
/// reports that as "no emotions".
pub fn interpret_detection(
    ok: bool,
    body: &str,
) -> Result<Option<Vec<EmotionResult>>, AppError> {
    if !ok {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail)
            .and_then(|d| match d {
                serde_json::Value::String(s) if !s.is_empty() => Some(s),
                _ => None,
            });
        return Err(AppError::Remote(
            detail.unwrap_or_else(|| ANALYSIS_FAILED.to_string()),
        ));
    }
    let parsed: DetectionBody = serde_json::from_str(body)?;
    Ok(parsed.results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_body_yields_results() {
        let body = r#"{"success":true,"results":[
            {"label":"happy","confidence":0.82,"percentage":"82%"},
            {"label":"sad","confidence":0.10,"percentage":"10%"}]}"#;
        let results = interpret_detection(true, body).unwrap().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0], EmotionResult::new("happy", 0.82, "82%"));
    }

    #[test]
    fn unprocessable_entity_uses_detail() {
        let err = interpret_detection(false, r#"{"detail":"no face detected"}"#).unwrap_err();
        assert_eq!(err, AppError::Remote("no face detected".to_string()));
        assert_eq!(err.to_string(), "no face detected");
    }

    #[test]
    fn error_without_string_detail_falls_back() {
        for body in [
            "{}",
            "<html>502 Bad Gateway</html>",
            r#"{"detail":[{"loc":["body","file"],"msg":"field required"}]}"#,
            r#"{"detail":""}"#,
        ] {
            let err = interpret_detection(false, body).unwrap_err();
            assert_eq!(err.to_string(), "Failed to analyze image", "body: {}", body);
        }
    }

    #[test]
    fn missing_results_is_not_an_error() {
        assert_eq!(interpret_detection(true, r#"{"success":true}"#).unwrap(), None);
    }

    #[test]
    fn garbage_success_body_is_an_error() {
        let err = interpret_detection(true, "not json").unwrap_err();
        assert!(matches!(err, AppError::Browser(_)));
    }

    #[test]
    fn model_info_accepts_labels_key() {
        let info: ModelInfo = serde_json::from_str(
            r#"{"model_loaded":true,"input_shape":[1,1,48,48],"labels":["angry","happy"]}"#,
        )
        .unwrap();
        assert!(info.model_loaded);
        assert_eq!(info.emotions, Some(vec!["angry".to_string(), "happy".to_string()]));
        assert_eq!(info.input_shape.unwrap().to_string(), "[1,1,48,48]");
        assert_eq!(info.message, None);
    }

    #[test]
    fn unloaded_model_info_is_minimal() {
        let info: ModelInfo = serde_json::from_str(r#"{"model_loaded":false}"#).unwrap();
        assert_eq!(info, ModelInfo::default());
    }

    #[test]
    fn health_status() {
        let health: HealthStatus =
            serde_json::from_str(r#"{"status":"healthy","model_loaded":false}"#).unwrap();
        assert!(health.is_healthy());
        assert!(!health.model_loaded);

        let degraded: HealthStatus = serde_json::from_str(r#"{"status":"degraded"}"#).unwrap();
        assert!(!degraded.is_healthy());
    }

    #[test]
    fn base64_request_shape() {
        let body = serde_json::to_string(&Base64Request {
            image: "data:image/jpeg;base64,AAAA",
        })
        .unwrap();
        assert_eq!(body, r#"{"image":"data:image/jpeg;base64,AAAA"}"#);
    }
}
