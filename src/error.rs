use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

pub const CAMERA_UNAVAILABLE: &str = "Unable to access camera. Please check permissions.";
pub const NOT_AN_IMAGE: &str = "Please select an image file.";
pub const ANALYSIS_FAILED: &str = "Failed to analyze image";
pub const NO_EMOTIONS: &str = "No emotions detected in the image.";
pub const MODEL_INFO_FAILED: &str = "Failed to fetch model information.";
pub const HEALTH_CHECK_FAILED: &str = "Failed to perform health check.";
pub const MODEL_NOT_LOADED: &str =
    "Emotion detection model is not loaded. Please ensure the ONNX model file is available.";

/// Every failure the page can show. All of them end up as banner text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    #[error("{}", CAMERA_UNAVAILABLE)]
    Camera(String),
    #[error("{}", NOT_AN_IMAGE)]
    NotAnImage,
    /// Non-2xx answer from the detection service, carrying its `detail`.
    #[error("{0}")]
    Remote(String),
    #[error("{}", NO_EMOTIONS)]
    NoEmotions,
    /// Transport, decoding or browser API failure.
    #[error("{0}")]
    Browser(String),
}

impl AppError {
    pub fn browser(context: &str, value: JsValue) -> Self {
        AppError::Browser(format!("{}: {}", context, describe_js(&value)))
    }
}

impl From<JsValue> for AppError {
    fn from(value: JsValue) -> Self {
        AppError::Browser(describe_js(&value))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Browser(err.to_string())
    }
}

/// Best-effort text for a thrown JS value (`Error.message`, a string, or its debug form).
pub fn describe_js(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{:?}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_shows_detail_verbatim() {
        let err = AppError::Remote("no face detected".to_string());
        assert_eq!(err.to_string(), "no face detected");
    }

    #[test]
    fn camera_error_hides_browser_reason() {
        let err = AppError::Camera("NotAllowedError".to_string());
        assert_eq!(err.to_string(), CAMERA_UNAVAILABLE);
    }

    #[test]
    fn fixed_messages() {
        assert_eq!(AppError::NotAnImage.to_string(), "Please select an image file.");
        assert_eq!(
            AppError::NoEmotions.to_string(),
            "No emotions detected in the image."
        );
    }
}
