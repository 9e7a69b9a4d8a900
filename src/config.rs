use serde::Serialize;
use wasm_bindgen::JsCast;

const API_BASE_META: &str = "emotion-api-base";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Prefix for every service call. Empty means same origin.
    pub api_base: String,
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub facing_mode: String,
    /// JPEG quality used when encoding a capture.
    pub jpeg_quality: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            ideal_width: 640,
            ideal_height: 480,
            facing_mode: "user".to_string(),
            jpeg_quality: 0.8,
        }
    }
}

impl AppConfig {
    /// Defaults, with the API base taken from `<meta name="emotion-api-base">` when present.
    pub fn from_document() -> Self {
        let mut config = Self::default();
        if let Some(base) = read_meta(API_BASE_META) {
            config.api_base = base;
        }
        config
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }

    pub fn media_constraints(&self) -> MediaConstraints {
        MediaConstraints {
            video: VideoConstraints {
                width: Ideal {
                    ideal: self.ideal_width,
                },
                height: Ideal {
                    ideal: self.ideal_height,
                },
                facing_mode: self.facing_mode.clone(),
            },
            audio: false,
        }
    }
}

fn read_meta(name: &str) -> Option<String> {
    let document = web_sys::window()?.document()?;
    let element = document
        .query_selector(&format!("meta[name=\"{}\"]", name))
        .ok()??;
    let meta = element.dyn_into::<web_sys::HtmlMetaElement>().ok()?;
    let content = meta.content();
    let content = content.trim();
    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}

/// `getUserMedia` constraints; serialized straight into the JS object the browser expects.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct MediaConstraints {
    pub video: VideoConstraints,
    pub audio: bool,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoConstraints {
    pub width: Ideal,
    pub height: Ideal,
    pub facing_mode: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Ideal {
    pub ideal: u32,
}
