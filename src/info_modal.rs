use wasm_bindgen::JsValue;
use yew::prelude::*;
use yew_icons::{Icon, IconId};

use crate::api::{HealthStatus, ModelInfo};

/// What the shared modal is currently showing.
#[derive(Clone, Debug, PartialEq)]
pub enum ModalContent {
    ModelInfo(ModelInfo),
    Health {
        status: HealthStatus,
        /// Local time at which the check answered.
        checked_at: String,
    },
}

impl ModalContent {
    pub fn health_now(status: HealthStatus) -> Self {
        let checked_at = js_sys::Date::new_0()
            .to_locale_string("default", &JsValue::UNDEFINED)
            .into();
        ModalContent::Health { status, checked_at }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ModalContent::ModelInfo(_) => "Model Information",
            ModalContent::Health { .. } => "Health Check",
        }
    }

    fn heading(&self) -> &'static str {
        match self {
            ModalContent::ModelInfo(_) => "Model Status",
            ModalContent::Health { .. } => "API Status",
        }
    }

    /// Label/value lines of the modal body, in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        match self {
            ModalContent::ModelInfo(info) => {
                let mut rows = vec![("Loaded", yes_no(info.model_loaded))];
                if let Some(shape) = &info.input_shape {
                    rows.push(("Input Shape", shape.to_string()));
                }
                if let Some(emotions) = &info.emotions {
                    rows.push(("Emotions", emotions.join(", ")));
                }
                if let Some(message) = &info.message {
                    rows.push(("Message", message.clone()));
                }
                rows
            }
            ModalContent::Health { status, checked_at } => {
                let health = if status.is_healthy() {
                    "✅ Healthy"
                } else {
                    "❌ Unhealthy"
                };
                let mut rows = vec![
                    ("Status", health.to_string()),
                    ("Model Loaded", yes_no(status.model_loaded)),
                ];
                if let Some(message) = &status.message {
                    rows.push(("Message", message.clone()));
                }
                rows.push(("Timestamp", checked_at.clone()));
                rows
            }
        }
    }
}

fn yes_no(flag: bool) -> String {
    let text = if flag { "✅ Yes" } else { "❌ No" };
    text.to_string()
}

#[derive(Properties, PartialEq, Clone)]
pub struct InfoModalProps {
    pub content: Option<ModalContent>,
    pub on_close: Callback<()>,
}

#[function_component(InfoModal)]
pub fn info_modal(props: &InfoModalProps) -> Html {
    let on_backdrop = {
        let on_close = props.on_close.clone();
        Callback::from(move |e: MouseEvent| {
            // Clicks inside the content bubble up with a different target.
            if e.target() == e.current_target() {
                on_close.emit(());
            }
        })
    };

    let on_close_click = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };

    let Some(content) = props.content.as_ref() else {
        return html! {
            <div id="info-modal" class="modal" style="display: none;"></div>
        };
    };

    html! {
        <div id="info-modal" class="modal" style="display: flex;" onclick={on_backdrop}>
            <div class="modal-content">
                <div class="modal-header">
                    <h3 id="modal-title">{content.title()}</h3>
                    <button id="modal-close" class="modal-close" type="button" title="Close" onclick={on_close_click}>
                        <Icon icon_id={IconId::LucideXCircle} width={"20"} height={"20"} />
                    </button>
                </div>
                <div id="modal-body" class="modal-body">
                    <div>
                        <h4>{content.heading()}</h4>
                        { for content.rows().into_iter().map(|(label, value)| html! {
                            <p><strong>{format!("{}:", label)}</strong>{" "}{value}</p>
                        }) }
                    </div>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn model_info_rows_skip_absent_fields() {
        let content = ModalContent::ModelInfo(ModelInfo {
            model_loaded: false,
            ..ModelInfo::default()
        });
        assert_eq!(content.title(), "Model Information");
        assert_eq!(content.rows(), vec![("Loaded", "❌ No".to_string())]);
    }

    #[test]
    fn model_info_rows_full() {
        let content = ModalContent::ModelInfo(ModelInfo {
            model_loaded: true,
            input_shape: Some(json!([1, 1, 48, 48])),
            emotions: Some(vec!["angry".into(), "happy".into()]),
            message: Some("ready".into()),
        });
        assert_eq!(
            content.rows(),
            vec![
                ("Loaded", "✅ Yes".to_string()),
                ("Input Shape", "[1,1,48,48]".to_string()),
                ("Emotions", "angry, happy".to_string()),
                ("Message", "ready".to_string()),
            ]
        );
    }

    #[test]
    fn health_rows_end_with_timestamp() {
        let content = ModalContent::Health {
            status: HealthStatus {
                status: Some("healthy".into()),
                model_loaded: true,
                message: None,
            },
            checked_at: "10/19/2026, 9:00:00 AM".into(),
        };
        assert_eq!(content.title(), "Health Check");
        let rows = content.rows();
        assert_eq!(rows[0], ("Status", "✅ Healthy".to_string()));
        assert_eq!(rows[1], ("Model Loaded", "✅ Yes".to_string()));
        assert_eq!(rows.last().unwrap().0, "Timestamp");
    }
}
