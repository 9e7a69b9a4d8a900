use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{DragEvent, File, FileReader, HtmlInputElement};
use yew::prelude::*;
use yew_icons::{Icon, IconId};

use crate::error::AppError;
use crate::state::UploadPreview;

pub fn is_image_type(media_type: &str) -> bool {
    media_type.starts_with("image/")
}

/// Reads `file` into a `data:` URL for the local preview.
pub async fn read_as_data_url(file: &File) -> Result<String, AppError> {
    let reader = FileReader::new()?;
    let done = js_sys::Promise::new(&mut |resolve, reject| {
        reader.set_onload(Some(&resolve));
        reader.set_onerror(Some(&reject));
    });
    reader.read_as_data_url(file)?;
    JsFuture::from(done)
        .await
        .map_err(|e| AppError::browser("failed to read file", e))?;
    reader
        .result()?
        .as_string()
        .ok_or_else(|| AppError::Browser("file reader returned no text".into()))
}

fn first_dropped_file(e: &DragEvent) -> Option<File> {
    e.data_transfer()?.files()?.get(0)
}

#[derive(Properties, PartialEq, Clone)]
pub struct UploadPanelProps {
    pub preview: Option<UploadPreview>,
    pub drag_over: bool,
    pub busy: bool,
    pub on_file: Callback<File>,
    pub on_drag: Callback<bool>,
    pub on_analyze: Callback<()>,
}

#[function_component(UploadPanel)]
pub fn upload_panel(props: &UploadPanelProps) -> Html {
    let input_ref = use_node_ref();

    let open_picker = {
        let input_ref = input_ref.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(input) = input_ref.cast::<HtmlInputElement>() {
                input.click();
            }
        })
    };

    let on_change = {
        let on_file = props.on_file.clone();
        Callback::from(move |e: Event| {
            let Some(input) = e
                .target()
                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            else {
                return;
            };
            if let Some(file) = input.files().and_then(|files| files.get(0)) {
                on_file.emit(file);
            }
            // Re-selecting the same file should fire `change` again.
            input.set_value("");
        })
    };

    let on_drag_over = {
        let on_drag = props.on_drag.clone();
        Callback::from(move |e: DragEvent| {
            e.prevent_default();
            on_drag.emit(true);
        })
    };

    let on_drag_leave = {
        let on_drag = props.on_drag.clone();
        Callback::from(move |e: DragEvent| {
            e.prevent_default();
            on_drag.emit(false);
        })
    };

    let on_drop = {
        let on_drag = props.on_drag.clone();
        let on_file = props.on_file.clone();
        Callback::from(move |e: DragEvent| {
            e.prevent_default();
            on_drag.emit(false);
            if let Some(file) = first_dropped_file(&e) {
                on_file.emit(file);
            }
        })
    };

    let on_analyze = {
        let on_analyze = props.on_analyze.clone();
        Callback::from(move |_: MouseEvent| on_analyze.emit(()))
    };

    let drag_class = if props.drag_over { "dragover" } else { "" };

    html! {
        <div class="upload-section">
            <input
                id="file-input"
                ref={input_ref}
                type="file"
                accept="image/*"
                style="display: none;"
                onchange={on_change}
            />
            if let Some(preview) = props.preview.as_ref() {
                <div
                    id="uploaded-image"
                    class="uploaded-image"
                    ondragover={on_drag_over}
                    ondragleave={on_drag_leave}
                    ondrop={on_drop}
                >
                    <img id="preview-image" src={preview.data_url.clone()} alt={preview.name.clone()} />
                    <div class="upload-actions">
                        <button class="btn btn-secondary" type="button" onclick={open_picker}>
                            {"Choose another"}
                        </button>
                        <button
                            id="analyze-upload"
                            class="btn btn-primary"
                            type="button"
                            onclick={on_analyze}
                            disabled={props.busy}
                        >
                            <Icon icon_id={IconId::LucideSmile} width={"18"} height={"18"} />
                            {" Analyze Emotion"}
                        </button>
                    </div>
                </div>
            } else {
                <div
                    id="upload-area"
                    class={classes!("upload-area", drag_class)}
                    onclick={open_picker}
                    ondragover={on_drag_over}
                    ondragleave={on_drag_leave}
                    ondrop={on_drop}
                >
                    <div class="upload-icon"><Icon icon_id={IconId::LucideUpload} width={"40"} height={"40"} /></div>
                    <p>{"Click to upload or drag and drop an image"}</p>
                    <p style="font-size: 0.85rem; color: #666;">{"Supports JPG, PNG and other image formats"}</p>
                </div>
            }
        </div>
    }
}

/// Preview record for an accepted file.
pub fn preview_for(file: &File, data_url: String) -> UploadPreview {
    UploadPreview {
        name: file.name(),
        data_url,
    }
}
