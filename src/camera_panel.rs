use yew::prelude::*;
use yew_icons::{Icon, IconId};

#[derive(Properties, PartialEq, Clone)]
pub struct CameraPanelProps {
    pub video_ref: NodeRef,
    pub canvas_ref: NodeRef,
    pub start_enabled: bool,
    pub capture_enabled: bool,
    pub stop_enabled: bool,
    pub captured_preview: Option<String>,
    pub on_start: Callback<()>,
    pub on_capture: Callback<()>,
    pub on_stop: Callback<()>,
}

#[function_component(CameraPanel)]
pub fn camera_panel(props: &CameraPanelProps) -> Html {
    let click = |cb: &Callback<()>| {
        let cb = cb.clone();
        Callback::from(move |_: MouseEvent| cb.emit(()))
    };

    html! {
        <div class="camera-section">
            <div class="video-container">
                <video id="video" ref={props.video_ref.clone()} autoplay={true} playsinline={true} muted={true}></video>
                <canvas id="canvas" ref={props.canvas_ref.clone()} style="display: none;"></canvas>
            </div>
            <div class="camera-controls">
                <button id="start-camera" class="btn btn-primary" type="button" onclick={click(&props.on_start)} disabled={!props.start_enabled}>
                    <Icon icon_id={IconId::LucideCamera} width={"18"} height={"18"} />{" Start Camera"}
                </button>
                <button id="capture" class="btn btn-success" type="button" onclick={click(&props.on_capture)} disabled={!props.capture_enabled} title="Capture (Space)">
                    <Icon icon_id={IconId::LucideAperture} width={"18"} height={"18"} />{" Capture"}
                </button>
                <button id="stop-camera" class="btn btn-danger" type="button" onclick={click(&props.on_stop)} disabled={!props.stop_enabled}>
                    <Icon icon_id={IconId::LucideCameraOff} width={"18"} height={"18"} />{" Stop Camera"}
                </button>
            </div>
            if let Some(src) = props.captured_preview.clone() {
                <div id="captured-image" class="captured-image" style="display: block;">
                    <h4>{"Captured Image"}</h4>
                    <img id="captured-preview" src={src} alt="Captured frame" />
                </div>
            }
        </div>
    }
}
