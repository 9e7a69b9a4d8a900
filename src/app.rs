use std::cell::Cell;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{File, KeyboardEvent};
use yew::prelude::*;
use yew_icons::{Icon, IconId};

use crate::api::EmotionApi;
use crate::camera::CameraSession;
use crate::camera_panel::CameraPanel;
use crate::config::AppConfig;
use crate::controller::Controller;
use crate::info_modal::InfoModal;
use crate::results_view::EmotionResults;
use crate::state::{AppState, Tab};
use crate::upload::UploadPanel;

fn display(visible: bool, shown_as: &str) -> String {
    format!("display: {};", if visible { shown_as } else { "none" })
}

#[function_component(App)]
pub fn app() -> Html {
    let config = use_memo((), |_| AppConfig::from_document());

    html! {
        <ContextProvider<AppConfig> context={(*config).clone()}>
            <MoodDetector />
        </ContextProvider<AppConfig>>
    }
}

#[function_component(MoodDetector)]
fn mood_detector() -> Html {
    let config = use_context::<AppConfig>().unwrap_or_default();
    let state = use_reducer(AppState::default);
    let video_ref = use_node_ref();
    let canvas_ref = use_node_ref();
    let camera = use_memo((), |_| CameraSession::default());
    let tickets = use_memo((), |_| Cell::new(0u64));
    let upload = use_mut_ref(|| None::<File>);

    let controller = Controller {
        dispatcher: state.dispatcher(),
        api: EmotionApi::new(config.clone()),
        config,
        camera: (*camera).clone(),
        video_ref: video_ref.clone(),
        canvas_ref: canvas_ref.clone(),
        tickets: tickets.clone(),
        upload: upload.clone(),
    };

    // The keydown listener outlives renders; it reads the phase through this ref.
    let capturing_ref = use_mut_ref(|| false);
    {
        let capturing_ref = capturing_ref.clone();
        use_effect_with(state.is_capturing(), move |capturing| {
            *capturing_ref.borrow_mut() = *capturing;
            || ()
        });
    }

    // Startup model check
    {
        let controller = controller.clone();
        use_effect_with((), move |_| {
            controller.check_model_status();
            || ()
        });
    }

    // Stream release follows the reducer: stop, tab switch and failed start all land here.
    {
        let controller = controller.clone();
        use_effect_with(state.wants_stream(), move |wants| {
            if !*wants {
                controller.release_camera();
            }
            || ()
        });
    }

    // Global keyboard shortcuts
    {
        let controller = controller.clone();
        let capturing_ref = capturing_ref.clone();
        use_effect_with((), move |_| {
            let document = web_sys::window().and_then(|w| w.document());
            let listener = Closure::<dyn Fn(KeyboardEvent)>::new(move |e: KeyboardEvent| {
                let capturing = *capturing_ref.borrow();
                if controller.handle_key(&e.key(), capturing) {
                    e.prevent_default();
                }
            });
            if let Some(document) = &document {
                let _ = document
                    .add_event_listener_with_callback("keydown", listener.as_ref().unchecked_ref());
            }

            move || {
                if let Some(document) = &document {
                    let _ = document.remove_event_listener_with_callback(
                        "keydown",
                        listener.as_ref().unchecked_ref(),
                    );
                }
                drop(listener);
            }
        });
    }

    let on_start = {
        let controller = controller.clone();
        let idle = state.start_enabled();
        Callback::from(move |_: ()| controller.start_camera(idle))
    };

    let on_capture = {
        let controller = controller.clone();
        let capturing = state.is_capturing();
        Callback::from(move |_: ()| controller.capture(capturing))
    };

    let on_stop = {
        let controller = controller.clone();
        Callback::from(move |_: ()| controller.stop_camera())
    };

    let on_file = {
        let controller = controller.clone();
        Callback::from(move |file: File| controller.accept_file(file))
    };

    let on_drag = {
        let controller = controller.clone();
        Callback::from(move |over: bool| controller.set_drag_over(over))
    };

    let on_analyze = {
        let controller = controller.clone();
        Callback::from(move |_: ()| controller.analyze_upload())
    };

    let on_model_info = {
        let controller = controller.clone();
        Callback::from(move |_: MouseEvent| controller.show_model_info())
    };

    let on_health = {
        let controller = controller.clone();
        Callback::from(move |_: MouseEvent| controller.show_health())
    };

    let on_close_modal = {
        let controller = controller.clone();
        Callback::from(move |_: ()| controller.close_modal())
    };

    let tab_buttons = Tab::ALL.iter().map(|&tab| {
        let controller = controller.clone();
        let onclick = Callback::from(move |_: MouseEvent| controller.switch_tab(tab));
        let active = state.tab == tab;
        html! {
            <button class={classes!("tab-btn", active.then_some("active"))} data-tab={tab.key()} type="button" {onclick}>
                {tab.title()}
            </button>
        }
    });

    let panel_class = |tab: Tab| classes!("tab-panel", (state.tab == tab).then_some("active"));
    let error_text = state.error.clone().unwrap_or_default();

    html! {
        <main class="container">
            <header class="header">
                <h1>{"Mood Detection"}</h1>
                <p class="subtitle">{"Detect emotions from your camera or an uploaded photo"}</p>
                <div class="header-actions">
                    <button id="model-info-btn" class="btn btn-secondary" type="button" onclick={on_model_info}>
                        <Icon icon_id={IconId::LucideInfo} width={"16"} height={"16"} />{" Model Info"}
                    </button>
                    <button id="health-check-btn" class="btn btn-secondary" type="button" onclick={on_health}>
                        <Icon icon_id={IconId::LucideActivity} width={"16"} height={"16"} />{" Health Check"}
                    </button>
                </div>
            </header>

            if let Some(warning) = state.model_warning.clone() {
                <div id="model-warning" class="warning-message">
                    <Icon icon_id={IconId::LucideAlertTriangle} width={"18"} height={"18"} />
                    <span>{warning}</span>
                </div>
            }

            <div class="tabs">
                { for tab_buttons }
            </div>

            <div id={Tab::Camera.panel_id()} class={panel_class(Tab::Camera)}>
                <CameraPanel
                    video_ref={video_ref.clone()}
                    canvas_ref={canvas_ref.clone()}
                    start_enabled={state.start_enabled()}
                    capture_enabled={state.capture_enabled()}
                    stop_enabled={state.stop_enabled()}
                    captured_preview={state.captured_preview.clone()}
                    {on_start}
                    {on_capture}
                    {on_stop}
                />
            </div>

            <div id={Tab::Upload.panel_id()} class={panel_class(Tab::Upload)}>
                <UploadPanel
                    preview={state.upload_preview.clone()}
                    drag_over={state.drag_over}
                    busy={state.loading}
                    {on_file}
                    {on_drag}
                    {on_analyze}
                />
            </div>

            <section class="results-section">
                <div id="loading" class="loading" style={display(state.loading, "block")}>
                    <div class="spinner"></div>
                    <p>{"Analyzing..."}</p>
                </div>
                <div id="error-message" class="error-message" style={display(state.error.is_some(), "block")}>
                    <span id="error-text">{error_text}</span>
                </div>
                <EmotionResults ranked={state.results.clone()} />
            </section>

            <InfoModal content={state.modal.clone()} on_close={on_close_modal} />
        </main>
    }
}
