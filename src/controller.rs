use std::cell::{Cell, RefCell};
use std::rc::Rc;
use web_sys::{File, HtmlCanvasElement, HtmlVideoElement};
use yew::prelude::*;

use crate::api::{EmotionApi, HealthStatus};
use crate::camera::{capture_frame, CameraSession, StartOutcome};
use crate::config::AppConfig;
use crate::error::{AppError, HEALTH_CHECK_FAILED, MODEL_INFO_FAILED, MODEL_NOT_LOADED};
use crate::info_modal::ModalContent;
use crate::keyboard::{shortcut_for, Shortcut};
use crate::state::{Action, AppState, Tab};
use crate::upload::{is_image_type, preview_for, read_as_data_url};

/// Banner to raise after the startup health check, if any.
pub fn startup_warning(status: &HealthStatus) -> Option<&'static str> {
    if status.model_loaded {
        None
    } else {
        Some(MODEL_NOT_LOADED)
    }
}

/// Side-effecting half of the page: talks to the camera, the file reader and
/// the service, and reports back only through reducer actions.
#[derive(Clone)]
pub struct Controller {
    pub dispatcher: UseReducerDispatcher<AppState>,
    pub api: EmotionApi,
    pub config: AppConfig,
    pub camera: CameraSession,
    pub video_ref: NodeRef,
    pub canvas_ref: NodeRef,
    /// Monotonic ticket source for analysis requests.
    pub tickets: Rc<Cell<u64>>,
    /// Latest accepted upload; a new drop or selection replaces it.
    pub upload: Rc<RefCell<Option<File>>>,
}

impl Controller {
    fn dispatch(&self, action: Action) {
        self.dispatcher.dispatch(action);
    }

    fn next_ticket(&self) -> u64 {
        let ticket = self.tickets.get().wrapping_add(1);
        self.tickets.set(ticket);
        ticket
    }

    pub fn switch_tab(&self, tab: Tab) {
        log::debug!("switching to {} tab", tab.key());
        self.dispatch(Action::SwitchTab(tab));
    }

    /// Requests the camera. Ignored unless the camera is idle.
    pub fn start_camera(&self, idle: bool) {
        if !idle {
            return;
        }
        let Some(video) = self.video_ref.cast::<HtmlVideoElement>() else {
            log::error!("video element missing");
            return;
        };
        self.dispatch(Action::CameraRequested);

        let this = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match this.camera.start(&video, &this.config).await {
                Ok(StartOutcome::Streaming) => {
                    log::info!(
                        "camera streaming at {}x{}",
                        video.video_width(),
                        video.video_height()
                    );
                    this.dispatch(Action::CameraStarted);
                }
                Ok(StartOutcome::Cancelled) => log::debug!("camera start superseded"),
                Err(err) => {
                    log::error!("error accessing camera: {:?}", err);
                    this.dispatch(Action::CameraFailed(err.to_string()));
                }
            }
        });
    }

    pub fn stop_camera(&self) {
        self.dispatch(Action::CameraStopped);
    }

    /// Releases the stream. Driven by the camera phase leaving requesting/active.
    pub fn release_camera(&self) {
        self.camera
            .stop(self.video_ref.cast::<HtmlVideoElement>().as_ref());
    }

    /// Snapshots the preview and sends it for analysis. No-op unless capturing.
    pub fn capture(&self, capturing: bool) {
        if !capturing {
            return;
        }
        let (Some(video), Some(canvas)) = (
            self.video_ref.cast::<HtmlVideoElement>(),
            self.canvas_ref.cast::<HtmlCanvasElement>(),
        ) else {
            return;
        };

        let data_url = match capture_frame(&video, &canvas, self.config.jpeg_quality) {
            Ok(url) => url,
            Err(err) => {
                log::error!("capture failed: {:?}", err);
                self.dispatch(Action::ShowError(err.to_string()));
                return;
            }
        };
        self.dispatch(Action::Captured(data_url.clone()));

        let ticket = self.next_ticket();
        self.dispatch(Action::AnalysisStarted(ticket));
        let this = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = this.api.detect_base64(&data_url).await;
            if let Err(err) = &outcome {
                log::error!("error analyzing image: {:?}", err);
            }
            this.dispatch(Action::AnalysisFinished { ticket, outcome });
        });
    }

    pub fn set_drag_over(&self, over: bool) {
        self.dispatch(Action::DragOver(over));
    }

    /// Validates a dropped or picked file and shows its preview once read.
    pub fn accept_file(&self, file: File) {
        let media_type = file.type_();
        if !is_image_type(&media_type) {
            log::debug!("rejected {} ({})", file.name(), media_type);
            self.dispatch(Action::FileRejected);
            return;
        }
        *self.upload.borrow_mut() = Some(file.clone());

        let this = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match read_as_data_url(&file).await {
                Ok(data_url) => {
                    // A newer file may have been chosen while this one was read.
                    if this.upload.borrow().as_ref() == Some(&file) {
                        this.dispatch(Action::FileAccepted(preview_for(&file, data_url)));
                    }
                }
                Err(err) => {
                    log::error!("error reading {}: {:?}", file.name(), err);
                    this.dispatch(Action::ShowError(err.to_string()));
                }
            }
        });
    }

    pub fn analyze_upload(&self) {
        let Some(file) = self.upload.borrow().clone() else {
            self.dispatch(Action::ShowError(AppError::NotAnImage.to_string()));
            return;
        };

        let ticket = self.next_ticket();
        self.dispatch(Action::AnalysisStarted(ticket));
        let this = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let outcome = this.api.detect_upload(&file).await;
            if let Err(err) = &outcome {
                log::error!("error analyzing uploaded image: {:?}", err);
            }
            this.dispatch(Action::AnalysisFinished { ticket, outcome });
        });
    }

    pub fn show_model_info(&self) {
        let this = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match this.api.model_info().await {
                Ok(info) => this.dispatch(Action::ModalOpened(ModalContent::ModelInfo(info))),
                Err(err) => {
                    log::error!("model info failed: {:?}", err);
                    this.dispatch(Action::ShowError(MODEL_INFO_FAILED.to_string()));
                }
            }
        });
    }

    pub fn show_health(&self) {
        let this = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match this.api.health().await {
                Ok(status) => this.dispatch(Action::ModalOpened(ModalContent::health_now(status))),
                Err(err) => {
                    log::error!("health check failed: {:?}", err);
                    this.dispatch(Action::ShowError(HEALTH_CHECK_FAILED.to_string()));
                }
            }
        });
    }

    /// One-shot startup probe. Failures are only logged.
    pub fn check_model_status(&self) {
        let this = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match this.api.health().await {
                Ok(status) => match startup_warning(&status) {
                    Some(warning) => {
                        log::warn!("detection model is not loaded");
                        this.dispatch(Action::ModelUnavailable(warning.to_string()));
                    }
                    None => log::info!("detection model ready"),
                },
                Err(err) => log::warn!("could not check model status: {:?}", err),
            }
        });
    }

    pub fn close_modal(&self) {
        self.dispatch(Action::ModalClosed);
    }

    /// Runs the shortcut bound to `key`, if any. Returns whether the key's
    /// default action must be suppressed.
    pub fn handle_key(&self, key: &str, capturing: bool) -> bool {
        match shortcut_for(key, capturing) {
            Some(Shortcut::CloseModal) => {
                self.close_modal();
                false
            }
            Some(Shortcut::Capture) => {
                self.capture(capturing);
                true
            }
            None => false,
        }
    }
}
