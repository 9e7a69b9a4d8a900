use std::rc::Rc;
use yew::prelude::*;

use crate::emotion::{rank, EmotionResult, RankedEmotions};
use crate::error::{AppError, NOT_AN_IMAGE};
use crate::info_modal::ModalContent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Camera,
    Upload,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Camera, Tab::Upload];

    /// Value of the button's `data-tab` attribute.
    pub fn key(self) -> &'static str {
        match self {
            Tab::Camera => "camera",
            Tab::Upload => "upload",
        }
    }

    pub fn panel_id(self) -> String {
        format!("{}-tab", self.key())
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Camera => "Camera",
            Tab::Upload => "Upload Image",
        }
    }
}

/// Camera lifecycle. A failed request reports its error and lands back in `Idle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraPhase {
    Idle,
    Requesting,
    Active,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UploadPreview {
    pub name: String,
    pub data_url: String,
}

pub type AnalysisOutcome = Result<Option<Vec<EmotionResult>>, AppError>;

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    SwitchTab(Tab),
    CameraRequested,
    CameraStarted,
    CameraFailed(String),
    CameraStopped,
    Captured(String),
    AnalysisStarted(u64),
    AnalysisFinished { ticket: u64, outcome: AnalysisOutcome },
    FileAccepted(UploadPreview),
    FileRejected,
    DragOver(bool),
    ShowError(String),
    ModalOpened(ModalContent),
    ModalClosed,
    ModelUnavailable(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppState {
    pub tab: Tab,
    pub camera: CameraPhase,
    pub loading: bool,
    pub error: Option<String>,
    pub results: Option<RankedEmotions>,
    pub captured_preview: Option<String>,
    pub upload_preview: Option<UploadPreview>,
    pub drag_over: bool,
    pub modal: Option<ModalContent>,
    /// Startup warning; outlives every other banner.
    pub model_warning: Option<String>,
    /// Ticket of the only analysis whose answer will still be shown.
    pub pending_analysis: Option<u64>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            tab: Tab::Camera,
            camera: CameraPhase::Idle,
            loading: false,
            error: None,
            results: None,
            captured_preview: None,
            upload_preview: None,
            drag_over: false,
            modal: None,
            model_warning: None,
            pending_analysis: None,
        }
    }
}

impl AppState {
    pub fn is_capturing(&self) -> bool {
        self.camera == CameraPhase::Active
    }

    pub fn start_enabled(&self) -> bool {
        self.camera == CameraPhase::Idle
    }

    pub fn capture_enabled(&self) -> bool {
        self.is_capturing()
    }

    pub fn stop_enabled(&self) -> bool {
        self.is_capturing()
    }

    /// Whether a stream is held or being acquired.
    pub fn wants_stream(&self) -> bool {
        matches!(self.camera, CameraPhase::Requesting | CameraPhase::Active)
    }

    fn show_loading(&mut self) {
        self.loading = true;
        self.error = None;
        self.results = None;
    }

    fn show_error(&mut self, message: String) {
        self.error = Some(message);
        self.loading = false;
        self.results = None;
    }

    fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::SwitchTab(tab) => {
                self.tab = tab;
                if tab != Tab::Camera && self.wants_stream() {
                    if self.camera == CameraPhase::Requesting {
                        self.loading = false;
                    }
                    self.camera = CameraPhase::Idle;
                }
                // An answer arriving after the switch would repaint cleared results.
                if self.pending_analysis.take().is_some() {
                    self.loading = false;
                }
                self.results = None;
                self.captured_preview = None;
                self.error = None;
            }
            Action::CameraRequested => {
                if self.camera != CameraPhase::Idle {
                    return false;
                }
                self.camera = CameraPhase::Requesting;
                self.show_loading();
            }
            Action::CameraStarted => {
                if self.camera != CameraPhase::Requesting {
                    return false;
                }
                self.camera = CameraPhase::Active;
                self.loading = false;
                self.error = None;
            }
            Action::CameraFailed(message) => {
                if self.camera != CameraPhase::Requesting {
                    return false;
                }
                self.camera = CameraPhase::Idle;
                self.show_error(message);
            }
            Action::CameraStopped => {
                if self.camera == CameraPhase::Requesting {
                    self.loading = false;
                }
                self.camera = CameraPhase::Idle;
            }
            Action::Captured(data_url) => {
                if !self.is_capturing() {
                    return false;
                }
                self.captured_preview = Some(data_url);
            }
            Action::AnalysisStarted(ticket) => {
                self.pending_analysis = Some(ticket);
                self.show_loading();
            }
            Action::AnalysisFinished { ticket, outcome } => {
                if self.pending_analysis != Some(ticket) {
                    return false;
                }
                self.pending_analysis = None;
                self.loading = false;
                match outcome.and_then(|list| rank(list).ok_or(AppError::NoEmotions)) {
                    Ok(ranked) => {
                        self.results = Some(ranked);
                        self.error = None;
                    }
                    Err(err) => self.show_error(err.to_string()),
                }
            }
            Action::FileAccepted(preview) => {
                self.upload_preview = Some(preview);
                self.error = None;
            }
            Action::FileRejected => self.show_error(NOT_AN_IMAGE.to_string()),
            Action::DragOver(over) => {
                if self.drag_over == over {
                    return false;
                }
                self.drag_over = over;
            }
            Action::ShowError(message) => self.show_error(message),
            Action::ModalOpened(content) => self.modal = Some(content),
            Action::ModalClosed => {
                if self.modal.is_none() {
                    return false;
                }
                self.modal = None;
            }
            Action::ModelUnavailable(message) => self.model_warning = Some(message),
        }
        true
    }
}

impl Reducible for AppState {
    type Action = Action;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        if next.apply(action) {
            Rc::new(next)
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HealthStatus;
    use crate::error::{CAMERA_UNAVAILABLE, MODEL_NOT_LOADED, NO_EMOTIONS};

    fn run(actions: impl IntoIterator<Item = Action>) -> AppState {
        let mut state = Rc::new(AppState::default());
        for action in actions {
            state = state.reduce(action);
        }
        (*state).clone()
    }

    fn active_camera() -> Vec<Action> {
        vec![Action::CameraRequested, Action::CameraStarted]
    }

    fn happy_sad() -> Vec<EmotionResult> {
        vec![
            EmotionResult::new("happy", 0.82, "82%"),
            EmotionResult::new("sad", 0.10, "10%"),
        ]
    }

    #[test]
    fn camera_start_toggles_controls() {
        let requesting = run([Action::CameraRequested]);
        assert_eq!(requesting.camera, CameraPhase::Requesting);
        assert!(requesting.loading);
        assert!(!requesting.start_enabled());
        assert!(!requesting.capture_enabled());

        let active = run(active_camera());
        assert_eq!(active.camera, CameraPhase::Active);
        assert!(!active.loading);
        assert!(!active.start_enabled());
        assert!(active.capture_enabled());
        assert!(active.stop_enabled());
    }

    #[test]
    fn second_start_is_ignored_while_active() {
        let mut actions = active_camera();
        actions.push(Action::CameraRequested);
        let state = run(actions);
        assert_eq!(state.camera, CameraPhase::Active);
        assert!(!state.loading);
    }

    #[test]
    fn permission_denied_returns_to_idle_with_error() {
        let state = run([
            Action::CameraRequested,
            Action::CameraFailed(CAMERA_UNAVAILABLE.to_string()),
        ]);
        assert_eq!(state.camera, CameraPhase::Idle);
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some(CAMERA_UNAVAILABLE));
        assert!(state.start_enabled());
    }

    #[test]
    fn stop_always_reenables_start() {
        for prefix in [vec![], vec![Action::CameraRequested], active_camera()] {
            let mut actions = prefix;
            actions.push(Action::CameraStopped);
            let state = run(actions);
            assert_eq!(state.camera, CameraPhase::Idle);
            assert!(state.start_enabled());
            assert!(!state.capture_enabled());
            assert!(!state.stop_enabled());
            assert!(!state.loading);
        }
    }

    #[test]
    fn capture_outside_active_is_a_no_op() {
        let state = run([Action::Captured("data:image/jpeg;base64,AA".into())]);
        assert_eq!(state.captured_preview, None);

        let mut actions = active_camera();
        actions.push(Action::Captured("data:image/jpeg;base64,AA".into()));
        assert!(run(actions).captured_preview.is_some());
    }

    #[test]
    fn leaving_camera_tab_releases_camera() {
        let mut actions = active_camera();
        actions.push(Action::SwitchTab(Tab::Upload));
        let state = run(actions);
        assert_eq!(state.tab, Tab::Upload);
        assert_eq!(state.camera, CameraPhase::Idle);
        assert!(!state.wants_stream());
    }

    #[test]
    fn leaving_during_request_cancels_it() {
        let state = run([
            Action::CameraRequested,
            Action::SwitchTab(Tab::Upload),
            Action::CameraStarted,
        ]);
        assert_eq!(state.camera, CameraPhase::Idle);
        assert!(!state.loading);
    }

    #[test]
    fn staying_on_camera_tab_keeps_stream() {
        let mut actions = active_camera();
        actions.push(Action::SwitchTab(Tab::Camera));
        assert_eq!(run(actions).camera, CameraPhase::Active);
    }

    #[test]
    fn switching_tabs_clears_results_and_errors() {
        let state = run([
            Action::AnalysisStarted(1),
            Action::AnalysisFinished {
                ticket: 1,
                outcome: Ok(Some(happy_sad())),
            },
            Action::ShowError("boom".into()),
            Action::SwitchTab(Tab::Upload),
        ]);
        assert_eq!(state.results, None);
        assert_eq!(state.error, None);
        assert_eq!(state.captured_preview, None);
    }

    #[test]
    fn camera_analysis_scenario() {
        let mut actions = active_camera();
        actions.extend([
            Action::Captured("data:image/jpeg;base64,AA".into()),
            Action::AnalysisStarted(1),
        ]);
        let loading = run(actions.clone());
        assert!(loading.loading);
        assert_eq!(loading.results, None);

        actions.push(Action::AnalysisFinished {
            ticket: 1,
            outcome: Ok(Some(happy_sad())),
        });
        let state = run(actions);
        assert!(!state.loading);
        assert_eq!(state.error, None);
        let ranked = state.results.expect("results");
        assert_eq!(ranked.primary().display_name(), "Happy");
        assert_eq!(ranked.primary().fill_width(), "82%");
        let labels: Vec<_> = ranked.bars().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["happy", "sad"]);
        assert!(state.captured_preview.is_some());
    }

    #[test]
    fn upload_analysis_remote_error_scenario() {
        let state = run([
            Action::SwitchTab(Tab::Upload),
            Action::AnalysisStarted(1),
            Action::AnalysisFinished {
                ticket: 1,
                outcome: Err(AppError::Remote("no face detected".into())),
            },
        ]);
        assert_eq!(state.error.as_deref(), Some("no face detected"));
        assert!(!state.loading);
        assert_eq!(state.results, None);
    }

    #[test]
    fn empty_results_show_no_emotions_error() {
        for outcome in [Ok(None), Ok(Some(Vec::new()))] {
            let state = run([
                Action::AnalysisStarted(7),
                Action::AnalysisFinished { ticket: 7, outcome },
            ]);
            assert_eq!(state.error.as_deref(), Some(NO_EMOTIONS));
            assert_eq!(state.results, None);
        }
    }

    #[test]
    fn stale_answer_is_discarded() {
        let state = run([
            Action::AnalysisStarted(1),
            Action::AnalysisStarted(2),
            Action::AnalysisFinished {
                ticket: 2,
                outcome: Ok(Some(happy_sad())),
            },
            Action::AnalysisFinished {
                ticket: 1,
                outcome: Err(AppError::Remote("late".into())),
            },
        ]);
        assert_eq!(state.error, None);
        assert_eq!(state.results.unwrap().primary().label, "happy");
    }

    #[test]
    fn stale_answer_does_not_stop_loading() {
        let state = run([
            Action::AnalysisStarted(1),
            Action::AnalysisStarted(2),
            Action::AnalysisFinished {
                ticket: 1,
                outcome: Ok(Some(happy_sad())),
            },
        ]);
        assert!(state.loading);
        assert_eq!(state.results, None);
    }

    #[test]
    fn answer_after_tab_switch_is_dropped() {
        let state = run([
            Action::AnalysisStarted(1),
            Action::SwitchTab(Tab::Upload),
            Action::AnalysisFinished {
                ticket: 1,
                outcome: Ok(Some(happy_sad())),
            },
        ]);
        assert!(!state.loading);
        assert_eq!(state.results, None);
    }

    #[test]
    fn rejected_file_leaves_preview_alone() {
        let preview = UploadPreview {
            name: "face.png".into(),
            data_url: "data:image/png;base64,AA".into(),
        };
        let state = run([
            Action::SwitchTab(Tab::Upload),
            Action::FileAccepted(preview.clone()),
            Action::FileRejected,
        ]);
        assert_eq!(state.upload_preview, Some(preview));
        assert_eq!(state.error.as_deref(), Some(NOT_AN_IMAGE));

        let fresh = run([Action::FileRejected]);
        assert_eq!(fresh.upload_preview, None);
        assert_eq!(fresh.error.as_deref(), Some(NOT_AN_IMAGE));
    }

    #[test]
    fn second_file_replaces_first() {
        let state = run([
            Action::FileAccepted(UploadPreview {
                name: "a.png".into(),
                data_url: "data:a".into(),
            }),
            Action::FileAccepted(UploadPreview {
                name: "b.jpg".into(),
                data_url: "data:b".into(),
            }),
        ]);
        assert_eq!(state.upload_preview.unwrap().name, "b.jpg");
    }

    #[test]
    fn modal_open_close() {
        let content = ModalContent::Health {
            status: HealthStatus::default(),
            checked_at: "now".into(),
        };
        let open = run([Action::ModalOpened(content.clone())]);
        assert_eq!(open.modal, Some(content.clone()));

        let closed = run([Action::ModalOpened(content), Action::ModalClosed]);
        assert_eq!(closed.modal, None);
    }

    #[test]
    fn model_warning_survives_other_banners() {
        let state = run([
            Action::ModelUnavailable(MODEL_NOT_LOADED.into()),
            Action::ShowError("x".into()),
            Action::SwitchTab(Tab::Upload),
            Action::AnalysisStarted(1),
        ]);
        assert_eq!(state.model_warning.as_deref(), Some(MODEL_NOT_LOADED));
    }

    #[test]
    fn redundant_actions_keep_the_same_state() {
        let state = Rc::new(AppState::default());
        let same = state.clone().reduce(Action::ModalClosed);
        assert!(Rc::ptr_eq(&state, &same));
        let same = state.clone().reduce(Action::DragOver(false));
        assert!(Rc::ptr_eq(&state, &same));
    }
}
