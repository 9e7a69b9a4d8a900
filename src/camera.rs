use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement, MediaStream,
    MediaStreamConstraints, MediaStreamTrack,
};

use crate::config::AppConfig;
use crate::error::{describe_js, AppError};

// HTMLMediaElement.HAVE_METADATA
const HAVE_METADATA: u16 = 1;

/// Result of a `start` call that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    Streaming,
    /// `stop` ran while permission or metadata was pending; nothing is held.
    Cancelled,
}

#[derive(Default)]
struct SessionInner {
    stream: RefCell<Option<MediaStream>>,
    /// Bumped by every start and stop so a late grant can tell it was superseded.
    epoch: Cell<u64>,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.get_mut().take() {
            stop_tracks(&stream);
        }
    }
}

/// Exclusive owner of the camera stream while it is live.
#[derive(Clone, Default)]
pub struct CameraSession {
    inner: Rc<SessionInner>,
}

impl CameraSession {
    fn bump(&self) -> u64 {
        let next = self.inner.epoch.get().wrapping_add(1);
        self.inner.epoch.set(next);
        next
    }

    fn superseded(&self, epoch: u64) -> bool {
        self.inner.epoch.get() != epoch
    }

    /// Asks for the camera, binds it to `video` and starts playback.
    pub async fn start(
        &self,
        video: &HtmlVideoElement,
        config: &AppConfig,
    ) -> Result<StartOutcome, AppError> {
        let epoch = self.bump();

        let window = web_sys::window().ok_or_else(|| AppError::Camera("no window".into()))?;
        let devices = window.navigator().media_devices().map_err(camera_error)?;
        let constraints: MediaStreamConstraints =
            serde_wasm_bindgen::to_value(&config.media_constraints())
                .map_err(|e| AppError::Camera(e.to_string()))?
                .unchecked_into();
        let promise = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(camera_error)?;
        let stream: MediaStream = JsFuture::from(promise)
            .await
            .map_err(camera_error)?
            .dyn_into()
            .map_err(camera_error)?;

        if self.superseded(epoch) {
            stop_tracks(&stream);
            return Ok(StartOutcome::Cancelled);
        }

        video.set_src_object(Some(&stream));
        if let Some(previous) = self.inner.stream.replace(Some(stream)) {
            stop_tracks(&previous);
        }

        wait_for_metadata(video).await;
        if self.superseded(epoch) {
            return Ok(StartOutcome::Cancelled);
        }

        let playing = video.play().map_err(camera_error)?;
        if let Err(e) = JsFuture::from(playing).await {
            // Autoplay policy can refuse; the stream is still bound and capturable.
            log::warn!("video.play() rejected: {}", describe_js(&e));
        }
        Ok(StartOutcome::Streaming)
    }

    /// Stops every track and detaches the preview. Safe to call in any state.
    pub fn stop(&self, video: Option<&HtmlVideoElement>) {
        self.bump();
        if let Some(stream) = self.inner.stream.borrow_mut().take() {
            stop_tracks(&stream);
            log::info!("camera released");
        }
        if let Some(video) = video {
            video.set_src_object(None);
        }
    }
}

/// Draws the current frame at native resolution and encodes it as a JPEG data URL.
pub fn capture_frame(
    video: &HtmlVideoElement,
    canvas: &HtmlCanvasElement,
    quality: f64,
) -> Result<String, AppError> {
    canvas.set_width(video.video_width());
    canvas.set_height(video.video_height());

    let context: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| AppError::Browser("2d context unavailable".into()))?
        .dyn_into()
        .map_err(JsValue::from)?;
    context.draw_image_with_html_video_element(video, 0.0, 0.0)?;

    Ok(canvas.to_data_url_with_type_and_encoder_options(
        "image/jpeg",
        &JsValue::from_f64(quality),
    )?)
}

fn stop_tracks(stream: &MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
            track.stop();
        }
    }
}

async fn wait_for_metadata(video: &HtmlVideoElement) {
    if video.ready_state() >= HAVE_METADATA {
        return;
    }
    let loaded = js_sys::Promise::new(&mut |resolve, _reject| {
        video.set_onloadedmetadata(Some(&resolve));
        // Fired when `stop` detaches the stream before metadata arrives.
        video.set_onemptied(Some(&resolve));
    });
    let _ = JsFuture::from(loaded).await;
    video.set_onloadedmetadata(None);
    video.set_onemptied(None);
}

fn camera_error(value: JsValue) -> AppError {
    AppError::Camera(describe_js(&value))
}
