mod api;
mod app;
mod camera;
mod camera_panel;
mod config;
mod controller;
mod emotion;
mod error;
mod info_modal;
mod keyboard;
mod results_view;
mod state;
mod upload;

use app::App;

fn main() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    wasm_logger::init(wasm_logger::Config::new(level));
    yew::Renderer::<App>::new().render();
}
