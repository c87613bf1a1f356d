//! Anniversary page: a saved dedication, background music with a bar
//! visualizer, local videos and floating hearts, rendered with egui into a
//! browser canvas.

// The wasm-bindgen start shim is an exported symbol.
#![cfg_attr(target_arch = "wasm32", allow(unsafe_code))]

pub mod audio;
pub mod config;
pub mod hearts;
pub mod media;
pub mod notes;
pub mod storage;
pub mod ui;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod web;

pub use config::PageConfig;
pub use media::{LocalFile, MediaError, MusicDeck, PlaybackState};
pub use notes::{NoteStore, Snapshot, VideoEntry};
pub use storage::{KeyValueStore, MemoryStore, StorageError};

#[cfg(target_arch = "wasm32")]
pub use app::AnniversaryApp;

// WASM entry point
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() -> Result<(), wasm_bindgen::JsValue> {
    use wasm_bindgen::JsCast;

    console_error_panic_hook::set_once();
    if let Err(e) = eframe::WebLogger::init(log::LevelFilter::Debug) {
        web_sys::console::error_1(&format!("Logger already set: {e}").into());
    }

    wasm_bindgen_futures::spawn_local(async {
        let config = PageConfig::default();
        let canvas = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(&config.canvas_id))
            .and_then(|el| el.dyn_into::<web_sys::HtmlCanvasElement>().ok());
        let Some(canvas) = canvas else {
            log::error!("No canvas element with id '{}'", config.canvas_id);
            return;
        };

        let result = eframe::WebRunner::new()
            .start(
                canvas.clone(),
                eframe::WebOptions::default(),
                Box::new(move |cc| Ok(Box::new(AnniversaryApp::new(cc, config, canvas)))),
            )
            .await;
        if let Err(e) = result {
            log::error!("Failed to start eframe: {e:?}");
        }
    });

    Ok(())
}
