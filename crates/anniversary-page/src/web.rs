//! DOM plumbing: hidden file inputs, object URLs and the `<video>` overlay
//! that sits on top of the canvas.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::media::{LocalFile, MediaError};
use crate::notes::VideoEntry;
use crate::ui::VideoSlot;

fn document() -> Result<web_sys::Document, MediaError> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or(MediaError::MissingDom("document"))
}

fn body() -> Result<web_sys::HtmlElement, MediaError> {
    document()?.body().ok_or(MediaError::MissingDom("body"))
}

/// Makes a `blob:` URL for a user-selected file.
///
/// # Errors
/// When the browser refuses to create the URL.
pub fn object_url(file: &web_sys::File) -> Result<String, MediaError> {
    Ok(web_sys::Url::create_object_url_with_blob(file)?)
}

pub fn revoke_object_url(url: &str) {
    if let Err(e) = web_sys::Url::revoke_object_url(url) {
        log::debug!("Could not revoke {url}: {e:?}");
    }
}

/// Hidden `<input type="file">` that queues the user's picks until the next
/// frame drains them.
pub struct FilePicker {
    input: web_sys::HtmlInputElement,
    picked: Rc<RefCell<Vec<LocalFile>>>,
    _on_change: Closure<dyn FnMut(web_sys::Event)>,
}

impl FilePicker {
    /// Creates the input (or reuses one with the same id) and hooks its
    /// `change` event. With `clear_after`, the input's value is reset after
    /// every pick so the same file can be chosen again.
    ///
    /// # Errors
    /// When the document is unavailable or the element cannot be created.
    pub fn install(
        id: &str,
        accept: &str,
        multiple: bool,
        clear_after: bool,
    ) -> Result<Self, MediaError> {
        let document = document()?;
        let input = match document.get_element_by_id(id) {
            Some(el) => el
                .dyn_into::<web_sys::HtmlInputElement>()
                .map_err(|_| MediaError::MissingDom("file input"))?,
            None => {
                let input = document
                    .create_element("input")?
                    .dyn_into::<web_sys::HtmlInputElement>()
                    .map_err(|_| MediaError::MissingDom("file input"))?;
                input.set_id(id);
                body()?.append_child(&input)?;
                input
            }
        };
        input.set_type("file");
        input.set_accept(accept);
        input.set_multiple(multiple);
        input.style().set_property("display", "none")?;

        let picked = Rc::new(RefCell::new(Vec::new()));
        let queue = picked.clone();
        let on_change = Closure::wrap(Box::new(move |event: web_sys::Event| {
            let Some(input) = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
            else {
                return;
            };
            if let Some(files) = input.files() {
                for i in 0..files.length() {
                    let Some(file) = files.get(i) else {
                        continue;
                    };
                    match object_url(&file) {
                        Ok(url) => queue.borrow_mut().push(LocalFile {
                            name: file.name(),
                            url,
                        }),
                        Err(e) => log::warn!("Skipping {}: {e}", file.name()),
                    }
                }
            }
            if clear_after {
                input.set_value("");
            }
        }) as Box<dyn FnMut(web_sys::Event)>);
        input.set_onchange(Some(on_change.as_ref().unchecked_ref()));

        Ok(Self {
            input,
            picked,
            _on_change: on_change,
        })
    }

    /// Opens the browser's file chooser.
    pub fn open(&self) {
        self.input.click();
    }

    /// Files picked since the last call, in selection order.
    pub fn take(&self) -> Vec<LocalFile> {
        std::mem::take(&mut *self.picked.borrow_mut())
    }
}

/// `<video controls>` elements kept in step with the video list and laid
/// over the card slots the page reserved for them.
pub struct VideoGallery {
    container: web_sys::HtmlElement,
    players: HashMap<String, web_sys::HtmlVideoElement>,
}

impl VideoGallery {
    /// # Errors
    /// When the overlay container cannot be added to the document.
    pub fn install() -> Result<Self, MediaError> {
        let container = document()?
            .create_element("div")?
            .dyn_into::<web_sys::HtmlElement>()
            .map_err(|_| MediaError::MissingDom("div"))?;
        container.set_id("video_gallery");
        container.set_attribute(
            "style",
            "position:fixed; left:0; top:0; width:0; height:0; overflow:visible; z-index:10;",
        )?;
        body()?.append_child(&container)?;
        Ok(Self {
            container,
            players: HashMap::new(),
        })
    }

    /// Adds players for new entries, drops players for removed ones and moves
    /// each player over its slot. `origin` is the canvas' top-left corner in
    /// CSS pixels and `scale` converts egui points to CSS pixels.
    pub fn sync(
        &mut self,
        videos: &[VideoEntry],
        slots: &[VideoSlot],
        origin: (f64, f64),
        scale: f32,
    ) {
        self.players.retain(|id, player| {
            let keep = videos.iter().any(|v| &v.id == id);
            if !keep {
                player.remove();
            }
            keep
        });

        for video in videos {
            if self.players.contains_key(&video.id) {
                continue;
            }
            match self.create_player(video) {
                Ok(player) => {
                    self.players.insert(video.id.clone(), player);
                }
                Err(e) => log::warn!("No player for {}: {e}", video.name),
            }
        }

        for (id, player) in &self.players {
            let style = player.style();
            let slot = slots.iter().find(|s| &s.id == id && s.visible);
            let result = match slot {
                Some(slot) => {
                    let px = |v: f32| format!("{:.1}px", f64::from(v * scale));
                    style
                        .set_property("display", "block")
                        .and_then(|()| {
                            style.set_property(
                                "left",
                                &format!("{:.1}px", origin.0 + f64::from(slot.rect.left() * scale)),
                            )
                        })
                        .and_then(|()| {
                            style.set_property(
                                "top",
                                &format!("{:.1}px", origin.1 + f64::from(slot.rect.top() * scale)),
                            )
                        })
                        .and_then(|()| style.set_property("width", &px(slot.rect.width())))
                        .and_then(|()| style.set_property("height", &px(slot.rect.height())))
                }
                None => style.set_property("display", "none"),
            };
            if let Err(e) = result {
                log::debug!("Could not place video {id}: {e:?}");
            }
        }
    }

    fn create_player(&self, video: &VideoEntry) -> Result<web_sys::HtmlVideoElement, MediaError> {
        let player = document()?
            .create_element("video")?
            .dyn_into::<web_sys::HtmlVideoElement>()
            .map_err(|_| MediaError::MissingDom("video"))?;
        player.set_src(&video.url);
        player.set_controls(true);
        player.set_attribute(
            "style",
            concat!(
                "position:absolute; display:none; border-radius:8px; ",
                "background:#000; object-fit:contain;",
            ),
        )?;
        self.container.append_child(&player)?;
        Ok(player)
    }
}
