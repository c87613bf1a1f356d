/// One frame of byte frequency magnitudes read from the Web Audio analyser.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AudioFrame {
    pub frequency_data: Vec<u8>,
}

impl AudioFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the frame with the latest analyser readout.
    pub fn update_from_fft(&mut self, frequency_data: &[u8]) {
        self.frequency_data.clear();
        self.frequency_data.extend_from_slice(frequency_data);
    }

    pub fn is_empty(&self) -> bool {
        self.frequency_data.is_empty()
    }

    /// The leading `bars` bins, the ones the visualizer shows.
    pub fn visible_bins(&self, bars: usize) -> &[u8] {
        &self.frequency_data[..bars.min(self.frequency_data.len())]
    }
}


#[cfg(target_arch = "wasm32")]
pub use web::{AutoplayCell, WebAudio};

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::{spawn_local, JsFuture};

    use super::AudioFrame;
    use crate::media::{AudioOutput, MediaError};

    /// Result of an autoplay attempt, tagged with the deck generation it was
    /// made for.
    pub type AutoplayCell = Rc<Cell<Option<(u64, bool)>>>;

    /// Looping `<audio>` element, optionally routed through an analyser to
    /// the speakers. Playback works without the analyser; the bars then stay
    /// empty.
    pub struct WebAudio {
        element: web_sys::HtmlAudioElement,
        context: Option<web_sys::AudioContext>,
        frame: Rc<RefCell<AudioFrame>>,
    }

    impl WebAudio {
        /// Creates the audio element and tries to wire the analyser graph.
        ///
        /// # Errors
        /// When the browser cannot create an `<audio>` element. Analyser
        /// failures are logged and only disable the visualization.
        pub fn new(fft_size: u32) -> Result<Self, MediaError> {
            let element = web_sys::HtmlAudioElement::new()?;
            element.set_loop(true);

            let frame = Rc::new(RefCell::new(AudioFrame::new()));
            let context = match attach_analyser(&element, fft_size, frame.clone()) {
                Ok(context) => {
                    log::debug!("Audio analyser attached (fft size {fft_size})");
                    Some(context)
                }
                Err(e) => {
                    log::warn!("Visualizer unavailable: {e}");
                    None
                }
            };

            Ok(Self {
                element,
                context,
                frame,
            })
        }

        pub fn frame(&self) -> AudioFrame {
            self.frame.borrow().clone()
        }

        pub fn set_source(&self, url: &str) {
            self.element.set_src(url);
        }

        /// Attempts playback and reports the outcome into `result` once the
        /// browser resolves or rejects the play promise.
        pub fn autoplay(&self, generation: u64, result: AutoplayCell) {
            match self.start() {
                Ok(promise) => spawn_local(async move {
                    let started = JsFuture::from(promise).await.is_ok();
                    result.set(Some((generation, started)));
                }),
                Err(e) => {
                    log::debug!("Autoplay refused immediately: {e}");
                    result.set(Some((generation, false)));
                }
            }
        }

        fn start(&self) -> Result<js_sys::Promise, MediaError> {
            // A context created before any gesture starts out suspended.
            if let Some(context) = &self.context {
                let _ = context.resume()?;
            }
            Ok(self.element.play()?)
        }
    }

    impl AudioOutput for WebAudio {
        /// Starts playback without waiting for the browser's answer.
        fn play(&self) {
            if let Err(e) = self.start() {
                log::warn!("Play failed: {e}");
            }
        }

        fn pause(&self) {
            if let Err(e) = self.element.pause() {
                log::warn!("Pause failed: {e:?}");
            }
        }
    }

    fn attach_analyser(
        element: &web_sys::HtmlAudioElement,
        fft_size: u32,
        frame: Rc<RefCell<AudioFrame>>,
    ) -> Result<web_sys::AudioContext, MediaError> {
        let context = web_sys::AudioContext::new()?;
        let analyser = context.create_analyser()?;
        analyser.set_fft_size(fft_size);

        let source = context.create_media_element_source(element)?;
        source.connect_with_audio_node(&analyser)?;
        analyser.connect_with_audio_node(&context.destination())?;

        start_sampling(analyser, frame)?;
        Ok(context)
    }

    fn request_animation_frame(callback: &Closure<dyn FnMut()>) -> Result<i32, MediaError> {
        let window = web_sys::window().ok_or(MediaError::MissingDom("window"))?;
        Ok(window.request_animation_frame(callback.as_ref().unchecked_ref())?)
    }

    // Reads the analyser once per animation frame for as long as the page
    // lives. The closure keeps itself alive through the Rc cycle.
    fn start_sampling(
        analyser: web_sys::AnalyserNode,
        frame: Rc<RefCell<AudioFrame>>,
    ) -> Result<(), MediaError> {
        let mut bins = vec![0u8; analyser.frequency_bin_count() as usize];
        let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
        let next = tick.clone();

        *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            analyser.get_byte_frequency_data(&mut bins);
            frame.borrow_mut().update_from_fft(&bins);
            if let Some(callback) = next.borrow().as_ref() {
                if let Err(e) = request_animation_frame(callback) {
                    log::warn!("Audio sampling stopped: {e}");
                }
            }
        }) as Box<dyn FnMut()>));

        let first = match tick.borrow().as_ref() {
            Some(callback) => request_animation_frame(callback).map(|_| ()),
            None => Ok(()),
        };
        first
    }
}
