use eframe::egui;

use crate::audio::{AutoplayCell, WebAudio};
use crate::config::PageConfig;
use crate::hearts::FloatingHeart;
use crate::media::{self, AudioOutput, LocalFile, MusicDeck};
use crate::notes::NoteStore;
use crate::storage::{BrowserStore, KeyValueStore, MemoryStore};
use crate::ui::{self, PageAction, PageView, VideoSlot};
use crate::web::{revoke_object_url, FilePicker, VideoGallery};

pub struct AnniversaryApp {
    config: PageConfig,
    notes: NoteStore<Box<dyn KeyValueStore>>,
    deck: MusicDeck,
    hearts: Vec<FloatingHeart>,

    // Browser side; each piece is optional so a failing API only disables
    // its own feature.
    canvas: web_sys::HtmlCanvasElement,
    audio: Option<WebAudio>,
    autoplay: AutoplayCell,
    video_picker: Option<FilePicker>,
    music_picker: Option<FilePicker>,
    gallery: Option<VideoGallery>,
}

fn installed<T>(what: &str, result: Result<T, crate::media::MediaError>) -> Option<T> {
    result
        .map_err(|e| log::warn!("{what} unavailable: {e}"))
        .ok()
}

impl AnniversaryApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: PageConfig,
        canvas: web_sys::HtmlCanvasElement,
    ) -> Self {
        let backend: Box<dyn KeyValueStore> = match BrowserStore::open() {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("{e}; notes will only last for this visit");
                Box::new(MemoryStore::new())
            }
        };
        let notes = NoteStore::load(backend, config.storage_key.clone());
        let hearts = FloatingHeart::scatter(&mut rand::rng(), &config);

        Self {
            notes,
            deck: MusicDeck::new(),
            hearts,
            canvas,
            audio: None,
            autoplay: AutoplayCell::default(),
            video_picker: installed(
                "Video picker",
                FilePicker::install("video_file_input", "video/*", true, true),
            ),
            music_picker: installed(
                "Music picker",
                FilePicker::install("music_file_input", "audio/*", false, false),
            ),
            gallery: installed("Video gallery", VideoGallery::install()),
            config,
        }
    }

    fn process_picked_files(&mut self) {
        if let Some(picker) = &self.video_picker {
            let files = picker.take();
            if !files.is_empty() {
                self.notes.add_videos(files);
            }
        }
        let music = self
            .music_picker
            .as_ref()
            .and_then(|picker| picker.take().pop());
        if let Some(file) = music {
            self.load_music(file);
        }
    }

    fn load_music(&mut self, file: LocalFile) {
        if self.audio.is_none() {
            self.audio = installed("Audio element", WebAudio::new(self.config.fft_size));
        }
        let url = file.url.clone();
        let previous = self.deck.load(file);
        if let Some(audio) = &self.audio {
            audio.set_source(&url);
            audio.autoplay(self.deck.generation(), self.autoplay.clone());
        }
        if let Some(previous) = previous {
            revoke_object_url(&previous.url);
        }
    }

    fn poll_autoplay(&mut self) {
        if let Some((generation, started)) = self.autoplay.take() {
            self.deck.autoplay_settled(generation, started);
        }
    }

    fn apply(&mut self, action: PageAction) {
        match action {
            PageAction::EditDedication(text) => self.notes.set_dedication(&text),
            PageAction::PickVideos => {
                if let Some(picker) = &self.video_picker {
                    picker.open();
                }
            }
            PageAction::PickMusic => {
                if let Some(picker) = &self.music_picker {
                    picker.open();
                }
            }
            PageAction::ToggleMusic => {
                let output = self.audio.as_ref().map(|a| a as &dyn AudioOutput);
                media::toggle_playback(&mut self.deck, output);
            }
            PageAction::RemoveVideo(id) => {
                if let Some(removed) = self.notes.remove_video(&id) {
                    log::info!("Removed video: {}", removed.name);
                    revoke_object_url(&removed.url);
                }
            }
        }
    }

    fn sync_gallery(&mut self, ctx: &egui::Context, slots: &[VideoSlot]) {
        let Some(gallery) = &mut self.gallery else {
            return;
        };
        let bounds = self.canvas.get_bounding_client_rect();
        gallery.sync(
            self.notes.videos(),
            slots,
            (bounds.left(), bounds.top()),
            ctx.zoom_factor(),
        );
    }
}

impl eframe::App for AnniversaryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_picked_files();
        self.poll_autoplay();

        let bars = self
            .audio
            .as_ref()
            .map(|audio| {
                audio
                    .frame()
                    .visible_bins(self.config.visible_bars)
                    .to_vec()
            })
            .unwrap_or_default();
        let view = PageView {
            dedication: self.notes.dedication(),
            videos: self.notes.videos(),
            music: self.deck.current(),
            playing: self.deck.is_playing(),
            bars: &bars,
            hearts: &self.hearts,
            time: ctx.input(|i| i.time),
        };
        let out = ui::draw_page(ctx, &view, &self.config);

        for action in out.actions {
            self.apply(action);
        }
        self.sync_gallery(ctx, &out.video_slots);

        // Hearts and bars animate continuously
        ctx.request_repaint();
    }
}
