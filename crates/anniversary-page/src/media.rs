//! Music playback state, independent of the browser's audio element.

use thiserror::Error;

/// Failures of the browser media plumbing. None of them reach the user; the
/// page logs them and carries on without the affected capability.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("browser object missing: {0}")]
    MissingDom(&'static str),
    #[error("web API call failed: {0}")]
    Js(String),
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for MediaError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        Self::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

/// A user-selected local file and the object URL that makes it playable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub url: String,
}

pub type MusicFile = LocalFile;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Paused,
    Playing,
}

/// What the audio element should be told to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackCommand {
    Play,
    Pause,
}

/// The element that actually makes sound.
pub trait AudioOutput {
    fn play(&self);
    fn pause(&self);
}

/// Play/pause button handler. Without an audio element nothing can play, so
/// the deck is left untouched.
pub fn toggle_playback(deck: &mut MusicDeck, output: Option<&dyn AudioOutput>) {
    let Some(output) = output else {
        return;
    };
    match deck.toggle() {
        Some(PlaybackCommand::Play) => output.play(),
        Some(PlaybackCommand::Pause) => output.pause(),
        None => {}
    }
}

/// The single background track and its play/pause flag.
///
/// The flag is the page's own view; pausing from outside (OS media keys) is
/// not observed.
#[derive(Debug, Default)]
pub struct MusicDeck {
    current: Option<MusicFile>,
    state: PlaybackState,
    generation: u64,
}

impl MusicDeck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&MusicFile> {
        self.current.as_ref()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Ticket of the most recent [`MusicDeck::load`].
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replaces the track. The deck goes back to `Paused` until the autoplay
    /// attempt for the new file settles. Returns the discarded file.
    pub fn load(&mut self, file: MusicFile) -> Option<MusicFile> {
        log::info!("Music loaded: {}", file.name);
        self.generation += 1;
        self.state = PlaybackState::Paused;
        self.current.replace(file)
    }

    /// Outcome of the autoplay attempt made for load `generation`. A rejection
    /// (no prior user gesture) leaves the deck paused. Results for a track
    /// that has since been replaced are ignored.
    pub fn autoplay_settled(&mut self, generation: u64, started: bool) {
        if generation != self.generation || self.current.is_none() {
            return;
        }
        if started {
            self.state = PlaybackState::Playing;
        } else {
            log::debug!("Autoplay was blocked, waiting for the play button");
        }
    }

    /// Flips between playing and paused. `None` when no music is loaded.
    pub fn toggle(&mut self) -> Option<PlaybackCommand> {
        self.current.as_ref()?;
        let (next, command) = match self.state {
            PlaybackState::Paused => (PlaybackState::Playing, PlaybackCommand::Play),
            PlaybackState::Playing => (PlaybackState::Paused, PlaybackCommand::Pause),
        };
        self.state = next;
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingOutput {
        calls: RefCell<Vec<PlaybackCommand>>,
    }

    impl AudioOutput for RecordingOutput {
        fn play(&self) {
            self.calls.borrow_mut().push(PlaybackCommand::Play);
        }

        fn pause(&self) {
            self.calls.borrow_mut().push(PlaybackCommand::Pause);
        }
    }

    fn track(name: &str) -> MusicFile {
        LocalFile {
            name: name.to_string(),
            url: format!("blob:{name}"),
        }
    }

    #[test]
    fn second_intake_replaces_the_first() {
        let mut deck = MusicDeck::new();
        assert!(deck.load(track("uno.mp3")).is_none());
        let discarded = deck.load(track("dos.mp3"));
        assert_eq!(discarded, Some(track("uno.mp3")));
        assert_eq!(deck.current(), Some(&track("dos.mp3")));
    }

    #[test]
    fn toggle_round_trips_between_two_states() {
        let mut deck = MusicDeck::new();
        deck.load(track("song.mp3"));
        assert_eq!(deck.state(), PlaybackState::Paused);
        assert_eq!(deck.toggle(), Some(PlaybackCommand::Play));
        assert_eq!(deck.state(), PlaybackState::Playing);
        assert_eq!(deck.toggle(), Some(PlaybackCommand::Pause));
        assert_eq!(deck.state(), PlaybackState::Paused);
    }

    #[test]
    fn toggle_without_music_does_nothing() {
        let mut deck = MusicDeck::new();
        assert_eq!(deck.toggle(), None);
        assert!(!deck.is_playing());
    }

    #[test]
    fn rejected_autoplay_stays_paused() {
        let mut deck = MusicDeck::new();
        deck.load(track("song.mp3"));
        deck.autoplay_settled(deck.generation(), false);
        assert_eq!(deck.state(), PlaybackState::Paused);
    }

    #[test]
    fn autoplay_for_a_replaced_track_is_ignored() {
        let mut deck = MusicDeck::new();
        deck.load(track("old.mp3"));
        let stale = deck.generation();
        deck.load(track("new.mp3"));
        deck.autoplay_settled(stale, true);
        assert!(!deck.is_playing());
        deck.autoplay_settled(deck.generation(), true);
        assert!(deck.is_playing());
    }

    #[test]
    fn toggle_playback_drives_the_output() {
        let mut deck = MusicDeck::new();
        deck.load(track("song.mp3"));
        let output = RecordingOutput::default();
        toggle_playback(&mut deck, Some(&output));
        toggle_playback(&mut deck, Some(&output));
        assert_eq!(
            *output.calls.borrow(),
            [PlaybackCommand::Play, PlaybackCommand::Pause]
        );
        assert_eq!(deck.state(), PlaybackState::Paused);
    }

    #[test]
    fn toggle_playback_without_an_element_keeps_the_deck_paused() {
        let mut deck = MusicDeck::new();
        deck.load(track("song.mp3"));
        toggle_playback(&mut deck, None);
        assert_eq!(deck.state(), PlaybackState::Paused);
        assert_eq!(deck.current(), Some(&track("song.mp3")));
    }

    #[test]
    fn toggle_playback_without_music_sends_nothing() {
        let mut deck = MusicDeck::new();
        let output = RecordingOutput::default();
        toggle_playback(&mut deck, Some(&output));
        assert!(output.calls.borrow().is_empty());
    }
}
