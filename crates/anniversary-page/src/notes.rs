//! The dedication and the video list, persisted as one JSON snapshot.

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

use crate::media::LocalFile;
use crate::storage::{KeyValueStore, StorageError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEntry {
    pub id: String,
    /// Object URL. Only playable during the session that created it.
    pub url: String,
    pub name: String,
}

/// Durable form of the page content.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub dedication: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub videos: Vec<VideoEntry>,
}

// A field written as `null` behaves like a missing one.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 11;

/// Short base-36 token. Not unique by construction; callers that care check
/// against the ids they already hold.
pub fn random_token<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ID_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())]))
        .collect()
}

/// Session state holder for the dedication and videos.
///
/// Loading never fails: a missing or unreadable snapshot yields the defaults.
/// Every mutation that changes something writes the full snapshot back; write
/// failures are logged and otherwise ignored, the in-memory state stays
/// authoritative for the rest of the session.
pub struct NoteStore<S: KeyValueStore> {
    backend: S,
    key: String,
    snapshot: Snapshot,
}

impl<S: KeyValueStore> NoteStore<S> {
    pub fn load(backend: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let snapshot = match backend.get(&key) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("Discarding unreadable snapshot under {key}: {e}");
                Snapshot::default()
            }),
            Ok(None) => Snapshot::default(),
            Err(e) => {
                log::warn!("Could not read saved notes: {e}");
                Snapshot::default()
            }
        };
        log::debug!(
            "Loaded notes: {} chars, {} videos",
            snapshot.dedication.chars().count(),
            snapshot.videos.len()
        );
        Self {
            backend,
            key,
            snapshot,
        }
    }

    /// Writes the current snapshot.
    ///
    /// # Errors
    /// Returns the backend's [`StorageError`]. The page itself never acts on
    /// it; see [`NoteStore::persist`].
    pub fn save(&mut self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.snapshot)?;
        self.backend.set(&self.key, &json)
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            log::warn!("Notes not saved: {e}");
        }
    }

    pub fn dedication(&self) -> &str {
        &self.snapshot.dedication
    }

    pub fn videos(&self) -> &[VideoEntry] {
        &self.snapshot.videos
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn set_dedication(&mut self, text: &str) {
        if self.snapshot.dedication == text {
            return;
        }
        text.clone_into(&mut self.snapshot.dedication);
        self.persist();
    }

    /// Appends one entry per file, in the given order, and returns how many
    /// were added.
    pub fn add_videos<I>(&mut self, files: I) -> usize
    where
        I: IntoIterator<Item = LocalFile>,
    {
        let mut rng = rand::rng();
        let before = self.snapshot.videos.len();
        for file in files {
            let mut id = random_token(&mut rng);
            while self.snapshot.videos.iter().any(|v| v.id == id) {
                id = random_token(&mut rng);
            }
            log::info!("Added video: {}", file.name);
            self.snapshot.videos.push(VideoEntry {
                id,
                url: file.url,
                name: file.name,
            });
        }
        let added = self.snapshot.videos.len() - before;
        if added > 0 {
            self.persist();
        }
        added
    }

    /// Removes the entry with `id`, keeping the order of the others. Returns
    /// the removed entry so its object URL can be released.
    pub fn remove_video(&mut self, id: &str) -> Option<VideoEntry> {
        let index = self.snapshot.videos.iter().position(|v| v.id == id)?;
        let removed = self.snapshot.videos.remove(index);
        self.persist();
        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const KEY: &str = "aniv_page_data_v4";

    fn file(name: &str) -> LocalFile {
        LocalFile {
            name: name.to_string(),
            url: format!("blob:{name}"),
        }
    }

    #[test]
    fn empty_backend_loads_defaults() {
        let store = NoteStore::load(MemoryStore::new(), KEY);
        assert_eq!(store.dedication(), "");
        assert!(store.videos().is_empty());
    }

    #[test]
    fn stored_snapshot_is_restored() {
        let mut backend = MemoryStore::new();
        backend
            .set(
                KEY,
                r#"{"dedication":"X","videos":[{"id":"a","url":"u","name":"n"}]}"#,
            )
            .unwrap();
        let store = NoteStore::load(backend, KEY);
        assert_eq!(store.dedication(), "X");
        assert_eq!(
            store.videos(),
            &[VideoEntry {
                id: "a".into(),
                url: "u".into(),
                name: "n".into(),
            }]
        );
    }

    #[test]
    fn invalid_payload_falls_back_to_defaults() {
        for raw in ["{not json", "null", "42", r#"{"videos":"nope"}"#] {
            let mut backend = MemoryStore::new();
            backend.set(KEY, raw).unwrap();
            let store = NoteStore::load(backend, KEY);
            assert_eq!(store.snapshot(), &Snapshot::default(), "payload {raw}");
        }
    }

    #[test]
    fn missing_or_null_fields_use_their_own_default() {
        let mut backend = MemoryStore::new();
        backend
            .set(KEY, r#"{"dedication":null,"videos":[{"id":"a","url":"u","name":"n"}]}"#)
            .unwrap();
        let store = NoteStore::load(backend, KEY);
        assert_eq!(store.dedication(), "");
        assert_eq!(store.videos().len(), 1);

        let mut backend = MemoryStore::new();
        backend.set(KEY, r#"{"dedication":"hola"}"#).unwrap();
        let store = NoteStore::load(backend, KEY);
        assert_eq!(store.dedication(), "hola");
        assert!(store.videos().is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let backend = MemoryStore::new();
        let mut store = NoteStore::load(backend.clone(), KEY);
        store.set_dedication("para siempre");
        store.add_videos([file("a.mp4"), file("b.webm")]);
        let expected = store.snapshot().clone();

        let reloaded = NoteStore::load(backend, KEY);
        assert_eq!(reloaded.snapshot(), &expected);
    }

    #[test]
    fn dedication_survives_reload() {
        let backend = MemoryStore::new();
        let mut store = NoteStore::load(backend.clone(), KEY);
        store.set_dedication("Te amo");

        let raw = backend.raw(KEY).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["dedication"], "Te amo");

        let fresh = NoteStore::load(backend, KEY);
        assert_eq!(fresh.dedication(), "Te amo");
    }

    #[test]
    fn one_intake_appends_in_selection_order_with_distinct_ids() {
        let mut store = NoteStore::load(MemoryStore::new(), KEY);
        store.add_videos([file("first.mp4")]);
        let prior = store.videos()[0].clone();

        let added = store.add_videos([file("second.mp4"), file("third.mp4")]);
        assert_eq!(added, 2);
        let videos = store.videos();
        assert_eq!(videos.len(), 3);
        assert_eq!(videos[0], prior);
        assert_eq!(videos[1].name, "second.mp4");
        assert_eq!(videos[2].name, "third.mp4");
        assert_eq!(videos[2].url, "blob:third.mp4");
        assert_ne!(videos[1].id, videos[2].id);
        assert_ne!(videos[0].id, videos[1].id);
    }

    #[test]
    fn remove_deletes_only_the_matching_entry() {
        let mut store = NoteStore::load(MemoryStore::new(), KEY);
        store.add_videos([file("a"), file("b"), file("c")]);
        let ids: Vec<String> = store.videos().iter().map(|v| v.id.clone()).collect();

        let removed = store.remove_video(&ids[1]).unwrap();
        assert_eq!(removed.name, "b");
        let names: Vec<&str> = store.videos().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["a", "c"]);
    }

    #[test]
    fn removing_unknown_id_is_a_no_op() {
        let backend = MemoryStore::new();
        let mut store = NoteStore::load(backend.clone(), KEY);
        store.add_videos([file("a"), file("b")]);
        let before = store.videos().to_vec();
        let saved = backend.raw(KEY);

        assert!(store.remove_video("does-not-exist").is_none());
        assert_eq!(store.videos(), before.as_slice());
        assert_eq!(backend.raw(KEY), saved);
    }

    #[test]
    fn failing_backend_never_panics() {
        let mut store = NoteStore::load(MemoryStore::failing(), KEY);
        assert_eq!(store.snapshot(), &Snapshot::default());

        store.set_dedication("sin guardar");
        store.add_videos([file("a")]);
        assert!(store.save().is_err());
        assert_eq!(store.dedication(), "sin guardar");
        assert_eq!(store.videos().len(), 1);
    }

    #[test]
    fn random_tokens_are_base36() {
        let mut rng = rand::rng();
        let t = random_token(&mut rng);
        assert_eq!(t.len(), ID_LEN);
        assert!(t.bytes().all(|b| ID_ALPHABET.contains(&b)));
    }
}
