//! Core data models for the song search service.
//!
//! [`Song`] mirrors the document stored in the backend index; [`SongResult`]
//! is what the search layer returns — the document plus the backend's stable
//! identifier and the composite relevance score computed at query time. The
//! score is never persisted; it only exists within the response it belongs to.

use serde::{Deserialize, Serialize};

/// A song document as stored in the search index (`_source`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    pub artist: String,
    #[serde(default = "default_lyrics")]
    pub lyrics: String,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub year: Option<i32>,
}

fn default_lyrics() -> String {
    "Lyrics not available".to_string()
}

/// A ranked search hit: the document's fields plus its backend identifier
/// and the composite (text relevance x popularity) score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongResult {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub lyrics: String,
    pub album: Option<String>,
    pub duration: Option<String>,
    pub views: u64,
    pub year: Option<i32>,
    pub score: f64,
}

impl SongResult {
    /// Assemble a result from a backend hit.
    pub fn from_hit(id: String, score: f64, song: Song) -> Self {
        Self {
            id,
            title: song.title,
            artist: song.artist,
            lyrics: song.lyrics,
            album: song.album,
            duration: song.duration,
            views: song.views,
            year: song.year,
            score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_song_deserializes_with_missing_optionals() {
        let song: Song =
            serde_json::from_str(r#"{"title": "Havana", "artist": "Camila Cabello"}"#).unwrap();
        assert_eq!(song.lyrics, "Lyrics not available");
        assert_eq!(song.views, 0);
        assert!(song.album.is_none());
        assert!(song.year.is_none());
    }

    #[test]
    fn test_from_hit_copies_all_fields() {
        let song: Song = serde_json::from_value(serde_json::json!({
            "title": "In the End",
            "artist": "Linkin Park",
            "lyrics": "It starts with one...",
            "album": "Hybrid Theory",
            "duration": "3:36",
            "views": 1_500_000,
            "year": 2000
        }))
        .unwrap();
        let result = SongResult::from_hit("doc-1".to_string(), 42.5, song);
        assert_eq!(result.id, "doc-1");
        assert_eq!(result.views, 1_500_000);
        assert_eq!(result.year, Some(2000));
        assert!((result.score - 42.5).abs() < 1e-9);
    }
}
