//! Playlist directory listing.
//!
//! Smart playlists (`.xsp`) declare their content type on the root element;
//! plain `.m3u` lists always hold songs.

use std::fs;
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, warn};

const PLAYLIST_EXTENSIONS: &[&str] = &["xsp", "m3u"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistFile {
    /// Full path to the playlist.
    pub file: PathBuf,
    /// File name without extension.
    pub name: String,
    /// `xsp` or `m3u`.
    pub ext: String,
}

impl PlaylistFile {
    /// File name as stored in a widget's `playlist` field.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.ext)
    }

    /// Content type of the playlist (`movies`, `episodes`, `songs`, ...).
    pub fn subtype(&self) -> Option<String> {
        match self.ext.as_str() {
            "m3u" => Some("songs".to_string()),
            "xsp" => smart_playlist_type(&self.file),
            _ => None,
        }
    }
}

/// Sorted playlist files in `dir`. A missing directory is an empty listing.
pub fn list_playlists(dir: &Path) -> Vec<PlaylistFile> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(
                target: "home_menu_maker::catalog",
                dir = %dir.display(),
                error = %err,
                "no playlist directory"
            );
            return Vec::new();
        }
    };

    let mut playlists: Vec<PlaylistFile> = entries
        .flatten()
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| {
            let path = entry.path();
            let ext = path.extension()?.to_str()?.to_ascii_lowercase();
            if !PLAYLIST_EXTENSIONS.contains(&ext.as_str()) {
                return None;
            }
            let name = path.file_stem()?.to_str()?.to_string();
            Some(PlaylistFile {
                file: path,
                name,
                ext,
            })
        })
        .collect();
    playlists.sort_by(|a, b| a.file.cmp(&b.file));
    playlists
}

/// Read the `type` attribute of the root element of a smart playlist.
pub fn smart_playlist_type(path: &Path) -> Option<String> {
    let xml = match fs::read_to_string(path) {
        Ok(xml) => xml,
        Err(err) => {
            warn!(
                target: "home_menu_maker::catalog",
                path = %path.display(),
                error = %err,
                "unreadable smart playlist"
            );
            return None;
        }
    };

    let mut reader = Reader::from_str(&xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"type" {
                        return Some(String::from_utf8_lossy(&attr.value).to_string());
                    }
                }
                return None;
            }
            Ok(Event::Eof) => return None,
            Err(err) => {
                warn!(
                    target: "home_menu_maker::catalog",
                    path = %path.display(),
                    error = %err,
                    "malformed smart playlist"
                );
                return None;
            }
            _ => {}
        }
        buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_sorted_playlists_and_reads_subtypes() {
        let dir = tempfile::tempdir().expect("tempdir creation should succeed");
        fs::write(
            dir.path().join("b_movies.xsp"),
            r#"<?xml version="1.0" encoding="UTF-8"?>
<smartplaylist type="movies"><name>Movies</name></smartplaylist>"#,
        )
        .expect("playlist should be written");
        fs::write(dir.path().join("a_mix.m3u"), "#EXTM3U\n").expect("playlist should be written");
        fs::write(dir.path().join("notes.txt"), "ignored").expect("file should be written");

        let playlists = list_playlists(dir.path());
        let names: Vec<String> = playlists.iter().map(PlaylistFile::file_name).collect();
        assert_eq!(names, vec!["a_mix.m3u", "b_movies.xsp"]);
        assert_eq!(playlists[0].subtype().as_deref(), Some("songs"));
        assert_eq!(playlists[1].subtype().as_deref(), Some("movies"));
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir creation should succeed");
        assert!(list_playlists(&dir.path().join("absent")).is_empty());
    }
}
