// src/app/local.rs
//! Local video files: folder import, playback and trailer search links.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::app::data::Movie;
use crate::app::error::PlayError;
use crate::app::utils::{clean_search_title, extract_year, is_video_ext};

const TRAILER_SEARCH: &str = "https://www.youtube.com/results?search_query=";

/// One record per video file under `root`, titled from the filename.
pub fn scan_video_files(root: &Path) -> Vec<Movie> {
    let mut out = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!("scan {}: {err}", root.display());
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let is_video = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(is_video_ext);
        if !is_video {
            continue;
        }
        if let Some(movie) = movie_from_path(path) {
            out.push(movie);
        }
    }
    info!("found {} video files under {}", out.len(), root.display());
    out
}

fn movie_from_path(path: &Path) -> Option<Movie> {
    let file_name = path.file_name()?.to_string_lossy();
    let stem = path.file_stem()?.to_string_lossy();

    let cleaned = clean_search_title(&file_name);
    let name = if cleaned.is_empty() { stem.trim() } else { cleaned.as_str() };
    let mut movie = Movie::new(name).ok()?;
    movie.year = extract_year(&stem).unwrap_or_default();
    movie.file_path = path.to_string_lossy().into_owned();
    debug!("{} -> `{}` {}", path.display(), movie.name, movie.year);
    Some(movie)
}

/// Open an attached file with the platform's default handler.
pub fn play(file_path: &str) -> Result<(), PlayError> {
    let file_path = file_path.trim();
    if file_path.is_empty() {
        return Err(PlayError::NoFile);
    }
    let path = PathBuf::from(file_path);
    if !path.exists() {
        return Err(PlayError::Missing(path));
    }
    info!("opening {}", path.display());
    opener(&path).spawn().map_err(PlayError::Launch)?;
    Ok(())
}

fn opener(path: &Path) -> Command {
    if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        // Empty title argument; otherwise a quoted path is taken as the title.
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    } else if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}

pub fn trailer_search_url(movie: &Movie) -> String {
    let query = format!("{} {} official trailer", movie.name, movie.year);
    let query = query.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("{TRAILER_SEARCH}{}", urlencoding::encode(&query))
}
