// src/app/utils.rs
use std::time::{SystemTime, UNIX_EPOCH};

use once_cell::sync::Lazy;
use regex::Regex;

/// Leading words kept in a search query; long queries match poorly.
pub const MAX_QUERY_WORDS: usize = 6;

pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "mov", "mpg", "mpeg", "m4v", "wmv", "webm",
];

static BRACKETED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\([^)]*\)|\[[^\]]*\]|\{[^}]*\}").expect("valid bracket regex")
});

static RELEASE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(2160p|1080p|720p|480p|4k|uhd|hdr|x264|x265|h\.?264|h\.?265|hevc|avc|xvid|divx|blu-?ray|brrip|bdrip|webrip|web-?dl|hdtv|dvdrip|remux|proper|repack|extended|unrated|aac|ac3|dts|atmos)\b",
    )
    .expect("valid release tag regex")
});

static YEAR_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(19\d{2}|20\d{2})\b").expect("valid year regex"));

static BRACKETED_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[(\[{]\s*(19\d{2}|20\d{2})\s*[)\]}]").expect("valid year regex"));

static GROUP_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-[A-Z0-9]{2,12}$").expect("valid group regex"));

static SPACED_GROUP_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s-\s*[A-Z0-9]{2,12}$").expect("valid group regex"));

const SECS_PER_YEAR: u64 = 31_556_952;

/// Next calendar year; later four-digit numbers are part of a title ("2049").
fn latest_release_year() -> u32 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    1970 + (secs / SECS_PER_YEAR) as u32 + 1
}

fn is_release_year(token: &str) -> bool {
    token
        .parse::<u32>()
        .is_ok_and(|y| y <= latest_release_year())
}

pub fn is_video_ext(ext: &str) -> bool {
    let ext = ext.to_ascii_lowercase();
    VIDEO_EXTENSIONS.contains(&ext.as_str())
}

fn strip_video_extension(raw: &str) -> &str {
    match raw.rsplit_once('.') {
        Some((stem, ext)) if is_video_ext(ext) => stem,
        _ => raw,
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turn a noisy title or release filename into a search query.
///
/// `"The.Matrix.1999.1080p.BluRay.x264-GROUP.mkv"` becomes `"The Matrix"`.
/// Hand-typed titles (spaces, no release tags) keep their numbers.
pub fn clean_search_title(raw: &str) -> String {
    let raw = strip_video_extension(raw.trim());
    let dotted = !raw.contains(' ');
    // Only treat dots as separators when there are no spaces, so "Mr. Smith" survives.
    let spaced = if dotted {
        raw.replace(['.', '_'], " ")
    } else {
        raw.replace('_', " ")
    };
    let had_bracket_year = BRACKETED_YEAR.is_match(&spaced);

    let mut title = BRACKETED.replace_all(&spaced, " ").into_owned();

    let mut tagged = false;
    if let Some(m) = RELEASE_TAG.find(&title) {
        title.truncate(m.start());
        tagged = true;
    }

    // Release names put the year right after the title; a leading year *is* the title.
    if (dotted || tagged) && !had_bracket_year {
        if let Some(m) = YEAR_TOKEN
            .find_iter(&title)
            .filter(|m| m.start() > 0 && is_release_year(m.as_str()))
            .last()
        {
            title.truncate(m.start());
        }
    }

    let mut title = collapse_whitespace(&title);

    // "Some Film - TVHD" loses its group; "Star Wars - The Empire Strikes Back" is a subtitle.
    let suffix = if dotted { &GROUP_SUFFIX } else { &SPACED_GROUP_SUFFIX };
    let title = suffix.replace(&title, "");

    let title = trim_separators(&title);
    let mut words = Vec::new();
    let mut counted = 0;
    for word in title.split_whitespace() {
        // Lone punctuation ("-", ":") does not use up the word budget.
        if word.chars().any(char::is_alphanumeric) {
            if counted == MAX_QUERY_WORDS {
                break;
            }
            counted += 1;
        }
        words.push(word);
    }
    trim_separators(&words.join(" ")).to_string()
}

fn trim_separators(s: &str) -> &str {
    s.trim_end_matches(|c: char| c.is_whitespace() || "-_.,:".contains(c))
}

/// Four-digit release year in 1900..=2099, preferring a bracketed one.
pub fn extract_year(raw: &str) -> Option<String> {
    if let Some(caps) = BRACKETED_YEAR.captures_iter(raw).last() {
        return Some(caps[1].to_string());
    }
    let spaced = raw.replace(['.', '_'], " ");
    let tokens: Vec<_> = YEAR_TOKEN
        .find_iter(&spaced)
        .filter(|m| is_release_year(m.as_str()))
        .collect();
    // "2012.2009.mkv": the last year is the release year, the first is the title.
    match tokens.as_slice() {
        [] => None,
        [only] if only.start() == 0 && spaced.trim().len() > 4 => {
            // A title that *starts* with a year ("1917 Extended") has no year info.
            None
        }
        [.., last] => Some(last.as_str().to_string()),
    }
}

/// Normalise a user-typed year hint; anything without a plausible year is dropped.
pub fn normalize_year_hint(hint: &str) -> Option<String> {
    YEAR_TOKEN
        .find(hint.trim())
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_release_noise() {
        assert_eq!(
            clean_search_title("The.Matrix.1999.1080p.BluRay.x264-GROUP.mkv"),
            "The Matrix"
        );
        assert_eq!(
            clean_search_title("Blade Runner 2049 (2017) [2160p] HDR"),
            "Blade Runner 2049"
        );
        assert_eq!(clean_search_title("Heat_1995_WEBRip"), "Heat");
    }

    #[test]
    fn keeps_plain_titles_and_dots_in_spaced_titles() {
        assert_eq!(clean_search_title("Mr. Smith Goes to Washington"), "Mr. Smith Goes to Washington");
        assert_eq!(clean_search_title("  Alien  "), "Alien");
        assert_eq!(clean_search_title("Nonexistent1999Movie"), "Nonexistent1999Movie");
    }

    #[test]
    fn leading_year_is_part_of_title() {
        assert_eq!(clean_search_title("2012.2009.720p.mkv"), "2012");
        assert_eq!(clean_search_title("1917"), "1917");
    }

    #[test]
    fn drops_release_group_and_caps_words() {
        assert_eq!(clean_search_title("Some Film - TVHD"), "Some Film");
        assert_eq!(
            clean_search_title("One Two Three Four Five Six Seven Eight"),
            "One Two Three Four Five Six"
        );
    }

    #[test]
    fn keeps_subtitles_after_a_dash() {
        assert_eq!(
            clean_search_title("Star Wars - The Empire Strikes Back"),
            "Star Wars - The Empire Strikes Back"
        );
        assert_eq!(
            clean_search_title("Mission: Impossible - Dead Reckoning"),
            "Mission: Impossible - Dead Reckoning"
        );
        assert_eq!(clean_search_title("Alien - Director's Cut"), "Alien - Director's Cut");
        assert_eq!(clean_search_title("Heat - 1995"), "Heat");
    }

    #[test]
    fn keeps_future_numbers_in_tagged_titles() {
        assert_eq!(clean_search_title("Blade Runner 2049 1080p"), "Blade Runner 2049");
        assert_eq!(clean_search_title("Blade.Runner.2049.2017.1080p.mkv"), "Blade Runner 2049");
        assert_eq!(clean_search_title("Heat 1995 1080p"), "Heat");
        assert_eq!(extract_year("Blade Runner 2049 1080p"), None);
        assert_eq!(extract_year("Blade.Runner.2049.2017.mkv"), Some("2017".into()));
    }

    #[test]
    fn finds_years() {
        assert_eq!(extract_year("Some Film (2000) - TVHD"), Some("2000".into()));
        assert_eq!(extract_year("The.Matrix.1999.1080p"), Some("1999".into()));
        assert_eq!(extract_year("2012.2009.720p"), Some("2009".into()));
        assert_eq!(extract_year("1917 Extended"), None);
        assert_eq!(extract_year("Example Movie - Director's Cut"), None);
    }

    #[test]
    fn normalizes_year_hints() {
        assert_eq!(normalize_year_hint(" 1999 "), Some("1999".into()));
        assert_eq!(normalize_year_hint("1999-05-01"), Some("1999".into()));
        assert_eq!(normalize_year_hint("soon"), None);
        assert_eq!(normalize_year_hint(""), None);
    }
}
