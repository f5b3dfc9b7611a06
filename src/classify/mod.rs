//! Filename classification heuristics for movies and TV episodes.
//!
//! Release filenames carry enough structure to decide where a file belongs
//! in the library: `Show.Name.S01E02.mkv` is an episode, `Some.Movie.2020.mkv`
//! is a movie. The heuristics here are deliberately simple regexes; callers
//! treat this module as an oracle that may also return nothing, in which
//! case the file cannot be placed automatically.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Episode pattern: title followed by `S<season>E<episode>` (case-insensitive).
#[allow(clippy::expect_used)]
static EPISODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<title>.*?)S(?P<season>\d{1,2})E(?P<episode>\d{2,3}|\d)")
        .expect("episode regex is valid") // Static pattern, safe to panic
});

/// Movie pattern: title followed by a plausible release year (1900-2099).
#[allow(clippy::expect_used)]
static MOVIE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<title>.+?)[._ ](?P<year>(19|20)\d{2})")
        .expect("movie regex is valid") // Static pattern, safe to panic
});

/// Classification of a media filename.
///
/// At most one class applies to a given filename. Both variants carry a
/// display title with release-name separators (`.`/`_`) normalized to spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaClass {
    /// A feature film with its release year.
    Movie {
        /// Display title, separators normalized.
        title: String,
        /// Four-digit release year.
        year: u16,
    },
    /// A single TV episode.
    Episode {
        /// Show title, separators normalized.
        title: String,
        /// Season number (1-99).
        season: u8,
        /// Episode number within the season.
        episode: u16,
    },
}

impl MediaClass {
    /// Returns the display title regardless of variant.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Movie { title, .. } | Self::Episode { title, .. } => title,
        }
    }
}

/// Classifies a filename as a movie or an episode, or neither.
///
/// When both patterns match (e.g. a show name that contains a year), the
/// movie interpretation wins. Returns `None` when the filename carries no
/// recognizable structure; the caller decides how to handle unclassifiable
/// input.
#[must_use]
pub fn classify(filename: &str) -> Option<MediaClass> {
    if let Some(caps) = MOVIE_PATTERN.captures(filename) {
        let title = normalize_title(&caps["title"]);
        let year = caps["year"].parse::<u16>().ok()?;
        if !title.is_empty() {
            debug!(%title, year, "classified as movie");
            return Some(MediaClass::Movie { title, year });
        }
    }

    if let Some(caps) = EPISODE_PATTERN.captures(filename) {
        let title = normalize_title(&caps["title"]);
        let season = caps["season"].parse::<u8>().ok()?;
        let episode = caps["episode"].parse::<u16>().ok()?;
        if !title.is_empty() {
            debug!(%title, season, episode, "classified as episode");
            return Some(MediaClass::Episode {
                title,
                season,
                episode,
            });
        }
    }

    debug!(filename, "could not classify filename");
    None
}

/// Replaces release-name separators with spaces and trims the result.
fn normalize_title(raw: &str) -> String {
    raw.replace(['.', '_'], " ").trim().to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_movie_with_dotted_title() {
        let class = classify("A.Movie.2020.mkv").unwrap();
        assert_eq!(
            class,
            MediaClass::Movie {
                title: "A Movie".to_string(),
                year: 2020,
            }
        );
    }

    #[test]
    fn test_classify_movie_with_underscores() {
        let class = classify("Another_Film_1999_1080p.mp4").unwrap();
        assert_eq!(
            class,
            MediaClass::Movie {
                title: "Another Film".to_string(),
                year: 1999,
            }
        );
    }

    #[test]
    fn test_classify_episode() {
        let class = classify("B.S01E02.mkv").unwrap();
        assert_eq!(
            class,
            MediaClass::Episode {
                title: "B".to_string(),
                season: 1,
                episode: 2,
            }
        );
    }

    #[test]
    fn test_classify_episode_lowercase_marker() {
        let class = classify("some.show.s03e12.720p.mkv").unwrap();
        assert_eq!(
            class,
            MediaClass::Episode {
                title: "some show".to_string(),
                season: 3,
                episode: 12,
            }
        );
    }

    #[test]
    fn test_classify_episode_three_digit_number() {
        let class = classify("Long.Runner.S02E104.mkv").unwrap();
        assert_eq!(
            class,
            MediaClass::Episode {
                title: "Long Runner".to_string(),
                season: 2,
                episode: 104,
            }
        );
    }

    #[test]
    fn test_classify_movie_wins_when_both_match() {
        // Title contains a year before the episode marker; the movie
        // interpretation takes precedence.
        let class = classify("Space.1999.S01E01.mkv").unwrap();
        assert!(matches!(class, MediaClass::Movie { year: 1999, .. }));
    }

    #[test]
    fn test_classify_unrecognized_returns_none() {
        assert!(classify("random-file.bin").is_none());
        assert!(classify("notes.txt").is_none());
    }

    #[test]
    fn test_classify_year_alone_is_not_a_movie() {
        // The movie pattern needs a non-empty title before the year.
        assert!(classify("2020.mkv").is_none());
    }

    #[test]
    fn test_title_accessor() {
        let class = classify("A.Movie.2020.mkv").unwrap();
        assert_eq!(class.title(), "A Movie");
    }
}
