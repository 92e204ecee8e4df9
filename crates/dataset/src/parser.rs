//! Parsers for the snapshot CSV files.
//!
//! A snapshot directory holds three files:
//! - ratings_matrix.csv: wide pivot, header `userId,<movieId>,...`, one row
//!   per user, empty cell = unrated
//! - movies.csv: `movieId,title` with RFC-4180 quoting for titles that
//!   contain commas or quotes
//! - popularity.csv: `movieId,popularity`
//!
//! Each parser reports failures with file and line context so a bad snapshot
//! is diagnosable from the startup error alone.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Read a file into lines, tolerating non-UTF-8 bytes via lossy conversion
fn read_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;

    let content = String::from_utf8_lossy(&bytes);
    Ok(content.lines().map(|s| s.to_string()).collect())
}

/// File name used in error messages
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Split one CSV line into fields, honoring double-quoted fields.
///
/// A quote opens only at the start of a field; `""` inside a quoted field is
/// a literal quote. Stray quotes elsewhere are kept as ordinary characters.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.is_empty() => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Parse the wide rating pivot into a `RatingTable`
///
/// Header: `userId` followed by one movie id per column. Every data row must
/// carry exactly one cell per column; empty cells mean unrated. Ratings must
/// parse as f32 within the valid rating range.
pub fn parse_ratings_matrix(path: &Path) -> Result<RatingTable> {
    let lines = read_lines(path)?;
    ratings_matrix_from_lines(&lines, &file_label(path))
}

fn ratings_matrix_from_lines(lines: &[String], file: &str) -> Result<RatingTable> {
    let mut rows = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (header_idx, header) = rows.next().ok_or_else(|| DataLoadError::ParseError {
        file: file.to_string(),
        line: 1,
        reason: "Missing header row".to_string(),
    })?;
    let header_fields: Vec<&str> = header.trim().split(',').collect();

    if header_fields.first().map(|f| f.trim()) != Some("userId") {
        return Err(DataLoadError::ParseError {
            file: file.to_string(),
            line: header_idx + 1,
            reason: "First header column must be userId".to_string(),
        });
    }

    let mut movie_ids = Vec::with_capacity(header_fields.len().saturating_sub(1));
    for field in &header_fields[1..] {
        let movie_id: MovieId =
            field
                .trim()
                .parse()
                .map_err(|e| DataLoadError::ParseError {
                    file: file.to_string(),
                    line: header_idx + 1,
                    reason: format!("Invalid movieId in header: {}", e),
                })?;
        movie_ids.push(movie_id);
    }

    let mut table = RatingTable::new(movie_ids.clone())?;

    for (idx, line) in rows {
        let line_no = idx + 1;
        let fields: Vec<&str> = line.trim().split(',').collect();

        if fields.len() != movie_ids.len() + 1 {
            return Err(DataLoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: format!(
                    "Expected {} fields but found {}",
                    movie_ids.len() + 1,
                    fields.len()
                ),
            });
        }

        let user_id: UserId =
            fields[0]
                .trim()
                .parse()
                .map_err(|e| DataLoadError::ParseError {
                    file: file.to_string(),
                    line: line_no,
                    reason: format!("Invalid userId: {}", e),
                })?;

        let mut ratings = HashMap::new();
        for (&movie_id, cell) in movie_ids.iter().zip(&fields[1..]) {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            let value: f32 = cell.parse().map_err(|e| DataLoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: format!("Invalid rating for movie {}: {}", movie_id, e),
            })?;
            if !(MIN_RATING_VALUE..=MAX_RATING_VALUE).contains(&value) {
                return Err(DataLoadError::ParseError {
                    file: file.to_string(),
                    line: line_no,
                    reason: format!(
                        "Rating {} for movie {} outside {}..={}",
                        value, movie_id, MIN_RATING_VALUE, MAX_RATING_VALUE
                    ),
                });
            }
            ratings.insert(movie_id, value);
        }

        table.push_row(user_id, ratings)?;
    }

    Ok(table)
}

/// Parse movies.csv into a `MovieCatalog`
///
/// Format: `movieId,title`, titles quoted when they contain commas.
pub fn parse_movie_catalog(path: &Path) -> Result<MovieCatalog> {
    let lines = read_lines(path)?;
    movie_catalog_from_lines(&lines, &file_label(path))
}

fn movie_catalog_from_lines(lines: &[String], file: &str) -> Result<MovieCatalog> {
    let mut rows = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (header_idx, header) = rows.next().ok_or_else(|| DataLoadError::ParseError {
        file: file.to_string(),
        line: 1,
        reason: "Missing header row".to_string(),
    })?;
    if header.trim().split(',').next().map(|f| f.trim()) != Some("movieId") {
        return Err(DataLoadError::ParseError {
            file: file.to_string(),
            line: header_idx + 1,
            reason: "First header column must be movieId".to_string(),
        });
    }

    let mut entries = Vec::new();
    for (idx, line) in rows {
        let line_no = idx + 1;
        let fields = split_fields(line.trim());

        if fields.len() != 2 {
            return Err(DataLoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: format!("Expected 2 fields but found {}", fields.len()),
            });
        }

        let movie_id: MovieId =
            fields[0]
                .trim()
                .parse()
                .map_err(|e| DataLoadError::ParseError {
                    file: file.to_string(),
                    line: line_no,
                    reason: format!("Invalid movieId: {}", e),
                })?;
        let title = fields[1].trim().to_string();
        if title.is_empty() {
            return Err(DataLoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: format!("Empty title for movie {}", movie_id),
            });
        }

        entries.push(MovieEntry {
            id: movie_id,
            title,
        });
    }

    MovieCatalog::new(entries)
}

/// Parse popularity.csv into a `PopularityIndex`
///
/// Format: `movieId,popularity`. Scores must be finite.
pub fn parse_popularity(path: &Path) -> Result<PopularityIndex> {
    let lines = read_lines(path)?;
    popularity_from_lines(&lines, &file_label(path))
}

fn popularity_from_lines(lines: &[String], file: &str) -> Result<PopularityIndex> {
    let mut rows = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (header_idx, header) = rows.next().ok_or_else(|| DataLoadError::ParseError {
        file: file.to_string(),
        line: 1,
        reason: "Missing header row".to_string(),
    })?;
    if header.trim().split(',').next().map(|f| f.trim()) != Some("movieId") {
        return Err(DataLoadError::ParseError {
            file: file.to_string(),
            line: header_idx + 1,
            reason: "First header column must be movieId".to_string(),
        });
    }

    let mut entries = Vec::new();
    for (idx, line) in rows {
        let line_no = idx + 1;
        let fields: Vec<&str> = line.trim().split(',').collect();

        if fields.len() != 2 {
            return Err(DataLoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: format!("Expected 2 fields but found {}", fields.len()),
            });
        }

        let movie_id: MovieId =
            fields[0]
                .trim()
                .parse()
                .map_err(|e| DataLoadError::ParseError {
                    file: file.to_string(),
                    line: line_no,
                    reason: format!("Invalid movieId: {}", e),
                })?;
        let score: f32 = fields[1]
            .trim()
            .parse()
            .map_err(|e| DataLoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: format!("Invalid popularity for movie {}: {}", movie_id, e),
            })?;
        if !score.is_finite() {
            return Err(DataLoadError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: format!("Popularity for movie {} is not finite", movie_id),
            });
        }

        entries.push((movie_id, score));
    }

    PopularityIndex::new(entries)
}
