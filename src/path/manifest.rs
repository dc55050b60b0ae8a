//! Manifest `Class-Path:` header extraction.

use std::io::BufRead;

const CLASS_PATH_HEADER: &str = "Class-Path:";

/// Extracts the space-separated path list declared by a manifest
/// `Class-Path:` header block.
///
/// The block is the header line itself plus every immediately following
/// continuation line (prefixed by at least one space). Scanning stops at
/// the first non-continuation line after the header; the rest of the
/// stream is left unread. A manifest without the header yields an empty
/// list, and an I/O error mid-stream degrades to whatever was
/// accumulated so far.
pub fn parse_class_path(reader: impl BufRead) -> Vec<String> {
    let mut accumulated = String::new();
    let mut in_header = false;

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(error = %err, "manifest read failed mid-stream");
                break;
            }
        };

        if !in_header {
            if let Some(rest) = line.trim_start().strip_prefix(CLASS_PATH_HEADER) {
                in_header = true;
                accumulated.push_str(rest.trim());
            }
        } else {
            if !line.starts_with(' ') {
                break;
            }
            if !accumulated.is_empty() {
                accumulated.push(' ');
            }
            accumulated.push_str(line.trim());
        }
    }

    accumulated
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_header_with_continuation_lines() {
        let manifest = "Manifest-Version: 1.0\n\
                        Class-Path: lib/a.zip\n \
                        lib/b.zip\n \
                        lib/c.zip\n\
                        Main-Entry: app\n";
        let paths = parse_class_path(Cursor::new(manifest));
        assert_eq!(paths, vec!["lib/a.zip", "lib/b.zip", "lib/c.zip"]);
    }

    #[test]
    fn test_parsing_halts_at_first_non_continuation_line() {
        let manifest = "Class-Path: one\n \
                        two\n\
                        Other: three\n four five\n";
        let paths = parse_class_path(Cursor::new(manifest));
        assert_eq!(paths, vec!["one", "two"]);
    }

    #[test]
    fn test_missing_header_yields_empty_list() {
        let manifest = "Manifest-Version: 1.0\nMain-Entry: app\n";
        assert!(parse_class_path(Cursor::new(manifest)).is_empty());
    }

    #[test]
    fn test_empty_stream() {
        assert!(parse_class_path(Cursor::new("")).is_empty());
    }

    #[test]
    fn test_header_value_spanning_three_continuations() {
        let manifest = "Class-Path: \n a.zip\n b.zip\n c.zip\nEnd: x\n";
        let paths = parse_class_path(Cursor::new(manifest));
        assert_eq!(paths, vec!["a.zip", "b.zip", "c.zip"]);
    }
}
