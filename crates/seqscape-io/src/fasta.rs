//! FASTA directory loading.
//!
//! Header lines start with `>`; the sequence lines between headers are
//! concatenated into one unbroken string. Records carry no identifier
//! beyond their position: discovery order across files, header order
//! within a file.
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// File suffixes read as sequence files. Matching is case-sensitive.
const RECOGNIZED_SUFFIXES: [&str; 2] = [".fasta", ".txt"];

/// Reads every FASTA record in `dir` (non-recursive) into a flat list of
/// sequence strings.
///
/// Only entries named `*.fasta` or `*.txt` contribute; everything else is
/// skipped. Files are visited in filesystem iteration order. An unreadable
/// directory or file is an error; malformed content is not: a file with
/// sequence lines but no header yields one headerless record, and an empty
/// file yields none.
pub fn load_sequences<P: AsRef<Path>>(dir: P) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read sequence directory {}", dir.display()))?;
    let mut sequences = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !RECOGNIZED_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            continue;
        }
        let file =
            File::open(&path).with_context(|| format!("failed to open {}", path.display()))?;
        let count = read_sequences(BufReader::new(file), &mut sequences)?;
        log::debug!("{}: {} record(s)", path.display(), count);
    }
    Ok(sequences)
}

/// Scans one FASTA stream, appending each record onto `sequences`, and
/// returns the number of records appended.
///
/// A record is flushed when the next `>` header arrives or the stream ends.
/// A header immediately followed by another header holds no content and is
/// dropped. Sequence lines are stripped of surrounding whitespace and joined
/// without a separator.
pub fn read_sequences<R: BufRead>(reader: R, sequences: &mut Vec<String>) -> Result<usize> {
    let before = sequences.len();
    let mut seq = String::new();
    for line in reader.lines() {
        let line = line?;
        if line.starts_with('>') {
            if !seq.is_empty() {
                sequences.push(std::mem::take(&mut seq));
            }
        } else {
            seq.push_str(line.trim());
        }
    }
    if !seq.is_empty() {
        sequences.push(seq);
    }
    Ok(sequences.len() - before)
}
