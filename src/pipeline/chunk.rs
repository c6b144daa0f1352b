//! Splits raw document text into bounded-length chunks for per-chunk scoring.
//!
//! The algorithm is line-oriented: short lines are dropped, the rest are
//! stripped down to a small character whitelist and accumulated into chunks of
//! at most `max_words` words. Two quirks of the trained model's preprocessing
//! are load-bearing and reproduced on purpose:
//!
//! * word counts come from splitting on single spaces without collapsing
//!   cleaning artifacts, so runs of spaces inflate the count;
//! * the line that overflows a chunk starts the next chunk with the running
//!   word count reset to zero, not to that line's own count.
//!
//! "Fixing" either one changes chunk boundaries and therefore scores.

/// Placeholder chunk for documents that produce no valid chunks at all.
pub const ERROR_CHUNK_TEXT: &str = "ERROR IN READING FILE";

/// Characters preserved by the cleaning pass; everything else becomes a space.
const KEPT_PUNCTUATION: &str = ".&!,()+'";

/// A document's chunk sequence plus the parsing error flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSet {
    chunks: Vec<String>,
    parsing_error: bool,
}

impl ChunkSet {
    /// Chunks a document, substituting the error placeholder when the text
    /// yields no valid chunks.
    #[must_use]
    pub fn from_text(text: &str, max_words: usize, min_letters: usize) -> Self {
        let chunks = split_to_chunks(text, max_words, min_letters);
        if chunks.is_empty() {
            Self {
                chunks: vec![ERROR_CHUNK_TEXT.to_string()],
                parsing_error: true,
            }
        } else {
            Self {
                chunks,
                parsing_error: false,
            }
        }
    }

    #[must_use]
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// True when the document produced zero valid chunks and the set holds
    /// only the placeholder.
    #[must_use]
    pub fn parsing_error(&self) -> bool {
        self.parsing_error
    }
}

/// Splits `text` into cleaned chunks of roughly `max_words` words each.
///
/// Lines of `min_letters` characters or fewer are discarded outright and never
/// contribute to any chunk. Returns an empty vector when nothing survives.
#[must_use]
pub fn split_to_chunks(text: &str, max_words: usize, min_letters: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut running_words = 0usize;

    for line in text.split('\n') {
        if line.chars().count() <= min_letters {
            continue;
        }

        let cleaned = clean_line(line);
        // Counts space-separated tokens without collapsing runs of spaces,
        // matching the counts the model was trained against.
        running_words += cleaned.split(' ').count();

        if running_words <= max_words {
            buffer.push_str(&cleaned);
            buffer.push(' ');
        } else {
            chunks.push(buffer.trim().to_string());
            buffer = cleaned;
            buffer.push(' ');
            // The overflowing line's own words are discounted for the next
            // chunk; the running count restarts from zero.
            running_words = 0;
        }
    }

    if buffer.chars().count() > 1 {
        chunks.push(buffer.trim().to_string());
    }

    chunks.retain(|chunk| !chunk.is_empty());
    chunks
}

/// Replaces every character outside the whitelist with a single space, then
/// drops the `"..."` and `" . . "` artifacts the replacement leaves behind.
fn clean_line(line: &str) -> String {
    let stripped: String = line
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || KEPT_PUNCTUATION.contains(c) {
                c
            } else {
                ' '
            }
        })
        .collect();
    stripped.replace("...", "").replace(" . . ", "")
}
