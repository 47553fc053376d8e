//! Word and character tokenization.
//!
//! A line lexes into words, where a word is a maximal run of one character
//! class (whitespace, alphanumeric/underscore, other). Class changes close
//! words; with `ignore_spaces` whitespace words are dropped from the output
//! but still act as boundaries. Classification is ASCII.

use crate::config::CompareOptions;
use crate::hashing::{fold_hash, HASH_SEED};
use crate::host::{HostEditor, HostError, ViewId};
use crate::myers::Hashed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharClass {
    Space,
    AlphaNum,
    Other,
}

pub(crate) fn char_class(byte: u8) -> CharClass {
    if byte == b' ' || byte == b'\t' {
        CharClass::Space
    } else if byte.is_ascii_alphanumeric() || byte == b'_' {
        CharClass::AlphaNum
    } else {
        CharClass::Other
    }
}

/// A word token: column offset and length within its line, plus fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Word {
    pub pos: usize,
    pub len: usize,
    pub hash: u64,
}

impl Hashed for Word {
    fn hash64(&self) -> u64 {
        self.hash
    }
}

/// A character token. `pos` is relative to the extracted section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Char {
    pub ch: u8,
    pub pos: usize,
}

impl Hashed for Char {
    fn hash64(&self) -> u64 {
        u64::from(self.ch)
    }
}

/// Lexes one buffer line into words.
pub(crate) fn line_words<H: HostEditor>(
    host: &H,
    view: ViewId,
    line: usize,
    options: &CompareOptions,
) -> Result<Vec<Word>, HostError> {
    let start = host.line_start(view, line)?;
    let end = host.line_end(view, line)?;

    let mut words = Vec::new();
    if end <= start {
        return Ok(words);
    }

    let mut text = host.text(view, start, end)?;
    if options.ignore_case {
        host.to_lower_case(&mut text);
    }

    let mut current_class = char_class(text[0]);
    let mut word = Word {
        pos: 0,
        len: 1,
        hash: fold_hash(HASH_SEED, text[0]),
    };

    for (i, &byte) in text.iter().enumerate().skip(1) {
        let class = char_class(byte);
        if class == current_class {
            word.len += 1;
            word.hash = fold_hash(word.hash, byte);
        } else {
            if !options.ignore_spaces || current_class != CharClass::Space {
                words.push(word);
            }
            current_class = class;
            word = Word {
                pos: i,
                len: 1,
                hash: fold_hash(HASH_SEED, byte),
            };
        }
    }

    if !options.ignore_spaces || current_class != CharClass::Space {
        words.push(word);
    }

    Ok(words)
}

/// Extracts the characters of `[start, end)` with positions relative to the
/// section start.
pub(crate) fn section_chars<H: HostEditor>(
    host: &H,
    view: ViewId,
    start: usize,
    end: usize,
    options: &CompareOptions,
) -> Result<Vec<Char>, HostError> {
    let mut chars = Vec::new();
    if end <= start {
        return Ok(chars);
    }

    let mut text = host.text(view, start, end)?;
    if options.ignore_case {
        host.to_lower_case(&mut text);
    }

    chars.reserve(text.len());
    for (i, &byte) in text.iter().enumerate() {
        if !options.ignore_spaces || char_class(byte) != CharClass::Space {
            chars.push(Char { ch: byte, pos: i });
        }
    }

    Ok(chars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryHost;

    fn words_of(line: &str, options: &CompareOptions) -> Vec<Word> {
        let host = MemoryHost::new(line, "");
        line_words(&host, ViewId::Main, 0, options).unwrap()
    }

    #[test]
    fn classifies_ascii_bytes() {
        assert_eq!(char_class(b' '), CharClass::Space);
        assert_eq!(char_class(b'\t'), CharClass::Space);
        assert_eq!(char_class(b'a'), CharClass::AlphaNum);
        assert_eq!(char_class(b'7'), CharClass::AlphaNum);
        assert_eq!(char_class(b'_'), CharClass::AlphaNum);
        assert_eq!(char_class(b';'), CharClass::Other);
    }

    #[test]
    fn splits_on_class_changes() {
        let words = words_of("int x = 1;\n", &CompareOptions::default());
        let spans: Vec<(usize, usize)> = words.iter().map(|w| (w.pos, w.len)).collect();
        assert_eq!(
            spans,
            vec![
                (0, 3), // int
                (3, 1),
                (4, 1), // x
                (5, 1),
                (6, 1), // =
                (7, 1),
                (8, 1), // 1
                (9, 1), // ;
            ]
        );
    }

    #[test]
    fn ignore_spaces_drops_whitespace_words_but_keeps_boundaries() {
        let options = CompareOptions {
            ignore_spaces: true,
            ..CompareOptions::default()
        };
        let words = words_of("foo  bar\n", &options);
        let spans: Vec<(usize, usize)> = words.iter().map(|w| (w.pos, w.len)).collect();
        assert_eq!(spans, vec![(0, 3), (5, 3)]);
    }

    #[test]
    fn ignore_case_folds_word_hashes() {
        let options = CompareOptions {
            ignore_case: true,
            ..CompareOptions::default()
        };
        let upper = words_of("FOO\n", &options);
        let lower = words_of("foo\n", &options);
        assert_eq!(upper[0].hash, lower[0].hash);
    }

    #[test]
    fn underscore_joins_identifiers() {
        let words = words_of("foo_bar baz\n", &CompareOptions::default());
        assert_eq!(words[0].len, 7);
    }

    #[test]
    fn section_chars_keep_relative_positions() {
        let host = MemoryHost::new("abc def\n", "");
        let chars = section_chars(&host, ViewId::Main, 4, 7, &CompareOptions::default()).unwrap();
        let collected: Vec<(u8, usize)> = chars.iter().map(|c| (c.ch, c.pos)).collect();
        assert_eq!(collected, vec![(b'd', 0), (b'e', 1), (b'f', 2)]);
    }

    #[test]
    fn section_chars_can_skip_spaces() {
        let host = MemoryHost::new("a b\n", "");
        let options = CompareOptions {
            ignore_spaces: true,
            ..CompareOptions::default()
        };
        let chars = section_chars(&host, ViewId::Main, 0, 3, &options).unwrap();
        let collected: Vec<(u8, usize)> = chars.iter().map(|c| (c.ch, c.pos)).collect();
        assert_eq!(collected, vec![(b'a', 0), (b'b', 2)]);
    }

    #[test]
    fn empty_section_yields_no_tokens() {
        let host = MemoryHost::new("abc\n", "");
        let chars = section_chars(&host, ViewId::Main, 2, 2, &CompareOptions::default()).unwrap();
        assert!(chars.is_empty());
    }
}
