//! Recovery phrase handling and checksum-word recovery
//!
//! A 12-word phrase packs 12 × 11 = 132 bits: 128 bits of entropy followed
//! by a 4-bit checksum equal to the top nibble of `SHA-256(entropy)[0]`.
//! Given the first 11 words, [`resolve_checksum_word`] walks the wordlist
//! in its canonical order and returns the first candidate that completes a
//! valid phrase.
//!
//! The wordlist is always passed in explicitly; [`english_wordlist`] returns
//! the standard BIP39 English list.

use std::fmt;

use bip39::Language;
use sha2::{Digest, Sha256};

use crate::error::WalletError;
use crate::Result;

/// Number of entries in a BIP39 wordlist (one per 11-bit index)
pub const WORDLIST_LEN: usize = 2048;

/// Words in a complete phrase
pub const PHRASE_WORDS: usize = 12;

/// Words accepted by the checksum resolver
pub const PREFIX_WORDS: usize = PHRASE_WORDS - 1;

const BITS_PER_WORD: u32 = 11;
const CHECKSUM_BITS: u32 = 4;

/// The standard BIP39 English wordlist
pub fn english_wordlist() -> &'static [&'static str; WORDLIST_LEN] {
    Language::English.word_list()
}

/// Recover the 12th word for an 11-word prefix
///
/// Candidates are tried in wordlist order and the first one that satisfies
/// the entropy/checksum relation is returned. Any prefix has many valid
/// completions (the 12th word carries 7 free entropy bits), so the result
/// is the lowest-index valid word, not necessarily the word a user lost.
pub fn resolve_checksum_word<'w, S: AsRef<str>>(
    words: &[S],
    wordlist: &'w [&'w str],
) -> Result<&'w str> {
    if words.len() != PREFIX_WORDS {
        return Err(WalletError::InvalidInputLength {
            expected: PREFIX_WORDS,
            found: words.len(),
        });
    }

    let prefix = pack_indices(words, wordlist)?;

    candidates(wordlist)
        .iter()
        .enumerate()
        .find(|(index, _)| checksum_matches(prefix, *index as u16))
        .map(|(_, word)| *word)
        .ok_or(WalletError::NoChecksumFound)
}

/// Check a 12-word phrase against the entropy/checksum relation
pub fn validate_phrase<S: AsRef<str>>(words: &[S], wordlist: &[&str]) -> Result<()> {
    if words.len() != PHRASE_WORDS {
        return Err(WalletError::InvalidInputLength {
            expected: PHRASE_WORDS,
            found: words.len(),
        });
    }

    let prefix = pack_indices(&words[..PREFIX_WORDS], wordlist)?;
    let last = word_index(words[PREFIX_WORDS].as_ref(), wordlist)?;

    if checksum_matches(prefix, last) {
        Ok(())
    } else {
        Err(WalletError::InvalidChecksum)
    }
}

fn candidates<'w>(wordlist: &'w [&'w str]) -> &'w [&'w str] {
    &wordlist[..wordlist.len().min(WORDLIST_LEN)]
}

fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

fn word_index(word: &str, wordlist: &[&str]) -> Result<u16> {
    let normalized = normalize(word);
    candidates(wordlist)
        .iter()
        .position(|w| *w == normalized)
        .map(|i| i as u16)
        .ok_or_else(|| WalletError::UnknownWord(word.to_string()))
}

/// Concatenate the 11-bit indices of an 11-word prefix (121 bits)
fn pack_indices<S: AsRef<str>>(words: &[S], wordlist: &[&str]) -> Result<u128> {
    words.iter().try_fold(0u128, |acc, word| {
        let index = word_index(word.as_ref(), wordlist)?;
        Ok((acc << BITS_PER_WORD) | u128::from(index))
    })
}

/// Append `last` to the 121-bit prefix and compare the trailing 4 bits with
/// the checksum of the leading 128
fn checksum_matches(prefix: u128, last: u16) -> bool {
    let entropy = (prefix << (BITS_PER_WORD - CHECKSUM_BITS)) | u128::from(last >> CHECKSUM_BITS);
    let checksum = (last & 0x0f) as u8;

    let digest = Sha256::digest(entropy.to_be_bytes());
    digest[0] >> (8 - CHECKSUM_BITS) == checksum
}

/// A complete, checksum-valid 12-word phrase
#[derive(Clone, PartialEq, Eq)]
pub struct Phrase {
    words: Vec<String>,
    resolved: bool,
}

impl Phrase {
    /// Build a phrase from 11 words (the 12th is recovered) or 12 words (the
    /// checksum is verified)
    pub fn from_words<S: AsRef<str>>(words: &[S], wordlist: &[&str]) -> Result<Self> {
        let mut normalized: Vec<String> = words.iter().map(|w| normalize(w.as_ref())).collect();

        match normalized.len() {
            PREFIX_WORDS => {
                let last = resolve_checksum_word(&normalized, wordlist)?;
                normalized.push(last.to_string());
                Ok(Self {
                    words: normalized,
                    resolved: true,
                })
            }
            PHRASE_WORDS => {
                validate_phrase(&normalized, wordlist)?;
                Ok(Self {
                    words: normalized,
                    resolved: false,
                })
            }
            found => Err(WalletError::InvalidInputLength {
                expected: if found < PREFIX_WORDS {
                    PREFIX_WORDS
                } else {
                    PHRASE_WORDS
                },
                found,
            }),
        }
    }

    /// Split on whitespace and build the phrase from the resulting words
    pub fn parse(text: &str, wordlist: &[&str]) -> Result<Self> {
        let words: Vec<&str> = text.split_whitespace().collect();
        Self::from_words(&words, wordlist)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// The 12th word when it was recovered rather than supplied
    pub fn resolved_word(&self) -> Option<&str> {
        if self.resolved {
            self.words.last().map(String::as_str)
        } else {
            None
        }
    }
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.words.join(" "))
    }
}

impl fmt::Debug for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Phrase")
            .field("words", &self.words.len())
            .field("resolved", &self.resolved)
            .finish()
    }
}
