//! Candidate strings reachable from a word by one or two edit operations.
//!
//! The four operations work on characters, not bytes:
//!
//! - **delete**: drop one character (`L` candidates)
//! - **transpose**: swap two adjacent characters (`L - 1` candidates)
//! - **replace**: substitute one character with a letter of [`ALPHABET`],
//!   never reproducing the original word
//! - **insert**: add one letter at any of the `L + 1` positions
//!
//! A transpose of two equal adjacent characters yields the input itself;
//! that result is kept.

use ahash::AHashSet;

pub const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

pub fn deletes(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    (0..chars.len())
        .map(|i| {
            let mut edited = chars.clone();
            edited.remove(i);
            collect(&edited)
        })
        .collect()
}

pub fn transposes(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    (0..chars.len().saturating_sub(1))
        .map(|i| {
            let mut edited = chars.clone();
            edited.swap(i, i + 1);
            collect(&edited)
        })
        .collect()
}

pub fn replaces(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut out = Vec::with_capacity(chars.len() * ALPHABET.len());
    for i in 0..chars.len() {
        for letter in ALPHABET.chars() {
            if letter == chars[i] {
                continue;
            }
            let mut edited = chars.clone();
            edited[i] = letter;
            out.push(collect(&edited));
        }
    }
    out
}

pub fn inserts(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut out = Vec::with_capacity((chars.len() + 1) * ALPHABET.len());
    for i in 0..=chars.len() {
        for letter in ALPHABET.chars() {
            let mut edited = chars.clone();
            edited.insert(i, letter);
            out.push(collect(&edited));
        }
    }
    out
}

/// Every distinct string one edit away from `word`.
pub fn edit_one(word: &str, allow_transpose: bool) -> AHashSet<String> {
    let mut set = AHashSet::new();
    set.extend(deletes(word));
    set.extend(replaces(word));
    set.extend(inserts(word));
    if allow_transpose {
        set.extend(transposes(word));
    }
    set
}

/// Every distinct string two edits away from `word`.
pub fn edit_two(word: &str, allow_transpose: bool) -> AHashSet<String> {
    let mut set = AHashSet::new();
    for first in edit_one(word, allow_transpose) {
        set.extend(edit_one(&first, allow_transpose));
    }
    set
}
