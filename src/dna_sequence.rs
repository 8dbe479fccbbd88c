use crate::{error::CfError, iupac_code::IupacCode};
use bio::pattern_matching::horspool::Horspool;
use serde::{Deserialize, Serialize};

pub type Sequence = String;

/// A resolved sequence together with the name it is known by in the
/// construction file. Simulators take these so that errors can name the
/// fragment at fault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedSequence {
    pub name: String,
    pub sequence: Sequence,
}

impl NamedSequence {
    pub fn new(name: impl Into<String>, sequence: impl Into<Sequence>) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.sequence.as_bytes()
    }
}

/// Turns a loosely written value into a canonical sequence: whitespace
/// dropped, uppercased, `U` read as `T`. Degenerate IUPAC letters are kept.
pub fn resolve_sequence(name: &str, value: &str) -> Result<Sequence, CfError> {
    let mut ret = String::with_capacity(value.len());
    for (position, c) in value.chars().filter(|c| !c.is_whitespace()).enumerate() {
        if !c.is_ascii() || !IupacCode::is_valid_letter(c as u8) {
            return Err(CfError::UnrecognizedSequence {
                name: name.to_string(),
                letter: c,
                position,
            });
        }
        match c.to_ascii_uppercase() {
            'U' => ret.push('T'),
            upper => ret.push(upper),
        }
    }
    Ok(ret)
}

/// True if every non-whitespace character is an IUPAC nucleotide letter and
/// there is at least one of them.
pub fn is_nucleotide_text(value: &str) -> bool {
    let mut letters = value.bytes().filter(|b| !b.is_ascii_whitespace()).peekable();
    letters.peek().is_some() && letters.all(IupacCode::is_valid_letter)
}

pub fn reverse_complement(seq: &str) -> Result<Sequence, CfError> {
    seq.as_bytes()
        .iter()
        .enumerate()
        .rev()
        .map(|(position, c)| {
            IupacCode::letter_complement(*c)
                .map(char::from)
                .ok_or_else(|| CfError::UnrecognizedSequence {
                    name: preview(seq),
                    letter: char::from(*c),
                    position,
                })
        })
        .collect()
}

/// A sequence that reads the same on both strands.
pub fn is_palindromic(seq: &str) -> bool {
    match reverse_complement(seq) {
        Ok(rc) => rc == seq.to_ascii_uppercase(),
        Err(_) => false,
    }
}

/// All exact, possibly overlapping, occurrences of `needle` in `haystack`.
pub fn find_all(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return vec![];
    }
    Horspool::new(needle).find_all(haystack).collect()
}

pub fn find_first(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    find_all(haystack, needle).first().copied()
}

/// Rewrites a circular sequence so that it starts at `origin`.
pub fn rotate(seq: &str, origin: usize) -> Sequence {
    if seq.is_empty() {
        return Sequence::new();
    }
    let origin = origin % seq.len();
    format!("{}{}", &seq[origin..], &seq[..origin])
}

/// Short form of a sequence for diagnostics.
pub fn preview(seq: &str) -> String {
    const MAX: usize = 24;
    match seq.get(..MAX) {
        Some(head) if seq.len() > MAX => format!("{head}..."),
        _ => seq.to_string(),
    }
}
