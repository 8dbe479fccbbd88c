use crate::{
    dna_sequence::{find_all, reverse_complement},
    error::CfError,
};
use serde::{Deserialize, Serialize};

/// A restriction enzyme with its recognition sequence and the two strand cut
/// positions, given as signed offsets from the 3' end of the recognition
/// site (`cut5` on the top strand, `cut3` on the bottom strand).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictionEnzyme {
    pub name: String,
    pub sequence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub cut5: isize,
    pub cut3: isize,
    #[serde(skip)]
    sequence_rc: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestrictionEnzymeSite {
    /// Start of the recognition sequence on the top strand.
    pub offset: usize,
    pub forward_strand: bool,
}

impl RestrictionEnzyme {
    pub fn new(name: &str, sequence: &str, cut5: isize, cut3: isize) -> Result<Self, CfError> {
        let mut ret = Self {
            name: name.to_string(),
            sequence: sequence.to_ascii_uppercase(),
            note: None,
            cut5,
            cut3,
            sequence_rc: String::new(),
        };
        ret.prepare()?;
        Ok(ret)
    }

    /// Computes the derived fields; required after deserialization.
    pub fn prepare(&mut self) -> Result<(), CfError> {
        self.sequence = self.sequence.to_ascii_uppercase();
        self.sequence_rc = reverse_complement(&self.sequence)?;
        Ok(())
    }

    pub fn recognition_rc(&self) -> &str {
        &self.sequence_rc
    }

    pub fn is_palindromic(&self) -> bool {
        self.sequence == self.sequence_rc
    }

    /// True if the enzyme leaves a 5' overhang.
    pub fn is_five_prime(&self) -> bool {
        self.cut5 < self.cut3
    }

    pub fn is_blunt(&self) -> bool {
        self.cut5 == self.cut3
    }

    pub fn overhang_length(&self) -> usize {
        self.cut5.abs_diff(self.cut3)
    }

    /// Offsets (from the recognition site end) bounding the single-stranded
    /// overhang, nearer cut first.
    pub fn cut_window(&self) -> (isize, isize) {
        if self.is_five_prime() {
            (self.cut5, self.cut3)
        } else {
            (self.cut3, self.cut5)
        }
    }

    /// Top-strand span `[start, end)` covered by the overhang a site leaves.
    /// The span may fall outside the sequence for sites close to an end.
    pub fn overhang_span(&self, site: &RestrictionEnzymeSite) -> (isize, isize) {
        let (near, far) = self.cut_window();
        let offset = site.offset as isize;
        if site.forward_strand {
            let end = offset + self.sequence.len() as isize;
            (end + near, end + far)
        } else {
            (offset - far, offset - near)
        }
    }

    pub fn forward_sites(&self, seq: &str) -> Vec<usize> {
        find_all(seq.as_bytes(), self.sequence.as_bytes())
    }

    pub fn reverse_sites(&self, seq: &str) -> Vec<usize> {
        find_all(seq.as_bytes(), self.sequence_rc.as_bytes())
    }

    /// All sites on both strands, by position. A palindromic site is reported
    /// once, as a forward site.
    pub fn get_sites(&self, seq: &str) -> Vec<RestrictionEnzymeSite> {
        let mut ret: Vec<RestrictionEnzymeSite> = self
            .forward_sites(seq)
            .into_iter()
            .map(|offset| RestrictionEnzymeSite {
                offset,
                forward_strand: true,
            })
            .collect();
        if !self.is_palindromic() {
            ret.extend(
                self.reverse_sites(seq)
                    .into_iter()
                    .map(|offset| RestrictionEnzymeSite {
                        offset,
                        forward_strand: false,
                    }),
            );
        }
        ret.sort_by_key(|site| site.offset);
        ret
    }
}
