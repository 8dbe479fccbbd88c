use crate::{
    dna_sequence::{NamedSequence, Sequence},
    error::CfError,
    restriction_enzyme::RestrictionEnzyme,
};
use itertools::Itertools;

/// Top-strand span of the overhang left by one cut. Blunt cuts have
/// `start == end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cut {
    pub start: usize,
    pub end: usize,
}

/// Cuts of every enzyme on both strands, by position. Cuts whose overhang
/// would fall off either end of `seq`, or would overlap an earlier cut, are
/// dropped.
pub fn find_cuts(seq: &str, enzymes: &[&RestrictionEnzyme]) -> Vec<Cut> {
    let len = seq.len() as isize;
    let sorted = enzymes
        .iter()
        .flat_map(|enzyme| {
            enzyme
                .get_sites(seq)
                .into_iter()
                .map(move |site| enzyme.overhang_span(&site))
        })
        .filter(|(start, end)| *start > 0 && *end < len)
        .map(|(start, end)| Cut {
            start: start as usize,
            end: end as usize,
        })
        .sorted_by_key(|cut| (cut.start, cut.end))
        .dedup();

    let mut cuts: Vec<Cut> = vec![];
    for cut in sorted {
        if cuts.last().is_none_or(|last| cut.start >= last.end) {
            cuts.push(cut);
        }
    }
    cuts
}

/// All fragments of `dna` in their original order. Each fragment keeps the
/// overhang text at both of its cut ends, so neighbouring fragments share it.
/// Without any cut the whole sequence is the only fragment.
pub fn digest_fragments(dna: &NamedSequence, enzymes: &[&RestrictionEnzyme]) -> Vec<Sequence> {
    let cuts = find_cuts(&dna.sequence, enzymes);
    let mut ret = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for cut in &cuts {
        ret.push(dna.sequence[start..cut.end].to_string());
        start = cut.start;
    }
    ret.push(dna.sequence[start..].to_string());
    ret
}

/// The zero-based `frag_select`-th fragment of a digest.
pub fn digest(
    dna: &NamedSequence,
    enzymes: &[&RestrictionEnzyme],
    frag_select: usize,
) -> Result<Sequence, CfError> {
    let mut fragments = digest_fragments(dna, enzymes);
    if frag_select >= fragments.len() {
        return Err(CfError::FragmentIndex {
            dna: dna.name.to_owned(),
            index: frag_select,
            count: fragments.len(),
        });
    }
    Ok(fragments.swap_remove(frag_select))
}
