//! Sticky-end bookkeeping shared by Golden Gate assembly and sticky ligation.

use crate::{
    dna_sequence::{Sequence, is_palindromic},
    error::CfError,
};
use itertools::Itertools;
use std::collections::HashMap;

/// A double-stranded fragment reduced to its top-strand text: the
/// single-stranded overhang on each end and the body in between.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StickyFragment {
    pub name: String,
    pub fragment: Sequence,
    pub sticky_end5: Sequence,
    pub sticky_end3: Sequence,
}

impl StickyFragment {
    /// Splits a fragment whose first and last `overhang` bases are its
    /// sticky ends.
    pub fn from_ends(name: &str, seq: &str, overhang: usize) -> Result<Self, CfError> {
        if overhang == 0 || seq.len() < 2 * overhang {
            return Err(CfError::InvalidInput {
                name: name.to_string(),
                message: format!(
                    "{} bp is too short to carry two {overhang} bp sticky ends",
                    seq.len()
                ),
            });
        }
        Ok(Self {
            name: name.to_string(),
            sticky_end5: seq[..overhang].to_string(),
            fragment: seq[overhang..seq.len() - overhang].to_string(),
            sticky_end3: seq[seq.len() - overhang..].to_string(),
        })
    }
}

/// A self-complementary end could ligate in either orientation.
pub fn check_not_palindromic(fragments: &[StickyFragment]) -> Result<(), CfError> {
    for f in fragments {
        for end in [&f.sticky_end5, &f.sticky_end3] {
            if is_palindromic(end) {
                return Err(CfError::StickyEnd {
                    fragment: f.name.to_owned(),
                    sticky_end: end.to_owned(),
                    message: "is palindromic, so the junction orientation is ambiguous"
                        .to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Each sticky-end sequence may start at most one fragment and end at most
/// one fragment.
pub fn check_unique_ends(fragments: &[StickyFragment]) -> Result<(), CfError> {
    let by_end5 = fragments.iter().into_group_map_by(|f| f.sticky_end5.as_str());
    let by_end3 = fragments.iter().into_group_map_by(|f| f.sticky_end3.as_str());
    for groups in [by_end5, by_end3] {
        if let Some((end, group)) = groups
            .into_iter()
            .filter(|(_, group)| group.len() > 1)
            .min_by(|a, b| a.0.cmp(b.0))
        {
            return Err(CfError::AmbiguousAssembly {
                sticky_end: end.to_string(),
                fragments: group.iter().map(|f| f.name.to_owned()).collect(),
            });
        }
    }
    Ok(())
}

/// Orders fragments into the cycle their sticky ends describe and checks
/// every junction, including the closing one.
///
/// Starting at the fragment with the smallest 5' end, each next fragment is
/// the one whose 5' end equals the current 3' end. Fragments left over once
/// the chain breaks are appended by 5' end so that the junction check can
/// name the first offending pair.
pub fn order_cycle(fragments: Vec<StickyFragment>) -> Result<Vec<StickyFragment>, CfError> {
    check_unique_ends(&fragments)?;
    let mut remaining: Vec<Option<StickyFragment>> = fragments
        .into_iter()
        .sorted_by(|a, b| a.sticky_end5.cmp(&b.sticky_end5))
        .map(Some)
        .collect();
    let index_by_end5: HashMap<String, usize> = remaining
        .iter()
        .enumerate()
        .filter_map(|(i, f)| f.as_ref().map(|f| (f.sticky_end5.to_owned(), i)))
        .collect();

    let mut ordered: Vec<StickyFragment> = Vec::with_capacity(remaining.len());
    let mut next = if remaining.is_empty() { None } else { Some(0) };
    while let Some(idx) = next {
        let Some(current) = remaining.get_mut(idx).and_then(|f| f.take()) else {
            break;
        };
        next = index_by_end5.get(&current.sticky_end3).copied();
        ordered.push(current);
    }
    ordered.extend(remaining.into_iter().flatten());

    for (left, right) in ordered.iter().circular_tuple_windows() {
        if left.sticky_end3 != right.sticky_end5 {
            return Err(CfError::StickyEndMismatch {
                left: left.name.to_owned(),
                right: right.name.to_owned(),
                left_end: left.sticky_end3.to_owned(),
                right_end: right.sticky_end5.to_owned(),
            });
        }
    }
    Ok(ordered)
}

/// Circular product text: each fragment's 5' end followed by its body. The
/// 3' end of each fragment is the next fragment's 5' end.
pub fn join_circular(ordered: &[StickyFragment]) -> Sequence {
    ordered
        .iter()
        .map(|f| format!("{}{}", f.sticky_end5, f.fragment))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(name: &str, end5: &str, body: &str, end3: &str) -> StickyFragment {
        StickyFragment {
            name: name.to_string(),
            fragment: body.to_string(),
            sticky_end5: end5.to_string(),
            sticky_end3: end3.to_string(),
        }
    }

    #[test]
    fn test_from_ends() {
        let f = StickyFragment::from_ends("x", "AATTCCCCGATC", 4).unwrap();
        assert_eq!(f.sticky_end5, "AATT");
        assert_eq!(f.fragment, "CCCC");
        assert_eq!(f.sticky_end3, "GATC");
        assert!(StickyFragment::from_ends("x", "AATTGAT", 4).is_err());
    }

    #[test]
    fn test_order_cycle_follows_ends() {
        let ordered = order_cycle(vec![
            frag("c", "GGAG", "CCC", "AATT"),
            frag("b", "TACT", "GGG", "GGAG"),
            frag("a", "AATT", "TTT", "TACT"),
        ])
        .unwrap();
        let names: Vec<&str> = ordered.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(join_circular(&ordered), "AATTTTTTACTGGGGGAGCCC");
    }

    #[test]
    fn test_order_cycle_reports_break() {
        let err = order_cycle(vec![
            frag("a", "AATT", "TTT", "TACT"),
            frag("b", "TACT", "GGG", "CGCA"),
        ])
        .unwrap_err();
        match err {
            CfError::StickyEndMismatch {
                left,
                right,
                left_end,
                right_end,
            } => {
                assert_eq!((left.as_str(), right.as_str()), ("b", "a"));
                assert_eq!((left_end.as_str(), right_end.as_str()), ("CGCA", "AATT"));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_order_cycle_rejects_short_cycles() {
        let err = order_cycle(vec![
            frag("a", "AATT", "TTT", "TACT"),
            frag("b", "TACT", "GGG", "AATT"),
            frag("c", "GGAG", "CCC", "CGCA"),
        ])
        .unwrap_err();
        assert!(matches!(err, CfError::StickyEndMismatch { .. }));
    }

    #[test]
    fn test_duplicate_ends_are_ambiguous() {
        let err = check_unique_ends(&[
            frag("a", "AATT", "TTT", "TACT"),
            frag("b", "AATT", "GGG", "GGAG"),
        ])
        .unwrap_err();
        match err {
            CfError::AmbiguousAssembly {
                sticky_end,
                fragments,
            } => {
                assert_eq!(sticky_end, "AATT");
                assert_eq!(fragments, vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_palindromic_end_rejected() {
        let err = check_not_palindromic(&[frag("a", "GATC", "TTT", "TACT")]).unwrap_err();
        assert!(matches!(err, CfError::StickyEnd { .. }));
        assert!(check_not_palindromic(&[frag("a", "AACT", "TTT", "TACT")]).is_ok());
    }
}
