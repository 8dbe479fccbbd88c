use crate::{
    dna_sequence::{NamedSequence, Sequence, find_all, find_first},
    error::CfError,
};
use itertools::Itertools;
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GibsonProduct {
    pub sequence: Sequence,
    /// Every fragment found a downstream partner in some round.
    pub is_circular: bool,
    pub rounds: usize,
}

/// One terminal-overlap hit: the tail of `working[from]` found in `working[to]` at `pos`.
#[derive(Clone, Copy, Debug)]
struct Junction {
    from: usize,
    to: usize,
    pos: usize,
}

fn find_junctions(working: &[NamedSequence], homology_length: usize) -> Vec<Junction> {
    let mut junctions = vec![];
    for (from, a) in working.iter().enumerate() {
        let tail = &a.as_bytes()[a.len() - homology_length..];
        for (to, b) in working.iter().enumerate() {
            if from == to {
                continue;
            }
            junctions.extend(
                find_all(b.as_bytes(), tail)
                    .into_iter()
                    .map(|pos| Junction { from, to, pos }),
            );
        }
    }
    junctions
}

/// Merges every chain of junctions into one sequence. Chains start at items
/// nothing points to; what is left are closed cycles, which are opened at
/// their first item by dropping the junction leading back into it.
fn merge_chains(
    working: &[NamedSequence],
    junctions: &[Junction],
    homology_length: usize,
) -> Vec<NamedSequence> {
    let next: HashMap<usize, Junction> = junctions.iter().map(|j| (j.from, *j)).collect();
    let has_incoming: HashSet<usize> = junctions.iter().map(|j| j.to).collect();
    let starts = (0..working.len())
        .filter(|i| !has_incoming.contains(i))
        .chain(0..working.len());

    let mut visited = vec![false; working.len()];
    let mut merged = vec![];
    for start in starts {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut product = working[start].to_owned();
        let mut current = start;
        while let Some(junction) = next.get(&current) {
            if visited[junction.to] {
                break;
            }
            visited[junction.to] = true;
            let b = &working[junction.to];
            product = NamedSequence::new(
                format!("{}+{}", product.name, b.name),
                format!(
                    "{}{}",
                    product.sequence,
                    &b.sequence[junction.pos + homology_length..]
                ),
            );
            current = junction.to;
        }
        merged.push(product);
    }
    merged
}

/// Trims the redundant copy of the closing overlap from a merged circle.
fn close_circle(product: &NamedSequence, homology_length: usize) -> Result<Sequence, CfError> {
    let tail = &product.as_bytes()[product.len() - homology_length..];
    match find_first(product.as_bytes(), tail) {
        Some(pos) if pos + homology_length < product.len() => {
            Ok(product.sequence[pos + homology_length..].to_string())
        }
        _ => Err(CfError::Circularity {
            product: product.name.to_owned(),
        }),
    }
}

/// Homology assembly by exact terminal overlap.
///
/// Each round looks for the last `homology_length` bases of every working
/// sequence anywhere in every other one. More hits than working sequences,
/// or a sequence with two partners on the same side, is an ambiguous
/// junction and the assembly fails. As many hits as sequences means every
/// sequence found its downstream partner, so the set closes into a circle.
/// Chains of hits are merged and the next round runs on the merged list,
/// which shrinks every round until one sequence is left.
///
/// With `require_circular` the converged product must be circular and is
/// trimmed to its non-redundant circular sequence; without it the merged
/// product is returned as is.
pub fn gibson(
    dnas: &[NamedSequence],
    homology_length: usize,
    require_circular: bool,
) -> Result<GibsonProduct, CfError> {
    if let Some(short) = dnas
        .iter()
        .find(|d| homology_length == 0 || d.len() < homology_length)
    {
        return Err(CfError::InvalidInput {
            name: short.name.to_owned(),
            message: format!(
                "{} bp does not fit a {homology_length} bp homology overlap",
                short.len()
            ),
        });
    }

    let mut working = dnas.to_vec();
    let mut is_circular = false;
    let mut rounds = 0;
    while working.len() > 1 {
        rounds += 1;
        let junctions = find_junctions(&working, homology_length);
        let ambiguous = junctions.iter().map(|j| j.from).counts().values().any(|&n| n > 1)
            || junctions.iter().map(|j| j.to).counts().values().any(|&n| n > 1);
        if junctions.is_empty() || junctions.len() > working.len() || ambiguous {
            return Err(CfError::NonConvergence {
                round: rounds,
                candidates: junctions.len(),
                fragments: working.into_iter().map(|w| w.name).collect(),
            });
        }
        if junctions.len() == working.len() {
            is_circular = true;
        }
        working = merge_chains(&working, &junctions, homology_length);
    }

    let Some(product) = working.pop() else {
        return Err(CfError::NonConvergence {
            round: rounds,
            candidates: 0,
            fragments: vec![],
        });
    };
    if !require_circular {
        return Ok(GibsonProduct {
            sequence: product.sequence,
            is_circular,
            rounds,
        });
    }
    if !is_circular {
        return Err(CfError::Circularity {
            product: product.name,
        });
    }
    Ok(GibsonProduct {
        sequence: close_circle(&product, homology_length)?,
        is_circular,
        rounds,
    })
}
