use crate::{
    dna_sequence::{NamedSequence, Sequence, find_first, reverse_complement, rotate},
    error::CfError,
};

fn anneal_mismatch(direction: &str, oligo: &NamedSequence, template: &NamedSequence) -> CfError {
    CfError::AnnealMismatch {
        direction: direction.to_string(),
        oligo: oligo.name.to_owned(),
        template: template.name.to_owned(),
    }
}

fn check_oligo(oligo: &NamedSequence, anneal_length: usize) -> Result<(), CfError> {
    if anneal_length == 0 || oligo.len() < anneal_length {
        return Err(CfError::InvalidInput {
            name: oligo.name.to_owned(),
            message: format!(
                "a {} nt oligo cannot supply a {anneal_length} nt anneal region",
                oligo.len()
            ),
        });
    }
    Ok(())
}

/// Start of `anneal` in `template` read as a circle, so that an anneal
/// region may span the origin.
fn find_circular(template: &str, anneal: &str) -> Option<usize> {
    if template.len() < anneal.len() {
        return None;
    }
    let wrap = &template[..anneal.len() - 1];
    let doubled = format!("{template}{wrap}");
    find_first(doubled.as_bytes(), anneal.as_bytes())
}

/// Predicts the PCR product of two oligos on a template.
///
/// Only the 3' terminal `anneal_length` bases of each oligo must match the
/// template exactly; 5' tails are carried into the product as written. The
/// template is tried in both orientations and treated as circular.
pub fn pcr(
    forward: &NamedSequence,
    reverse: &NamedSequence,
    template: &NamedSequence,
    anneal_length: usize,
) -> Result<Sequence, CfError> {
    check_oligo(forward, anneal_length)?;
    check_oligo(reverse, anneal_length)?;

    let forward_anneal = &forward.sequence[forward.len() - anneal_length..];
    let oriented = match find_circular(&template.sequence, forward_anneal) {
        Some(pos) => rotate(&template.sequence, pos),
        None => {
            let template_rc = reverse_complement(&template.sequence)?;
            let pos = find_circular(&template_rc, forward_anneal)
                .ok_or_else(|| anneal_mismatch("forward", forward, template))?;
            rotate(&template_rc, pos)
        }
    };

    let reverse_rc = reverse_complement(&reverse.sequence)?;
    let reverse_anneal = &reverse_rc[..anneal_length];
    let end = oriented
        .get(anneal_length..)
        .and_then(|rest| find_first(rest.as_bytes(), reverse_anneal.as_bytes()))
        .map(|pos| pos + anneal_length)
        .ok_or_else(|| anneal_mismatch("reverse", reverse, template))?;

    Ok(format!(
        "{}{}{}",
        forward.sequence,
        &oriented[anneal_length..end],
        reverse_rc
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const F: &str = "ATGACCATGATTACGCCA";
    const M: &str = "AGCTTGCATGCCTGCAGGTCGACTCTAGAG";
    const R: &str = "GTTTTCCCAGTCACGACG";

    fn template() -> NamedSequence {
        NamedSequence::new("pTemplate", format!("GGGGGG{F}{M}{R}CCCCCC"))
    }

    fn oligos() -> (NamedSequence, NamedSequence) {
        (
            NamedSequence::new("oF", format!("GGTCTCA{F}")),
            NamedSequence::new("oR", format!("GAATTC{}", reverse_complement(R).unwrap())),
        )
    }

    #[test]
    fn test_product_carries_oligo_tails() {
        let (fwd, rev) = oligos();
        let product = pcr(&fwd, &rev, &template(), 18).unwrap();
        assert_eq!(product, format!("GGTCTCA{F}{M}{R}GAATTC"));
        assert!(product.starts_with(&fwd.sequence));
        assert!(product.ends_with(&reverse_complement(&rev.sequence).unwrap()));
    }

    #[test]
    fn test_reverse_orientation_template() {
        let (fwd, rev) = oligos();
        let flipped = NamedSequence::new(
            "pFlipped",
            reverse_complement(&template().sequence).unwrap(),
        );
        assert_eq!(
            pcr(&fwd, &rev, &flipped, 18).unwrap(),
            pcr(&fwd, &rev, &template(), 18).unwrap()
        );
    }

    #[test]
    fn test_anneal_across_origin() {
        let (fwd, rev) = oligos();
        let circular = NamedSequence::new(
            "pCircular",
            format!("{}{M}{R}CCCCCCGGGGGG{}", &F[9..], &F[..9]),
        );
        assert_eq!(
            pcr(&fwd, &rev, &circular, 18).unwrap(),
            format!("GGTCTCA{F}{M}{R}GAATTC")
        );
    }

    #[test]
    fn test_anneal_mismatch() {
        let (fwd, rev) = oligos();
        let unrelated = NamedSequence::new("oX", "TTTTTTTTTTTTTTTTTTTT");
        match pcr(&unrelated, &rev, &template(), 18).unwrap_err() {
            CfError::AnnealMismatch {
                direction, oligo, ..
            } => {
                assert_eq!(direction, "forward");
                assert_eq!(oligo, "oX");
            }
            other => panic!("unexpected error {other}"),
        }
        match pcr(&fwd, &unrelated, &template(), 18).unwrap_err() {
            CfError::AnnealMismatch { direction, .. } => assert_eq!(direction, "reverse"),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_short_oligo() {
        let (_, rev) = oligos();
        let short = NamedSequence::new("oShort", "ACGT");
        assert!(matches!(
            pcr(&short, &rev, &template(), 18),
            Err(CfError::InvalidInput { .. })
        ));
    }
}
