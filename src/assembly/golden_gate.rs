use super::sticky_ends::{StickyFragment, check_not_palindromic, join_circular, order_cycle};
use crate::{
    dna_sequence::{NamedSequence, Sequence},
    error::CfError,
    restriction_enzyme::{RestrictionEnzyme, RestrictionEnzymeSite},
};

fn site_error(dna: &NamedSequence, enzyme: &RestrictionEnzyme, message: String) -> CfError {
    CfError::EnzymeSite {
        fragment: dna.name.to_owned(),
        enzyme: enzyme.name.to_owned(),
        message,
    }
}

/// Cuts a part at its single forward and single reverse site and keeps what
/// lies between them, with the two overhangs the cuts leave.
pub fn excise(dna: &NamedSequence, enzyme: &RestrictionEnzyme) -> Result<StickyFragment, CfError> {
    if enzyme.is_palindromic() {
        return Err(site_error(
            dna,
            enzyme,
            "recognition sequence is palindromic; Golden Gate needs a Type IIS enzyme".to_string(),
        ));
    }
    if enzyme.is_blunt() {
        return Err(site_error(dna, enzyme, "enzyme leaves blunt ends".to_string()));
    }
    let forward = enzyme.forward_sites(&dna.sequence);
    let reverse = enzyme.reverse_sites(&dna.sequence);
    if forward.len() != 1 || reverse.len() != 1 {
        return Err(site_error(
            dna,
            enzyme,
            format!(
                "expected exactly one forward ({}) and one reverse ({}) site, found {} and {}",
                enzyme.sequence,
                enzyme.recognition_rc(),
                forward.len(),
                reverse.len()
            ),
        ));
    }
    let (f, r) = (forward[0], reverse[0]);
    if r < f + enzyme.sequence.len() {
        return Err(site_error(
            dna,
            enzyme,
            format!("reverse site at {r} precedes forward site at {f}"),
        ));
    }

    let (start5, end5) = enzyme.overhang_span(&RestrictionEnzymeSite {
        offset: f,
        forward_strand: true,
    });
    let (start3, end3) = enzyme.overhang_span(&RestrictionEnzymeSite {
        offset: r,
        forward_strand: false,
    });
    if start5 < 0 || end3 > dna.len() as isize || end5 > start3 {
        return Err(site_error(
            dna,
            enzyme,
            format!("cuts at {start5}..{end5} and {start3}..{end3} do not leave a fragment"),
        ));
    }
    let (start5, end5, start3, end3) = (
        start5 as usize,
        end5 as usize,
        start3 as usize,
        end3 as usize,
    );
    Ok(StickyFragment {
        name: dna.name.to_owned(),
        fragment: dna.sequence[end5..start3].to_string(),
        sticky_end5: dna.sequence[start5..end5].to_string(),
        sticky_end3: dna.sequence[start3..end3].to_string(),
    })
}

/// One-pot digestion and ligation of `dnas` with a Type IIS enzyme into a
/// single circular product.
pub fn golden_gate(dnas: &[NamedSequence], enzyme: &RestrictionEnzyme) -> Result<Sequence, CfError> {
    let fragments = dnas
        .iter()
        .map(|dna| excise(dna, enzyme))
        .collect::<Result<Vec<_>, _>>()?;
    check_not_palindromic(&fragments)?;
    let ordered = order_cycle(fragments)?;
    Ok(join_circular(&ordered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enzymes::Enzymes;

    fn bsa_i() -> RestrictionEnzyme {
        Enzymes::builtin().unwrap().get("BsaI").unwrap().to_owned()
    }

    /// A part flanked by BsaI sites that releases `end5 + body + end3`.
    fn part(name: &str, end5: &str, body: &str, end3: &str) -> NamedSequence {
        NamedSequence::new(
            name,
            format!("CCGGTCTCA{end5}{body}{end3}TGAGACCGG"),
        )
    }

    #[test]
    fn test_excise() {
        let f = excise(&part("p1", "AATG", "CCCCCC", "TACT"), &bsa_i()).unwrap();
        assert_eq!(f.sticky_end5, "AATG");
        assert_eq!(f.fragment, "CCCCCC");
        assert_eq!(f.sticky_end3, "TACT");
    }

    #[test]
    fn test_three_part_cycle_any_order() {
        let p1 = part("p1", "AATG", "CCCCCCCC", "TACT");
        let p2 = part("p2", "TACT", "GGGGGGGGGG", "GGAG");
        let p3 = part("p3", "GGAG", "TTTTTT", "AATG");
        let expected = "AATGCCCCCCCCTACTGGGGGGGGGGGGAGTTTTTT";
        for order in [
            [&p1, &p2, &p3],
            [&p3, &p1, &p2],
            [&p2, &p3, &p1],
            [&p3, &p2, &p1],
        ] {
            let dnas: Vec<NamedSequence> = order.iter().map(|p| (*p).to_owned()).collect();
            let product = golden_gate(&dnas, &bsa_i()).unwrap();
            assert_eq!(product, expected);
            assert_eq!(product.len(), 8 + 10 + 6 + 3 * 4);
        }
    }

    #[test]
    fn test_three_prime_overhang_enzyme() {
        // Cuts 1 nt past the site on the top strand, 5 nt on the bottom.
        let enzyme = RestrictionEnzyme::new("FakeIIS", "GAAGAGC", 5, 1).unwrap();
        assert!(!enzyme.is_five_prime());
        let part = |name: &str, end5: &str, body: &str, end3: &str| {
            NamedSequence::new(name, format!("CCGAAGAGCA{end5}{body}{end3}TGCTCTTCCC"))
        };
        let p1 = part("p1", "AATG", "CCCCCC", "TACT");
        let p2 = part("p2", "TACT", "GGGGGG", "AATG");

        let f = excise(&p1, &enzyme).unwrap();
        assert_eq!(f.sticky_end5, "AATG");
        assert_eq!(f.fragment, "CCCCCC");
        assert_eq!(f.sticky_end3, "TACT");

        let product = golden_gate(&[p2, p1], &enzyme).unwrap();
        assert_eq!(product, "AATGCCCCCCTACTGGGGGG");
    }

    #[test]
    fn test_missing_and_extra_sites() {
        let no_site = NamedSequence::new("bare", "ACGTACGTACGTACGT");
        assert!(matches!(
            excise(&no_site, &bsa_i()),
            Err(CfError::EnzymeSite { .. })
        ));
        let two_sites = NamedSequence::new(
            "twice",
            "GGTCTCAAATTCCCGGTCTCAAACCCTACTTGAGACC",
        );
        assert!(matches!(
            excise(&two_sites, &bsa_i()),
            Err(CfError::EnzymeSite { .. })
        ));
    }

    #[test]
    fn test_reverse_before_forward() {
        let flipped = NamedSequence::new("flipped", "GAGACCTTTTTTTTTTGGTCTCAAAA");
        match excise(&flipped, &bsa_i()).unwrap_err() {
            CfError::EnzymeSite {
                fragment, message, ..
            } => {
                assert_eq!(fragment, "flipped");
                assert!(message.contains("precedes"));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_palindromic_enzyme_rejected() {
        let eco_ri = Enzymes::builtin().unwrap().get("EcoRI").unwrap().to_owned();
        let dna = NamedSequence::new("x", "GAATTCAAAAGAATTC");
        assert!(matches!(
            golden_gate(&[dna], &eco_ri),
            Err(CfError::EnzymeSite { .. })
        ));
    }

    #[test]
    fn test_palindromic_sticky_end_rejected() {
        let p1 = part("p1", "GATC", "CCCCCC", "TACT");
        let p2 = part("p2", "TACT", "GGGGGG", "GATC");
        assert!(matches!(
            golden_gate(&[p1, p2], &bsa_i()),
            Err(CfError::StickyEnd { .. })
        ));
    }

    #[test]
    fn test_shared_sticky_end_is_ambiguous() {
        let p1 = part("p1", "AATG", "CCCCCC", "TACT");
        let p2 = part("p2", "TACT", "GGGGGG", "AATG");
        let p3 = part("p3", "TACT", "AAAAAA", "AATG");
        assert!(matches!(
            golden_gate(&[p1, p2, p3], &bsa_i()),
            Err(CfError::AmbiguousAssembly { .. })
        ));
    }

    #[test]
    fn test_open_cycle_is_mismatch() {
        let p1 = part("p1", "AATG", "CCCCCC", "TACT");
        let p2 = part("p2", "TACT", "GGGGGG", "GGAG");
        assert!(matches!(
            golden_gate(&[p1, p2], &bsa_i()),
            Err(CfError::StickyEndMismatch { .. })
        ));
    }
}
