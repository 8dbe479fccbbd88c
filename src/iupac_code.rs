const DNA_BITMASK_A: u8 = 1;
const DNA_BITMASK_C: u8 = 2;
const DNA_BITMASK_G: u8 = 4;
const DNA_BITMASK_T: u8 = 8;
const DNA_BITMASK_N: u8 = DNA_BITMASK_A | DNA_BITMASK_C | DNA_BITMASK_G | DNA_BITMASK_T;

/// Letters in bitmask order; index `i` holds the canonical letter for mask `i`.
const MASK_LETTERS: &[u8; 16] = b"-ACMGRSVTWYHKDBN";

/// A bitmasked IUPAC code for DNA bases, eg DNA_BITMASK_A|DNA_BITMASK_C
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct IupacCode(u8);

impl IupacCode {
    pub fn new(bitmask: u8) -> Self {
        Self(bitmask & DNA_BITMASK_N)
    }

    #[inline(always)]
    pub fn from_letter(letter: u8) -> Self {
        match letter.to_ascii_uppercase() {
            b'A' => Self(DNA_BITMASK_A),
            b'C' => Self(DNA_BITMASK_C),
            b'G' => Self(DNA_BITMASK_G),
            b'T' => Self(DNA_BITMASK_T),
            b'U' => Self(DNA_BITMASK_T),
            b'W' => Self(DNA_BITMASK_A | DNA_BITMASK_T),
            b'S' => Self(DNA_BITMASK_C | DNA_BITMASK_G),
            b'M' => Self(DNA_BITMASK_A | DNA_BITMASK_C),
            b'K' => Self(DNA_BITMASK_G | DNA_BITMASK_T),
            b'R' => Self(DNA_BITMASK_A | DNA_BITMASK_G),
            b'Y' => Self(DNA_BITMASK_C | DNA_BITMASK_T),
            b'B' => Self(DNA_BITMASK_C | DNA_BITMASK_G | DNA_BITMASK_T),
            b'D' => Self(DNA_BITMASK_A | DNA_BITMASK_G | DNA_BITMASK_T),
            b'H' => Self(DNA_BITMASK_A | DNA_BITMASK_C | DNA_BITMASK_T),
            b'V' => Self(DNA_BITMASK_A | DNA_BITMASK_C | DNA_BITMASK_G),
            b'N' => Self(DNA_BITMASK_N),
            _ => Self(0),
        }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// True for A, C, G and T only.
    #[inline(always)]
    pub fn is_unambiguous(&self) -> bool {
        self.0.count_ones() == 1
    }

    /// Base-pairing partner set: A<->T and C<->G bits swap.
    #[inline(always)]
    pub fn complement(self) -> Self {
        let a = (self.0 & DNA_BITMASK_A) << 3;
        let t = (self.0 & DNA_BITMASK_T) >> 3;
        let c = (self.0 & DNA_BITMASK_C) << 1;
        let g = (self.0 & DNA_BITMASK_G) >> 1;
        Self(a | t | c | g)
    }

    #[inline(always)]
    pub fn to_letter(self) -> u8 {
        MASK_LETTERS[self.0 as usize]
    }

    #[inline(always)]
    pub fn is_valid_letter(letter: u8) -> bool {
        !Self::from_letter(letter).is_empty()
    }

    /// Uppercase complement of an IUPAC letter; `None` for anything else.
    /// `U` complements to `A`, like `T`.
    #[inline(always)]
    pub fn letter_complement(letter: u8) -> Option<u8> {
        let code = Self::from_letter(letter);
        match code.is_empty() {
            true => None,
            false => Some(code.complement().to_letter()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base2iupac() {
        assert_eq!(IupacCode::from_letter(b'A'), IupacCode::new(DNA_BITMASK_A));
        assert_eq!(IupacCode::from_letter(b'C'), IupacCode::new(DNA_BITMASK_C));
        assert_eq!(IupacCode::from_letter(b'G'), IupacCode::new(DNA_BITMASK_G));
        assert_eq!(IupacCode::from_letter(b'T'), IupacCode::new(DNA_BITMASK_T));
        assert_eq!(IupacCode::from_letter(b'U'), IupacCode::new(DNA_BITMASK_T));
        assert_eq!(IupacCode::from_letter(b'X'), IupacCode::new(0));
        assert!(IupacCode::from_letter(b'a').is_unambiguous());
        assert!(!IupacCode::from_letter(b'N').is_unambiguous());
    }

    #[test]
    fn test_mask_letters_round_trip() {
        for letter in b"ACGTWSMKRYBDHVN" {
            assert_eq!(IupacCode::from_letter(*letter).to_letter(), *letter);
        }
    }

    #[test]
    fn test_complement() {
        assert_eq!(IupacCode::letter_complement(b'A'), Some(b'T'));
        assert_eq!(IupacCode::letter_complement(b'C'), Some(b'G'));
        assert_eq!(IupacCode::letter_complement(b'G'), Some(b'C'));
        assert_eq!(IupacCode::letter_complement(b'T'), Some(b'A'));
        assert_eq!(IupacCode::letter_complement(b'U'), Some(b'A'));
        assert_eq!(IupacCode::letter_complement(b'a'), Some(b'T'));
        assert_eq!(IupacCode::letter_complement(b'X'), None);
    }

    #[test]
    fn test_degenerate_complement() {
        assert_eq!(IupacCode::letter_complement(b'R'), Some(b'Y'));
        assert_eq!(IupacCode::letter_complement(b'Y'), Some(b'R'));
        assert_eq!(IupacCode::letter_complement(b'K'), Some(b'M'));
        assert_eq!(IupacCode::letter_complement(b'B'), Some(b'V'));
        assert_eq!(IupacCode::letter_complement(b'D'), Some(b'H'));
        assert_eq!(IupacCode::letter_complement(b'S'), Some(b'S'));
        assert_eq!(IupacCode::letter_complement(b'W'), Some(b'W'));
        assert_eq!(IupacCode::letter_complement(b'N'), Some(b'N'));
    }
}
