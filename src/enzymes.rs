use crate::restriction_enzyme::RestrictionEnzyme;
use anyhow::{Context, Result, anyhow};
use std::{fs, path::Path};

const BUILTIN_ENZYMES_JSON: &str = include_str!("../assets/enzymes.json");

/// Read-only restriction enzyme registry. Build one at startup (or use the
/// process-wide [`crate::ENZYMES`]) and pass it by reference to whatever
/// needs to look enzymes up.
#[derive(Clone, Debug, Default)]
pub struct Enzymes {
    restriction_enzymes: Vec<RestrictionEnzyme>,
    max_re_length: usize,
}

impl Enzymes {
    pub fn from_json_text(json_text: &str) -> Result<Self> {
        let res: serde_json::Value = serde_json::from_str(json_text)?;
        let arr = res
            .as_array()
            .ok_or(anyhow!("Enzymes file is not a JSON array"))?;
        let mut restriction_enzymes = vec![];
        for row in arr {
            match row.get("type").and_then(|t| t.as_str()) {
                Some("restriction") => {
                    let mut re: RestrictionEnzyme = serde_json::from_value(row.to_owned())
                        .with_context(|| format!("Bad restriction enzyme: {row}"))?;
                    re.prepare()
                        .with_context(|| format!("Bad recognition sequence: {row}"))?;
                    restriction_enzymes.push(re);
                }
                Some(other) => return Err(anyhow!("Unknown enzyme type '{other}' in {row}")),
                None => return Err(anyhow!("Missing enzyme type for {row}")),
            }
        }
        Ok(Self::from_enzymes(restriction_enzymes))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Could not read enzyme table '{}'", path.display()))?;
        Self::from_json_text(&text)
    }

    pub fn builtin() -> Result<Self> {
        Self::from_json_text(BUILTIN_ENZYMES_JSON)
    }

    pub fn from_enzymes(restriction_enzymes: Vec<RestrictionEnzyme>) -> Self {
        let max_re_length = restriction_enzymes
            .iter()
            .map(|re| re.sequence.len())
            .max()
            .unwrap_or(0);
        Self {
            restriction_enzymes,
            max_re_length,
        }
    }

    pub fn restriction_enzymes(&self) -> &[RestrictionEnzyme] {
        &self.restriction_enzymes
    }

    /// Case-insensitive lookup by enzyme name.
    pub fn get(&self, name: &str) -> Option<&RestrictionEnzyme> {
        self.restriction_enzymes
            .iter()
            .find(|re| re.name.eq_ignore_ascii_case(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn max_re_length(&self) -> usize {
        self.max_re_length
    }

    pub fn is_empty(&self) -> bool {
        self.restriction_enzymes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_table() {
        let enzymes = Enzymes::builtin().unwrap();
        assert!(enzymes.contains("EcoRI"));
        assert!(enzymes.contains("bsai"));
        assert_eq!(enzymes.max_re_length(), 8);
        let bsa_i = enzymes.get("BsaI").unwrap();
        assert_eq!(bsa_i.recognition_rc(), "GAGACC");
        assert!(bsa_i.is_five_prime());
        assert!(enzymes.get("EcoRV").unwrap().is_blunt());
        assert!(!enzymes.get("KpnI").unwrap().is_five_prime());
    }

    #[test]
    fn test_builtin_type_iis_overhangs() {
        let enzymes = Enzymes::builtin().unwrap();
        for name in ["BsaI", "BsmBI", "Esp3I", "BbsI", "BtgZI"] {
            assert_eq!(enzymes.get(name).unwrap().overhang_length(), 4, "{name}");
        }
        assert_eq!(enzymes.get("SapI").unwrap().overhang_length(), 3);
    }

    #[test]
    fn test_custom_table_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"type":"restriction","name":"FakeI","sequence":"acgcgt","cut5":2,"cut3":6}}]"#
        )
        .unwrap();
        let enzymes = Enzymes::from_path(file.path()).unwrap();
        assert_eq!(enzymes.restriction_enzymes().len(), 1);
        let fake = enzymes.get("fakei").unwrap();
        assert_eq!(fake.sequence, "ACGCGT");
        assert!(fake.is_palindromic());
        assert!(!enzymes.contains("EcoRI"));
    }

    #[test]
    fn test_bad_rows_are_rejected() {
        assert!(Enzymes::from_json_text("{}").is_err());
        assert!(Enzymes::from_json_text(r#"[{"name":"X"}]"#).is_err());
        assert!(Enzymes::from_json_text(r#"[{"type":"protease","name":"X"}]"#).is_err());
        assert!(
            Enzymes::from_json_text(
                r#"[{"type":"restriction","name":"X","sequence":"GAZTC","cut5":1,"cut3":2}]"#
            )
            .is_err()
        );
    }
}
