//! Machine-readable construction file contract shared by the parser, the
//! simulator and any outer surface (CLI, JSON exchange).
//!
//! A [`ConstructionFile`] is the wire format between parsing and simulation.
//! It serializes to JSON through serde and to the canonical CF text through
//! [`ConstructionFile::to_text`]; parsing that text again yields an equal
//! value.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, error::Error, fmt, str::FromStr};

pub type SeqName = String;

/// Enzyme slot value of an `Assemble` step that selects homology-based assembly.
pub const GIBSON_MARKER: &str = "gibson";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LigationProtocol {
    #[default]
    Sticky,
    Blunt,
}

/// Operation names recognized at the start of a CF line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    Pcr,
    Digest,
    Ligate,
    Assemble,
    Gibson,
    GoldenGate,
    Blunt,
    Transform,
}

impl OperationKind {
    pub const ALL: [OperationKind; 8] = [
        Self::Pcr,
        Self::Digest,
        Self::Ligate,
        Self::Assemble,
        Self::Gibson,
        Self::GoldenGate,
        Self::Blunt,
        Self::Transform,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Pcr => "pcr",
            Self::Digest => "digest",
            Self::Ligate => "ligate",
            Self::Assemble => "assemble",
            Self::Gibson => "gibson",
            Self::GoldenGate => "goldengate",
            Self::Blunt => "blunt",
            Self::Transform => "transform",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperation(pub String);

impl fmt::Display for UnknownOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown operation '{}'", self.0)
    }
}

impl Error for UnknownOperation {}

impl FromStr for OperationKind {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|kind| kind.keyword().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation")]
pub enum ConstructionStep {
    #[serde(rename = "PCR")]
    Pcr {
        output: SeqName,
        forward_oligo: SeqName,
        reverse_oligo: SeqName,
        template: SeqName,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        product_size: Option<usize>,
    },
    Digest {
        output: SeqName,
        dna: SeqName,
        enzymes: Vec<String>,
        frag_select: usize,
    },
    Ligate {
        output: SeqName,
        dnas: Vec<SeqName>,
        #[serde(default)]
        protocol: LigationProtocol,
    },
    Assemble {
        output: SeqName,
        dnas: Vec<SeqName>,
        enzyme: String,
    },
    Transform {
        output: SeqName,
        dna: SeqName,
        strain: String,
        antibiotics: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        temperature: Option<f64>,
    },
}

impl ConstructionStep {
    /// Values of the `operation` tag in serialized steps.
    pub const OPERATIONS: [&'static str; 5] = ["PCR", "Digest", "Ligate", "Assemble", "Transform"];

    pub fn output(&self) -> &str {
        match self {
            Self::Pcr { output, .. }
            | Self::Digest { output, .. }
            | Self::Ligate { output, .. }
            | Self::Assemble { output, .. }
            | Self::Transform { output, .. } => output,
        }
    }

    /// Names this step needs resolved before it can run, in document order.
    pub fn inputs(&self) -> Vec<&str> {
        match self {
            Self::Pcr {
                forward_oligo,
                reverse_oligo,
                template,
                ..
            } => vec![
                forward_oligo.as_str(),
                reverse_oligo.as_str(),
                template.as_str(),
            ],
            Self::Digest { dna, .. } | Self::Transform { dna, .. } => vec![dna.as_str()],
            Self::Ligate { dnas, .. } | Self::Assemble { dnas, .. } => {
                dnas.iter().map(|s| s.as_str()).collect()
            }
        }
    }

    pub fn is_homology_assembly(enzyme: &str) -> bool {
        enzyme.eq_ignore_ascii_case(GIBSON_MARKER)
    }

    /// Canonical single-line CF text for this step.
    pub fn to_text_line(&self) -> String {
        let mut tokens: Vec<String> = vec![];
        match self {
            Self::Pcr {
                output,
                forward_oligo,
                reverse_oligo,
                template,
                product_size,
            } => {
                tokens.push("PCR".to_string());
                tokens.push(forward_oligo.to_owned());
                tokens.push(reverse_oligo.to_owned());
                tokens.push(template.to_owned());
                if let Some(size) = product_size {
                    tokens.push(size.to_string());
                }
                tokens.push(output.to_owned());
            }
            Self::Digest {
                output,
                dna,
                enzymes,
                frag_select,
            } => {
                tokens.push("Digest".to_string());
                tokens.push(dna.to_owned());
                tokens.extend(enzymes.iter().cloned());
                tokens.push(frag_select.to_string());
                tokens.push(output.to_owned());
            }
            Self::Ligate {
                output,
                dnas,
                protocol,
            } => {
                tokens.push(
                    match protocol {
                        LigationProtocol::Sticky => "Ligate",
                        LigationProtocol::Blunt => "Blunt",
                    }
                    .to_string(),
                );
                tokens.extend(dnas.iter().cloned());
                tokens.push(output.to_owned());
            }
            Self::Assemble {
                output,
                dnas,
                enzyme,
            } => {
                if Self::is_homology_assembly(enzyme) {
                    tokens.push("Gibson".to_string());
                    tokens.extend(dnas.iter().cloned());
                } else {
                    tokens.push("Assemble".to_string());
                    tokens.extend(dnas.iter().cloned());
                    tokens.push(enzyme.to_owned());
                }
                tokens.push(output.to_owned());
            }
            Self::Transform {
                output,
                dna,
                strain,
                antibiotics,
                temperature,
            } => {
                tokens.push("Transform".to_string());
                tokens.push(dna.to_owned());
                tokens.push(strain.to_owned());
                tokens.extend(antibiotics.iter().cloned());
                if let Some(t) = temperature {
                    tokens.push(t.to_string());
                }
                tokens.push(output.to_owned());
            }
        }
        tokens.join("\t")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstructionFile {
    pub steps: Vec<ConstructionStep>,
    #[serde(default)]
    pub sequences: BTreeMap<SeqName, String>,
}

impl ConstructionFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical CF text: step lines in order, then one `name<TAB>sequence`
    /// line per sequence sorted by name.
    pub fn to_text(&self) -> String {
        let mut lines: Vec<String> = self.steps.iter().map(|s| s.to_text_line()).collect();
        lines.extend(
            self.sequences
                .iter()
                .map(|(name, seq)| format!("{name}\t{seq}")),
        );
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_kind_from_str_is_case_insensitive() {
        assert_eq!("PCR".parse::<OperationKind>(), Ok(OperationKind::Pcr));
        assert_eq!(
            "GoldenGate".parse::<OperationKind>(),
            Ok(OperationKind::GoldenGate)
        );
        assert_eq!(
            "splice".parse::<OperationKind>(),
            Err(UnknownOperation("splice".to_string()))
        );
    }

    #[test]
    fn test_step_inputs_and_output() {
        let step = ConstructionStep::Pcr {
            output: "amp".to_string(),
            forward_oligo: "oA".to_string(),
            reverse_oligo: "oB".to_string(),
            template: "pUC".to_string(),
            product_size: None,
        };
        assert_eq!(step.output(), "amp");
        assert_eq!(step.inputs(), vec!["oA", "oB", "pUC"]);
    }

    #[test]
    fn test_gibson_step_text_omits_marker() {
        let step = ConstructionStep::Assemble {
            output: "pdt".to_string(),
            dnas: vec!["a".to_string(), "b".to_string()],
            enzyme: GIBSON_MARKER.to_string(),
        };
        assert_eq!(step.to_text_line(), "Gibson\ta\tb\tpdt");
    }

    #[test]
    fn test_json_shape_is_tagged_by_operation() {
        let cf = ConstructionFile {
            steps: vec![ConstructionStep::Digest {
                output: "dig".to_string(),
                dna: "pcr".to_string(),
                enzymes: vec!["EcoRI".to_string()],
                frag_select: 1,
            }],
            sequences: BTreeMap::new(),
        };
        let json: serde_json::Value = serde_json::from_str(&cf.to_json().unwrap()).unwrap();
        assert_eq!(json["steps"][0]["operation"], "Digest");
        assert!(ConstructionStep::OPERATIONS.contains(&"Digest"));
        assert_eq!(json["steps"][0]["frag_select"], 1);
        assert_eq!(ConstructionFile::from_json(&cf.to_json().unwrap()).unwrap(), cf);
    }

    #[test]
    fn test_every_step_tag_is_listed() {
        let name = || "x".to_string();
        let steps = [
            ConstructionStep::Pcr {
                output: name(),
                forward_oligo: name(),
                reverse_oligo: name(),
                template: name(),
                product_size: None,
            },
            ConstructionStep::Digest {
                output: name(),
                dna: name(),
                enzymes: vec![],
                frag_select: 0,
            },
            ConstructionStep::Ligate {
                output: name(),
                dnas: vec![],
                protocol: LigationProtocol::Sticky,
            },
            ConstructionStep::Assemble {
                output: name(),
                dnas: vec![],
                enzyme: GIBSON_MARKER.to_string(),
            },
            ConstructionStep::Transform {
                output: name(),
                dna: name(),
                strain: name(),
                antibiotics: vec![],
                temperature: None,
            },
        ];
        let tags: Vec<String> = steps
            .iter()
            .map(|step| serde_json::to_value(step).unwrap()["operation"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(tags, ConstructionStep::OPERATIONS);
    }

    #[test]
    fn test_to_text_sorts_sequences() {
        let mut cf = ConstructionFile::new();
        cf.sequences.insert("b".to_string(), "CCCC".to_string());
        cf.sequences.insert("a".to_string(), "GGGG".to_string());
        assert_eq!(cf.to_text(), "a\tGGGG\nb\tCCCC\n");
    }
}
