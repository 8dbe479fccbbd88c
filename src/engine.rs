use crate::{
    assembly::{AssemblyMethod, assemble},
    digest::digest_fragments,
    dna_sequence::{NamedSequence, Sequence, resolve_sequence},
    enzymes::Enzymes,
    error::CfError,
    ligate::ligate,
    pcr::pcr,
    restriction_enzyme::RestrictionEnzyme,
};
use cfsim_protocol::{ConstructionFile, ConstructionStep, LigationProtocol};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path};

pub type Product = NamedSequence;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// 3' oligo bases that must match the PCR template exactly.
    pub anneal_length: usize,
    /// Terminal overlap joining fragments in homology assembly.
    pub homology_length: usize,
    /// Reject homology assemblies that do not close into a circle.
    pub require_circular_assembly: bool,
    /// Fail on lines that are neither an operation nor a sequence.
    pub strict_parsing: bool,
    /// Sticky-end length read off the ends of ligated fragments.
    pub ligation_overhang_length: usize,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            anneal_length: 18,
            homology_length: 20,
            require_circular_assembly: true,
            strict_parsing: false,
            ligation_overhang_length: 4,
        }
    }
}

impl SimulationParameters {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, CfError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub output: String,
    pub length: usize,
    pub messages: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Zero-based position of the step in the construction file.
    pub index: usize,
    pub step: ConstructionStep,
    pub result: StepResult,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub products: Vec<Product>,
    pub records: Vec<StepRecord>,
}

impl SimulationReport {
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .flat_map(|r| r.result.warnings.iter().map(|w| w.as_str()))
    }
}

/// Names visible to a step: earlier products shadow declared sequences.
struct ProductRegistry<'c> {
    cf: &'c ConstructionFile,
    products: HashMap<String, Sequence>,
}

impl<'c> ProductRegistry<'c> {
    fn new(cf: &'c ConstructionFile) -> Self {
        Self {
            cf,
            products: HashMap::new(),
        }
    }

    fn resolve(&self, step: &ConstructionStep, name: &str) -> Result<NamedSequence, CfError> {
        if let Some(seq) = self.products.get(name) {
            return Ok(NamedSequence::new(name, seq.to_owned()));
        }
        match self.cf.sequences.get(name) {
            Some(value) => Ok(NamedSequence::new(name, resolve_sequence(name, value)?)),
            None => Err(CfError::UnresolvedReference {
                step: step.output().to_string(),
                name: name.to_string(),
            }),
        }
    }

    fn resolve_all(
        &self,
        step: &ConstructionStep,
        names: &[String],
    ) -> Result<Vec<NamedSequence>, CfError> {
        names.iter().map(|name| self.resolve(step, name)).collect()
    }
}

/// Runs construction files against one enzyme registry and one set of
/// parameters. A simulator holds no per-run state, so it can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct Simulator<'a> {
    enzymes: &'a Enzymes,
    parameters: SimulationParameters,
}

impl<'a> Simulator<'a> {
    pub fn new(enzymes: &'a Enzymes) -> Self {
        Self::with_parameters(enzymes, SimulationParameters::default())
    }

    pub fn with_parameters(enzymes: &'a Enzymes, parameters: SimulationParameters) -> Self {
        Self {
            enzymes,
            parameters,
        }
    }

    /// Products of every step, in step order.
    pub fn simulate(&self, cf: &ConstructionFile) -> Result<Vec<Product>, CfError> {
        Ok(self.simulate_with_journal(cf)?.products)
    }

    /// Simulates the steps strictly in document order. Any failing step
    /// aborts the whole run.
    pub fn simulate_with_journal(&self, cf: &ConstructionFile) -> Result<SimulationReport, CfError> {
        let mut registry = ProductRegistry::new(cf);
        let mut report = SimulationReport::default();
        for (index, step) in cf.steps.iter().enumerate() {
            let mut result = StepResult {
                output: step.output().to_string(),
                length: 0,
                messages: vec![],
                warnings: vec![],
            };
            let sequence = self.simulate_step(step, &registry, &mut result)?;
            result.length = sequence.len();
            if registry.cf.sequences.contains_key(step.output()) {
                result.messages.push(format!(
                    "'{}' shadows the declared sequence of the same name",
                    step.output()
                ));
            }
            registry
                .products
                .insert(step.output().to_string(), sequence.to_owned());
            report
                .products
                .push(NamedSequence::new(step.output(), sequence));
            report.records.push(StepRecord {
                index,
                step: step.to_owned(),
                result,
            });
        }
        Ok(report)
    }

    /// Independent construction files, simulated in parallel. Results keep
    /// the input order.
    pub fn simulate_batch(&self, cfs: &[ConstructionFile]) -> Vec<Result<SimulationReport, CfError>> {
        cfs.par_iter()
            .map(|cf| self.simulate_with_journal(cf))
            .collect()
    }

    fn lookup_enzymes(&self, names: &[String]) -> Result<Vec<&RestrictionEnzyme>, CfError> {
        names
            .iter()
            .map(|name| {
                self.enzymes
                    .get(name)
                    .ok_or_else(|| CfError::UnknownEnzyme {
                        name: name.to_owned(),
                    })
            })
            .collect()
    }

    fn simulate_step(
        &self,
        step: &ConstructionStep,
        registry: &ProductRegistry<'_>,
        result: &mut StepResult,
    ) -> Result<Sequence, CfError> {
        match step {
            ConstructionStep::Pcr {
                forward_oligo,
                reverse_oligo,
                template,
                product_size,
                ..
            } => {
                let forward = registry.resolve(step, forward_oligo)?;
                let reverse = registry.resolve(step, reverse_oligo)?;
                let template = registry.resolve(step, template)?;
                let product = pcr(&forward, &reverse, &template, self.parameters.anneal_length)?;
                result.messages.push(format!(
                    "PCR of '{}' with '{}'/'{}': {} bp",
                    template.name,
                    forward.name,
                    reverse.name,
                    product.len()
                ));
                if let Some(size) = product_size {
                    if *size != product.len() {
                        result.warnings.push(format!(
                            "Expected a {size} bp product, predicted {} bp",
                            product.len()
                        ));
                    }
                }
                Ok(product)
            }
            ConstructionStep::Digest {
                dna,
                enzymes,
                frag_select,
                ..
            } => {
                let dna = registry.resolve(step, dna)?;
                let enzymes = self.lookup_enzymes(enzymes)?;
                let mut fragments = digest_fragments(&dna, &enzymes);
                let names = enzymes.iter().map(|e| e.name.as_str()).collect::<Vec<_>>();
                if fragments.len() == 1 {
                    result.warnings.push(format!(
                        "{} do(es) not cut '{}'",
                        names.join(", "),
                        dna.name
                    ));
                }
                if *frag_select >= fragments.len() {
                    return Err(CfError::FragmentIndex {
                        dna: dna.name,
                        index: *frag_select,
                        count: fragments.len(),
                    });
                }
                result.messages.push(format!(
                    "Digest of '{}' with {}: {} fragment(s), keeping fragment {frag_select}",
                    dna.name,
                    names.join(", "),
                    fragments.len()
                ));
                Ok(fragments.swap_remove(*frag_select))
            }
            ConstructionStep::Ligate { dnas, protocol, .. } => {
                let dnas = registry.resolve_all(step, dnas)?;
                let product = ligate(&dnas, *protocol, self.parameters.ligation_overhang_length)?;
                result.messages.push(match protocol {
                    LigationProtocol::Sticky => {
                        format!("Ligated {} fragment(s) by sticky ends", dnas.len())
                    }
                    LigationProtocol::Blunt => {
                        format!("Joined {} fragment(s) blunt end to end", dnas.len())
                    }
                });
                Ok(product)
            }
            ConstructionStep::Assemble { dnas, enzyme, .. } => {
                let dnas = registry.resolve_all(step, dnas)?;
                let assembly = assemble(&dnas, enzyme, self.enzymes, &self.parameters)?;
                match assembly.method {
                    AssemblyMethod::GoldenGate => result.messages.push(format!(
                        "Golden Gate assembly of {} part(s) with {enzyme}",
                        dnas.len()
                    )),
                    AssemblyMethod::Gibson => {
                        if !ConstructionStep::is_homology_assembly(enzyme) {
                            result.warnings.push(format!(
                                "'{enzyme}' is not a known enzyme; assembled by homology"
                            ));
                        }
                        result.messages.push(format!(
                            "Homology assembly of {} fragment(s) with {} bp overlaps",
                            dnas.len(),
                            self.parameters.homology_length
                        ));
                        if !assembly.circular {
                            result
                                .warnings
                                .push("Homology assembly product is linear".to_string());
                        } else if !self.parameters.require_circular_assembly {
                            result.warnings.push(format!(
                                "Circular product left unclosed; it contains the closing {} bp overlap twice",
                                self.parameters.homology_length
                            ));
                        }
                    }
                }
                Ok(assembly.sequence)
            }
            ConstructionStep::Transform {
                dna,
                strain,
                antibiotics,
                temperature,
                ..
            } => {
                let dna = registry.resolve(step, dna)?;
                let mut message = format!("Transformed '{}' into {strain}", dna.name);
                if !antibiotics.is_empty() {
                    message += &format!(", selecting on {}", antibiotics.join(", "));
                }
                if let Some(temperature) = temperature {
                    message += &format!(" at {temperature}C");
                }
                result.messages.push(message);
                Ok(dna.sequence)
            }
        }
    }
}
