pub mod gibson;
pub mod golden_gate;
pub mod sticky_ends;

use crate::{
    dna_sequence::{NamedSequence, Sequence},
    engine::SimulationParameters,
    enzymes::Enzymes,
    error::CfError,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssemblyMethod {
    GoldenGate,
    Gibson,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assembly {
    pub sequence: Sequence,
    pub method: AssemblyMethod,
    pub circular: bool,
}

/// Golden Gate when `enzyme_or_marker` names a known enzyme, homology
/// assembly otherwise.
pub fn assemble(
    dnas: &[NamedSequence],
    enzyme_or_marker: &str,
    enzymes: &Enzymes,
    parameters: &SimulationParameters,
) -> Result<Assembly, CfError> {
    if dnas.is_empty() {
        return Err(CfError::InvalidInput {
            name: enzyme_or_marker.to_string(),
            message: "assembly needs at least one input".to_string(),
        });
    }
    match enzymes.get(enzyme_or_marker) {
        Some(enzyme) => Ok(Assembly {
            sequence: golden_gate::golden_gate(dnas, enzyme)?,
            method: AssemblyMethod::GoldenGate,
            circular: true,
        }),
        None => {
            let product = gibson::gibson(
                dnas,
                parameters.homology_length,
                parameters.require_circular_assembly,
            )?;
            Ok(Assembly {
                sequence: product.sequence,
                method: AssemblyMethod::Gibson,
                circular: product.is_circular,
            })
        }
    }
}
