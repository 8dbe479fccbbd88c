use enzymes::Enzymes;
use lazy_static::lazy_static;

pub mod assembly;
pub mod digest;
pub mod dna_sequence;
pub mod engine;
pub mod enzymes;
pub mod error;
pub mod input;
pub mod iupac_code;
pub mod ligate;
pub mod parser;
pub mod pcr;
pub mod restriction_enzyme;

pub use cfsim_protocol::{ConstructionFile, ConstructionStep, LigationProtocol};
pub use engine::{SimulationParameters, SimulationReport, Simulator};
pub use error::{CfError, ErrorCode};

lazy_static! {
    // Built-in restriction enzymes, embedded at compile time
    pub static ref ENZYMES: Enzymes =
        Enzymes::builtin().expect("embedded enzyme table is valid JSON");
}
