use crate::{
    assembly::sticky_ends::{StickyFragment, join_circular, order_cycle},
    dna_sequence::{NamedSequence, Sequence},
    error::CfError,
};
use cfsim_protocol::LigationProtocol;

/// Joins fragments that already carry their overhangs.
///
/// `Sticky` reads the first and last `overhang_length` bases of each input
/// as its sticky ends and closes the fragments into one circle following
/// the sticky-end junctions. Palindromic ends are allowed here, as most
/// Type II enzymes leave them. `Blunt` joins the inputs end to end in the
/// order given.
pub fn ligate(
    dnas: &[NamedSequence],
    protocol: LigationProtocol,
    overhang_length: usize,
) -> Result<Sequence, CfError> {
    if dnas.is_empty() {
        return Err(CfError::InvalidInput {
            name: "ligation".to_string(),
            message: "nothing to ligate".to_string(),
        });
    }
    match protocol {
        LigationProtocol::Blunt => Ok(dnas.iter().map(|d| d.sequence.as_str()).collect()),
        LigationProtocol::Sticky => {
            let fragments = dnas
                .iter()
                .map(|d| StickyFragment::from_ends(&d.name, &d.sequence, overhang_length))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(join_circular(&order_cycle(fragments)?))
        }
    }
}
