// Raw codec: fixed-width little-endian records.
//
// Layout:
//   initial state id                      i32
//   per state, in id order 0..N:
//     state id | 0x4000_0000 if final     i32
//     transition count                    i32
//     count x (input, output, target)     3 x i32

use crate::codec::{ByteReader, decode_symbol};
use crate::fst::{Fst, StateDef};
use crate::transition::{RawStateHeader, RawTransition, Transition};
use crate::{FstError, Result, StateId};

pub fn encode(fst: &Fst<i32>) -> Vec<u8> {
    let size = 4
        + fst.state_count() * size_of::<RawStateHeader>()
        + fst.transition_count() * size_of::<RawTransition>();
    let mut out = Vec::with_capacity(size);
    out.extend_from_slice(&(fst.initial() as i32).to_le_bytes());

    for state in 0..fst.state_count() as StateId {
        let transitions = fst.transitions(state);
        let header = RawStateHeader::new(state, fst.is_final(state), transitions.len());
        out.extend_from_slice(bytemuck::bytes_of(&header));
        for t in transitions {
            out.extend_from_slice(bytemuck::bytes_of(&RawTransition::from_transition(t)));
        }
    }
    out
}

pub fn decode(data: &[u8]) -> Result<Fst<i32>> {
    let mut reader = ByteReader::new(data);
    let initial = reader.read_i32_le()?;
    if initial < 0 {
        return Err(FstError::Corrupt(format!("negative initial state {initial}")));
    }

    let mut states: Vec<StateDef<i32>> = Vec::new();
    while !reader.is_empty() {
        let header: RawStateHeader = reader.read_pod()?;
        let expected = states.len() as u32;
        let id = header.state_id();
        if id < 0 || id as u32 != expected {
            return Err(FstError::StateIdMismatch {
                expected,
                actual: id as u32,
            });
        }

        let count = header.transition_count();
        if count < 0 || count as usize * size_of::<RawTransition>() > reader.remaining() {
            return Err(FstError::Corrupt(format!(
                "state {id} claims {count} transitions, {} bytes left",
                reader.remaining()
            )));
        }

        let mut transitions = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let raw: RawTransition = reader.read_pod()?;
            let target = raw.target();
            if target < 0 {
                return Err(FstError::Corrupt(format!(
                    "state {id} has negative target {target}"
                )));
            }
            transitions.push(Transition::new(
                decode_symbol(raw.input() as u32)?,
                raw.output(),
                target as StateId,
            ));
        }
        states.push(StateDef {
            is_final: header.is_final(),
            transitions,
        });
    }

    Fst::from_states(initial as StateId, states)
}
