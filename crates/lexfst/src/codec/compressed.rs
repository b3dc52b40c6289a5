// Compressed codec: LEB128 varint stream.
//
// States are renumbered by descending in-degree (ties keep original order) so
// frequently referenced targets get short ids. Layout:
//   varint(initial)
//   per state, in new id order:
//     varint((transition count << 1) | final)
//     if count > 1: bitmap, one bit per transition, MSB first, set = nonzero output
//     per transition:
//       varint(symbol - previous symbol)
//       varint(output as u32)   omitted when count > 1 and the bit is clear
//       varint(target)

use log::trace;

use crate::codec::{ByteReader, decode_symbol};
use crate::fst::{Fst, StateDef};
use crate::transition::Transition;
use crate::varint;
use crate::{FstError, Result, StateId};

/// Smallest possible encoding of one transition: symbol delta and target.
const MIN_TRANSITION_LEN: usize = 2;

/// Old id -> new id, most referenced states first.
fn renumber(fst: &Fst<i32>) -> (Vec<StateId>, Vec<StateId>) {
    let count = fst.state_count();
    let mut in_degree = vec![0u32; count];
    for state in 0..count as StateId {
        for t in fst.transitions(state) {
            in_degree[t.target as usize] += 1;
        }
    }

    let mut order: Vec<StateId> = (0..count as StateId).collect();
    order.sort_by(|a, b| in_degree[*b as usize].cmp(&in_degree[*a as usize]));

    let mut new_ids = vec![0; count];
    for (new, &old) in order.iter().enumerate() {
        new_ids[old as usize] = new as StateId;
    }
    (order, new_ids)
}

#[inline]
fn bitmap_len(count: usize) -> usize {
    count.div_ceil(8)
}

pub fn encode(fst: &Fst<i32>) -> Vec<u8> {
    let (order, new_ids) = renumber(fst);
    let mut out = Vec::with_capacity(fst.state_count() + fst.transition_count() * 3);
    varint::write_u32(&mut out, new_ids[fst.initial() as usize]);

    for &old in &order {
        let transitions = fst.transitions(old);
        let count = transitions.len();
        varint::write_u32(
            &mut out,
            ((count as u32) << 1) | u32::from(fst.is_final(old)),
        );

        let with_bitmap = count > 1;
        if with_bitmap {
            let start = out.len();
            out.resize(start + bitmap_len(count), 0);
            for (i, t) in transitions.iter().enumerate() {
                if t.output != 0 {
                    out[start + i / 8] |= 0x80 >> (i % 8);
                }
            }
        }

        let mut previous = 0u32;
        for t in transitions {
            let symbol = t.input as u32;
            varint::write_u32(&mut out, symbol - previous);
            previous = symbol;
            if !with_bitmap || t.output != 0 {
                varint::write_u32(&mut out, t.output as u32);
            }
            varint::write_u32(&mut out, new_ids[t.target as usize]);
        }
    }
    out
}

pub fn decode(data: &[u8]) -> Result<Fst<i32>> {
    let mut reader = ByteReader::new(data);
    let initial = reader.read_varint()?;

    let mut states: Vec<StateDef<i32>> = Vec::new();
    while !reader.is_empty() {
        let id = states.len();
        let header = reader.read_varint()?;
        let count = (header >> 1) as usize;
        let is_final = header & 1 != 0;
        if count * MIN_TRANSITION_LEN > reader.remaining() {
            return Err(FstError::Corrupt(format!(
                "state {id} claims {count} transitions, {} bytes left",
                reader.remaining()
            )));
        }

        let bitmap = if count > 1 {
            Some(reader.take(bitmap_len(count))?)
        } else {
            None
        };

        let mut transitions = Vec::with_capacity(count);
        let mut previous = 0u32;
        for i in 0..count {
            let delta = reader.read_varint()?;
            let symbol = previous.checked_add(delta).ok_or_else(|| {
                FstError::Corrupt(format!("state {id}: symbol delta {delta} overflows"))
            })?;
            previous = symbol;

            let has_output = match bitmap {
                Some(bits) => bits[i / 8] & (0x80 >> (i % 8)) != 0,
                None => true,
            };
            let output = if has_output {
                reader.read_varint()? as i32
            } else {
                0
            };
            let target = reader.read_varint()?;
            transitions.push(Transition::new(decode_symbol(symbol)?, output, target));
        }
        trace!("decoded state {id}: {count} transitions, final={is_final}");
        states.push(StateDef {
            is_final,
            transitions,
        });
    }

    Fst::from_states(initial, states)
}
