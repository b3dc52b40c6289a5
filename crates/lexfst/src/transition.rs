// Transducer transitions: in-memory form and raw on-disk records.

use bytemuck::{Pod, Zeroable};

use crate::StateId;

/// One outgoing transition of an [`crate::Fst`] state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transition<T> {
    pub input: char,
    pub output: T,
    pub target: StateId,
}

impl<T> Transition<T> {
    pub fn new(input: char, output: T, target: StateId) -> Self {
        Self {
            input,
            output,
            target,
        }
    }
}

/// Flag OR-ed into the state id word of a raw state header for final states.
pub const RAW_FINAL_FLAG: i32 = 0x4000_0000;

/// Raw state header (8 bytes): id word and transition count.
///
/// All fields are little-endian on disk; use [`RawStateHeader::new`] and the
/// accessors rather than the fields directly.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct RawStateHeader {
    pub id_and_flags: i32,
    pub transition_count: i32,
}

impl RawStateHeader {
    pub fn new(id: StateId, is_final: bool, transition_count: usize) -> Self {
        let mut word = id as i32;
        if is_final {
            word |= RAW_FINAL_FLAG;
        }
        Self {
            id_and_flags: word.to_le(),
            transition_count: (transition_count as i32).to_le(),
        }
    }

    #[inline]
    pub fn state_id(&self) -> i32 {
        i32::from_le(self.id_and_flags) & !RAW_FINAL_FLAG
    }

    #[inline]
    pub fn is_final(&self) -> bool {
        i32::from_le(self.id_and_flags) & RAW_FINAL_FLAG != 0
    }

    #[inline]
    pub fn transition_count(&self) -> i32 {
        i32::from_le(self.transition_count)
    }
}

/// Raw transition record (12 bytes): input code point, output, target id.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct RawTransition {
    pub input: i32,
    pub output: i32,
    pub target: i32,
}

impl RawTransition {
    pub fn from_transition(t: &Transition<i32>) -> Self {
        Self {
            input: (t.input as i32).to_le(),
            output: t.output.to_le(),
            target: (t.target as i32).to_le(),
        }
    }

    #[inline]
    pub fn input(&self) -> i32 {
        i32::from_le(self.input)
    }

    #[inline]
    pub fn output(&self) -> i32 {
        i32::from_le(self.output)
    }

    #[inline]
    pub fn target(&self) -> i32 {
        i32::from_le(self.target)
    }
}

const _: () = assert!(size_of::<RawStateHeader>() == 8);
const _: () = assert!(size_of::<RawTransition>() == 12);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_final_flag() {
        let h = RawStateHeader::new(7, true, 3);
        assert_eq!(h.state_id(), 7);
        assert!(h.is_final());
        assert_eq!(h.transition_count(), 3);

        let bytes = bytemuck::bytes_of(&h);
        assert_eq!(&bytes[..4], &[0x07, 0x00, 0x00, 0x40]);
        assert_eq!(&bytes[4..], &[0x03, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn header_non_final() {
        let h = RawStateHeader::new(0x123, false, 0);
        assert_eq!(h.state_id(), 0x123);
        assert!(!h.is_final());
    }

    #[test]
    fn transition_layout_is_little_endian() {
        let t = RawTransition::from_transition(&Transition::new('b', -2, 5));
        let bytes = bytemuck::bytes_of(&t);
        assert_eq!(
            bytes,
            &[0x62, 0, 0, 0, 0xFE, 0xFF, 0xFF, 0xFF, 0x05, 0, 0, 0]
        );
        assert_eq!(t.input(), 'b' as i32);
        assert_eq!(t.output(), -2);
        assert_eq!(t.target(), 5);
    }

    #[test]
    fn read_unaligned_record() {
        let mut buf = vec![0u8; 1];
        buf.extend_from_slice(bytemuck::bytes_of(&RawTransition::from_transition(
            &Transition::new('\u{00e4}', 42, 9),
        )));
        let t: RawTransition = bytemuck::pod_read_unaligned(&buf[1..13]);
        assert_eq!(t.input(), 0xE4);
        assert_eq!(t.output(), 42);
        assert_eq!(t.target(), 9);
    }
}
