// Closed code point intervals and range partitioning.

use crate::AutomataError;

/// Largest Unicode scalar value.
pub const MAX_CODE_POINT: u32 = 0x10_FFFF;

/// A closed interval `[start, end]` of code points.
///
/// Ranges are plain values compared by `(start, end)`. The invariant
/// `start <= end` is enforced by every constructor, so an empty range is not
/// representable; operations that may produce "no range" return `Option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CharRange {
    start: u32,
    end: u32,
}

impl CharRange {
    /// The full alphabet, used for "any symbol" transitions.
    pub const ANY: CharRange = CharRange {
        start: 0,
        end: MAX_CODE_POINT,
    };

    /// Create a range, rejecting `end < start`.
    pub fn new(start: u32, end: u32) -> Result<Self, AutomataError> {
        if end < start {
            return Err(AutomataError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Range covering exactly one character.
    pub const fn single(c: char) -> Self {
        Self {
            start: c as u32,
            end: c as u32,
        }
    }

    /// Range between two characters, inclusive on both ends.
    pub fn between(first: char, last: char) -> Result<Self, AutomataError> {
        Self::new(first as u32, last as u32)
    }

    #[inline]
    pub fn start(&self) -> u32 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of code points in the range.
    #[inline]
    pub fn len(&self) -> u64 {
        u64::from(self.end - self.start) + 1
    }

    /// Always `false`; present for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub fn contains(&self, symbol: u32) -> bool {
        self.start <= symbol && symbol <= self.end
    }

    #[inline]
    pub fn contains_char(&self, c: char) -> bool {
        self.contains(c as u32)
    }

    /// Whether `other` lies entirely inside this range.
    #[inline]
    pub fn covers(&self, other: &CharRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    #[inline]
    pub fn overlaps(&self, other: &CharRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// The common part of two ranges, or `None` when they are disjoint.
    pub fn intersect(&self, other: &CharRange) -> Option<CharRange> {
        if !self.overlaps(other) {
            return None;
        }
        Some(CharRange {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }
}

impl std::fmt::Display for CharRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "[{}]", self.start)
        } else {
            write!(f, "[{}-{}]", self.start, self.end)
        }
    }
}

/// Partition a multiset of ranges into the coarsest set of disjoint ranges.
///
/// Every input range is exactly a union of output ranges, and the union of
/// the outputs equals the union of the inputs. The result is sorted
/// ascending. Duplicate and nested inputs are allowed.
///
/// Each start and each `end + 1` is a boundary where the set of covering
/// input ranges changes, so cutting at exactly those points and keeping the
/// covered segments yields the coarsest partition.
pub fn disjoin<I>(ranges: I) -> Vec<CharRange>
where
    I: IntoIterator<Item = CharRange>,
{
    // (position, coverage delta); exclusive ends are widened to avoid
    // overflow at u32::MAX.
    let mut events: Vec<(u64, i64)> = Vec::new();
    for r in ranges {
        events.push((u64::from(r.start), 1));
        events.push((u64::from(r.end) + 1, -1));
    }
    events.sort_unstable();

    let mut out = Vec::new();
    let mut depth: i64 = 0;
    let mut i = 0;
    while i < events.len() {
        let pos = events[i].0;
        while i < events.len() && events[i].0 == pos {
            depth += events[i].1;
            i += 1;
        }
        if depth > 0 && i < events.len() {
            let next = events[i].0;
            out.push(CharRange {
                start: pos as u32,
                end: (next - 1) as u32,
            });
        }
    }
    out
}
