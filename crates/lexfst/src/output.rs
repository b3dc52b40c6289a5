// Output monoids accumulated along transducer paths.

use std::fmt::Debug;
use std::hash::Hash;

/// A value carried on transitions and combined along a path.
///
/// `aggregate` must be associative with `zero()` as its identity; it need
/// not be commutative (string concatenation is not).
pub trait Output: Clone + PartialEq + Debug {
    fn zero() -> Self;

    /// Combine the output accumulated so far with the next transition's.
    fn aggregate(&self, next: &Self) -> Self;
}

/// Outputs the builder can redistribute along shared prefixes.
///
/// Output pushing needs a cancellative operation: after moving `common`
/// toward the root, `subtract` must recover the residue so that
/// `common.aggregate(&x.subtract(&common)) == x` for every `x`.
pub trait PushableOutput: Output + Eq + Hash {
    /// The share of `self` and `other` to keep on a shared arc.
    fn common(&self, other: &Self) -> Self;

    /// What remains of `self` once `prefix` has been accounted for.
    fn subtract(&self, prefix: &Self) -> Self;
}

/// Integer outputs add up along the path. Arithmetic wraps, so partial sums
/// of any order of pushes still yield the exact original value.
impl Output for i32 {
    #[inline]
    fn zero() -> Self {
        0
    }

    #[inline]
    fn aggregate(&self, next: &Self) -> Self {
        self.wrapping_add(*next)
    }
}

impl PushableOutput for i32 {
    #[inline]
    fn common(&self, other: &Self) -> Self {
        *self.min(other)
    }

    #[inline]
    fn subtract(&self, prefix: &Self) -> Self {
        self.wrapping_sub(*prefix)
    }
}

impl Output for String {
    fn zero() -> Self {
        String::new()
    }

    fn aggregate(&self, next: &Self) -> Self {
        let mut out = String::with_capacity(self.len() + next.len());
        out.push_str(self);
        out.push_str(next);
        out
    }
}

impl<E: Clone + PartialEq + Debug> Output for Vec<E> {
    fn zero() -> Self {
        Vec::new()
    }

    fn aggregate(&self, next: &Self) -> Self {
        let mut out = Vec::with_capacity(self.len() + next.len());
        out.extend_from_slice(self);
        out.extend_from_slice(next);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_sum() {
        assert_eq!(i32::zero(), 0);
        assert_eq!(4i32.aggregate(&3130), 3134);
        assert_eq!(i32::MAX.aggregate(&1), i32::MIN);
    }

    #[test]
    fn integer_push_cancels() {
        for (a, b) in [(10i32, 3), (3, 10), (-5, 7), (i32::MIN, i32::MAX)] {
            let common = a.common(&b);
            assert_eq!(common.aggregate(&a.subtract(&common)), a);
            assert_eq!(common.aggregate(&b.subtract(&common)), b);
        }
    }

    #[test]
    fn string_concatenation() {
        let a = String::from("ab");
        assert_eq!(a.aggregate(&String::from("ility")), "ability");
        assert_eq!(String::zero().aggregate(&a), "ab");
    }

    #[test]
    fn vec_concatenation() {
        assert_eq!(vec![1u8, 2].aggregate(&vec![3]), vec![1, 2, 3]);
        assert!(Vec::<u8>::zero().is_empty());
    }
}
