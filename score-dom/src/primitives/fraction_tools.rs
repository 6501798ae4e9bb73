//! Tools for treating fractions as musical lengths.

use std::collections::VecDeque;

use fraction::Fraction;

pub(crate) fn zero() -> Fraction {
    Fraction::new(0_u64, 1_u64)
}

pub fn is_power_of_two(num: u64) -> bool {
    num != 0 && num & (num - 1) == 0
}

/// Odd part of the denominator: 1 for plain lengths, 3 for triplets etc.
pub fn tuplet_factor(denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    denominator >> denominator.trailing_zeros()
}

/// Amount of dots encoded by numerator of a reduced fraction.
///
/// Dotted values have numerators of form `2^(k+1) - 1`: 3 is one dot,
/// 7 is two dots, etc. Numerators 1 and 2 are plain values.
pub fn dot_count(numerator: u64) -> Option<u8> {
    match numerator {
        1 | 2 => Some(0),
        n if n > 2 && is_power_of_two(n + 1) => {
            Some((n + 1).trailing_zeros() as u8 - 1)
        }
        _ => None,
    }
}

pub(crate) fn parts(frac: &Fraction) -> Option<(u64, u64)> {
    Some((*frac.numer()?, *frac.denom()?))
}

/// Split complex fraction by simple fractions, that could be interpreted as
/// musical lengths.
///
/// Every part has a power of two as numerator.
///
/// # Returns
///
/// Fractions, started with the smallest, up to the largest.
///
/// # Example
///
/// ```
/// # use fraction::Fraction;
/// # use score_dom::primitives::normalize_fraction;
/// assert_eq!(
///     normalize_fraction(Fraction::new(13u64, 16u64)),
///         vec![
///             Fraction::new(1u64, 16u64),
///             Fraction::new(1u64, 4u64),
///             Fraction::new(1u64, 2u64)
///         ]
/// );
/// ```
pub fn normalize_fraction(frac: Fraction) -> VecDeque<Fraction> {
    let mut head = VecDeque::new();
    let (num, den) = match parts(&frac) {
        Some(p) => p,
        None => return head,
    };
    for bit in 0..u64::BITS {
        let part = 1_u64 << bit;
        if part > num {
            break;
        }
        if num & part != 0 {
            head.push_back(Fraction::new(part, den));
        }
    }
    head
}

#[cfg(test)]
mod tests {
    use fraction::Fraction;

    use super::{dot_count, is_power_of_two, normalize_fraction, tuplet_factor};

    #[test]
    fn test_normalize_fraction() {
        assert_eq!(
            normalize_fraction(Fraction::new(5u64, 8u64)),
            vec![Fraction::new(1u64, 8u64), Fraction::new(1u64, 2u64)]
        );
        assert_eq!(
            normalize_fraction(Fraction::new(3u64, 12u64)),
            vec![Fraction::new(1u64, 4u64)]
        );
        assert_eq!(
            normalize_fraction(Fraction::new(5u64, 12u64)),
            vec![Fraction::new(1u64, 12u64), Fraction::new(1u64, 3u64)]
        );
        assert!(normalize_fraction(Fraction::new(0u64, 1u64)).is_empty());
    }

    #[test]
    fn test_dots_and_tuplets() {
        assert!(is_power_of_two(64));
        assert!(!is_power_of_two(0));
        assert!(!is_power_of_two(12));
        assert_eq!(dot_count(1), Some(0));
        assert_eq!(dot_count(3), Some(1));
        assert_eq!(dot_count(7), Some(2));
        assert_eq!(dot_count(63), Some(5));
        assert_eq!(dot_count(5), None);
        assert_eq!(tuplet_factor(16), 1);
        assert_eq!(tuplet_factor(12), 3);
        assert_eq!(tuplet_factor(20), 5);
    }
}
