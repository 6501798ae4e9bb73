use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign},
    str::FromStr,
};

use fraction::Fraction;

use super::{
    fraction_tools::{dot_count, parts, tuplet_factor, zero},
    DurationError, DurationResult, MAX_DOTS,
};

const BASE_NAMES: [(&str, u64, u64); 8] = [
    ("breve", 2, 1),
    ("whole", 1, 1),
    ("half", 1, 2),
    ("quarter", 1, 4),
    ("eighth", 1, 8),
    ("sixteenth", 1, 16),
    ("thirty-second", 1, 32),
    ("sixty-fourth", 1, 64),
];
const DOT_NAMES: [(&str, u8); 3] =
    [("triple dotted", 3), ("double dotted", 2), ("dotted", 1)];
/// name, actual, normal
const TUPLET_NAMES: [(&str, u64, u64); 4] = [
    ("triplet", 3, 2),
    ("quintuplet", 5, 4),
    ("sextuplet", 6, 4),
    ("septuplet", 7, 4),
];

/// Strictly positive length of musical time, in whole notes.
///
/// Kept as reduced fraction, so `2/8` and `1/4` are the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration {
    fraction: Fraction,
}
impl Duration {
    /// # Example
    ///
    /// ```
    /// # use score_dom::primitives::Duration;
    /// assert_eq!(Duration::new(2, 8).unwrap(), Duration::quarter());
    /// assert!(Duration::new(0, 8).is_err());
    /// ```
    pub fn new(numerator: u64, denominator: u64) -> DurationResult<Self> {
        if numerator == 0 || denominator == 0 {
            return Err(DurationError::Arithmetic(format!(
                "duration should be positive, got {}/{}",
                numerator, denominator
            )));
        }
        Ok(Self::unchecked(numerator, denominator))
    }
    fn unchecked(numerator: u64, denominator: u64) -> Self {
        Self {
            fraction: Fraction::new(numerator, denominator),
        }
    }
    pub fn from_fraction(fraction: Fraction) -> DurationResult<Self> {
        match parts(&fraction) {
            Some((n, d)) if n > 0 && !fraction.is_sign_negative() => {
                Self::new(n, d)
            }
            _ => Err(DurationError::Arithmetic(format!(
                "duration should be positive, got {}",
                fraction
            ))),
        }
    }

    pub fn breve() -> Self {
        Self::unchecked(2, 1)
    }
    pub fn whole() -> Self {
        Self::unchecked(1, 1)
    }
    pub fn half() -> Self {
        Self::unchecked(1, 2)
    }
    pub fn quarter() -> Self {
        Self::unchecked(1, 4)
    }
    pub fn eighth() -> Self {
        Self::unchecked(1, 8)
    }
    pub fn sixteenth() -> Self {
        Self::unchecked(1, 16)
    }
    pub fn thirty_second() -> Self {
        Self::unchecked(1, 32)
    }
    pub fn sixty_fourth() -> Self {
        Self::unchecked(1, 64)
    }
    pub fn quarter_triplet() -> Self {
        Self::unchecked(1, 6)
    }
    pub fn eighth_triplet() -> Self {
        Self::unchecked(1, 12)
    }
    pub fn sixteenth_triplet() -> Self {
        Self::unchecked(1, 24)
    }

    pub fn as_fraction(&self) -> Fraction {
        self.fraction
    }
    pub fn numerator(&self) -> u64 {
        self.parts().0
    }
    pub fn denominator(&self) -> u64 {
        self.parts().1
    }
    fn parts(&self) -> (u64, u64) {
        // constructors never keep zero, NaN or infinite values.
        parts(&self.fraction).unwrap_or((1, 1))
    }

    pub fn is_longer_than(&self, other: &Duration) -> bool {
        self > other
    }
    pub fn is_shorter_than(&self, other: &Duration) -> bool {
        self < other
    }

    /// Subtract, failing when the result is not strictly positive.
    pub fn checked_sub(&self, other: &Duration) -> DurationResult<Self> {
        let result = self.fraction - other.fraction;
        if result <= zero() {
            return Err(DurationError::Arithmetic(format!(
                "{} - {} is not a positive duration",
                self, other
            )));
        }
        Self::from_fraction(result)
    }
    pub fn multiply(
        &self,
        numerator: u64,
        denominator: u64,
    ) -> DurationResult<Self> {
        let factor = Self::new(numerator, denominator)?;
        Self::from_fraction(self.fraction * factor.fraction)
    }
    fn scaled(&self, numerator: u64, denominator: u64) -> Self {
        Self {
            fraction: self.fraction * Fraction::new(numerator, denominator),
        }
    }

    /// Value of this duration without its dots, and the amount of dots.
    ///
    /// None if the value can not be expressed as dotted base value.
    pub fn undotted(&self) -> Option<(Duration, u8)> {
        let (n, d) = self.parts();
        match dot_count(n)? {
            0 => Some((*self, 0)),
            dots => Some((Self::unchecked(1_u64 << dots, d), dots)),
        }
    }
    pub fn dots(&self) -> u8 {
        self.undotted().map(|(_, dots)| dots).unwrap_or(0)
    }
    /// Treat self as undotted base value and apply the dots to it.
    pub fn with_dots(&self, dots: u8) -> DurationResult<Self> {
        if dots > MAX_DOTS {
            return Err(DurationError::Arithmetic(format!(
                "no more than {} dots allowed, got {}",
                MAX_DOTS, dots
            )));
        }
        let low = 1_u64 << dots;
        Ok(self.scaled(2 * low - 1, low))
    }
    /// Add one more dot to (possibly already dotted) value.
    ///
    /// # Example
    ///
    /// ```
    /// # use score_dom::primitives::Duration;
    /// let dotted = Duration::quarter().add_dot().unwrap();
    /// assert_eq!(dotted, Duration::new(3, 8).unwrap());
    /// assert_eq!(dotted.add_dot().unwrap(), Duration::new(7, 16).unwrap());
    /// ```
    pub fn add_dot(&self) -> DurationResult<Self> {
        let (base, dots) = self.undotted().ok_or_else(|| {
            DurationError::Arithmetic(format!(
                "{} can not be dotted further",
                self
            ))
        })?;
        base.with_dots(dots + 1)
    }
    /// Length of one element of `actual` played in time of `normal`.
    pub fn tuplet(&self, actual: u64, normal: u64) -> DurationResult<Self> {
        self.multiply(normal, actual)
    }

    /// Sum of durations, None for the empty iterator.
    pub fn sum_of(durations: impl IntoIterator<Item = Duration>) -> Option<Self> {
        durations.into_iter().reduce(|a, b| a + b)
    }

    /// Canonical name, like "dotted quarter" or "eighth triplet".
    pub fn name(&self) -> Option<String> {
        let (_, d) = self.parts();
        let (plain, tuplet) = match tuplet_factor(d) {
            1 => (*self, None),
            factor => {
                let (name, actual, normal) = TUPLET_NAMES
                    .iter()
                    .find(|(_, actual, _)| *actual == factor)?;
                (self.scaled(*actual, *normal), Some(*name))
            }
        };
        let (base, dots) = plain.undotted()?;
        let (base_name, _, _) = BASE_NAMES
            .iter()
            .find(|(_, n, d)| base.parts() == (*n, *d))?;
        let mut name = String::new();
        if dots > 0 {
            let (prefix, _) =
                DOT_NAMES.iter().find(|(_, count)| *count == dots)?;
            name.push_str(prefix);
            name.push(' ');
        }
        name.push_str(base_name);
        if let Some(tuplet) = tuplet {
            name.push(' ');
            name.push_str(tuplet);
        }
        Some(name)
    }
}
impl Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (n, d) = self.parts();
        write!(f, "{}/{}", n, d)
    }
}
impl From<Duration> for Fraction {
    fn from(value: Duration) -> Self {
        value.fraction
    }
}
impl Add for Duration {
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            fraction: self.fraction + rhs.fraction,
        }
    }
    type Output = Self;
}
impl FromStr for Duration {
    type Err = DurationError;

    /// Parse names like "quarter", "dotted half note" or
    /// "eighth-note triplet".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || DurationError::Parse(s.to_string());
        let normalized = s
            .to_lowercase()
            .replace('-', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let mut rest = normalized.as_str();

        let mut dots = 0;
        for (prefix, count) in DOT_NAMES {
            if let Some(tail) = rest.strip_prefix(prefix) {
                if let Some(tail) = tail.strip_prefix(' ') {
                    rest = tail;
                    dots = count;
                    break;
                }
            }
        }
        let mut tuplet = None;
        for (suffix, actual, normal) in TUPLET_NAMES {
            if let Some(head) = rest.strip_suffix(suffix) {
                if let Some(head) = head.strip_suffix(' ') {
                    rest = head;
                    tuplet = Some((actual, normal));
                    break;
                }
            }
        }
        if let Some(head) = rest.strip_suffix(" note") {
            rest = head;
        }
        let (_, n, d) = BASE_NAMES
            .iter()
            .find(|(name, _, _)| name.replace('-', " ") == rest)
            .ok_or_else(err)?;
        let mut duration = Self::unchecked(*n, *d).with_dots(dots)?;
        if let Some((actual, normal)) = tuplet {
            duration = duration.tuplet(actual, normal)?;
        }
        Ok(duration)
    }
}

/// Non-negative distance from the start of a measure or of the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Offset {
    fraction: Fraction,
}
impl Offset {
    pub fn zero() -> Self {
        Self { fraction: zero() }
    }
    pub fn new(numerator: u64, denominator: u64) -> DurationResult<Self> {
        if denominator == 0 {
            return Err(DurationError::Arithmetic(format!(
                "offset {}/0 has no value",
                numerator
            )));
        }
        Ok(Self {
            fraction: Fraction::new(numerator, denominator),
        })
    }
    pub fn from_fraction(fraction: Fraction) -> DurationResult<Self> {
        match parts(&fraction) {
            Some((n, d)) if !fraction.is_sign_negative() || n == 0 => {
                Self::new(n, d)
            }
            _ => Err(DurationError::Arithmetic(format!(
                "offset should not be negative, got {}",
                fraction
            ))),
        }
    }
    pub fn as_fraction(&self) -> Fraction {
        self.fraction
    }
    pub fn is_zero(&self) -> bool {
        self.fraction == zero()
    }
    /// Distance from `earlier` to self, None if self is not later.
    pub fn duration_since(&self, earlier: &Offset) -> Option<Duration> {
        Duration::from_fraction(self.fraction - earlier.fraction).ok()
    }
}
impl Default for Offset {
    fn default() -> Self {
        Self::zero()
    }
}
impl Display for Offset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match parts(&self.fraction) {
            Some((n, d)) => write!(f, "{}/{}", n, d),
            None => write!(f, "{}", self.fraction),
        }
    }
}
impl From<Duration> for Offset {
    fn from(value: Duration) -> Self {
        Self {
            fraction: value.fraction,
        }
    }
}
impl Add<Duration> for Offset {
    fn add(self, rhs: Duration) -> Self::Output {
        Self {
            fraction: self.fraction + rhs.fraction,
        }
    }
    type Output = Self;
}
impl Add for Offset {
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            fraction: self.fraction + rhs.fraction,
        }
    }
    type Output = Self;
}
impl AddAssign<Duration> for Offset {
    fn add_assign(&mut self, rhs: Duration) {
        self.fraction = self.fraction + rhs.fraction;
    }
}
impl Sum<Duration> for Offset {
    fn sum<I: Iterator<Item = Duration>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, d| acc + d)
    }
}
impl PartialEq<Duration> for Offset {
    fn eq(&self, other: &Duration) -> bool {
        self.fraction == other.fraction
    }
}
impl PartialOrd<Duration> for Offset {
    fn partial_cmp(&self, other: &Duration) -> Option<std::cmp::Ordering> {
        self.fraction.partial_cmp(&other.fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::{Duration, Offset};
    use crate::primitives::DurationError;

    #[test]
    fn arithmetic() {
        let quarter = Duration::quarter();
        assert_eq!(quarter + quarter, Duration::half());
        assert_eq!(
            Duration::half().checked_sub(&quarter).unwrap(),
            Duration::quarter()
        );
        assert!(matches!(
            quarter.checked_sub(&quarter),
            Err(DurationError::Arithmetic(_))
        ));
        assert_eq!(
            Duration::half().multiply(2, 3).unwrap(),
            Duration::new(1, 3).unwrap()
        );
        assert!(Duration::half().multiply(0, 3).is_err());
        assert!(Duration::eighth().is_shorter_than(&quarter));
        assert_eq!(
            Duration::sum_of(vec![quarter; 4]),
            Some(Duration::whole())
        );
        assert_eq!(Duration::sum_of(Vec::new()), None);
    }

    #[test]
    fn dots_and_tuplets() {
        let half = Duration::half();
        assert_eq!(half.with_dots(1).unwrap(), Duration::new(3, 4).unwrap());
        assert_eq!(half.with_dots(2).unwrap(), Duration::new(7, 8).unwrap());
        assert!(half.with_dots(6).is_err());
        assert_eq!(half.with_dots(5).unwrap().dots(), 5);
        assert!(half.with_dots(5).unwrap().add_dot().is_err());
        assert_eq!(
            Duration::eighth().tuplet(3, 2).unwrap(),
            Duration::eighth_triplet()
        );
        assert!(Duration::new(5, 8).unwrap().add_dot().is_err());
    }

    #[test]
    fn names() {
        for name in [
            "whole",
            "dotted quarter",
            "double dotted half",
            "eighth triplet",
            "sixteenth quintuplet",
            "thirty-second",
            "breve",
        ] {
            let duration: Duration = name.parse().unwrap();
            assert_eq!(duration.name().as_deref(), Some(name));
        }
        assert_eq!(
            "Eighth-note triplet".parse::<Duration>().unwrap(),
            Duration::eighth_triplet()
        );
        assert_eq!(
            "quarter sextuplet".parse::<Duration>().unwrap(),
            Duration::new(1, 6).unwrap()
        );
        assert_eq!(
            "dotted breve".parse::<Duration>().unwrap(),
            Duration::new(3, 1).unwrap()
        );
        assert!(matches!(
            "crotchet".parse::<Duration>(),
            Err(DurationError::Parse(_))
        ));
        assert_eq!(Duration::new(5, 8).unwrap().name(), None);
    }

    #[test]
    fn offsets() {
        let mut offset = Offset::zero();
        assert!(offset.is_zero());
        offset += Duration::quarter();
        offset += Duration::eighth();
        assert_eq!(offset, Offset::new(3, 8).unwrap());
        assert!(offset < Duration::half());
        assert_eq!(
            Offset::from(Duration::half()).duration_since(&offset),
            Some(Duration::eighth())
        );
        assert_eq!(offset.duration_since(&offset), None);
        let total: Offset = vec![Duration::half(); 2].into_iter().sum();
        assert_eq!(total, Duration::whole());
    }
}
