//! Total-order f64 wrapper.
//!
//! Number literal payloads must be hashable and totally ordered to act as
//! interning keys. Comparison goes through `f64::total_cmp`; hashing uses
//! the bit pattern, with `-0.0` normalized to `0.0` so the two zeros intern
//! to one literal.

/// f64 with `Eq`/`Ord`/`Hash`. Access the raw value through `.0`.
#[derive(Debug, Clone, Copy)]
pub struct OrderedFloat(pub f64);

impl OrderedFloat {
    /// Canonical bit pattern: `-0.0` maps to the bits of `0.0` so the two
    /// zeros hash and intern identically.
    pub fn canonical_bits(self) -> u64 {
        if self.0 == 0.0 {
            0.0f64.to_bits()
        } else {
            self.0.to_bits()
        }
    }
}

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_bits() == other.canonical_bits()
    }
}

impl Eq for OrderedFloat {}

impl PartialOrd for OrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical_bits().hash(state);
    }
}

impl From<f64> for OrderedFloat {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for OrderedFloat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros_collapse() {
        assert_eq!(OrderedFloat(0.0), OrderedFloat(-0.0));
    }

    #[test]
    fn nan_equals_itself() {
        assert_eq!(OrderedFloat(f64::NAN), OrderedFloat(f64::NAN));
    }
}
