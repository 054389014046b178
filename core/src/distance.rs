use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Edge weight. Always finite once a graph has been validated.
pub type Weight = f64;

/// Tentative shortest-path length to a vertex.
///
/// `Unreached` stands in for positive infinity. It compares greater than
/// every `Finite` value and serializes as JSON `null`, so nothing downstream
/// depends on IEEE infinity surviving a round trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distance {
    Finite(f64),
    Unreached,
}

impl Distance {
    pub const ZERO: Distance = Distance::Finite(0.0);

    pub fn is_finite(self) -> bool {
        matches!(self, Distance::Finite(_))
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Distance::Finite(d) => Some(d),
            Distance::Unreached => None,
        }
    }

    /// Distance obtained by following an edge of `weight` out of a vertex at
    /// this distance. None when this vertex is unreached or the sum overflows
    /// upward. A sum that overflows downward saturates at `f64::MIN`, so it
    /// still counts as an improvement.
    pub fn extend(self, weight: Weight) -> Option<f64> {
        match self {
            Distance::Finite(d) => Some((d + weight).max(f64::MIN)).filter(|c| c.is_finite()),
            Distance::Unreached => None,
        }
    }

    /// True if `candidate` is strictly shorter than this distance.
    pub fn improved_by(self, candidate: f64) -> bool {
        match self {
            Distance::Finite(d) => candidate < d,
            Distance::Unreached => true,
        }
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Distance::Finite(a), Distance::Finite(b)) => a.partial_cmp(b),
            (Distance::Finite(_), Distance::Unreached) => Some(Ordering::Less),
            (Distance::Unreached, Distance::Finite(_)) => Some(Ordering::Greater),
            (Distance::Unreached, Distance::Unreached) => Some(Ordering::Equal),
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Finite(d) => write!(f, "{}", d),
            Distance::Unreached => f.write_str("∞"),
        }
    }
}

impl Serialize for Distance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Distance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<f64>::deserialize(deserializer)? {
            Some(d) => Distance::Finite(d),
            None => Distance::Unreached,
        })
    }
}
