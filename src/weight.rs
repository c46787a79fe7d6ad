use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Error, Formatter};
use std::ops::{Add, Mul};

/// A recognition score with a graph cost and an acoustic cost component.
///
/// Multiplication concatenates paths (componentwise addition of costs) and
/// addition keeps the cheaper of two weights, so this is a tropical semiring
/// over cost pairs. `zero` (both components infinite) marks states that are
/// not final and paths that do not exist.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeWeight {
    pub graph: f64,
    pub acoustic: f64,
}

impl LatticeWeight {
    pub fn new(graph: f64, acoustic: f64) -> Self {
        LatticeWeight { graph, acoustic }
    }

    /// The combined cost of both components.
    pub fn total(&self) -> f64 {
        self.graph + self.acoustic
    }

    /// Multiplies the graph component by `graph_scale` and the acoustic
    /// component by `acoustic_scale`.
    pub fn scale(&self, graph_scale: f64, acoustic_scale: f64) -> Self {
        LatticeWeight {
            graph: self.graph * graph_scale,
            acoustic: self.acoustic * acoustic_scale,
        }
    }
}

impl Eq for LatticeWeight {}

impl PartialOrd for LatticeWeight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.total().partial_cmp(&other.total()) {
            Some(Ordering::Equal) => self.graph.partial_cmp(&other.graph),
            ordering => ordering,
        }
    }
}

/// Weights are ordered by total cost, ties broken by the graph component;
/// a NaN component sorts behind every proper weight.
impl Ord for LatticeWeight {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.partial_cmp(other) {
            Some(ordering) => ordering,
            None => {
                if self.total().is_nan() {
                    if other.total().is_nan() {
                        Ordering::Equal
                    } else {
                        Ordering::Greater
                    }
                } else {
                    Ordering::Less
                }
            }
        }
    }
}

impl Mul for LatticeWeight {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        LatticeWeight {
            graph: self.graph + other.graph,
            acoustic: self.acoustic + other.acoustic,
        }
    }
}

impl Add for LatticeWeight {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        if self <= other {
            self
        } else {
            other
        }
    }
}

impl One for LatticeWeight {
    fn one() -> Self {
        LatticeWeight {
            graph: 0.0,
            acoustic: 0.0,
        }
    }
}

impl Zero for LatticeWeight {
    fn zero() -> Self {
        LatticeWeight {
            graph: f64::INFINITY,
            acoustic: f64::INFINITY,
        }
    }

    fn is_zero(&self) -> bool {
        self.graph == f64::INFINITY && self.acoustic == f64::INFINITY
    }
}

impl Display for LatticeWeight {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "{},{}", self.graph, self.acoustic)
    }
}
