mod prune;

use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Error, Formatter};

use crate::weight::LatticeWeight;

/// An elementary label on one channel of an arc; `0` denotes the empty
/// label.
pub type Label = usize;

/// A weighted transition to `target`, with one label per channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arc<W> {
    pub ilabel: Label,
    pub olabel: Label,
    pub weight: W,
    pub target: usize,
}

/// A weighted lattice over dense states `0..n` with a single start state and
/// a final weight per state (`W::zero()` meaning not final).
///
/// Arcs are stored per source state. Cycles are permitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice<W> {
    start: usize,
    arcs: Vec<Vec<Arc<W>>>,
    finals: Vec<W>,
}

impl<W: Zero> Lattice<W> {
    /// Creates a lattice with `states` states, no arcs and no final states.
    pub fn new(states: usize, start: usize) -> Self {
        assert!(states == 0 || start < states);
        Lattice {
            start,
            arcs: (0..states).map(|_| Vec::new()).collect(),
            finals: (0..states).map(|_| W::zero()).collect(),
        }
    }

    pub fn is_final(&self, state: usize) -> bool {
        !self.finals[state].is_zero()
    }
}

impl<W> Lattice<W> {
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn num_states(&self) -> usize {
        self.arcs.len()
    }

    /// Total number of arcs over all states.
    pub fn num_arcs(&self) -> usize {
        self.arcs.iter().map(|arcs| arcs.len()).sum()
    }

    pub fn arcs(&self, state: usize) -> &[Arc<W>] {
        &self.arcs[state]
    }

    pub fn add_arc(&mut self, source: usize, arc: Arc<W>) {
        assert!(arc.target < self.arcs.len());
        self.arcs[source].push(arc);
    }

    pub fn set_final(&mut self, state: usize, weight: W) {
        self.finals[state] = weight;
    }

    pub fn final_weight(&self, state: usize) -> &W {
        &self.finals[state]
    }
}

impl<W: Zero + Clone> Lattice<W> {
    /// Removes every state that is not both reachable from the start state
    /// and co-reachable to a final state, renumbering the survivors in
    /// ascending order of their old ids.
    ///
    /// The start state itself always survives; a lattice without any
    /// successful path shrinks to a lone non-final start state.
    pub fn connect(&mut self) {
        let n = self.num_states();
        if n == 0 {
            return;
        }

        let mut accessible = vec![false; n];
        let mut stack = vec![self.start];
        accessible[self.start] = true;
        while let Some(state) = stack.pop() {
            for arc in &self.arcs[state] {
                if !accessible[arc.target] {
                    accessible[arc.target] = true;
                    stack.push(arc.target);
                }
            }
        }

        let mut reverse: Vec<Vec<usize>> = (0..n).map(|_| Vec::new()).collect();
        for (source, arcs) in self.arcs.iter().enumerate() {
            for arc in arcs {
                reverse[arc.target].push(source);
            }
        }
        let mut coaccessible = vec![false; n];
        let mut stack: Vec<usize> = (0..n).filter(|&s| self.is_final(s)).collect();
        for &state in &stack {
            coaccessible[state] = true;
        }
        while let Some(state) = stack.pop() {
            for &source in &reverse[state] {
                if !coaccessible[source] {
                    coaccessible[source] = true;
                    stack.push(source);
                }
            }
        }

        let mut remap = vec![usize::max_value(); n];
        let mut kept = 0;
        for state in 0..n {
            if state == self.start || (accessible[state] && coaccessible[state]) {
                remap[state] = kept;
                kept += 1;
            }
        }

        let mut arcs: Vec<Vec<Arc<W>>> = (0..kept).map(|_| Vec::new()).collect();
        let mut finals: Vec<W> = (0..kept).map(|_| W::zero()).collect();
        for state in 0..n {
            if remap[state] == usize::max_value() {
                continue;
            }
            for arc in &self.arcs[state] {
                if accessible[state] && coaccessible[arc.target] {
                    arcs[remap[state]].push(Arc {
                        target: remap[arc.target],
                        ..arc.clone()
                    });
                }
            }
            if accessible[state] && coaccessible[state] {
                finals[remap[state]] = self.finals[state].clone();
            }
        }

        self.start = remap[self.start];
        self.arcs = arcs;
        self.finals = finals;
    }
}

impl Lattice<LatticeWeight> {
    /// Rescales every arc and final weight componentwise.
    pub fn scale(&mut self, graph_scale: f64, acoustic_scale: f64) {
        for arcs in &mut self.arcs {
            for arc in arcs {
                arc.weight = arc.weight.scale(graph_scale, acoustic_scale);
            }
        }
        for weight in &mut self.finals {
            *weight = weight.scale(graph_scale, acoustic_scale);
        }
    }
}

impl<W: Zero + Display> Display for Lattice<W> {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        writeln!(f, "start: {}", self.start)?;
        for (source, arcs) in self.arcs.iter().enumerate() {
            for arc in arcs {
                writeln!(
                    f,
                    "{} → {} [{}:{}] # {}",
                    source, arc.target, arc.ilabel, arc.olabel, arc.weight
                )?;
            }
        }
        for (state, weight) in self.finals.iter().enumerate() {
            if !weight.is_zero() {
                writeln!(f, "final: {} # {}", state, weight)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Arc, Lattice};
    use crate::weight::LatticeWeight;
    use num_traits::One;

    fn arc(target: usize, label: usize, weight: LatticeWeight) -> Arc<LatticeWeight> {
        Arc {
            ilabel: label,
            olabel: label,
            weight,
            target,
        }
    }

    #[test]
    fn test_connect_removes_dead_states() {
        // 0 → 1 → 3 (final); 2 is a dead end, 4 is unreachable.
        let mut lattice: Lattice<LatticeWeight> = Lattice::new(5, 0);
        lattice.add_arc(0, arc(1, 1, LatticeWeight::one()));
        lattice.add_arc(0, arc(2, 2, LatticeWeight::one()));
        lattice.add_arc(1, arc(3, 3, LatticeWeight::one()));
        lattice.add_arc(4, arc(3, 4, LatticeWeight::one()));
        lattice.set_final(3, LatticeWeight::one());

        lattice.connect();

        assert_eq!(lattice.num_states(), 3);
        assert_eq!(lattice.start(), 0);
        assert_eq!(lattice.num_arcs(), 2);
        assert!(lattice.is_final(2));
    }

    #[test]
    fn test_connect_keeps_lone_start() {
        let mut lattice: Lattice<LatticeWeight> = Lattice::new(3, 0);
        lattice.add_arc(0, arc(1, 1, LatticeWeight::one()));
        lattice.add_arc(1, arc(2, 2, LatticeWeight::one()));

        lattice.connect();

        assert_eq!(lattice.num_states(), 1);
        assert_eq!(lattice.start(), 0);
        assert_eq!(lattice.num_arcs(), 0);
        assert!(!lattice.is_final(0));
    }

    #[test]
    fn test_scale_round_trip() {
        let mut lattice: Lattice<LatticeWeight> = Lattice::new(2, 0);
        lattice.add_arc(0, arc(1, 1, LatticeWeight::new(1.0, 2.0)));
        lattice.set_final(1, LatticeWeight::new(0.5, 4.0));
        let original = lattice.clone();

        lattice.scale(2.0, 4.0);
        assert_eq!(lattice.arcs(0)[0].weight, LatticeWeight::new(2.0, 8.0));

        lattice.scale(0.5, 0.25);
        assert_eq!(lattice, original);
    }
}
