use num_traits::Zero;
use std::collections::VecDeque;

use super::Lattice;
use crate::weight::LatticeWeight;

impl Lattice<LatticeWeight> {
    /// Removes every arc and final weight that lies on no path whose total
    /// cost is within `beam` of the best path cost, then trims unreachable
    /// states.
    pub fn prune(&mut self, beam: f64) {
        let n = self.num_states();
        if n == 0 {
            return;
        }

        let forward = self.distances(false);
        let backward = self.distances(true);
        let best = backward[self.start];
        if !best.is_finite() {
            // no successful path at all
            for arcs in &mut self.arcs {
                arcs.clear();
            }
            for weight in &mut self.finals {
                *weight = LatticeWeight::zero();
            }
            self.connect();
            return;
        }

        let cutoff = best + beam;
        for state in 0..n {
            let from_start = forward[state];
            self.arcs[state]
                .retain(|arc| from_start + arc.weight.total() + backward[arc.target] <= cutoff);
            if self.is_final(state) && from_start + self.finals[state].total() > cutoff {
                self.finals[state] = LatticeWeight::zero();
            }
        }
        self.connect();
    }

    /// Best total cost from the start state to each state (`backward ==
    /// false`), or from each state to a final state with the final weight
    /// included (`backward == true`). Unreachable states get infinity.
    fn distances(&self, backward: bool) -> Vec<f64> {
        let n = self.num_states();
        let mut edges: Vec<Vec<(usize, f64)>> = (0..n).map(|_| Vec::new()).collect();
        for source in 0..n {
            for arc in &self.arcs[source] {
                let cost = arc.weight.total();
                if backward {
                    edges[arc.target].push((source, cost));
                } else {
                    edges[source].push((arc.target, cost));
                }
            }
        }

        let mut distance = vec![f64::INFINITY; n];
        let mut queue = VecDeque::new();
        if backward {
            for state in 0..n {
                if self.is_final(state) {
                    distance[state] = self.finals[state].total();
                    queue.push_back(state);
                }
            }
        } else {
            distance[self.start] = 0.0;
            queue.push_back(self.start);
        }

        while let Some(state) = queue.pop_front() {
            let base = distance[state];
            for &(next, cost) in &edges[state] {
                if base + cost < distance[next] {
                    distance[next] = base + cost;
                    queue.push_back(next);
                }
            }
        }
        distance
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Arc, Lattice};
    use crate::weight::LatticeWeight;
    use num_traits::One;

    fn arc(target: usize, label: usize, total: f64) -> Arc<LatticeWeight> {
        Arc {
            ilabel: label,
            olabel: label,
            weight: LatticeWeight::new(total, 0.0),
            target,
        }
    }

    /// Diamond with a cheap branch (total 2) and an expensive branch
    /// (total 11).
    fn diamond() -> Lattice<LatticeWeight> {
        let mut lattice = Lattice::new(4, 0);
        lattice.add_arc(0, arc(1, 1, 1.0));
        lattice.add_arc(0, arc(2, 2, 10.0));
        lattice.add_arc(1, arc(3, 3, 1.0));
        lattice.add_arc(2, arc(3, 4, 1.0));
        lattice.set_final(3, LatticeWeight::one());
        lattice
    }

    #[test]
    fn test_prune_drops_out_of_beam_branch() {
        let mut lattice = diamond();
        lattice.prune(5.0);

        assert_eq!(lattice.num_states(), 3);
        assert_eq!(lattice.num_arcs(), 2);
        assert_eq!(lattice.arcs(0)[0].ilabel, 1);
    }

    #[test]
    fn test_prune_keeps_everything_within_wide_beam() {
        let mut lattice = diamond();
        lattice.prune(20.0);

        assert_eq!(lattice.num_states(), 4);
        assert_eq!(lattice.num_arcs(), 4);
    }

    #[test]
    fn test_prune_without_successful_path() {
        let mut lattice: Lattice<LatticeWeight> = Lattice::new(3, 0);
        lattice.add_arc(0, arc(1, 1, 1.0));
        lattice.add_arc(1, arc(2, 2, 1.0));

        lattice.prune(10.0);

        assert_eq!(lattice.num_states(), 1);
        assert_eq!(lattice.num_arcs(), 0);
    }
}
