use fnv::FnvHashSet;
use num_traits::{One, Zero};
use std::ops::Mul;

use crate::lattice::{Arc, Label, Lattice};
use crate::registry::SequenceRegistry;

/// The arc channel that delimiter matching and the length bound apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchChannel {
    Input,
    Output,
}

impl MatchChannel {
    fn select<W>(self, arc: &Arc<W>) -> Label {
        match self {
            MatchChannel::Input => arc.ilabel,
            MatchChannel::Output => arc.olabel,
        }
    }
}

/// A partial word: a path that started at the boundary state `origin` and
/// currently stands at `current`, with the product of the traversed weights
/// and the non-empty labels collected on each channel.
struct FrontierEntry<W> {
    origin: usize,
    current: usize,
    weight: W,
    iseq: Vec<Label>,
    oseq: Vec<Label>,
}

fn singleton(label: Label) -> Vec<Label> {
    if label == 0 {
        Vec::new()
    } else {
        vec![label]
    }
}

/// Collapses every run of arcs between delimiter crossings into a single
/// word arc.
///
/// The output lattice shares the input's state set (trimmed afterwards) and
/// final weights. Arcs whose matched-channel label is a delimiter are kept
/// as they are, carrying singleton sequence codes; every other output arc
/// stands for one maximal delimiter-free path between two word-boundary
/// states, carrying the codes of the collected label sequences and the
/// product of the path's weights. Paths whose matched-channel sequence
/// would grow beyond `max_length` are abandoned.
///
/// Distinct paths between the same pair of states are never merged, so the
/// caller is expected to keep the input narrow (pruning) and `max_length`
/// bounded. Without any delimiter in the lattice this degenerates to full
/// path enumeration from the start state.
pub fn expand<W>(
    lat: &Lattice<W>,
    delimiters: &FnvHashSet<Label>,
    channel: MatchChannel,
    max_length: usize,
    registry: &mut SequenceRegistry,
) -> Lattice<W>
where
    W: Copy + Mul<Output = W> + One + Zero,
{
    let n = lat.num_states();
    if n == 0 {
        return Lattice::new(0, 0);
    }

    let mut out = Lattice::new(n, lat.start());
    for state in 0..n {
        out.set_final(state, *lat.final_weight(state));
    }

    // Word-boundary states: the start state and every state entered through
    // a delimiter arc. Delimiter arcs themselves survive unchanged, modulo
    // relabeling with singleton sequence codes.
    let mut boundaries = FnvHashSet::default();
    boundaries.insert(lat.start());
    for state in 0..n {
        for arc in lat.arcs(state) {
            if delimiters.contains(&channel.select(arc)) {
                let ilabel = registry.code_of(singleton(arc.ilabel));
                let olabel = registry.code_of(singleton(arc.olabel));
                out.add_arc(
                    state,
                    Arc {
                        ilabel,
                        olabel,
                        weight: arc.weight,
                        target: arc.target,
                    },
                );
                boundaries.insert(arc.target);
            }
        }
    }

    // Code assignment follows traversal order; seeding the stack in state
    // order keeps it reproducible.
    let mut seeds: Vec<usize> = boundaries.into_iter().collect();
    seeds.sort_unstable();
    let mut stack: Vec<FrontierEntry<W>> = seeds
        .into_iter()
        .map(|state| FrontierEntry {
            origin: state,
            current: state,
            weight: W::one(),
            iseq: Vec::new(),
            oseq: Vec::new(),
        })
        .collect();

    while let Some(FrontierEntry {
        origin,
        current,
        weight,
        iseq,
        oseq,
    }) = stack.pop()
    {
        let mut has_delimiter_arc = false;
        for arc in lat.arcs(current) {
            let match_label = channel.select(arc);
            if delimiters.contains(&match_label) {
                has_delimiter_arc = true;
                continue;
            }
            let matched = match channel {
                MatchChannel::Input => iseq.len(),
                MatchChannel::Output => oseq.len(),
            };
            let length = matched + if match_label == 0 { 0 } else { 1 };
            if length <= max_length {
                let mut iseq_next = iseq.clone();
                if arc.ilabel != 0 {
                    iseq_next.push(arc.ilabel);
                }
                let mut oseq_next = oseq.clone();
                if arc.olabel != 0 {
                    oseq_next.push(arc.olabel);
                }
                stack.push(FrontierEntry {
                    origin,
                    current: arc.target,
                    weight: weight * arc.weight,
                    iseq: iseq_next,
                    oseq: oseq_next,
                });
            }
        }

        // A word ends where another word may begin or the lattice ends.
        // Zero-length words (origin == current) are never emitted.
        if origin != current && (has_delimiter_arc || lat.is_final(current)) {
            let ilabel = registry.code_of(iseq);
            let olabel = registry.code_of(oseq);
            out.add_arc(
                origin,
                Arc {
                    ilabel,
                    olabel,
                    weight,
                    target: current,
                },
            );
        }
    }

    out.connect();
    out
}

#[cfg(test)]
mod tests {
    use super::{expand, MatchChannel};
    use crate::lattice::{Arc, Lattice};
    use crate::registry::SequenceRegistry;
    use crate::weight::LatticeWeight;
    use fnv::FnvHashSet;
    use num_traits::One;

    #[test]
    fn test_no_delimiters_enumerates_full_paths() {
        // 0 → 1 → 2 (final) collapses into a single two-character word arc.
        let mut lattice: Lattice<LatticeWeight> = Lattice::new(3, 0);
        lattice.add_arc(
            0,
            Arc {
                ilabel: 1,
                olabel: 1,
                weight: LatticeWeight::new(1.0, 0.0),
                target: 1,
            },
        );
        lattice.add_arc(
            1,
            Arc {
                ilabel: 2,
                olabel: 2,
                weight: LatticeWeight::new(0.0, 2.0),
                target: 2,
            },
        );
        lattice.set_final(2, LatticeWeight::one());

        let mut registry = SequenceRegistry::new();
        let out = expand(
            &lattice,
            &FnvHashSet::default(),
            MatchChannel::Output,
            usize::max_value(),
            &mut registry,
        );

        assert_eq!(out.num_states(), 2);
        assert_eq!(out.num_arcs(), 1);
        let arc = &out.arcs(0)[0];
        assert_eq!(registry.sequence(arc.ilabel), Some(&vec![1, 2]));
        assert_eq!(arc.weight, LatticeWeight::new(1.0, 2.0));
        assert_eq!(arc.target, 1);
        assert!(out.is_final(1));
    }

    #[test]
    fn test_empty_lattice() {
        let lattice: Lattice<LatticeWeight> = Lattice::new(0, 0);
        let mut registry = SequenceRegistry::new();
        let out = expand(
            &lattice,
            &FnvHashSet::default(),
            MatchChannel::Output,
            usize::max_value(),
            &mut registry,
        );
        assert_eq!(out.num_states(), 0);
        assert_eq!(registry.size(), 1);
    }
}
