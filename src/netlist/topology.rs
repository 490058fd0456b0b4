use super::circuit_builder::{PartSlot, PIN_TINYVEC_SIZE};
use super::PartIndex;
use crate::chips::PinKind;
use crate::error::WiringError;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::io::Write;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub(super) struct PinRef {
    pub part: PartIndex,
    pub pin: usize,
}

/// Pins attached to one net.
#[derive(Debug, Clone, Default)]
pub(super) struct NetLinks {
    /// Pins that can put a level on the net.
    pub drivers: SmallVec<[PinRef; 4]>,
    /// Parts that must be re-evaluated when the net changes level.
    pub readers: SmallVec<[PartIndex; 4]>,
}

pub(super) type PinKinds = SmallVec<[PinKind; PIN_TINYVEC_SIZE]>;

/// Static analysis of a circuit's wiring.
///
/// Parts are nodes of a dependency graph with an edge from P to Q if an output of P shares a net with
/// a combinational input of Q. Sampled inputs are clocked boundaries and don't add edges.
/// Ranks follow the topological order of the strongly connected components of that graph,
/// so evaluating parts in rank order settles an acyclic network in one pass.
///
/// Loops are found on a finer graph of pins, where an output only depends on the inputs
/// [Chip::depends_on](crate::chips::Chip::depends_on) lists, so independent gates of one package
/// may feed each other but a ring inside a package is still a loop.
#[derive(Debug, Clone)]
pub(super) struct Topology {
    /// Effective kind of every pin of every part.
    pub kinds: Vec<PinKinds>,
    pub nets: Vec<NetLinks>,
    /// Every connected clock pin.
    pub clocks: Vec<PinRef>,
    pub rank: Vec<usize>,
    graph: DiGraph<PartIndex, ()>,
    loops: Vec<Vec<PartIndex>>,
    rank_count: usize,
}

/// Returns the parts of every combinational cycle between pins.
///
/// Each pin has an input node and an output node. Edges go from the input node of a pin to the
/// output nodes that depend on it and from the output node of a driver to the input nodes of the
/// other combinational pins on its net.
fn pin_loops(
    parts: &[PartSlot],
    kinds: &[PinKinds],
    nets: &[NetLinks],
    listeners: &[SmallVec<[PinRef; 4]>],
) -> Vec<Vec<PartIndex>> {
    let mut base = Vec::with_capacity(parts.len());
    let mut graph = DiGraph::<PinRef, ()>::new();
    for (i, slot) in parts.iter().enumerate() {
        base.push(graph.node_count());
        for pin in 0..slot.pins.len() {
            let pin = PinRef { part: PartIndex::new(i), pin };
            graph.add_node(pin);
            graph.add_node(pin);
        }
    }
    let input = |pin: PinRef| NodeIndex::new(base[pin.part.idx] + 2 * pin.pin);
    let output = |pin: PinRef| NodeIndex::new(base[pin.part.idx] + 2 * pin.pin + 1);

    for (i, slot) in parts.iter().enumerate() {
        let part = PartIndex::new(i);
        let part_kinds = &kinds[i];
        for out in (0..slot.pins.len()).filter(|pin| part_kinds[*pin].drives()) {
            let all: SmallVec<[usize; PIN_TINYVEC_SIZE]>;
            let inputs = match slot.chip.depends_on(out) {
                Some(inputs) => inputs,
                None => {
                    all = (0..slot.pins.len()).collect();
                    &all[..]
                }
            };
            for pin in inputs {
                if *pin != out && part_kinds[*pin].is_combinational() {
                    graph.add_edge(
                        input(PinRef { part, pin: *pin }),
                        output(PinRef { part, pin: out }),
                        (),
                    );
                }
            }
        }
    }
    for (links, listeners) in nets.iter().zip(listeners) {
        for driver in &links.drivers {
            // The input side of a pin never reads its own drive.
            for reader in listeners.iter().filter(|reader| *reader != driver) {
                graph.add_edge(output(*driver), input(*reader), ());
            }
        }
    }

    let mut loops: Vec<Vec<PartIndex>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| {
            let members: BTreeSet<PartIndex> = scc.iter().map(|node| graph[*node].part).collect();
            members.into_iter().collect()
        })
        .collect();
    loops.sort();
    loops.dedup();
    loops
}

impl Topology {
    /// Returns the [Topology] of `parts`, failing if an output is tied to a rail.
    pub fn analyze(parts: &[PartSlot], net_count: usize) -> Result<Topology, WiringError> {
        let mut nets = vec![NetLinks::default(); net_count];
        let mut listeners: Vec<SmallVec<[PinRef; 4]>> = vec![SmallVec::new(); net_count];
        let mut kinds = Vec::with_capacity(parts.len());
        let mut clocks = Vec::new();

        for (i, slot) in parts.iter().enumerate() {
            let part = PartIndex::new(i);
            let tied: SmallVec<[Option<bool>; PIN_TINYVEC_SIZE]> = slot
                .pins
                .iter()
                .map(|net| net.and_then(|net| net.rail_level()))
                .collect();
            let part_kinds: PinKinds = (0..slot.pins.len())
                .map(|pin| slot.chip.static_kind(pin, &tied))
                .collect();

            for (pin, net) in slot.pins.iter().enumerate() {
                let net = match net {
                    Some(net) => *net,
                    None => continue,
                };
                let kind = part_kinds[pin];
                let links = &mut nets[net.idx];
                if kind.drives() {
                    if net.is_rail() {
                        return Err(WiringError::DrivesRail {
                            part: slot.name.clone(),
                            pin: slot.chip.pins()[pin].name.to_string(),
                        });
                    }
                    links.drivers.push(PinRef { part, pin });
                }
                if kind.is_combinational() {
                    listeners[net.idx].push(PinRef { part, pin });
                    if !links.readers.contains(&part) {
                        links.readers.push(part);
                    }
                }
                if kind.is_clock() {
                    clocks.push(PinRef { part, pin });
                }
            }
            kinds.push(part_kinds);
        }

        let mut graph = DiGraph::with_capacity(parts.len(), 0);
        let nodes: Vec<NodeIndex> = (0..parts.len())
            .map(|i| graph.add_node(PartIndex::new(i)))
            .collect();
        let mut edges = BTreeSet::new();
        for links in &nets {
            for driver in &links.drivers {
                for reader in &links.readers {
                    // Feedback inside a part only matters for loops, see pin_loops.
                    if driver.part != *reader {
                        edges.insert((driver.part, *reader));
                    }
                }
            }
        }
        for (from, to) in edges {
            graph.add_edge(nodes[from.idx], nodes[to.idx], ());
        }

        // tarjan_scc returns components in reverse topological order.
        let sccs = tarjan_scc(&graph);
        let rank_count = sccs.len();
        let mut rank = vec![0; parts.len()];
        for (i, scc) in sccs.iter().enumerate() {
            for node in scc {
                rank[graph[*node].idx] = rank_count - 1 - i;
            }
        }
        let loops = pin_loops(parts, &kinds, &nets, &listeners);

        Ok(Topology {
            kinds,
            nets,
            clocks,
            rank,
            graph,
            loops,
            rank_count,
        })
    }

    /// Returns every group of parts that forms a combinational loop.
    pub fn loops(&self) -> &[Vec<PartIndex>] {
        &self.loops
    }

    /// Returns the number of distinct ranks.
    pub fn rank_count(&self) -> usize {
        self.rank_count
    }

    /// Writes the dependency graph in dot format, labeling each part with `label`.
    pub fn write_dot<W: Write, F: Fn(PartIndex) -> String>(
        &self,
        out: &mut W,
        label: F,
    ) -> std::io::Result<()> {
        use petgraph::dot::{Config, Dot};
        let labeled = self.graph.map(|_, part| label(*part), |_, _| ());
        write!(out, "{:?}", Dot::with_config(&labeled, &[Config::EdgeNoLabel]))
    }
}
