use super::circuit_builder::{CircuitBuilder, PartSlot, PIN_TINYVEC_SIZE};
use super::handles::*;
use super::topology::{PinRef, Topology};
use super::{resolve, Drive, NetIndex, PartIndex, Signal, VCC};
use crate::chips::Chip;
use crate::config::SimConfig;
use crate::data_structures::{RankQueue, SignalState};
use crate::error::{BusConflict, ConflictDriver, RomLoadError, SettleDivergence, SimError};
use indexmap::{IndexMap, IndexSet};
use smallvec::{smallvec, SmallVec};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{event, span, Level};
use unwrap::unwrap;

type PinLevels = SmallVec<[bool; PIN_TINYVEC_SIZE]>;
type PinDrives = SmallVec<[Drive; PIN_TINYVEC_SIZE]>;

/// Built version of [CircuitBuilder], see [CircuitBuilder] for an example.
///
/// A [Circuit] holds the level of every net, the drive of every output pin and the internal state of
/// every part. It moves forward in two kinds of operations:
/// * [settle](Circuit::settle): re-evaluates parts whose inputs changed until no net changes level.
/// * [fire_edges](Circuit::fire_edges): every part with a clock pin that went from low to high since it was
///   last sampled captures its next state from the same settled snapshot, then the circuit settles again.
#[derive(Debug, Clone)]
pub struct Circuit {
    parts: Vec<PartSlot>,
    drives: Vec<PinDrives>,
    topology: Topology,
    net_names: IndexMap<String, NetIndex>,
    part_names: IndexMap<String, PartIndex>,
    probes: IndexMap<String, Probe>,
    internal_levers: IndexSet<PartIndex>,
    state: SignalState,
    // Level of every clock pin in topology.clocks the last time edges were looked for.
    sampled: Vec<bool>,
    queue: RankQueue<PartIndex>,
    // Nets resolved since conflicts were last checked.
    touched: BTreeSet<NetIndex>,
    conflicted: BTreeSet<NetIndex>,
    config: SimConfig,
    step: u64,
}

impl Circuit {
    pub(super) fn new(builder: CircuitBuilder, topology: Topology) -> Circuit {
        let CircuitBuilder {
            parts,
            net_names,
            part_names,
            probes,
            internal_levers,
            config,
        } = builder;

        let floating = config.floating_level.is_high();
        let mut state = SignalState::new(net_names.len());
        state.set(VCC.idx, true);
        for net in net_names.values().filter(|net| !net.is_rail()) {
            state.set(net.idx, floating);
            state.set_floating(net.idx, true);
        }
        state.clear_changed();

        let drives = parts
            .iter()
            .map(|slot| smallvec![Drive::HighZ; slot.pins.len()])
            .collect();

        let mut queue = RankQueue::new();
        for (i, rank) in topology.rank.iter().enumerate() {
            queue.push(*rank, PartIndex::new(i));
        }

        let sampled = topology
            .clocks
            .iter()
            .map(|clock| Self::pin_net_level(&parts, &state, floating, *clock))
            .collect();

        Circuit {
            parts,
            drives,
            topology,
            net_names,
            part_names,
            probes,
            internal_levers,
            state,
            sampled,
            queue,
            touched: Default::default(),
            conflicted: Default::default(),
            config,
            step: 0,
        }
    }

    fn pin_net_level(parts: &[PartSlot], state: &SignalState, floating: bool, pin: PinRef) -> bool {
        match parts[pin.part.idx].pins[pin.pin] {
            Some(net) => state.level(net.idx),
            None => floating,
        }
    }

    /// Returns the level of every pin of `part`, unconnected pins read the floating level.
    fn part_levels(&self, part: PartIndex) -> PinLevels {
        let floating = self.config.floating_level.is_high();
        self.parts[part.idx]
            .pins
            .iter()
            .map(|net| match net {
                Some(net) => self.state.level(net.idx),
                None => floating,
            })
            .collect()
    }

    /// Evaluates `part` and resolves every net whose drivers changed.
    fn evaluate(&mut self, part: PartIndex, rank: usize) {
        let levels = self.part_levels(part);
        let slot = &mut self.parts[part.idx];
        let mut drives: PinDrives = smallvec![Drive::HighZ; slot.pins.len()];
        slot.chip.evaluate(&levels, &mut drives);

        let kinds = &self.topology.kinds[part.idx];
        let current = &mut self.drives[part.idx];
        let mut dirty: SmallVec<[NetIndex; 8]> = SmallVec::new();
        for (pin, drive) in drives.into_iter().enumerate() {
            // Pins acting as inputs never load their net.
            if !kinds[pin].drives() || current[pin] == drive {
                continue;
            }
            current[pin] = drive;
            if let Some(net) = slot.pins[pin] {
                if !dirty.contains(&net) {
                    dirty.push(net);
                }
            }
        }
        for net in dirty {
            self.resolve_net(net, rank);
        }
    }

    /// Resolves the level of `net` and schedules its readers if the level changed.
    fn resolve_net(&mut self, net: NetIndex, rank: usize) {
        let links = &self.topology.nets[net.idx];
        let drives = &self.drives;
        let resolution = resolve(
            links
                .drivers
                .iter()
                .map(|driver| drives[driver.part.idx][driver.pin]),
            self.config.floating_level.is_high(),
            self.config.conflict.fallback,
        );
        self.touched.insert(net);
        self.state.set_floating(net.idx, resolution.floating);
        if self.state.set(net.idx, resolution.level) {
            for reader in &links.readers {
                self.queue
                    .push_after(rank, self.topology.rank[reader.idx], *reader);
            }
        }
    }

    /// Evaluates scheduled parts in rank order until no net changes level.
    ///
    /// Returns the number of passes it took, 0 if nothing was scheduled.
    /// Once settled, nets with disagreeing drivers are recorded as [conflicts](Circuit::conflicts).
    pub fn settle(&mut self) -> Result<usize, SettleDivergence> {
        let cap = self.config.settle_cap(self.parts.len());
        let mut passes = 0;
        while !self.queue.is_empty() {
            if passes == cap {
                let unstable: Vec<String> = self
                    .queue
                    .iter()
                    .map(|part| self.parts[part.idx].name.clone())
                    .collect();
                event!(
                    Level::ERROR,
                    step = self.step,
                    passes,
                    unstable = unstable.len(),
                    "circuit did not settle"
                );
                return Err(SettleDivergence {
                    step: self.step,
                    passes,
                    unstable,
                });
            }
            self.queue.swap();
            while let Some((rank, part)) = self.queue.pop() {
                self.evaluate(part, rank);
            }
            passes += 1;
        }
        self.update_conflicts();
        Ok(passes)
    }

    fn update_conflicts(&mut self) {
        let touched = std::mem::take(&mut self.touched);
        for net in touched {
            let links = &self.topology.nets[net.idx];
            let mut low = false;
            let mut high = false;
            for driver in &links.drivers {
                match self.drives[driver.part.idx][driver.pin] {
                    Drive::Low => low = true,
                    Drive::High => high = true,
                    Drive::HighZ => {}
                }
            }
            if low && high {
                if self.conflicted.insert(net) {
                    event!(
                        Level::WARN,
                        step = self.step,
                        net = self.net_name(net),
                        "bus conflict"
                    );
                }
            } else {
                self.conflicted.remove(&net);
            }
        }
    }

    /// Settles, then fails with the first conflict if the conflict policy is strict.
    pub fn settle_and_check(&mut self) -> Result<(), SimError> {
        self.settle()?;
        if self.config.conflict.strict {
            if let Some(conflict) = self.conflicts().into_iter().next() {
                return Err(conflict.into());
            }
        }
        Ok(())
    }

    /// Returns every clock pin whose net rose since it was last sampled, and samples all of them.
    fn sample_edges(&mut self) -> Vec<PinRef> {
        let floating = self.config.floating_level.is_high();
        let mut edges = Vec::new();
        for (clock, sampled) in self.topology.clocks.iter().zip(self.sampled.iter_mut()) {
            let now = Self::pin_net_level(&self.parts, &self.state, floating, *clock);
            if now && !*sampled {
                edges.push(*clock);
            }
            *sampled = now;
        }
        edges
    }

    /// Samples every clock pin without firing anything.
    pub fn resample(&mut self) {
        self.sample_edges();
    }

    /// Clocks every part that saw a rising edge, then settles.
    ///
    /// Every part in a batch reads the same snapshot, so none of them sees another's update.
    /// Edges produced by settling after a batch form the next batch.
    /// Returns the number of batches fired.
    pub fn fire_edges(&mut self) -> Result<usize, SimError> {
        let mut batches = 0;
        loop {
            let edges = self.sample_edges();
            if edges.is_empty() {
                return Ok(batches);
            }
            if batches == self.config.edge_cascade_limit {
                let unstable = edges
                    .iter()
                    .map(|edge| self.parts[edge.part.idx].name.clone())
                    .collect();
                event!(
                    Level::ERROR,
                    step = self.step,
                    batches,
                    "clock edges kept cascading"
                );
                return Err(SettleDivergence {
                    step: self.step,
                    passes: batches,
                    unstable,
                }
                .into());
            }

            // Snapshot every part first, clock_edge only touches internal state.
            let snapshots: Vec<PinLevels> =
                edges.iter().map(|edge| self.part_levels(edge.part)).collect();
            for (edge, levels) in edges.iter().zip(snapshots) {
                self.parts[edge.part.idx]
                    .chip
                    .clock_edge(edge.pin, &levels);
            }
            for edge in &edges {
                self.queue
                    .push(self.topology.rank[edge.part.idx], edge.part);
            }
            event!(Level::TRACE, step = self.step, edges = edges.len(), "edge batch");
            self.settle_and_check()?;
            batches += 1;
        }
    }

    /// Settles staged changes, then fires the resulting clock edges.
    pub fn tick(&mut self) -> Result<usize, SimError> {
        self.settle_and_check()?;
        self.fire_edges()
    }

    /// Puts every part in its reset state and settles, without firing any edge.
    pub fn reset_edge(&mut self) -> Result<(), SimError> {
        let span = span!(Level::DEBUG, "reset", step = self.step);
        let _enter = span.enter();
        for (i, slot) in self.parts.iter_mut().enumerate() {
            slot.chip.reset();
            self.queue.push(self.topology.rank[i], PartIndex::new(i));
        }
        self.settle_and_check()?;
        self.resample();
        event!(Level::DEBUG, "parts reset");
        Ok(())
    }

    /// Moves a lever, the change takes effect on the next settle.
    ///
    /// Returns true if the lever changed level.
    pub fn set_lever(&mut self, lever: LeverHandle, level: bool) -> bool {
        let part = lever.part;
        let slot = &mut self.parts[part.idx];
        let lever = unwrap!(slot.chip.as_lever_mut(), "Part {} is not a lever", slot.name);
        let changed = lever.set(level);
        if changed {
            self.queue.push(self.topology.rank[part.idx], part);
        }
        changed
    }

    /// Returns true if `part` is a lever only the simulation itself may move.
    pub fn is_internal_lever(&self, part: PartIndex) -> bool {
        self.internal_levers.contains(&part)
    }

    /// Returns the handle of the lever `part`, if it is one.
    pub fn lever_handle(&self, part: PartIndex) -> Option<LeverHandle> {
        let slot = &self.parts[part.idx];
        slot.chip.as_lever()?;
        Some(LeverHandle {
            part,
            net: slot.pins[crate::chips::lever::OUT]?,
        })
    }

    /// Replaces the contents of the ROM `part` and schedules it.
    ///
    /// # Panics
    ///
    /// Will panic if `part` is not a ROM.
    pub fn load_rom(&mut self, part: PartIndex, image: &[u8]) -> Result<(), RomLoadError> {
        let slot = &mut self.parts[part.idx];
        let rom = unwrap!(slot.chip.as_rom_mut(), "Part {} is not a ROM", slot.name);
        rom.load(image)?;
        self.queue.push(self.topology.rank[part.idx], part);
        Ok(())
    }

    pub fn level(&self, net: NetIndex) -> Signal {
        self.state.level(net.idx).into()
    }

    /// Returns true if no driver was active on `net` when it was last resolved.
    pub fn is_floating(&self, net: NetIndex) -> bool {
        self.state.floating(net.idx)
    }

    /// Returns the net `pin` of `part` is attached to.
    pub fn pin_net(&self, part: PartIndex, pin: usize) -> Option<NetIndex> {
        *self.parts[part.idx].pins.get(pin)?
    }

    /// Returns the level seen by `pin` of `part`.
    pub fn pin_level(&self, part: PartIndex, pin: usize) -> Signal {
        match self.pin_net(part, pin) {
            Some(net) => self.level(net),
            None => self.config.floating_level,
        }
    }

    pub fn probe_value(&self, probe: ProbeHandle) -> BusValue {
        let (_, probe) = unwrap!(
            self.probes.get_index(probe.0),
            "Tried to read probe {} out of {}",
            probe.0,
            self.probes.len()
        );
        self.nets_value(&probe.bits)
    }

    pub fn probe_name(&self, probe: ProbeHandle) -> &str {
        let (name, _) = unwrap!(
            self.probes.get_index(probe.0),
            "Tried to read probe {} out of {}",
            probe.0,
            self.probes.len()
        );
        name
    }

    pub fn probe_handle(&self, name: &str) -> Option<ProbeHandle> {
        self.probes.get_index_of(name).map(ProbeHandle)
    }

    /// Returns the value of the probe called `name`.
    pub fn read_probe(&self, name: &str) -> Option<BusValue> {
        self.probe_handle(name).map(|probe| self.probe_value(probe))
    }

    /// Returns the name and value of every probe, in the order they were registered.
    pub fn probe_values(&self) -> impl Iterator<Item = (&str, BusValue)> + '_ {
        self.probes
            .iter()
            .map(move |(name, probe)| (name.as_str(), self.nets_value(&probe.bits)))
    }

    /// Collects the levels of up to 64 nets into a [BusValue].
    pub fn nets_value(&self, nets: &[NetIndex]) -> BusValue {
        let mut value = 0;
        let mut floating = 0;
        for (i, net) in nets.iter().take(64).enumerate() {
            if self.state.level(net.idx) {
                value |= 1 << i;
            }
            if self.state.floating(net.idx) {
                floating |= 1 << i;
            }
        }
        BusValue {
            value,
            width: nets.len().min(64),
            floating,
        }
    }

    pub fn part_index(&self, name: &str) -> Option<PartIndex> {
        self.part_names.get(name).copied()
    }

    pub fn part_name(&self, part: PartIndex) -> &str {
        &self.parts[part.idx].name
    }

    pub fn chip(&self, part: PartIndex) -> &Chip {
        &self.parts[part.idx].chip
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Returns the name and non empty register dump of every part.
    pub fn registers(&self) -> impl Iterator<Item = (&str, Vec<(&'static str, u64)>)> + '_ {
        self.parts
            .iter()
            .map(|slot| (slot.name.as_str(), slot.chip.registers()))
            .filter(|(_, registers)| !registers.is_empty())
    }

    pub fn net_index(&self, name: &str) -> Option<NetIndex> {
        self.net_names.get(name).copied()
    }

    pub fn net_name(&self, net: NetIndex) -> &str {
        let (name, _) = unwrap!(
            self.net_names.get_index(net.idx),
            "Tried to name net {} out of {}",
            net.idx,
            self.net_names.len()
        );
        name
    }

    pub fn net_count(&self) -> usize {
        self.net_names.len()
    }

    /// Returns the names of the nets that changed level since the last [Circuit::clear_changed].
    pub fn changed_nets(&self) -> Vec<String> {
        self.state
            .iter_changed()
            .filter(|idx| *idx < self.net_names.len())
            .map(|idx| self.net_name(NetIndex::new(idx)).to_string())
            .collect()
    }

    pub fn clear_changed(&mut self) {
        self.state.clear_changed()
    }

    /// Returns every conflict present in the settled state.
    pub fn conflicts(&self) -> Vec<BusConflict> {
        self.conflicted
            .iter()
            .map(|net| {
                let drivers = self.topology.nets[net.idx]
                    .drivers
                    .iter()
                    .filter_map(|driver| {
                        let level = self.drives[driver.part.idx][driver.pin].level()?;
                        let slot = &self.parts[driver.part.idx];
                        Some(ConflictDriver {
                            part: slot.name.clone(),
                            pin: slot.chip.pins()[driver.pin].name,
                            level: level.into(),
                        })
                    })
                    .collect();
                BusConflict {
                    step: self.step,
                    net: self.net_name(*net).to_string(),
                    drivers,
                    resolved: self.level(*net),
                }
            })
            .collect()
    }

    /// Returns the step number attached to errors and faults.
    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn set_step(&mut self, step: u64) {
        self.step = step;
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Returns every group of parts that forms a combinational loop,
    /// only circuits built with [CircuitBuilder::build_allowing_loops] have any.
    pub fn loops(&self) -> Vec<Vec<&str>> {
        self.topology
            .loops()
            .iter()
            .map(|parts| parts.iter().map(|part| self.part_name(*part)).collect())
            .collect()
    }

    /// Writes the part dependency graph to `filename` in dot format.
    ///
    /// Parts are labeled by name with the "debug_parts" feature and by index otherwise.
    pub fn dump_dot<P: AsRef<Path>>(&self, filename: P) -> std::io::Result<()> {
        let mut f = std::fs::File::create(filename)?;
        self.topology.write_dot(&mut f, |part| self.dot_label(part))
    }

    #[cfg(feature = "debug_parts")]
    fn dot_label(&self, part: PartIndex) -> String {
        let slot = &self.parts[part.idx];
        format!("{} ({})", slot.name, slot.chip.part_number())
    }

    #[cfg(not(feature = "debug_parts"))]
    fn dot_label(&self, part: PartIndex) -> String {
        part.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chips::{hc245, hc377, hex, quad};
    use crate::config::{ConflictFallback, ConflictPolicy};
    use crate::netlist::{CircuitBuilder, GND};

    fn conflicting(fallback: ConflictFallback, strict: bool) -> (Circuit, NetIndex) {
        let mut g = CircuitBuilder::with_config(SimConfig {
            conflict: ConflictPolicy { fallback, strict },
            ..Default::default()
        });
        let a = g.lever("A", false).unwrap();
        let b = g.lever("B", true).unwrap();
        let y = g.net("Y").unwrap();
        let u1 = g.hc04("U1").unwrap();
        let u2 = g.hc04("U2").unwrap();
        g.connect(u1, hex::A[0], a.net()).unwrap();
        g.connect(u1, hex::Y[0], y).unwrap();
        g.connect(u2, hex::A[0], b.net()).unwrap();
        g.connect(u2, hex::Y[0], y).unwrap();
        (g.build().unwrap(), y)
    }

    #[test]
    fn test_settle_idempotent() {
        let mut g = CircuitBuilder::new();
        let a = g.lever("A", true).unwrap();
        let y = g.bus("Y", 6).unwrap();
        let inv = g.hc04("U1").unwrap();
        for i in 0..6 {
            let input = if i == 0 { a.net() } else { y.bit(i - 1) };
            g.connect(inv, hex::A[i], input).unwrap();
            g.connect(inv, hex::Y[i], y.bit(i)).unwrap();
        }
        let c = &mut g.build().unwrap();
        assert!(c.settle().unwrap() > 0);
        let settled = c.read_probe("Y").unwrap();
        assert_eq!(settled.value, 0b101010);
        assert_eq!(settled.floating, 0);

        c.clear_changed();
        assert_eq!(c.settle(), Ok(0));
        assert_eq!(c.read_probe("Y"), Some(settled));
        assert!(c.changed_nets().is_empty());
    }

    #[test]
    fn test_acyclic_settles_in_one_pass() {
        let mut g = CircuitBuilder::new();
        let a = g.lever("A", false).unwrap();
        let mut input = a.net();
        // Created in reverse order so index order is the opposite of signal flow.
        let parts: Vec<_> = (0..5).map(|i| g.hc04(format!("U{}", 5 - i)).unwrap()).collect();
        for part in parts.iter().rev() {
            let out = g.net(format!("N{}", part.idx)).unwrap();
            g.connect(*part, hex::A[0], input).unwrap();
            g.connect(*part, hex::Y[0], out).unwrap();
            input = out;
        }
        let c = &mut g.build().unwrap();
        assert_eq!(c.settle(), Ok(1));
        assert_eq!(c.level(input), Signal::High);

        c.set_lever(a, true);
        assert_eq!(c.settle(), Ok(1));
        assert_eq!(c.level(input), Signal::Low);
    }

    #[test]
    fn test_divergence() {
        let mut g = CircuitBuilder::new();
        let nets: Vec<_> = (0..3).map(|i| g.net(format!("N{}", i)).unwrap()).collect();
        for i in 0..3 {
            let u = g.hc04(format!("U{}", i)).unwrap();
            g.connect(u, hex::A[0], nets[i]).unwrap();
            g.connect(u, hex::Y[0], nets[(i + 1) % 3]).unwrap();
        }
        let c = &mut g.build_allowing_loops().unwrap();
        assert_eq!(c.loops(), vec![vec!["U0", "U1", "U2"]]);

        let err = c.settle().unwrap_err();
        assert_eq!(err.passes, c.config().settle_cap(3));
        assert!(!err.unstable.is_empty());
    }

    #[test]
    fn test_edge_atomicity() {
        let mut g = CircuitBuilder::new();
        let clk = g.lever("CLK", false).unwrap();
        let d = g.lever("D", true).unwrap();
        let q1 = g.bus("Q1", 8).unwrap();
        let q2 = g.bus("Q2", 8).unwrap();
        let u1 = g.hc377("U1").unwrap();
        let u2 = g.hc377("U2").unwrap();
        for (u, q) in [(u1, &q1), (u2, &q2)] {
            g.connect(u, hc377::CLK, clk.net()).unwrap();
            g.connect(u, hc377::NE, GND).unwrap();
            g.connect_word(u, &hc377::Q, q.bits()).unwrap();
        }
        g.connect(u1, hc377::D[0], d.net()).unwrap();
        g.tie(u1, &hc377::D[1..], GND).unwrap();
        g.connect_word(u2, &hc377::D, q1.bits()).unwrap();

        let c = &mut g.build().unwrap();
        c.reset_edge().unwrap();
        let q1 = c.probe_handle("Q1").unwrap();
        let q2 = c.probe_handle("Q2").unwrap();

        c.set_lever(clk, true);
        assert_eq!(c.tick(), Ok(1));
        assert_eq!((q1.u8(c), q2.u8(c)), (1, 0));

        c.set_lever(clk, false);
        assert_eq!(c.tick(), Ok(0));
        c.set_lever(clk, true);
        assert_eq!(c.tick(), Ok(1));
        assert_eq!((q1.u8(c), q2.u8(c)), (1, 1));
    }

    #[test]
    fn test_conflict_fallbacks() {
        for (fallback, level) in [
            (ConflictFallback::WiredAnd, Signal::Low),
            (ConflictFallback::WiredOr, Signal::High),
        ] {
            let (mut c, y) = conflicting(fallback, false);
            c.set_step(3);
            c.settle_and_check().unwrap();
            assert_eq!(c.level(y), level);

            let conflicts = c.conflicts();
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].step, 3);
            assert_eq!(conflicts[0].net, "Y");
            assert_eq!(conflicts[0].resolved, level);
            assert_eq!(conflicts[0].drivers.len(), 2);
        }
    }

    #[test]
    fn test_conflict_strict() {
        let (mut c, _) = conflicting(ConflictFallback::WiredAnd, true);
        match c.settle_and_check() {
            Err(SimError::BusConflict(conflict)) => assert_eq!(conflict.net, "Y"),
            other => panic!("expected a conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_conflict_cleared() {
        let mut g = CircuitBuilder::new();
        let a = g.lever("A", false).unwrap();
        let b = g.lever("B", false).unwrap();
        let y = g.net("Y").unwrap();
        let u1 = g.hc04("U1").unwrap();
        let u2 = g.hc04("U2").unwrap();
        g.connect(u1, hex::A[0], a.net()).unwrap();
        g.connect(u1, hex::Y[0], y).unwrap();
        g.connect(u2, hex::A[0], b.net()).unwrap();
        g.connect(u2, hex::Y[0], y).unwrap();
        let c = &mut g.build().unwrap();

        c.settle().unwrap();
        assert!(c.conflicts().is_empty());
        c.set_lever(b, true);
        c.settle().unwrap();
        assert_eq!(c.conflicts().len(), 1);
        c.set_lever(a, true);
        c.settle().unwrap();
        assert!(c.conflicts().is_empty());
        assert_eq!(c.level(y), Signal::Low);
    }

    #[test]
    fn test_floating_bus() {
        for level in [Signal::Low, Signal::High] {
            let mut g = CircuitBuilder::with_config(SimConfig {
                floating_level: level,
                ..Default::default()
            });
            let noe = g.lever("/OE", true).unwrap();
            let bus = g.bus("BUS", 8).unwrap();
            let u = g.hc245("U1").unwrap();
            g.connect(u, hc245::DIR, crate::netlist::VCC).unwrap();
            g.connect(u, hc245::NOE, noe.net()).unwrap();
            g.tie(u, &hc245::A, GND).unwrap();
            g.connect_word(u, &hc245::B, bus.bits()).unwrap();
            let c = &mut g.build().unwrap();

            c.settle().unwrap();
            let value = c.read_probe("BUS").unwrap();
            assert_eq!(value.floating, 0xff);
            assert_eq!(value.value, if level.is_high() { 0xff } else { 0 });

            c.set_lever(noe, false);
            c.settle().unwrap();
            assert_eq!(
                c.read_probe("BUS"),
                Some(BusValue {
                    value: 0,
                    width: 8,
                    floating: 0
                })
            );
        }
    }

    #[test]
    fn test_unconnected_pin_reads_floating_level() {
        let mut g = CircuitBuilder::new();
        let y = g.net("Y").unwrap();
        let u = g.hc00("U1").unwrap();
        g.connect(u, quad::Y[0], y).unwrap();
        let c = &mut g.build().unwrap();
        c.settle().unwrap();
        assert_eq!(c.pin_level(u, quad::A[0]), Signal::High);
        assert_eq!(c.level(y), Signal::Low);
    }

    #[test]
    fn test_set_lever_unchanged() {
        let mut g = CircuitBuilder::new();
        let a = g.lever("A", true).unwrap();
        let c = &mut g.build().unwrap();
        c.settle().unwrap();
        assert!(!c.set_lever(a, true));
        assert_eq!(c.settle(), Ok(0));
        assert!(c.set_lever(a, false));
        assert_eq!(c.settle(), Ok(1));
        assert_eq!(c.changed_nets(), vec!["A".to_string()]);
    }
}
