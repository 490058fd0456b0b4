use super::handles::*;
use super::topology::Topology;
use super::{Circuit, NetIndex, PartIndex, GND, VCC};
use crate::chips::*;
use crate::config::SimConfig;
use crate::error::WiringError;
use casey::pascal;
use indexmap::{IndexMap, IndexSet};
use smallvec::{smallvec, SmallVec};
use std::ops::{Deref, DerefMut};
use tracing::{event, Level};

/// Inline capacity of per-part pin vectors, the widest part has 26 pins.
pub(super) const PIN_TINYVEC_SIZE: usize = 32;
pub(super) type PinNets = SmallVec<[Option<NetIndex>; PIN_TINYVEC_SIZE]>;

/// A named part and the net attached to each of its pins.
#[derive(Debug, Clone)]
pub(super) struct PartSlot {
    pub name: String,
    pub chip: Chip,
    pub pins: PinNets,
}

/// Creates a constructor for every part model, named after the part in snake case.
macro_rules! chip_constructors {
    ($($name:ident),+) => {
        $(
            #[doc = concat!("Adds a new `", stringify!($name), "` part and returns its [PartIndex].")]
            pub fn $name<S: Into<String>>(&mut self, name: S) -> Result<PartIndex, WiringError> {
                let chip: pascal!($name) = Default::default();
                self.part(name, chip)
            }
        )+
    };
}

/// Declares the static topology of a circuit: parts, nets, how pins attach to nets,
/// externally driven levers and named probes.
///
/// Once [built](CircuitBuilder::build) the topology can't change anymore.
///
/// Every circuit contains the [GND] and [VCC] rails.
///
/// # Example
/// ```
/// # use ttlsim::netlist::{CircuitBuilder, Signal, GND};
/// # use ttlsim::chips::{hex, quad};
/// let mut g = CircuitBuilder::new();
///
/// let a = g.lever("A", true).unwrap();
/// let b = g.lever("B", true).unwrap();
/// let y = g.net("Y").unwrap();
///
/// let nand = g.hc00("U1").unwrap();
/// g.connect(nand, quad::A[0], a.net()).unwrap();
/// g.connect(nand, quad::B[0], b.net()).unwrap();
/// g.connect(nand, quad::Y[0], y).unwrap();
///
/// let c = &mut g.build().unwrap();
/// c.settle().unwrap();
/// assert_eq!(c.level(y), Signal::Low);
///
/// c.set_lever(b, false);
/// c.settle().unwrap();
/// assert_eq!(c.level(y), Signal::High);
/// ```
#[derive(Debug, Clone)]
pub struct CircuitBuilder {
    pub(super) parts: Vec<PartSlot>,
    pub(super) net_names: IndexMap<String, NetIndex>,
    pub(super) part_names: IndexMap<String, PartIndex>,
    pub(super) probes: IndexMap<String, Probe>,
    pub(super) internal_levers: IndexSet<PartIndex>,
    pub(super) config: SimConfig,
}

impl CircuitBuilder {
    /// Returns a new [CircuitBuilder] containing only [GND] and [VCC].
    pub fn new() -> CircuitBuilder {
        Self::with_config(SimConfig::default())
    }

    pub fn with_config(config: SimConfig) -> CircuitBuilder {
        let mut net_names = IndexMap::new();
        net_names.insert("GND".to_string(), GND);
        net_names.insert("VCC".to_string(), VCC);

        CircuitBuilder {
            parts: Default::default(),
            net_names,
            part_names: Default::default(),
            probes: Default::default(),
            internal_levers: Default::default(),
            config,
        }
    }

    /// Returns a new net called `name`.
    pub fn net<S: Into<String>>(&mut self, name: S) -> Result<NetIndex, WiringError> {
        let name = name.into();
        if self.net_names.contains_key(&name) {
            return Err(WiringError::DuplicateName(name));
        }
        let idx = NetIndex::new(self.net_names.len());
        self.net_names.insert(name, idx);
        Ok(idx)
    }

    /// Returns a bus of `width` new nets called `name[0]`..`name[width-1]`, registered as a probe called `name`.
    pub fn bus<S: Into<String>>(&mut self, name: S, width: usize) -> Result<Bus, WiringError> {
        let name = name.into();
        let bits = (0..width)
            .map(|i| self.net(format!("{}[{}]", name, i)))
            .collect::<Result<SmallVec<_>, _>>()?;
        self.probe(name.clone(), &bits)?;
        Ok(Bus { name, bits })
    }

    /// Adds `chip` to the circuit as `name`.
    pub fn part<S: Into<String>, C: Into<Chip>>(
        &mut self,
        name: S,
        chip: C,
    ) -> Result<PartIndex, WiringError> {
        let name = name.into();
        if self.part_names.contains_key(&name) {
            return Err(WiringError::DuplicateName(name));
        }
        let chip = chip.into();
        let idx = PartIndex::new(self.parts.len());
        self.part_names.insert(name.clone(), idx);
        self.parts.push(PartSlot {
            name,
            pins: smallvec![None; chip.pins().len()],
            chip,
        });
        Ok(idx)
    }

    chip_constructors!(
        hc00, hc04, hc08, hc32, hc86, hc74, hc157, hc163, hc245, hc283, hc377, hc688, at28c256,
        sram62256
    );

    /// Attaches pin number `pin` of `part` to `net`.
    ///
    /// # Panics
    ///
    /// Will panic if `part` was not created by this builder.
    pub fn connect(
        &mut self,
        part: PartIndex,
        pin: usize,
        net: NetIndex,
    ) -> Result<(), WiringError> {
        let slot = &mut self.parts[part.idx];
        match slot.pins.get_mut(pin) {
            None => Err(WiringError::UnknownPin {
                part: slot.name.clone(),
                pin: pin.to_string(),
            }),
            Some(Some(_)) => Err(WiringError::PinAlreadyConnected {
                part: slot.name.clone(),
                pin: slot.chip.pins()[pin].name.to_string(),
            }),
            Some(attached) => {
                *attached = Some(net);
                Ok(())
            }
        }
    }

    /// Attaches the pin called `pin` of `part` to `net`.
    pub fn connect_named(
        &mut self,
        part: PartIndex,
        pin: &str,
        net: NetIndex,
    ) -> Result<(), WiringError> {
        let slot = &self.parts[part.idx];
        let idx = slot
            .chip
            .pin_named(pin)
            .ok_or_else(|| WiringError::UnknownPin {
                part: slot.name.clone(),
                pin: pin.to_string(),
            })?;
        self.connect(part, idx, net)
    }

    /// Attaches every pin in `pins` to the net in the same position in `nets`.
    pub fn connect_word(
        &mut self,
        part: PartIndex,
        pins: &[usize],
        nets: &[NetIndex],
    ) -> Result<(), WiringError> {
        if pins.len() != nets.len() {
            return Err(WiringError::WidthMismatch {
                part: self.parts[part.idx].name.clone(),
                expected: pins.len(),
                actual: nets.len(),
            });
        }
        for (pin, net) in pins.iter().zip(nets) {
            self.connect(part, *pin, *net)?;
        }
        Ok(())
    }

    /// Ties every pin in `pins` to `rail`.
    pub fn tie(
        &mut self,
        part: PartIndex,
        pins: &[usize],
        rail: NetIndex,
    ) -> Result<(), WiringError> {
        for pin in pins {
            self.connect(part, *pin, rail)?;
        }
        Ok(())
    }

    /// Registers `nets` for observation as `name`.
    pub fn probe<S: Into<String>>(
        &mut self,
        name: S,
        nets: &[NetIndex],
    ) -> Result<ProbeHandle, WiringError> {
        let name = name.into();
        if self.probes.contains_key(&name) {
            return Err(WiringError::DuplicateName(name));
        }
        let (idx, _) = self.probes.insert_full(
            name.clone(),
            Probe {
                name,
                bits: nets.iter().copied().collect(),
            },
        );
        Ok(ProbeHandle(idx))
    }

    /// Returns a new lever called `name` driving a new net of the same name,
    /// which can be set from outside the circuit.
    pub fn lever<S: Into<String>>(&mut self, name: S, level: bool) -> Result<LeverHandle, WiringError> {
        let name = name.into();
        let net = self.net(name.clone())?;
        let part = self.part(name, Lever::new(level))?;
        self.connect(part, crate::chips::lever::OUT, net)?;
        Ok(LeverHandle { part, net })
    }

    /// Same as [CircuitBuilder::lever] but only the simulation itself may move it.
    pub fn internal_lever<S: Into<String>>(
        &mut self,
        name: S,
        level: bool,
    ) -> Result<LeverHandle, WiringError> {
        let handle = self.lever(name, level)?;
        self.internal_levers.insert(handle.part);
        Ok(handle)
    }

    /// Returns a builder that prefixes every part and net name with `name`.
    pub fn module<S: Into<String>>(&mut self, name: S) -> ModuleBuilder<'_> {
        ModuleBuilder {
            g: self,
            prefix: name.into(),
        }
    }

    /// Returns the number of parts declared so far.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Checks the topology and returns the runnable [Circuit].
    ///
    /// Fails with [WiringError::CombinationalLoop] if a cycle doesn't go through a clocked input.
    pub fn build(self) -> Result<Circuit, WiringError> {
        let topology = Topology::analyze(&self.parts, self.net_names.len())?;
        if let Some(cycle) = topology.loops().first() {
            let names = cycle
                .iter()
                .map(|part| self.parts[part.idx].name.clone())
                .collect();
            return Err(WiringError::CombinationalLoop(names));
        }
        Ok(self.finish(topology))
    }

    /// Same as [CircuitBuilder::build] but accepts combinational loops,
    /// circuits built this way might never settle.
    pub fn build_allowing_loops(self) -> Result<Circuit, WiringError> {
        let topology = Topology::analyze(&self.parts, self.net_names.len())?;
        Ok(self.finish(topology))
    }

    fn finish(self, topology: Topology) -> Circuit {
        event!(
            Level::DEBUG,
            parts = self.parts.len(),
            nets = self.net_names.len(),
            probes = self.probes.len(),
            ranks = topology.rank_count(),
            "circuit built"
        );
        Circuit::new(self, topology)
    }
}

impl Default for CircuitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped view of a [CircuitBuilder] where part and net names get a `MODULE.` prefix.
///
/// Dereferences to the [CircuitBuilder], so wiring methods are available directly.
pub struct ModuleBuilder<'a> {
    g: &'a mut CircuitBuilder,
    prefix: String,
}

impl<'a> ModuleBuilder<'a> {
    pub fn name(&self) -> &str {
        &self.prefix
    }

    fn scoped(&self, name: &str) -> String {
        format!("{}.{}", self.prefix, name)
    }

    pub fn part<S: Into<String>, C: Into<Chip>>(
        &mut self,
        designator: S,
        chip: C,
    ) -> Result<PartIndex, WiringError> {
        let name = self.scoped(&designator.into());
        self.g.part(name, chip)
    }

    chip_constructors!(
        hc00, hc04, hc08, hc32, hc86, hc74, hc157, hc163, hc245, hc283, hc377, hc688, at28c256,
        sram62256
    );

    /// Returns a new private net.
    pub fn net<S: Into<String>>(&mut self, name: S) -> Result<NetIndex, WiringError> {
        let name = self.scoped(&name.into());
        self.g.net(name)
    }

    /// Returns a new private bus, see [CircuitBuilder::bus].
    pub fn bus<S: Into<String>>(&mut self, name: S, width: usize) -> Result<Bus, WiringError> {
        let name = self.scoped(&name.into());
        self.g.bus(name, width)
    }

    pub fn lever<S: Into<String>>(&mut self, name: S, level: bool) -> Result<LeverHandle, WiringError> {
        let name = self.scoped(&name.into());
        self.g.lever(name, level)
    }

    pub fn internal_lever<S: Into<String>>(
        &mut self,
        name: S,
        level: bool,
    ) -> Result<LeverHandle, WiringError> {
        let name = self.scoped(&name.into());
        self.g.internal_lever(name, level)
    }
}

impl<'a> Deref for ModuleBuilder<'a> {
    type Target = CircuitBuilder;
    fn deref(&self) -> &CircuitBuilder {
        self.g
    }
}

impl<'a> DerefMut for ModuleBuilder<'a> {
    fn deref_mut(&mut self) -> &mut CircuitBuilder {
        self.g
    }
}
