//! Multi phase clock driving the machine.
use crate::config::ClockMode;
use crate::error::SimError;
use crate::netlist::{Circuit, LeverHandle, NetIndex};
use serde::Serialize;
use smallvec::SmallVec;
use tracing::{event, Level};

/// What a call to [Clock::advance] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PhaseOutcome {
    /// Moved to `phase`.
    Advanced { phase: usize },
    /// The halt line is asserted, nothing changed.
    Inhibited,
    /// The reset line is asserted, the machine was reset and is back in phase 0.
    Reset,
}

/// Non-overlapping phase sequencer.
///
/// Exactly one phase line is high at a time. Moving to the next phase lowers the current line
/// and raises the next one in the same transition, then the circuit settles and the parts
/// clocked by the rising line capture their inputs.
#[derive(Debug, Clone)]
pub struct Clock {
    phases: SmallVec<[LeverHandle; 4]>,
    current: usize,
    halt: NetIndex,
    reset: NetIndex,
    mode: ClockMode,
    frequency_hz: u32,
}

impl Clock {
    /// Returns a new [Clock] in phase 0.
    ///
    /// # Panics
    ///
    /// Will panic if there are less than 2 phases.
    pub fn new(
        phases: &[LeverHandle],
        halt: NetIndex,
        reset: NetIndex,
        mode: ClockMode,
        frequency_hz: u32,
    ) -> Clock {
        assert!(phases.len() >= 2, "A clock needs at least 2 phases");
        Clock {
            phases: phases.iter().copied().collect(),
            current: 0,
            halt,
            reset,
            mode,
            frequency_hz,
        }
    }

    pub fn phase(&self) -> usize {
        self.current
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ClockMode) {
        self.mode = mode;
    }

    /// Advisory rate for callers that tick the clock in real time.
    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    /// Returns true if the halt line is high.
    pub fn is_inhibited(&self, c: &Circuit) -> bool {
        c.level(self.halt).is_high()
    }

    /// Returns true if the reset line is high.
    pub fn is_resetting(&self, c: &Circuit) -> bool {
        c.level(self.reset).is_high()
    }

    /// Puts the phase lines in phase 0, takes effect on the next settle.
    pub fn force_phase_0(&mut self, c: &mut Circuit) {
        for (i, phase) in self.phases.iter().enumerate() {
            c.set_lever(*phase, i == 0);
        }
        self.current = 0;
    }

    /// Moves to the next phase, or resets the machine if the reset line is high.
    pub fn advance(&mut self, c: &mut Circuit) -> Result<PhaseOutcome, SimError> {
        if self.is_resetting(c) {
            self.force_phase_0(c);
            c.reset_edge()?;
            event!(Level::DEBUG, step = c.step(), "clock reset");
            return Ok(PhaseOutcome::Reset);
        }
        if self.is_inhibited(c) {
            event!(Level::TRACE, step = c.step(), "clock inhibited");
            return Ok(PhaseOutcome::Inhibited);
        }
        let next = (self.current + 1) % self.phases.len();
        c.set_lever(self.phases[self.current], false);
        c.set_lever(self.phases[next], true);
        self.current = next;
        c.tick()?;
        event!(Level::TRACE, step = c.step(), phase = next, "phase");
        Ok(PhaseOutcome::Advanced { phase: next })
    }

    /// Advances as many phases as one tick of the current [ClockMode] allows,
    /// stopping early if the clock gets inhibited or reset.
    ///
    /// Returns the number of phases advanced.
    pub fn tick(&mut self, c: &mut Circuit) -> Result<usize, SimError> {
        let budget = match self.mode {
            ClockMode::SingleStep => 1,
            ClockMode::FreeRun { phases_per_tick } => phases_per_tick,
        };
        let mut advanced = 0;
        while advanced < budget {
            match self.advance(c)? {
                PhaseOutcome::Advanced { .. } => advanced += 1,
                PhaseOutcome::Inhibited | PhaseOutcome::Reset => break,
            }
        }
        Ok(advanced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chips::{hc163, hc377};
    use crate::netlist::{CircuitBuilder, Signal, GND, VCC};

    struct Rig {
        c: Circuit,
        clock: Clock,
        halt: LeverHandle,
        reset: LeverHandle,
        phases: Vec<LeverHandle>,
    }

    /// A counter clocked on PHI0 and a register capturing it on PHI1.
    fn rig(phase_count: usize, mode: ClockMode) -> Rig {
        let mut g = CircuitBuilder::new();
        let phases: Vec<_> = (0..phase_count)
            .map(|i| g.internal_lever(format!("PHI{}", i), i == 0).unwrap())
            .collect();
        let halt = g.lever("HLT", false).unwrap();
        let reset = g.lever("RST", false).unwrap();
        let count = g.bus("COUNT", 4).unwrap();
        let latched = g.bus("LATCHED", 8).unwrap();

        let counter = g.hc163("U1").unwrap();
        g.connect(counter, hc163::CLK, phases[0].net()).unwrap();
        g.tie(counter, &[hc163::NCLR, hc163::NLD, hc163::ENP, hc163::ENT], VCC)
            .unwrap();
        g.tie(counter, &hc163::D, GND).unwrap();
        g.connect_word(counter, &hc163::Q, count.bits()).unwrap();

        let register = g.hc377("U2").unwrap();
        g.connect(register, hc377::CLK, phases[1].net()).unwrap();
        g.connect(register, hc377::NE, GND).unwrap();
        g.connect_word(register, &hc377::D[..4], count.bits()).unwrap();
        g.tie(register, &hc377::D[4..], GND).unwrap();
        g.connect_word(register, &hc377::Q, latched.bits()).unwrap();

        let mut c = g.build().unwrap();
        c.reset_edge().unwrap();
        let clock = Clock::new(&phases, halt.net(), reset.net(), mode, 10);
        Rig {
            c,
            clock,
            halt,
            reset,
            phases,
        }
    }

    fn active_phases(r: &Rig) -> Vec<usize> {
        (0..r.phases.len())
            .filter(|i| r.c.level(r.phases[*i].net()) == Signal::High)
            .collect()
    }

    #[test]
    fn test_phases_cycle() {
        let r = &mut rig(3, ClockMode::SingleStep);
        for expected in [1, 2, 0, 1, 2, 0] {
            assert_eq!(
                r.clock.advance(&mut r.c),
                Ok(PhaseOutcome::Advanced { phase: expected })
            );
            assert_eq!(r.clock.phase(), expected);
            assert_eq!(active_phases(r), vec![expected]);
        }
    }

    #[test]
    fn test_capture_order() {
        let r = &mut rig(2, ClockMode::SingleStep);
        let count = r.c.probe_handle("COUNT").unwrap();
        let latched = r.c.probe_handle("LATCHED").unwrap();

        r.clock.advance(&mut r.c).unwrap();
        assert_eq!((count.u8(&r.c), latched.u8(&r.c)), (0, 0));
        r.clock.advance(&mut r.c).unwrap();
        assert_eq!((count.u8(&r.c), latched.u8(&r.c)), (1, 0));
        r.clock.advance(&mut r.c).unwrap();
        assert_eq!((count.u8(&r.c), latched.u8(&r.c)), (1, 1));
    }

    #[test]
    fn test_inhibit() {
        let r = &mut rig(2, ClockMode::FreeRun { phases_per_tick: 4 });
        assert_eq!(r.clock.tick(&mut r.c), Ok(4));
        r.c.set_lever(r.halt, true);
        r.c.settle().unwrap();
        assert_eq!(r.clock.advance(&mut r.c), Ok(PhaseOutcome::Inhibited));
        assert_eq!(r.clock.tick(&mut r.c), Ok(0));
        assert_eq!(r.clock.phase(), 0);
        assert_eq!(r.c.read_probe("COUNT").unwrap().value, 2);
    }

    #[test]
    fn test_reset() {
        let r = &mut rig(2, ClockMode::SingleStep);
        r.clock.advance(&mut r.c).unwrap();
        r.clock.advance(&mut r.c).unwrap();
        r.clock.advance(&mut r.c).unwrap();
        assert_eq!(r.clock.phase(), 1);

        r.c.set_lever(r.reset, true);
        r.c.settle().unwrap();
        assert_eq!(r.clock.advance(&mut r.c), Ok(PhaseOutcome::Reset));
        assert_eq!(r.clock.phase(), 0);
        assert_eq!(active_phases(r), vec![0]);
        assert_eq!(r.c.read_probe("COUNT").unwrap().value, 0);
        assert_eq!(r.c.read_probe("LATCHED").unwrap().value, 0);

        // Leaving reset doesn't fire the pending phase 0 edge.
        r.c.set_lever(r.reset, false);
        assert_eq!(r.c.tick(), Ok(0));
        assert_eq!(r.c.read_probe("COUNT").unwrap().value, 0);
    }
}
