//! Operating-mode state machines for the plant components.
//!
//! Each component owns its mode enumeration and the transition rule. The
//! solver never sets a mode directly; it only shapes the inputs (field-control
//! fraction, permissions, offered heat) that the rules consume.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Collector/receiver operating mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrMode {
    #[default]
    Off,
    Startup,
    On,
    /// Producing, with part of the field tracked off the receiver
    Defocus,
}

/// What the receiver can do this step, as seen by its transition rule.
#[derive(Clone, Copy, Debug)]
pub struct CrTransitionInput {
    /// Net absorbed power is above the minimum turndown
    pub available: bool,
    /// The field is allowed to focus on the receiver at all (field control > 0)
    pub startup_allowed: bool,
    /// Accumulated startup energy and time are satisfied by the end of the step
    pub startup_complete: bool,
    /// Field control is below 1
    pub defocused: bool,
}

impl CrMode {
    pub fn is_producing(self) -> bool {
        matches!(self, CrMode::On | CrMode::Defocus)
    }

    pub fn transition(self, input: CrTransitionInput) -> CrMode {
        if !input.available {
            return CrMode::Off;
        }
        let running = if input.defocused {
            CrMode::Defocus
        } else {
            CrMode::On
        };
        match self {
            CrMode::On | CrMode::Defocus => running,
            CrMode::Startup if input.startup_complete => running,
            CrMode::Startup => CrMode::Startup,
            CrMode::Off if !input.startup_allowed => CrMode::Off,
            CrMode::Off if input.startup_complete => running,
            CrMode::Off => CrMode::Startup,
        }
    }
}

impl fmt::Display for CrMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CrMode::Off => "OFF",
            CrMode::Startup => "STARTUP",
            CrMode::On => "ON",
            CrMode::Defocus => "DEFOCUS",
        };
        f.write_str(s)
    }
}

/// Power-cycle operating mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PcMode {
    #[default]
    Off,
    Startup,
    On,
    Standby,
}

/// Inputs to the power-cycle transition rule.
#[derive(Clone, Copy, Debug)]
pub struct PcTransitionInput {
    /// Offered thermal power over design thermal input
    pub load_frac: f64,
    pub cutoff_frac: f64,
    pub sb_frac: f64,
    pub startup_allowed: bool,
    pub standby_allowed: bool,
    /// Accumulated startup energy and time are satisfied by the end of the step
    pub startup_complete: bool,
}

impl PcMode {
    pub fn is_running(self) -> bool {
        matches!(self, PcMode::On | PcMode::Standby)
    }

    pub fn transition(self, input: PcTransitionInput) -> PcMode {
        if input.load_frac >= input.cutoff_frac {
            return match self {
                PcMode::On | PcMode::Standby => PcMode::On,
                PcMode::Startup if input.startup_complete => PcMode::On,
                PcMode::Startup => PcMode::Startup,
                PcMode::Off if !input.startup_allowed => PcMode::Off,
                PcMode::Off if input.startup_complete => PcMode::On,
                PcMode::Off => PcMode::Startup,
            };
        }
        if input.load_frac >= input.sb_frac && input.standby_allowed && self.is_running() {
            return PcMode::Standby;
        }
        PcMode::Off
    }
}

impl fmt::Display for PcMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PcMode::Off => "OFF",
            PcMode::Startup => "STARTUP",
            PcMode::On => "ON",
            PcMode::Standby => "STANDBY",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cr(available: bool, allowed: bool, complete: bool, defocused: bool) -> CrTransitionInput {
        CrTransitionInput {
            available,
            startup_allowed: allowed,
            startup_complete: complete,
            defocused,
        }
    }

    fn pc(load: f64, su: bool, sb: bool, complete: bool) -> PcTransitionInput {
        PcTransitionInput {
            load_frac: load,
            cutoff_frac: 0.25,
            sb_frac: 0.15,
            startup_allowed: su,
            standby_allowed: sb,
            startup_complete: complete,
        }
    }

    #[test]
    fn receiver_needs_startup_before_on() {
        assert_eq!(CrMode::Off.transition(cr(true, true, false, false)), CrMode::Startup);
        assert_eq!(CrMode::Startup.transition(cr(true, true, false, false)), CrMode::Startup);
        assert_eq!(CrMode::Startup.transition(cr(true, true, true, false)), CrMode::On);
        assert_eq!(CrMode::Off.transition(cr(true, true, true, true)), CrMode::Defocus);
    }

    #[test]
    fn receiver_startup_gated_by_permission() {
        assert_eq!(CrMode::Off.transition(cr(true, false, true, false)), CrMode::Off);
        // An ongoing startup is not interrupted by the gate
        assert_eq!(CrMode::Startup.transition(cr(true, false, true, false)), CrMode::On);
    }

    #[test]
    fn receiver_shuts_down_without_resource() {
        for mode in [CrMode::Off, CrMode::Startup, CrMode::On, CrMode::Defocus] {
            assert_eq!(mode.transition(cr(false, true, true, false)), CrMode::Off);
        }
    }

    #[test]
    fn receiver_toggles_defocus() {
        assert_eq!(CrMode::On.transition(cr(true, true, true, true)), CrMode::Defocus);
        assert_eq!(CrMode::Defocus.transition(cr(true, true, true, false)), CrMode::On);
    }

    #[test]
    fn cycle_startup_and_on() {
        assert_eq!(PcMode::Off.transition(pc(0.8, true, true, false)), PcMode::Startup);
        assert_eq!(PcMode::Off.transition(pc(0.8, false, true, false)), PcMode::Off);
        assert_eq!(PcMode::Startup.transition(pc(0.8, false, true, true)), PcMode::On);
        assert_eq!(PcMode::Standby.transition(pc(0.8, false, true, false)), PcMode::On);
    }

    #[test]
    fn cycle_standby_only_from_running() {
        assert_eq!(PcMode::On.transition(pc(0.2, true, true, true)), PcMode::Standby);
        assert_eq!(PcMode::On.transition(pc(0.2, true, false, true)), PcMode::Off);
        assert_eq!(PcMode::Off.transition(pc(0.2, true, true, true)), PcMode::Off);
        assert_eq!(PcMode::Standby.transition(pc(0.05, true, true, true)), PcMode::Off);
    }

    #[test]
    fn display_names() {
        assert_eq!(CrMode::Defocus.to_string(), "DEFOCUS");
        assert_eq!(PcMode::Standby.to_string(), "STANDBY");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn cr_mode() -> impl Strategy<Value = CrMode> {
            prop_oneof![
                Just(CrMode::Off),
                Just(CrMode::Startup),
                Just(CrMode::On),
                Just(CrMode::Defocus),
            ]
        }

        fn pc_mode() -> impl Strategy<Value = PcMode> {
            prop_oneof![
                Just(PcMode::Off),
                Just(PcMode::Startup),
                Just(PcMode::On),
                Just(PcMode::Standby),
            ]
        }

        proptest! {
            #[test]
            fn receiver_off_without_permission_stays_off(
                available in any::<bool>(),
                complete in any::<bool>(),
                defocused in any::<bool>(),
            ) {
                let next = CrMode::Off.transition(cr(available, false, complete, defocused));
                prop_assert_eq!(next, CrMode::Off);
            }

            #[test]
            fn producing_receiver_reports_focus(
                mode in cr_mode(),
                allowed in any::<bool>(),
                complete in any::<bool>(),
                defocused in any::<bool>(),
            ) {
                let next = mode.transition(cr(true, allowed, complete, defocused));
                if next.is_producing() {
                    prop_assert_eq!(next == CrMode::Defocus, defocused);
                }
            }

            #[test]
            fn cycle_below_standby_load_shuts_down(
                mode in pc_mode(),
                load in 0.0f64..0.15,
                su in any::<bool>(),
                sb in any::<bool>(),
                complete in any::<bool>(),
            ) {
                prop_assert_eq!(mode.transition(pc(load, su, sb, complete)), PcMode::Off);
            }

            #[test]
            fn standby_reached_only_from_running_cycle(
                mode in pc_mode(),
                load in 0.0f64..2.0,
                su in any::<bool>(),
                sb in any::<bool>(),
                complete in any::<bool>(),
            ) {
                let next = mode.transition(pc(load, su, sb, complete));
                if next == PcMode::Standby {
                    prop_assert!(mode.is_running());
                    prop_assert!(sb);
                    prop_assert!((0.15..0.25).contains(&load));
                }
            }

            #[test]
            fn blocked_cycle_never_leaves_off(
                load in 0.0f64..2.0,
                sb in any::<bool>(),
                complete in any::<bool>(),
            ) {
                prop_assert_eq!(PcMode::Off.transition(pc(load, false, sb, complete)), PcMode::Off);
            }
        }
    }
}
