//! Permission policies.

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};
use sf_components::{CrMode, PcMode, Permissions};
use sf_core::SimInfo;

/// Small slack on accumulated hours.
const EPSILON_HR: f64 = 1e-9;

/// Everything a policy may look at when a timestep has converged.
#[derive(Clone, Copy, Debug)]
pub struct PolicyContext {
    pub sim: SimInfo,
    /// Permissions that were in force during the step
    pub current: Permissions,
    pub cr_mode_before: CrMode,
    pub cr_mode: CrMode,
    pub pc_mode_before: PcMode,
    pub pc_mode: PcMode,
}

/// Computes next-step permissions from this step's outcome.
pub trait PermissionPolicy {
    fn name(&self) -> &str;

    /// Clear carried state before a new run.
    fn reset(&mut self);

    /// Permissions for the next timestep.
    fn next(&mut self, ctx: &PolicyContext) -> Permissions;
}

/// Permits every transition at every step.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysAllow;

impl PermissionPolicy for AlwaysAllow {
    fn name(&self) -> &str {
        "always-allow"
    }

    fn reset(&mut self) {}

    fn next(&mut self, _ctx: &PolicyContext) -> Permissions {
        Permissions::default()
    }
}

/// Configuration for [`StandardPolicy`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardPolicyConfig {
    /// Hours the receiver must stay off after shutting down
    pub rec_su_cooldown_hr: f64,
    /// Hours the power cycle must stay off after shutting down
    pub pc_su_cooldown_hr: f64,
    /// Maximum consecutive hours in standby
    pub max_standby_hr: f64,
}

impl Default for StandardPolicyConfig {
    fn default() -> Self {
        Self {
            rec_su_cooldown_hr: 1.0,
            pc_su_cooldown_hr: 1.0,
            max_standby_hr: 2.0,
        }
    }
}

/// Cooldown-based permissions.
///
/// - Receiver startup is blocked for `rec_su_cooldown_hr` after the receiver
///   drops from a producing mode to OFF.
/// - Cycle startup is blocked for `pc_su_cooldown_hr` after the cycle drops
///   to OFF from any other mode.
/// - Standby is blocked once the cycle has been in standby for
///   `max_standby_hr` without interruption.
#[derive(Clone, Debug)]
pub struct StandardPolicy {
    config: StandardPolicyConfig,
    rec_cooldown_hr: f64,
    pc_cooldown_hr: f64,
    standby_hr: f64,
}

impl StandardPolicy {
    pub fn new(config: StandardPolicyConfig) -> ControlResult<Self> {
        for (v, what) in [
            (config.rec_su_cooldown_hr, "receiver cooldown must be non-negative"),
            (config.pc_su_cooldown_hr, "cycle cooldown must be non-negative"),
            (config.max_standby_hr, "standby limit must be non-negative"),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(ControlError::InvalidArg { what });
            }
        }
        Ok(Self {
            config,
            rec_cooldown_hr: 0.0,
            pc_cooldown_hr: 0.0,
            standby_hr: 0.0,
        })
    }

    pub fn config(&self) -> &StandardPolicyConfig {
        &self.config
    }
}

impl PermissionPolicy for StandardPolicy {
    fn name(&self) -> &str {
        "standard"
    }

    fn reset(&mut self) {
        self.rec_cooldown_hr = 0.0;
        self.pc_cooldown_hr = 0.0;
        self.standby_hr = 0.0;
    }

    fn next(&mut self, ctx: &PolicyContext) -> Permissions {
        let dt = ctx.sim.step_hours();

        if ctx.cr_mode_before.is_producing() && ctx.cr_mode == CrMode::Off {
            self.rec_cooldown_hr = self.config.rec_su_cooldown_hr;
            tracing::debug!(
                time_s = ctx.sim.time_s,
                cooldown_hr = self.rec_cooldown_hr,
                "receiver shut down; startup cooldown armed"
            );
        } else {
            self.rec_cooldown_hr = (self.rec_cooldown_hr - dt).max(0.0);
        }

        if ctx.pc_mode_before != PcMode::Off && ctx.pc_mode == PcMode::Off {
            self.pc_cooldown_hr = self.config.pc_su_cooldown_hr;
            tracing::debug!(
                time_s = ctx.sim.time_s,
                cooldown_hr = self.pc_cooldown_hr,
                "power cycle shut down; startup cooldown armed"
            );
        } else {
            self.pc_cooldown_hr = (self.pc_cooldown_hr - dt).max(0.0);
        }

        if ctx.pc_mode == PcMode::Standby {
            self.standby_hr += dt;
        } else {
            self.standby_hr = 0.0;
        }

        Permissions {
            is_rec_su_allowed: self.rec_cooldown_hr <= EPSILON_HR,
            is_pc_su_allowed: self.pc_cooldown_hr <= EPSILON_HR,
            is_pc_sb_allowed: self.standby_hr + EPSILON_HR < self.config.max_standby_hr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(cr: (CrMode, CrMode), pc: (PcMode, PcMode)) -> PolicyContext {
        let mut sim = SimInfo::new(3600.0).unwrap();
        sim.set_step_index(10);
        PolicyContext {
            sim,
            current: Permissions::default(),
            cr_mode_before: cr.0,
            cr_mode: cr.1,
            pc_mode_before: pc.0,
            pc_mode: pc.1,
        }
    }

    const STEADY: (PcMode, PcMode) = (PcMode::On, PcMode::On);

    #[test]
    fn always_allow_is_permissive() {
        let mut p = AlwaysAllow;
        let perms = p.next(&ctx((CrMode::On, CrMode::Off), (PcMode::On, PcMode::Off)));
        assert_eq!(perms, Permissions::default());
    }

    #[test]
    fn receiver_shutdown_arms_cooldown() {
        let mut p = StandardPolicy::new(StandardPolicyConfig {
            rec_su_cooldown_hr: 2.0,
            ..StandardPolicyConfig::default()
        })
        .unwrap();

        let perms = p.next(&ctx((CrMode::On, CrMode::Off), STEADY));
        assert!(!perms.is_rec_su_allowed);
        let perms = p.next(&ctx((CrMode::Off, CrMode::Off), STEADY));
        assert!(!perms.is_rec_su_allowed);
        let perms = p.next(&ctx((CrMode::Off, CrMode::Off), STEADY));
        assert!(perms.is_rec_su_allowed);
    }

    #[test]
    fn zero_cooldown_never_blocks() {
        let mut p = StandardPolicy::new(StandardPolicyConfig {
            rec_su_cooldown_hr: 0.0,
            pc_su_cooldown_hr: 0.0,
            ..StandardPolicyConfig::default()
        })
        .unwrap();
        let perms = p.next(&ctx((CrMode::On, CrMode::Off), (PcMode::On, PcMode::Off)));
        assert!(perms.is_rec_su_allowed);
        assert!(perms.is_pc_su_allowed);
    }

    #[test]
    fn cycle_shutdown_arms_cooldown() {
        let mut p = StandardPolicy::new(StandardPolicyConfig::default()).unwrap();
        let perms = p.next(&ctx((CrMode::On, CrMode::On), (PcMode::Standby, PcMode::Off)));
        assert!(!perms.is_pc_su_allowed);
        let perms = p.next(&ctx((CrMode::On, CrMode::On), (PcMode::Off, PcMode::Off)));
        assert!(perms.is_pc_su_allowed);
    }

    #[test]
    fn standby_is_time_limited() {
        let mut p = StandardPolicy::new(StandardPolicyConfig::default()).unwrap();
        let sb = (PcMode::Standby, PcMode::Standby);
        let cr = (CrMode::On, CrMode::On);
        assert!(p.next(&ctx(cr, (PcMode::On, PcMode::Standby))).is_pc_sb_allowed);
        assert!(!p.next(&ctx(cr, sb)).is_pc_sb_allowed);
        // Leaving standby clears the counter
        assert!(p.next(&ctx(cr, (PcMode::Standby, PcMode::On))).is_pc_sb_allowed);
    }

    #[test]
    fn reset_clears_cooldowns() {
        let mut p = StandardPolicy::new(StandardPolicyConfig::default()).unwrap();
        p.next(&ctx((CrMode::On, CrMode::Off), (PcMode::On, PcMode::Off)));
        p.reset();
        let perms = p.next(&ctx((CrMode::Off, CrMode::Off), (PcMode::Off, PcMode::Off)));
        assert!(perms.is_rec_su_allowed && perms.is_pc_su_allowed);
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

        fn history() -> impl Strategy<Value = Vec<(CrMode, PcMode)>> {
            prop::collection::vec((cr_mode(), pc_mode()), 1..48)
        }

        proptest! {
            #[test]
            fn always_allow_ignores_history(steps in history()) {
                let mut p = AlwaysAllow;
                let mut prev = (CrMode::Off, PcMode::Off);
                for (cr, pc) in steps {
                    let perms = p.next(&ctx((prev.0, cr), (prev.1, pc)));
                    prop_assert_eq!(perms, Permissions::default());
                    prev = (cr, pc);
                }
            }

            #[test]
            fn zero_cooldowns_only_limit_standby(steps in history()) {
                let mut p = StandardPolicy::new(StandardPolicyConfig {
                    rec_su_cooldown_hr: 0.0,
                    pc_su_cooldown_hr: 0.0,
                    max_standby_hr: 1000.0,
                })
                .unwrap();
                let mut prev = (CrMode::Off, PcMode::Off);
                for (cr, pc) in steps {
                    let perms = p.next(&ctx((prev.0, cr), (prev.1, pc)));
                    prop_assert_eq!(perms, Permissions::default());
                    prev = (cr, pc);
                }
            }

            #[test]
            fn shutdown_always_blocks_the_next_startup(
                steps in history(),
                cooldown in 0.5f64..5.0,
            ) {
                let mut p = StandardPolicy::new(StandardPolicyConfig {
                    rec_su_cooldown_hr: cooldown,
                    pc_su_cooldown_hr: cooldown,
                    ..StandardPolicyConfig::default()
                })
                .unwrap();
                let mut prev = (CrMode::Off, PcMode::Off);
                for (cr, pc) in steps {
                    let perms = p.next(&ctx((prev.0, cr), (prev.1, pc)));
                    if prev.0.is_producing() && cr == CrMode::Off {
                        prop_assert!(!perms.is_rec_su_allowed);
                    }
                    if prev.1 != PcMode::Off && pc == PcMode::Off {
                        prop_assert!(!perms.is_pc_su_allowed);
                    }
                    prev = (cr, pc);
                }
            }
        }
    }

    #[test]
    fn rejects_negative_config() {
        let err = StandardPolicy::new(StandardPolicyConfig {
            max_standby_hr: -1.0,
            ..StandardPolicyConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, ControlError::InvalidArg { .. }));
    }
}
