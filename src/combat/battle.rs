//! Battle: the pulse state machine driving two forces to a terminal state.
//!
//! Both combat powers are computed from pre-pulse status before either side
//! takes damage, so there is no first-mover advantage inside a pulse. The
//! only one-sided transition is the opening surprise attack.

use serde::Serialize;

use crate::combat::engine::Force;

/// Absolute combat-power floor below which neither side can meaningfully hurt
/// the other. Prevents unbounded pulse counts as power decays toward zero.
pub const STALEMATE_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Blue,
    Red,
}

/// Terminal condition of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    /// Red at total status zero, blue still afloat.
    RedDefeated,
    /// Blue at total status zero, red still afloat.
    BlueDefeated,
    MutualDestruction,
    Stalemate,
    DurationExpired,
}

impl Conclusion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RedDefeated => "red_defeated",
            Self::BlueDefeated => "blue_defeated",
            Self::MutualDestruction => "mutual_destruction",
            Self::Stalemate => "stalemate",
            Self::DurationExpired => "duration_expired",
        }
    }
}

/// Parallel status/time sequences, one entry per recorded pulse. Entry 0 is
/// the pre-battle state.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PulseHistory {
    pub blue_status: Vec<f64>,
    pub red_status: Vec<f64>,
    pub pulse_index: Vec<u32>,
}

/// Cumulative rounds fired by one side across a battle.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SalvoExpenditure {
    pub missiles: f64,
    pub interceptors: f64,
}

#[derive(Debug, Clone)]
pub struct Battle {
    pub blue: Force,
    pub red: Force,
    pulse_count: u32,
    /// 0 runs to exhaustion; otherwise exactly this many pulses are fought.
    fixed_duration: u32,
    history: PulseHistory,
    blue_expended: SalvoExpenditure,
    red_expended: SalvoExpenditure,
}

impl Battle {
    pub fn new(blue: Force, red: Force) -> Self {
        Self::with_duration(blue, red, 0)
    }

    pub fn with_duration(blue: Force, red: Force, fixed_duration: u32) -> Self {
        let mut battle = Self {
            blue,
            red,
            pulse_count: 0,
            fixed_duration,
            history: PulseHistory::default(),
            blue_expended: SalvoExpenditure::default(),
            red_expended: SalvoExpenditure::default(),
        };
        battle.record_state();
        battle
    }

    pub fn pulse_count(&self) -> u32 {
        self.pulse_count
    }

    pub fn history(&self) -> &PulseHistory {
        &self.history
    }

    pub fn expended(&self, side: Side) -> SalvoExpenditure {
        match side {
            Side::Blue => self.blue_expended,
            Side::Red => self.red_expended,
        }
    }

    /// Neither side can push more than the threshold through the other's
    /// defense. Checked on pre-pulse state, so two toothless forces stalemate
    /// before any pulse is fought.
    pub fn stalemated(&self) -> bool {
        self.blue.combat_power_against(&self.red) <= STALEMATE_THRESHOLD
            && self.red.combat_power_against(&self.blue) <= STALEMATE_THRESHOLD
    }

    /// Terminal condition, or `None` while the battle is still in progress.
    /// Defeat takes precedence over stalemate and duration expiry.
    pub fn conclusion(&self) -> Option<Conclusion> {
        match (self.blue.is_defeated(), self.red.is_defeated()) {
            (true, true) => Some(Conclusion::MutualDestruction),
            (false, true) => Some(Conclusion::RedDefeated),
            (true, false) => Some(Conclusion::BlueDefeated),
            (false, false) => {
                if self.stalemated() {
                    Some(Conclusion::Stalemate)
                } else if self.fixed_duration > 0 && self.pulse_count >= self.fixed_duration {
                    Some(Conclusion::DurationExpired)
                } else {
                    None
                }
            }
        }
    }

    /// One simultaneous exchange. Both powers come from pre-pulse status;
    /// a force destroyed this pulse still lands its full salvo.
    pub fn resolve_pulse(&mut self) {
        let blue_power = self.blue.combat_power_against(&self.red);
        let red_power = self.red.combat_power_against(&self.blue);

        self.blue_expended.missiles += self.blue.salvo_size();
        self.blue_expended.interceptors += self.blue.interceptor_salvo_size();
        self.red_expended.missiles += self.red.salvo_size();
        self.red_expended.interceptors += self.red.interceptor_salvo_size();

        self.red.apply_damage(blue_power);
        self.blue.apply_damage(red_power);

        self.pulse_count += 1;
        self.record_state();
    }

    /// One-sided opening pulse: only the attacker's combat power is applied.
    /// The defender's interceptors still fire (they are already subtracted
    /// inside the attacker's combat power) but no return salvo is launched.
    pub fn surprise_attack(&mut self, attacker: Side) {
        match attacker {
            Side::Blue => {
                let power = self.blue.combat_power_against(&self.red);
                self.blue_expended.missiles += self.blue.salvo_size();
                self.red_expended.interceptors += self.red.interceptor_salvo_size();
                self.red.apply_damage(power);
            }
            Side::Red => {
                let power = self.red.combat_power_against(&self.blue);
                self.red_expended.missiles += self.red.salvo_size();
                self.blue_expended.interceptors += self.blue.interceptor_salvo_size();
                self.blue.apply_damage(power);
            }
        }
        self.pulse_count += 1;
        self.record_state();
    }

    /// Run to the terminal state. With a fixed duration the battle fights
    /// exactly that many pulses regardless of exhaustion or stalemate, then
    /// reports whatever condition holds.
    pub fn resolve(&mut self) -> Conclusion {
        if self.fixed_duration > 0 {
            while self.pulse_count < self.fixed_duration {
                self.resolve_pulse();
            }
            return self.conclusion().unwrap_or(Conclusion::DurationExpired);
        }
        loop {
            if let Some(done) = self.conclusion() {
                return done;
            }
            self.resolve_pulse();
        }
    }

    fn record_state(&mut self) {
        self.history.blue_status.push(self.blue.total_status());
        self.history.red_status.push(self.red.total_status());
        self.history.pulse_index.push(self.pulse_count);
    }
}
