pub mod battle;
pub mod engine;
pub mod report;
pub mod rng;

pub use battle::{
    Battle, Conclusion, PulseHistory, SalvoExpenditure, Side, STALEMATE_THRESHOLD,
};
pub use engine::{average_readiness, Force, Ship, WeaponProfile, SERVICE_LIFE_YEARS};
pub use report::{force_status_percent, pulse_snapshot, BattleSummary};
pub use rng::{stream_seed, Rng};
