//! broadside: salvo-exchange attrition simulation between two naval groups,
//! repeated under randomized force compositions by a Monte Carlo harness.

pub mod cli;
pub mod combat;
pub mod cost;
pub mod data;
pub mod generate;
pub mod montecarlo;
pub mod parallel;
