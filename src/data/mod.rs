pub mod config;
pub mod inventory;
pub mod validate;

pub use config::{load_scenario, ScenarioConfig, DEFAULT_SCENARIO_PATH};
pub use inventory::{
    load_inventory, load_inventory_or_builtin, Inventory, ShipClassRecord, WeaponClassRecord,
    DEFAULT_INVENTORY_PATH,
};
pub use validate::{
    validate_inventory, validate_inventory_file, ValidationDiagnostic, ValidationReport,
    ValidationSeverity,
};
