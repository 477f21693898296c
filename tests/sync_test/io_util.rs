use std::path::{Path, PathBuf};

pub static NETPROJECT_PATH: &str = env!("CARGO_BIN_EXE_netproject");
pub static SCENARIOS_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/scenarios");
pub static SCENARIO_SNAPSHOTS_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/scenario-snapshots");

pub fn scenario_path(name: &str) -> PathBuf {
    Path::new(SCENARIOS_PATH).join(format!("{}.scenario.json", name))
}
