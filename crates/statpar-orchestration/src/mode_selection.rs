//! Isolation mode selection logic.

use statpar_core::worker::StatError;

use crate::interfaces::IsolationMode;

/// Modes run for `--mode all`, in execution order.
pub const ALL_MODES: [IsolationMode; 3] = [
    IsolationMode::Process,
    IsolationMode::Thread,
    IsolationMode::Sequential,
];

/// Get the modes to run based on the `--mode` selection.
pub fn get_modes_to_run(selection: &str) -> Result<Vec<IsolationMode>, StatError> {
    match selection.trim() {
        s if s.eq_ignore_ascii_case("all") => Ok(ALL_MODES.to_vec()),
        name => Ok(vec![name.parse()?]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_all() {
        let modes = get_modes_to_run("all").unwrap();
        assert_eq!(modes, ALL_MODES.to_vec());
    }

    #[test]
    fn select_single() {
        assert_eq!(
            get_modes_to_run("thread").unwrap(),
            vec![IsolationMode::Thread]
        );
        assert_eq!(
            get_modes_to_run(" Process ").unwrap(),
            vec![IsolationMode::Process]
        );
    }

    #[test]
    fn select_unknown() {
        assert!(matches!(
            get_modes_to_run("fork"),
            Err(StatError::Config(_))
        ));
    }
}
