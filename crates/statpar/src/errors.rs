//! Error handling and exit codes.

use statpar_core::constants::exit_codes;
use statpar_core::kind::StatKind;
use statpar_core::worker::StatError;
use statpar_orchestration::isolation::EngineError;

/// Application-level failures that are not library errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// One or more runs ended with failed slots.
    #[error("{0} run(s) finished without all three results")]
    Incomplete(usize),

    /// Worker mode could not produce its record.
    #[error("{kind} worker failed")]
    Worker {
        kind: StatKind,
        #[source]
        source: EngineError,
    },
}

/// Handle a statistics error and return the appropriate exit code.
pub fn handle_error(err: &StatError) -> i32 {
    match err {
        StatError::EmptyDataset | StatError::Allocation(_) | StatError::Handoff(_) => {
            exit_codes::ERROR_GENERIC
        }
        StatError::InvalidRange { .. } | StatError::Config(_) => exit_codes::ERROR_CONFIG,
        StatError::Cancelled => exit_codes::ERROR_CANCELED,
        StatError::Mismatch(_) => exit_codes::ERROR_MISMATCH,
    }
}

/// Exit code for a coordinated-run error.
pub fn handle_engine_error(err: &EngineError) -> i32 {
    match err {
        EngineError::Spawn { .. } | EngineError::Channel(_) | EngineError::Wire(_) => {
            exit_codes::ERROR_GENERIC
        }
        EngineError::Stat(e) => handle_error(e),
        EngineError::Cancelled => exit_codes::ERROR_CANCELED,
    }
}

/// Exit code for any error reaching `main`.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(app) = err.downcast_ref::<AppError>() {
        match app {
            AppError::Incomplete(_) => exit_codes::ERROR_TIMEOUT,
            AppError::Worker { .. } => exit_codes::ERROR_GENERIC,
        }
    } else if let Some(engine) = err.downcast_ref::<EngineError>() {
        handle_engine_error(engine)
    } else if let Some(stat) = err.downcast_ref::<StatError>() {
        handle_error(stat)
    } else {
        exit_codes::ERROR_GENERIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn error_codes() {
        assert_eq!(handle_error(&StatError::Cancelled), 130);
        assert_eq!(handle_error(&StatError::Mismatch("mean".into())), 3);
        assert_eq!(handle_error(&StatError::Config("bad".into())), 4);
        assert_eq!(handle_error(&StatError::InvalidRange { min: 2, max: 1 }), 4);
        assert_eq!(handle_error(&StatError::EmptyDataset), 1);
    }

    #[test]
    fn engine_codes() {
        assert_eq!(handle_engine_error(&EngineError::Cancelled), 130);
        assert_eq!(
            handle_engine_error(&EngineError::Spawn {
                kind: StatKind::Mean,
                source: io::Error::other("missing"),
            }),
            1
        );
        assert_eq!(
            handle_engine_error(&EngineError::Stat(StatError::Config("x".into()))),
            4
        );
    }

    #[test]
    fn anyhow_codes() {
        assert_eq!(exit_code(&AppError::Incomplete(1).into()), 2);
        assert_eq!(exit_code(&EngineError::Cancelled.into()), 130);
        assert_eq!(exit_code(&StatError::Mismatch("x".into()).into()), 3);
        assert_eq!(exit_code(&anyhow::anyhow!("write failed")), 1);
        let wrapped = anyhow::Error::from(StatError::Config("bad".into())).context("startup");
        assert_eq!(exit_code(&wrapped), 4);
    }
}
