//! Shared error types for the services crate.

use thiserror::Error;

use curve_core::model::ModuleId;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `LearningService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LearningError {
    #[error("unknown module: {0}")]
    UnknownModule(ModuleId),
    #[error("module {module} is locked; complete {} first", join(.missing))]
    Locked {
        module: ModuleId,
        missing: Vec<ModuleId>,
    },
}

fn join(ids: &[ModuleId]) -> String {
    ids.iter()
        .map(ModuleId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Catalog(#[from] curve_core::Error),
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_message_lists_missing_modules() {
        let err = LearningError::Locked {
            module: ModuleId::new("next-data-fetching"),
            missing: vec![ModuleId::new("next-routing"), ModuleId::new("js-async")],
        };
        assert_eq!(
            err.to_string(),
            "module next-data-fetching is locked; complete next-routing, js-async first"
        );
    }
}
