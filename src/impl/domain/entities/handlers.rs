use async_trait::async_trait;

/// What the user is being asked to confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmPrompt {
    DeactivateStore { location: String, units: u64 },
    ClearAll { locations: usize, pool_units: u64 },
    DeleteArchive { name: String },
}

/// Stands in for the yes/no dialog of the host application. Destructive
/// operations only proceed when this returns `true`.
#[async_trait]
pub trait ConfirmationHandler: Send + Sync {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool;
}

/// Confirms everything. For headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

#[async_trait]
impl ConfirmationHandler for AutoConfirm {
    async fn confirm(&self, _prompt: &ConfirmPrompt) -> bool {
        true
    }
}

// --

impl std::fmt::Display for ConfirmPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfirmPrompt::DeactivateStore { location, units } => write!(
                f,
                "Deactivate store {}? {} unit(s) will be moved back to the pool.",
                location, units
            ),
            ConfirmPrompt::ClearAll {
                locations,
                pool_units,
            } => write!(
                f,
                "Clear all data? {} location(s) and {} pooled unit(s) will be removed.",
                locations, pool_units
            ),
            ConfirmPrompt::DeleteArchive { name } => {
                write!(f, "Delete archive '{}'? This cannot be undone.", name)
            }
        }
    }
}
