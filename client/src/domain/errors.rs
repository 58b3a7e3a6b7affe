use thiserror::Error;

/// Local checks run when a deal is submitted. Never reaches the repository.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid time range")]
    InvalidTimeRange,
    #[error("Select at least one group this deal applies to")]
    InvalidApplicableGroups,
    #[error("A restaurant, item name and deal type are required")]
    IncompleteDraft,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddDealError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Message from the repository or image storage, shown as-is
    #[error("{0}")]
    Repository(String),
    #[error("Sign in to post a deal")]
    SignInRequired,
    #[error("Deals can only be submitted from the last step")]
    NotAtFinalStep,
}

impl AddDealError {
    pub fn from_repository(error: anyhow::Error) -> Self {
        AddDealError::Repository(error.to_string())
    }
}
