use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid alert config: {0}")]
    InvalidAlertConfig(String),

    #[error("Cannot {action} alert {id} while {from}")]
    InvalidTransition {
        id: String,
        from: String,
        action: &'static str,
    },

    #[error("Onboarding is not finished: {0} step incomplete")]
    OnboardingIncomplete(&'static str),
}
