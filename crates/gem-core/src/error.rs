use std::fmt;

use gem_sol::{Address, SolError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GemError {
    #[error("wallet not connected")]
    WalletNotConnected,

    #[error("address derivation exhausted: {0}")]
    DerivationExhausted(String),

    #[error("malformed account data: {0}")]
    MalformedAccountData(String),

    #[error("transport failure: {0}")]
    TransportFailure(String),

    #[error("signature rejected: {0}")]
    SignatureRejected(String),

    #[error("confirmation timed out after {0}s")]
    ConfirmationTimeout(u64),

    #[error("protocol rejected: {0}")]
    ProtocolRejected(String),

    #[error("account not found: {0}")]
    AccountNotFound(Address),

    #[error("metadata error: {0}")]
    Metadata(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("transaction error: {0}")]
    Transaction(String),
}

impl From<SolError> for GemError {
    fn from(e: SolError) -> Self {
        match e {
            SolError::DerivationExhausted(msg) => GemError::DerivationExhausted(msg),
            other => GemError::Transaction(other.to_string()),
        }
    }
}

impl GemError {
    /// Attach the user action this failure belongs to.
    pub fn during(self, action: Action) -> OperationError {
        OperationError {
            action,
            source: self,
        }
    }
}

/// User-facing protocol actions, used to scope errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Mint,
    Imprint,
    Redeem,
    Allocate,
    Deallocate,
    Delegate,
    Undelegate,
    Claim,
    Load,
    ListTargets,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Mint => "mint",
            Action::Imprint => "imprint",
            Action::Redeem => "redeem",
            Action::Allocate => "allocate",
            Action::Deallocate => "deallocate",
            Action::Delegate => "delegate",
            Action::Undelegate => "undelegate",
            Action::Claim => "claim",
            Action::Load => "load",
            Action::ListTargets => "list-targets",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A [`GemError`] annotated with the action that failed.
#[derive(Debug, Error)]
#[error("{action} failed: {source}")]
pub struct OperationError {
    pub action: Action,
    pub source: GemError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_malformed_account_data() {
        let err = GemError::MalformedAccountData("need 39 bytes, got 12".into());
        assert_eq!(
            err.to_string(),
            "malformed account data: need 39 bytes, got 12"
        );
    }

    #[test]
    fn display_confirmation_timeout() {
        assert_eq!(
            GemError::ConfirmationTimeout(60).to_string(),
            "confirmation timed out after 60s"
        );
    }

    #[test]
    fn derivation_failure_keeps_its_kind() {
        let err: GemError = SolError::DerivationExhausted("no bump".into()).into();
        assert!(matches!(err, GemError::DerivationExhausted(_)));
    }

    #[test]
    fn other_sol_errors_become_transaction_errors() {
        let err: GemError = SolError::SigningError("not a required signer".into()).into();
        assert!(matches!(err, GemError::Transaction(_)));
        assert!(err.to_string().contains("not a required signer"));
    }

    #[test]
    fn operation_error_names_action_and_cause() {
        let err = GemError::SignatureRejected("user declined".into()).during(Action::Claim);
        assert_eq!(err.to_string(), "claim failed: signature rejected: user declined");
        assert!(err.source().is_some());
    }

    #[test]
    fn action_labels() {
        assert_eq!(Action::ListTargets.to_string(), "list-targets");
        assert_eq!(Action::Undelegate.to_string(), "undelegate");
    }
}
