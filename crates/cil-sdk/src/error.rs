use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("transaction id must not be blank")]
    BlankTransactionId,

    #[error("ledger error: {0}")]
    Ledger(#[from] cil_ledger::LedgerError),
}

pub type SdkResult<T> = Result<T, SdkError>;
