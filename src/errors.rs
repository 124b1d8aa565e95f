/// Error type that can be returned by fallible operations in this crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error writing CSV output; could wrap IO or serialization errors
    #[error("Error processing CSV: {0}")]
    Csv(#[from] csv::Error),
    /// Error serializing state for the [`Storage`](crate::storage::Storage) backend
    #[error("Error encoding stored state: {0}")]
    Json(#[from] serde_json::Error),
    /// Error reading or writing a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// An amount was entered that is not a number, or is larger than
    /// [`MAX_AMOUNT`](crate::io::MAX_AMOUNT) either way.
    ///
    /// Amounts are checked when entered; a rejected value never reaches the ledger.
    #[error("Invalid amount {0:?}: expected a number such as 12.50 or -40, at most 1e15 either way")]
    InvalidAmount(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_shows_cause() {
        let cause = serde_json::from_str::<bool>("maybe").unwrap_err();
        let expected = format!("Error encoding stored state: {cause}");
        assert_eq!(Error::from(cause).to_string(), expected);
    }
}
