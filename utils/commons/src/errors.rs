use super::*;

/// The custom errors the auction contract can produce.
#[derive(Serialize, Debug, PartialEq, Eq, Reject, SchemaType)]
pub enum CustomContractError {
    /// Failed parsing the parameter (Error code: -1).
    #[from(ParseError)]
    ParseParams,
    /// Failed logging: Log is full (Error code: -2).
    LogFull,
    /// Failed logging: Log is malformed (Error code: -3).
    LogMalformed,
    /// No auction record exists for the token (Error code: -4).
    NotFound,
    /// Token is already in an open or unsettled auction (Error code: -5).
    AlreadyActive,
    /// Sender does not hold the token or has not made the auction contract
    /// an operator (Error code: -6).
    NotAuthorized,
    /// Auction no longer accepts bids (Error code: -7).
    AuctionNotOpen,
    /// Auction deadline has passed (Error code: -8).
    AuctionExpired,
    /// Raised if bid is not higher than the highest amount (Error code: -9)
    BidTooLow,
    /// Only the seller can perform this action (Error code: -10).
    NotSeller,
    /// Raised if there is an attempt to end the auction before its deadline
    /// (Error code: -11)
    AuctionStillOpen,
    /// Auction was already ended (Error code: -12).
    AlreadyClosed,
    /// Auction has not been ended yet (Error code: -13).
    AuctionNotClosed,
    /// Only the highest bidder can claim the token (Error code: -14).
    NotWinner,
    /// Token was already delivered for this auction (Error code: -15).
    AlreadyClaimed,
    /// Sender has no balance to withdraw (Error code: -16).
    NothingToWithdraw,
    /// Value or token transfer failed (Error code: -17).
    TransferFailed,
    /// Only account addresses can take part in auctions (Error code: -18).
    OnlyAccountAddress,
    /// Duration is either zero, above the configured maximum or overflows
    /// (Error code: -19)
    InvalidDuration,
    /// Unauthorized (Error code: -20)
    Unauthorized,
    /// Incompatible contract (Error code: -21)
    Incompatible,
    /// Token was auctioned the maximum number of times (Error code: -22).
    RoundLimit,
}

/// Mapping the logging errors to CustomContractError.
impl From<LogError> for CustomContractError {
    fn from(le: LogError) -> Self {
        match le {
            LogError::Full => Self::LogFull,
            LogError::Malformed => Self::LogMalformed,
        }
    }
}

/// Mapping errors related to contract invocations to CustomContractError.
impl<T> From<CallContractError<T>> for CustomContractError {
    fn from(_cce: CallContractError<T>) -> Self {
        Self::TransferFailed
    }
}

/// Mapping errors related to value transfers to CustomContractError.
impl From<TransferError> for CustomContractError {
    fn from(_te: TransferError) -> Self {
        Self::TransferFailed
    }
}
