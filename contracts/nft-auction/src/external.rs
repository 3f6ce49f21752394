use commons::Token;
use concordium_std::*;

#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct InitParams {
    /// Longest auction the contract accepts.
    pub max_duration: Duration,
}

#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct StartAuctionParams {
    /// Token to be auctioned. The sender must hold it and have made this
    /// contract an operator in the token registry.
    pub token: Token,
    /// Time from now until bids are no longer accepted.
    pub duration: Duration,
}

#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct ViewAuctionParams {
    pub token: Token,
    /// Archived auction round. The current auction is returned when omitted.
    pub round: Option<u32>,
}

#[derive(Debug, Clone, SchemaType, Serialize)]
pub struct PendingWithdrawalParams {
    pub token: Token,
    pub account: AccountAddress,
}

#[derive(Debug, Clone, SchemaType, Serialize, PartialEq, Eq)]
pub enum InternalValue {
    MaxDuration(Duration),
}

#[derive(Debug, Clone, SchemaType, Serialize)]
pub enum ViewInternalValueParams {
    MaxDuration,
}
