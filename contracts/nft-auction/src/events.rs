use commons::{Token, ABORT_TAG, BIDING_TAG, CLAIM_TAG, END_TAG, RECLAIM_TAG, START_TAG, WITHDRAW_TAG};
use concordium_std::*;

/// Auction start event data.
#[derive(Debug, Serial)]
pub struct StartEvent<'a> {
    /// Auctioned token.
    pub token: &'a Token,
    /// Seller account address.
    pub seller: &'a AccountAddress,
    /// Bids are accepted until this time.
    pub deadline: Timestamp,
}

/// Bid event data.
#[derive(Debug, Serial)]
pub struct BidEvent<'a> {
    pub token: &'a Token,
    /// Bidder account address.
    pub bidder: &'a AccountAddress,
    /// Bid amount.
    pub amount: Amount,
}

/// Auction end event data.
#[derive(Debug, Serial)]
pub struct EndEvent<'a> {
    pub token: &'a Token,
    pub seller: &'a AccountAddress,
    /// Highest bidder, if there was any bid.
    pub winner: &'a Option<AccountAddress>,
    /// Winning bid.
    pub price: Amount,
}

/// Token claim event data.
#[derive(Debug, Serial)]
pub struct ClaimEvent<'a> {
    pub token: &'a Token,
    /// Address of the previous token owner.
    pub seller: &'a AccountAddress,
    /// Address of the auction winner.
    pub winner: &'a AccountAddress,
}

/// Withdraw event data.
#[derive(Debug, Serial)]
pub struct WithdrawEvent<'a> {
    pub token: &'a Token,
    /// Receiver of the funds.
    pub account: &'a AccountAddress,
    pub amount: Amount,
}

/// Reclaim event data, logged when an auction without bids gets settled.
#[derive(Debug, Serial)]
pub struct ReclaimEvent<'a> {
    pub token: &'a Token,
    pub seller: &'a AccountAddress,
}

/// Abort event data, logged when the winning bid is refunded because the
/// seller no longer lets this contract move the token.
#[derive(Debug, Serial)]
pub struct AbortEvent<'a> {
    pub token: &'a Token,
    pub seller: &'a AccountAddress,
    pub winner: &'a AccountAddress,
    /// Amount refunded to the winner.
    pub amount: Amount,
}

/// Tagged Custom event to be serialized for the event log.
#[derive(Debug)]
pub enum AuctionEvents<'a> {
    Start(StartEvent<'a>),
    Bid(BidEvent<'a>),
    End(EndEvent<'a>),
    Claim(ClaimEvent<'a>),
    Withdraw(WithdrawEvent<'a>),
    Reclaim(ReclaimEvent<'a>),
    Abort(AbortEvent<'a>),
}

impl<'a> AuctionEvents<'a> {
    pub fn start(token: &'a Token, seller: &'a AccountAddress, deadline: Timestamp) -> Self {
        Self::Start(StartEvent {
            token,
            seller,
            deadline,
        })
    }

    pub fn bid(token: &'a Token, bidder: &'a AccountAddress, amount: Amount) -> Self {
        Self::Bid(BidEvent {
            token,
            bidder,
            amount,
        })
    }

    pub fn end(
        token: &'a Token,
        seller: &'a AccountAddress,
        winner: &'a Option<AccountAddress>,
        price: Amount,
    ) -> Self {
        Self::End(EndEvent {
            token,
            seller,
            winner,
            price,
        })
    }

    pub fn claim(
        token: &'a Token,
        seller: &'a AccountAddress,
        winner: &'a AccountAddress,
    ) -> Self {
        Self::Claim(ClaimEvent {
            token,
            seller,
            winner,
        })
    }

    pub fn withdraw(token: &'a Token, account: &'a AccountAddress, amount: Amount) -> Self {
        Self::Withdraw(WithdrawEvent {
            token,
            account,
            amount,
        })
    }

    pub fn reclaim(token: &'a Token, seller: &'a AccountAddress) -> Self {
        Self::Reclaim(ReclaimEvent { token, seller })
    }

    pub fn abort(
        token: &'a Token,
        seller: &'a AccountAddress,
        winner: &'a AccountAddress,
        amount: Amount,
    ) -> Self {
        Self::Abort(AbortEvent {
            token,
            seller,
            winner,
            amount,
        })
    }
}

impl<'a> Serial for AuctionEvents<'a> {
    fn serial<W: Write>(&self, out: &mut W) -> Result<(), W::Err> {
        match self {
            AuctionEvents::Start(event) => {
                out.write_u8(START_TAG)?;
                event.serial(out)
            }
            AuctionEvents::Bid(event) => {
                out.write_u8(BIDING_TAG)?;
                event.serial(out)
            }
            AuctionEvents::End(event) => {
                out.write_u8(END_TAG)?;
                event.serial(out)
            }
            AuctionEvents::Claim(event) => {
                out.write_u8(CLAIM_TAG)?;
                event.serial(out)
            }
            AuctionEvents::Withdraw(event) => {
                out.write_u8(WITHDRAW_TAG)?;
                event.serial(out)
            }
            AuctionEvents::Reclaim(event) => {
                out.write_u8(RECLAIM_TAG)?;
                event.serial(out)
            }
            AuctionEvents::Abort(event) => {
                out.write_u8(ABORT_TAG)?;
                event.serial(out)
            }
        }
    }
}
