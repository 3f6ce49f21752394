use commons::{CustomContractError, Token};
use concordium_std::*;

/// Auction lifecycle. Transitions only ever go `Open -> Closed -> Settled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SchemaType)]
pub enum AuctionStatus {
    /// Accepting bids until the deadline, then waiting for the seller to end it.
    Open,
    /// Highest bid is frozen, token is not delivered yet.
    Closed,
    /// Token was delivered to the winner, or released to the seller when
    /// there were no bids.
    Settled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, SchemaType)]
pub struct Auction {
    /// Auctioned token together with its registry.
    pub token: Token,
    /// Seller account address.
    pub seller: AccountAddress,
    /// Number of earlier auctions of the same token.
    pub round: u32,
    /// Auction start time.
    pub start: Timestamp,
    /// Bids are accepted strictly before this time, ending is allowed from it.
    pub deadline: Timestamp,
    /// Current highest bidder.
    pub highest_bidder: Option<AccountAddress>,
    /// Current highest bid, zero until the first bid.
    pub highest_bid: Amount,
    /// Lifecycle stage of the auction.
    pub status: AuctionStatus,
}

impl Auction {
    /// Bidding was closed by the seller.
    pub fn is_ended(&self) -> bool {
        self.status != AuctionStatus::Open
    }

    /// Bidding is closed, `account` won and the token was not delivered yet.
    pub fn awaits_claim_by(&self, account: &AccountAddress) -> bool {
        self.status == AuctionStatus::Closed && self.highest_bidder == Some(*account)
    }
}

/// Funds owed to an account. The ledger entry is already cleared once this is
/// produced, the caller MUST execute the transfer.
#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub struct Payout {
    pub account: AccountAddress,
    pub amount: Amount,
}

/// Token owed to the auction winner. The auction is already marked settled
/// once this is produced, the caller MUST execute the token transfer.
#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub struct Delivery {
    pub seller: AccountAddress,
    pub winner: AccountAddress,
    pub price: Amount,
}

/// Outcome of a withdraw request.
#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub enum Withdrawal {
    /// Refunded bids or sale proceeds.
    Funds(Payout),
    /// No bids were placed, the token is released back to the seller.
    Asset(AccountAddress),
    /// Seller settled the sale. The token MUST be delivered before the
    /// proceeds are paid.
    Sale(Delivery, Payout),
}

/// The contract state.
#[derive(Serial, DeserialWithState, StateClone)]
#[concordium(state_parameter = "S")]
pub struct State<S: HasStateApi> {
    /// Longest auction duration accepted on start.
    pub max_duration: Duration,
    /// Current auction of every token that was ever auctioned.
    auctions: StateMap<Token, Auction, S>,
    /// Superseded auctions by token and round.
    archive: StateMap<(Token, u32), Auction, S>,
    /// Withdrawable balances by token and account.
    pending: StateMap<(Token, AccountAddress), Amount, S>,
}

impl<S: HasStateApi> State<S> {
    /// Create a new state with no auctions.
    pub fn new(state_builder: &mut StateBuilder<S>, max_duration: Duration) -> Self {
        State {
            max_duration,
            auctions: state_builder.new_map(),
            archive: state_builder.new_map(),
            pending: state_builder.new_map(),
        }
    }

    /// Current auction of the token.
    pub fn auction(&self, token: &Token) -> Result<Auction, CustomContractError> {
        self.auctions
            .get(token)
            .map(|auction| (*auction).clone())
            .ok_or(CustomContractError::NotFound)
    }

    /// Auction of the token that was superseded by a later round.
    pub fn archived_auction(
        &self,
        token: &Token,
        round: u32,
    ) -> Result<Auction, CustomContractError> {
        self.archive
            .get(&(token.clone(), round))
            .map(|auction| (*auction).clone())
            .ok_or(CustomContractError::NotFound)
    }

    pub fn pending_withdrawal(&self, token: &Token, account: &AccountAddress) -> Amount {
        self.pending
            .get(&(token.clone(), *account))
            .map(|amount| *amount)
            .unwrap_or_else(Amount::zero)
    }

    /// Fails if the token is still in an open or unsettled auction.
    pub fn ensure_startable(&self, token: &Token) -> Result<(), CustomContractError> {
        match self.auctions.get(token).map(|auction| auction.status) {
            Some(AuctionStatus::Open) | Some(AuctionStatus::Closed) => {
                Err(CustomContractError::AlreadyActive)
            }
            Some(AuctionStatus::Settled) | None => Ok(()),
        }
    }

    /// Open a new auction. A settled auction of the same token is moved to
    /// the archive.
    pub fn start(
        &mut self,
        token: Token,
        seller: AccountAddress,
        slot_time: Timestamp,
        duration: Duration,
    ) -> Result<Auction, CustomContractError> {
        self.ensure_startable(&token)?;
        ensure!(
            duration > Duration::from_millis(0) && duration <= self.max_duration,
            CustomContractError::InvalidDuration
        );
        let deadline = slot_time
            .checked_add(duration)
            .ok_or(CustomContractError::InvalidDuration)?;

        let round = match self.auction(&token) {
            Ok(previous) => {
                let round = previous
                    .round
                    .checked_add(1)
                    .ok_or(CustomContractError::RoundLimit)?;
                self.archive.insert((token.clone(), previous.round), previous);
                round
            }
            Err(_) => 0,
        };

        let auction = Auction {
            token: token.clone(),
            seller,
            round,
            start: slot_time,
            deadline,
            highest_bidder: None,
            highest_bid: Amount::zero(),
            status: AuctionStatus::Open,
        };
        self.auctions.insert(token, auction.clone());

        Ok(auction)
    }

    /// Place a bid. The displaced highest bid is credited to its bidder, the
    /// new amount stays in the contract balance.
    pub fn bid(
        &mut self,
        token: &Token,
        slot_time: Timestamp,
        bidder: AccountAddress,
        amount: Amount,
    ) -> Result<(), CustomContractError> {
        let mut auction = self.auction(token)?;

        ensure!(
            auction.status == AuctionStatus::Open,
            CustomContractError::AuctionNotOpen
        );
        ensure!(
            slot_time < auction.deadline,
            CustomContractError::AuctionExpired
        );
        ensure!(
            amount > auction.highest_bid,
            CustomContractError::BidTooLow
        );

        if let Some(previous_bidder) = auction.highest_bidder {
            self.credit(token, previous_bidder, auction.highest_bid);
        }

        auction.highest_bidder = Some(bidder);
        auction.highest_bid = amount;
        self.auctions.insert(token.clone(), auction);

        Ok(())
    }

    /// Close bidding. The winning bid stays in escrow until the token is
    /// delivered.
    pub fn end(
        &mut self,
        token: &Token,
        sender: &AccountAddress,
        slot_time: Timestamp,
    ) -> Result<Auction, CustomContractError> {
        let mut auction = self.auction(token)?;

        ensure_eq!(sender, &auction.seller, CustomContractError::NotSeller);
        ensure!(
            slot_time >= auction.deadline,
            CustomContractError::AuctionStillOpen
        );
        ensure!(
            auction.status == AuctionStatus::Open,
            CustomContractError::AlreadyClosed
        );

        auction.status = AuctionStatus::Closed;
        self.auctions.insert(token.clone(), auction.clone());

        Ok(auction)
    }

    /// Settle the auction in favour of the winner and make the winning bid
    /// withdrawable by the seller. Returns the token delivery that MUST be
    /// executed.
    pub fn claim(
        &mut self,
        token: &Token,
        sender: &AccountAddress,
    ) -> Result<Delivery, CustomContractError> {
        let mut auction = self.auction(token)?;

        ensure!(
            auction.status != AuctionStatus::Open,
            CustomContractError::AuctionNotClosed
        );
        let winner = match auction.highest_bidder {
            Some(winner) if winner == *sender => winner,
            _ => bail!(CustomContractError::NotWinner),
        };
        ensure!(
            auction.status == AuctionStatus::Closed,
            CustomContractError::AlreadyClaimed
        );

        auction.status = AuctionStatus::Settled;
        let delivery = Delivery {
            seller: auction.seller,
            winner,
            price: auction.highest_bid,
        };
        self.credit(token, auction.seller, auction.highest_bid);
        self.auctions.insert(token.clone(), auction);

        Ok(delivery)
    }

    /// Settle the auction without delivery and refund the winning bid. Used
    /// when the seller no longer lets this contract move the token.
    pub fn abort(
        &mut self,
        token: &Token,
        sender: &AccountAddress,
    ) -> Result<Payout, CustomContractError> {
        let mut auction = self.auction(token)?;

        ensure!(
            auction.awaits_claim_by(sender),
            CustomContractError::NotWinner
        );

        auction.status = AuctionStatus::Settled;
        self.credit(token, *sender, auction.highest_bid);
        self.auctions.insert(token.clone(), auction);

        self.take_pending(token, sender)
    }

    /// Settle an auction that ended without bids. The seller kept custody of
    /// the token, so only the record changes.
    pub fn reclaim(
        &mut self,
        token: &Token,
        sender: &AccountAddress,
    ) -> Result<AccountAddress, CustomContractError> {
        let mut auction = self.auction(token)?;

        ensure_eq!(sender, &auction.seller, CustomContractError::NotSeller);
        ensure!(
            auction.status != AuctionStatus::Open,
            CustomContractError::AuctionNotClosed
        );
        ensure!(
            auction.status == AuctionStatus::Closed,
            CustomContractError::AlreadyClaimed
        );
        ensure!(
            auction.highest_bidder.is_none(),
            CustomContractError::NothingToWithdraw
        );

        auction.status = AuctionStatus::Settled;
        self.auctions.insert(token.clone(), auction);

        Ok(*sender)
    }

    /// Clear the withdrawable balance of the account. Returns the payout that
    /// MUST be transferred.
    pub fn take_pending(
        &mut self,
        token: &Token,
        account: &AccountAddress,
    ) -> Result<Payout, CustomContractError> {
        let amount = self
            .pending
            .remove_and_get(&(token.clone(), *account))
            .unwrap_or_else(Amount::zero);
        ensure!(
            amount > Amount::zero(),
            CustomContractError::NothingToWithdraw
        );

        Ok(Payout {
            account: *account,
            amount,
        })
    }

    /// Withdraw funds owed to the account. A seller of a closed auction with
    /// a winner settles it first, so proceeds are only paid together with the
    /// token delivery. A seller without bids and without funds is routed to
    /// [`State::reclaim`].
    pub fn withdraw(
        &mut self,
        token: &Token,
        account: &AccountAddress,
    ) -> Result<Withdrawal, CustomContractError> {
        let auction = self.auction(token)?;

        if let (true, AuctionStatus::Closed, Some(winner)) = (
            auction.seller == *account,
            auction.status,
            auction.highest_bidder,
        ) {
            let delivery = self.claim(token, &winner)?;
            let payout = self.take_pending(token, account)?;
            return Ok(Withdrawal::Sale(delivery, payout));
        }

        match self.take_pending(token, account) {
            Ok(payout) => Ok(Withdrawal::Funds(payout)),
            Err(CustomContractError::NothingToWithdraw)
                if auction.seller == *account
                    && auction.status == AuctionStatus::Closed
                    && auction.highest_bidder.is_none() =>
            {
                self.reclaim(token, account).map(Withdrawal::Asset)
            }
            Err(e) => Err(e),
        }
    }

    fn credit(&mut self, token: &Token, account: AccountAddress, amount: Amount) {
        let balance = self.pending_withdrawal(token, &account);
        self.pending.insert((token.clone(), account), balance + amount);
    }
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use commons::ContractTokenId;
    use concordium_cis2::TokenIdVec;
    use test_infrastructure::*;

    const NFT_CONTRACT: ContractAddress = ContractAddress {
        index: 1,
        subindex: 0,
    };
    const SELLER: AccountAddress = AccountAddress([0; 32]);
    const ALICE: AccountAddress = AccountAddress([1; 32]);
    const BOB: AccountAddress = AccountAddress([2; 32]);

    fn token_id() -> ContractTokenId {
        TokenIdVec(vec![0, 2])
    }

    fn token() -> Token {
        Token {
            contract: NFT_CONTRACT,
            id: token_id(),
        }
    }

    fn at(seconds: u64) -> Timestamp {
        Timestamp::from_timestamp_millis(seconds * 1000)
    }

    fn hour() -> Duration {
        Duration::from_seconds(3600)
    }

    fn ccd(micro_ccd: u64) -> Amount {
        Amount::from_micro_ccd(micro_ccd)
    }

    fn open_state() -> State<TestStateApi> {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, Duration::from_days(7));
        state
            .start(token(), SELLER, at(0), hour())
            .expect_report("Starting auction should pass");
        state
    }

    #[concordium_test]
    fn test_start_creates_open_auction() {
        let state = open_state();
        let auction = state.auction(&token()).expect_report("Auction should exist");

        claim_eq!(auction.seller, SELLER);
        claim_eq!(auction.deadline, at(3600));
        claim_eq!(auction.highest_bidder, None);
        claim_eq!(auction.highest_bid, Amount::zero());
        claim_eq!(auction.status, AuctionStatus::Open);
        claim_eq!(auction.round, 0);
    }

    #[concordium_test]
    fn test_start_rejects_invalid_duration() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = State::new(&mut state_builder, Duration::from_days(7));

        claim_eq!(
            state.start(token(), SELLER, at(0), Duration::from_millis(0)),
            Err(CustomContractError::InvalidDuration)
        );
        claim_eq!(
            state.start(token(), SELLER, at(0), Duration::from_days(8)),
            Err(CustomContractError::InvalidDuration)
        );
        claim_eq!(state.auction(&token()), Err(CustomContractError::NotFound));
    }

    #[concordium_test]
    fn test_start_twice_is_already_active() {
        let mut state = open_state();

        claim_eq!(
            state.start(token(), ALICE, at(10), hour()),
            Err(CustomContractError::AlreadyActive)
        );

        state
            .end(&token(), &SELLER, at(3600))
            .expect_report("Ending should pass");
        // Closed but unsettled auctions still block the token
        claim_eq!(
            state.start(token(), SELLER, at(3601), hour()),
            Err(CustomContractError::AlreadyActive)
        );
    }

    #[concordium_test]
    fn test_highest_bid_is_monotonic_and_displaced_bids_are_credited() {
        let mut state = open_state();

        state.bid(&token(), at(1), ALICE, ccd(100)).expect_report("1st bid");
        state.bid(&token(), at(2), BOB, ccd(150)).expect_report("2nd bid");
        claim_eq!(
            state.bid(&token(), at(3), ALICE, ccd(150)),
            Err(CustomContractError::BidTooLow)
        );
        claim_eq!(
            state.bid(&token(), at(3), ALICE, ccd(120)),
            Err(CustomContractError::BidTooLow)
        );
        state.bid(&token(), at(4), ALICE, ccd(400)).expect_report("3rd bid");

        let auction = state.auction(&token()).expect_report("Auction should exist");
        claim_eq!(auction.highest_bidder, Some(ALICE));
        claim_eq!(auction.highest_bid, ccd(400));

        // Rejected bids are never credited
        claim_eq!(state.pending_withdrawal(&token(), &ALICE), ccd(100));
        claim_eq!(state.pending_withdrawal(&token(), &BOB), ccd(150));
        claim_eq!(state.pending_withdrawal(&token(), &SELLER), Amount::zero());
    }

    #[concordium_test]
    fn test_bid_rejections() {
        let mut state = open_state();

        claim_eq!(
            state.bid(&token(), at(1), ALICE, Amount::zero()),
            Err(CustomContractError::BidTooLow)
        );
        claim_eq!(
            state.bid(&token(), at(3600), ALICE, ccd(100)),
            Err(CustomContractError::AuctionExpired)
        );

        let unknown = Token {
            contract: NFT_CONTRACT,
            id: TokenIdVec(vec![9]),
        };
        claim_eq!(
            state.bid(&unknown, at(1), ALICE, ccd(100)),
            Err(CustomContractError::NotFound)
        );

        state
            .end(&token(), &SELLER, at(3600))
            .expect_report("Ending should pass");
        claim_eq!(
            state.bid(&token(), at(3600), ALICE, ccd(100)),
            Err(CustomContractError::AuctionNotOpen)
        );
    }

    #[concordium_test]
    fn test_end_checks_seller_deadline_and_status() {
        let mut state = open_state();
        state.bid(&token(), at(1), ALICE, ccd(100)).expect_report("Bid");

        claim_eq!(
            state.end(&token(), &ALICE, at(3600)),
            Err(CustomContractError::NotSeller)
        );
        claim_eq!(
            state.end(&token(), &SELLER, at(3599)),
            Err(CustomContractError::AuctionStillOpen)
        );

        let auction = state
            .end(&token(), &SELLER, at(3600))
            .expect_report("Ending should pass");
        claim_eq!(auction.status, AuctionStatus::Closed);
        // Winning bid stays in escrow until the token is delivered
        claim_eq!(state.pending_withdrawal(&token(), &SELLER), Amount::zero());

        claim_eq!(
            state.end(&token(), &SELLER, at(3700)),
            Err(CustomContractError::AlreadyClosed)
        );
    }

    #[concordium_test]
    fn test_claim_once_by_winner_after_close() {
        let mut state = open_state();
        state.bid(&token(), at(1), ALICE, ccd(100)).expect_report("Bid");

        claim_eq!(
            state.claim(&token(), &ALICE),
            Err(CustomContractError::AuctionNotClosed)
        );

        state
            .end(&token(), &SELLER, at(3600))
            .expect_report("Ending should pass");

        claim_eq!(
            state.claim(&token(), &BOB),
            Err(CustomContractError::NotWinner)
        );
        claim_eq!(
            state.claim(&token(), &ALICE),
            Ok(Delivery {
                seller: SELLER,
                winner: ALICE,
                price: ccd(100),
            })
        );
        claim_eq!(
            state.claim(&token(), &ALICE),
            Err(CustomContractError::AlreadyClaimed)
        );

        let auction = state.auction(&token()).expect_report("Auction should exist");
        claim_eq!(auction.status, AuctionStatus::Settled);
        claim_eq!(state.pending_withdrawal(&token(), &SELLER), ccd(100));
    }

    #[concordium_test]
    fn test_withdraw_is_paid_exactly_once() {
        let mut state = open_state();
        state.bid(&token(), at(1), ALICE, ccd(100)).expect_report("1st bid");
        state.bid(&token(), at(2), BOB, ccd(150)).expect_report("2nd bid");

        claim_eq!(
            state.withdraw(&token(), &ALICE),
            Ok(Withdrawal::Funds(Payout {
                account: ALICE,
                amount: ccd(100),
            }))
        );
        claim_eq!(
            state.withdraw(&token(), &ALICE),
            Err(CustomContractError::NothingToWithdraw)
        );
        // Highest bidder has nothing to withdraw, the bid is in escrow
        claim_eq!(
            state.withdraw(&token(), &BOB),
            Err(CustomContractError::NothingToWithdraw)
        );

        state
            .end(&token(), &SELLER, at(3600))
            .expect_report("Ending should pass");
        claim_eq!(
            state.withdraw(&token(), &SELLER),
            Ok(Withdrawal::Sale(
                Delivery {
                    seller: SELLER,
                    winner: BOB,
                    price: ccd(150),
                },
                Payout {
                    account: SELLER,
                    amount: ccd(150),
                }
            ))
        );
        claim_eq!(
            state.withdraw(&token(), &SELLER),
            Err(CustomContractError::NothingToWithdraw)
        );
        // Seller settled the sale, the token can not be claimed twice
        claim_eq!(
            state.claim(&token(), &BOB),
            Err(CustomContractError::AlreadyClaimed)
        );
    }

    #[concordium_test]
    fn test_abort_refunds_winner() {
        let mut state = open_state();
        state.bid(&token(), at(1), ALICE, ccd(100)).expect_report("1st bid");
        state.bid(&token(), at(2), BOB, ccd(150)).expect_report("2nd bid");

        claim_eq!(
            state.abort(&token(), &BOB),
            Err(CustomContractError::NotWinner)
        );

        state
            .end(&token(), &SELLER, at(3600))
            .expect_report("Ending should pass");

        claim_eq!(
            state.abort(&token(), &ALICE),
            Err(CustomContractError::NotWinner)
        );
        claim_eq!(
            state.abort(&token(), &BOB),
            Ok(Payout {
                account: BOB,
                amount: ccd(150),
            })
        );

        let auction = state.auction(&token()).expect_report("Auction should exist");
        claim_eq!(auction.status, AuctionStatus::Settled);
        claim_eq!(state.pending_withdrawal(&token(), &SELLER), Amount::zero());
        claim_eq!(
            state.claim(&token(), &BOB),
            Err(CustomContractError::AlreadyClaimed)
        );
        claim_eq!(
            state.abort(&token(), &BOB),
            Err(CustomContractError::NotWinner)
        );
    }

    #[concordium_test]
    fn test_restart_fails_after_last_round() {
        let mut state = open_state();
        let mut auction = state.auction(&token()).expect_report("Auction should exist");
        auction.round = u32::MAX;
        auction.status = AuctionStatus::Settled;
        state.auctions.insert(token(), auction);

        claim_eq!(
            state.start(token(), SELLER, at(4000), hour()),
            Err(CustomContractError::RoundLimit)
        );
    }

    #[concordium_test]
    fn test_no_bid_auction_is_reclaimed_by_seller() {
        let mut state = open_state();
        state
            .end(&token(), &SELLER, at(3600))
            .expect_report("Ending should pass");

        claim_eq!(
            state.withdraw(&token(), &ALICE),
            Err(CustomContractError::NothingToWithdraw)
        );
        claim_eq!(
            state.reclaim(&token(), &ALICE),
            Err(CustomContractError::NotSeller)
        );
        claim_eq!(
            state.withdraw(&token(), &SELLER),
            Ok(Withdrawal::Asset(SELLER))
        );
        claim_eq!(
            state.withdraw(&token(), &SELLER),
            Err(CustomContractError::NothingToWithdraw)
        );
        claim_eq!(
            state.reclaim(&token(), &SELLER),
            Err(CustomContractError::AlreadyClaimed)
        );
    }

    #[concordium_test]
    fn test_reclaim_is_rejected_with_winner() {
        let mut state = open_state();

        claim_eq!(
            state.reclaim(&token(), &SELLER),
            Err(CustomContractError::AuctionNotClosed)
        );

        state.bid(&token(), at(1), ALICE, ccd(100)).expect_report("Bid");
        state
            .end(&token(), &SELLER, at(3600))
            .expect_report("Ending should pass");

        claim_eq!(
            state.reclaim(&token(), &SELLER),
            Err(CustomContractError::NothingToWithdraw)
        );
    }

    #[concordium_test]
    fn test_restart_archives_settled_auction_and_keeps_balances() {
        let mut state = open_state();
        state.bid(&token(), at(1), ALICE, ccd(100)).expect_report("1st bid");
        state.bid(&token(), at(2), BOB, ccd(150)).expect_report("2nd bid");
        state
            .end(&token(), &SELLER, at(3600))
            .expect_report("Ending should pass");
        let _ = state.claim(&token(), &BOB).expect_report("Claim should pass");

        // Bob re-auctions the token he just won
        let auction = state
            .start(token(), BOB, at(4000), hour())
            .expect_report("Restarting should pass");
        claim_eq!(auction.round, 1);
        claim_eq!(auction.seller, BOB);

        let archived = state
            .archived_auction(&token(), 0)
            .expect_report("Archived auction should exist");
        claim_eq!(archived.seller, SELLER);
        claim_eq!(archived.highest_bidder, Some(BOB));
        claim_eq!(archived.status, AuctionStatus::Settled);

        // Balances from the first round are still withdrawable
        claim_eq!(state.pending_withdrawal(&token(), &ALICE), ccd(100));
        claim_eq!(state.pending_withdrawal(&token(), &SELLER), ccd(150));
    }
}
