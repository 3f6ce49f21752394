use commons::{ContractResult, CustomContractError, Token};
use concordium_std::*;

use crate::events::*;
use crate::external::*;
use crate::nft;
use crate::state::{Auction, State, Withdrawal};

/// Initialize the auction contract with no auctions.
#[init(contract = "NftAuction", parameter = "InitParams")]
fn contract_init<S: HasStateApi>(
    ctx: &impl HasInitContext,
    state_builder: &mut StateBuilder<S>,
) -> InitResult<State<S>> {
    let params: InitParams = ctx.parameter_cursor().get()?;
    ensure!(
        params.max_duration > Duration::from_millis(0),
        CustomContractError::InvalidDuration.into()
    );

    Ok(State::new(state_builder, params.max_duration))
}

/// Open an auction for a token held by the sender.
///
/// It rejects if:
/// - Sender is not an account.
/// - The token is already in an open or unsettled auction.
/// - Sender does not hold the token or this contract is not its operator.
/// - Duration is zero or exceeds the configured maximum.
#[receive(
    mutable,
    contract = "NftAuction",
    name = "startAuction",
    parameter = "StartAuctionParams",
    enable_logger
)]
fn contract_start_auction<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let params: StartAuctionParams = ctx.parameter_cursor().get()?;
    let seller = sender_account(ctx)?;

    // Fail early, before querying the registry
    host.state().ensure_startable(&params.token)?;
    nft::ensure_controls(host, &params.token, &seller, &ctx.self_address())?;

    let auction = host.state_mut().start(
        params.token,
        seller,
        ctx.metadata().slot_time(),
        params.duration,
    )?;

    logger.log(&AuctionEvents::start(
        &auction.token,
        &auction.seller,
        auction.deadline,
    ))?;

    Ok(())
}

/// Bid the attached amount. It must be higher than the current highest bid.
#[receive(
    mutable,
    payable,
    contract = "NftAuction",
    name = "bid",
    parameter = "Token",
    enable_logger
)]
fn contract_bid<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    amount: Amount,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let token: Token = ctx.parameter_cursor().get()?;
    let bidder = sender_account(ctx)?;

    host.state_mut()
        .bid(&token, ctx.metadata().slot_time(), bidder, amount)?;

    logger.log(&AuctionEvents::bid(&token, &bidder, amount))?;

    Ok(())
}

/// Close bidding on an auction. Only the seller can end it, and only once
/// the deadline has passed.
#[receive(
    mutable,
    contract = "NftAuction",
    name = "endAuction",
    parameter = "Token",
    enable_logger
)]
fn contract_end_auction<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let token: Token = ctx.parameter_cursor().get()?;
    let sender = sender_account(ctx)?;

    let auction = host
        .state_mut()
        .end(&token, &sender, ctx.metadata().slot_time())?;

    logger.log(&AuctionEvents::end(
        &token,
        &auction.seller,
        &auction.highest_bidder,
        auction.highest_bid,
    ))?;

    Ok(())
}

/// Transfer the token from the seller to the auction winner.
///
/// The auction is settled before the registry is called, so a registry that
/// calls back into this contract sees the token as already claimed.
#[receive(
    mutable,
    contract = "NftAuction",
    name = "claimNFT",
    parameter = "Token",
    enable_logger
)]
fn contract_claim_nft<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let token: Token = ctx.parameter_cursor().get()?;
    let sender = sender_account(ctx)?;

    let delivery = host.state_mut().claim(&token, &sender)?;

    nft::transfer(host, &token, &delivery.seller, &delivery.winner)?;

    logger.log(&AuctionEvents::claim(
        &token,
        &delivery.seller,
        &delivery.winner,
    ))?;

    Ok(())
}

/// Pay out the sender's withdrawable balance for the token.
///
/// - A seller of a closed auction with a winner delivers the token to the
///   winner first, and is then paid the winning bid.
/// - A seller whose auction ended without bids gets the token released.
/// - A winner whose token can no longer be moved by this contract gets the
///   winning bid refunded.
#[receive(
    mutable,
    contract = "NftAuction",
    name = "withdraw",
    parameter = "Token",
    enable_logger
)]
fn contract_withdraw<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let token: Token = ctx.parameter_cursor().get()?;
    let sender = sender_account(ctx)?;

    let auction = host.state().auction(&token)?;
    if auction.awaits_claim_by(&sender)
        && nft::ensure_controls(host, &token, &auction.seller, &ctx.self_address()).is_err()
    {
        let payout = host.state_mut().abort(&token, &sender)?;
        host.invoke_transfer(&payout.account, payout.amount)?;
        logger.log(&AuctionEvents::abort(
            &token,
            &auction.seller,
            &sender,
            payout.amount,
        ))?;
        return Ok(());
    }

    match host.state_mut().withdraw(&token, &sender)? {
        Withdrawal::Funds(payout) => {
            host.invoke_transfer(&payout.account, payout.amount)?;
            logger.log(&AuctionEvents::withdraw(
                &token,
                &payout.account,
                payout.amount,
            ))?;
        }
        Withdrawal::Asset(seller) => {
            logger.log(&AuctionEvents::reclaim(&token, &seller))?;
        }
        Withdrawal::Sale(delivery, payout) => {
            nft::transfer(host, &token, &delivery.seller, &delivery.winner)?;
            host.invoke_transfer(&payout.account, payout.amount)?;
            logger.log(&AuctionEvents::claim(
                &token,
                &delivery.seller,
                &delivery.winner,
            ))?;
            logger.log(&AuctionEvents::withdraw(
                &token,
                &payout.account,
                payout.amount,
            ))?;
        }
    }

    Ok(())
}

/// Settle an auction that ended without bids. The seller never gave up the
/// token, so nothing is transferred.
#[receive(
    mutable,
    contract = "NftAuction",
    name = "reclaim",
    parameter = "Token",
    enable_logger
)]
fn contract_reclaim<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let token: Token = ctx.parameter_cursor().get()?;
    let sender = sender_account(ctx)?;

    let seller = host.state_mut().reclaim(&token, &sender)?;

    logger.log(&AuctionEvents::reclaim(&token, &seller))?;

    Ok(())
}

#[receive(
    contract = "NftAuction",
    name = "getSeller",
    parameter = "Token",
    return_value = "AccountAddress"
)]
fn contract_get_seller<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<AccountAddress> {
    let token: Token = ctx.parameter_cursor().get()?;
    Ok(host.state().auction(&token)?.seller)
}

#[receive(
    contract = "NftAuction",
    name = "getHighestBidder",
    parameter = "Token",
    return_value = "Option<AccountAddress>"
)]
fn contract_get_highest_bidder<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<Option<AccountAddress>> {
    let token: Token = ctx.parameter_cursor().get()?;
    Ok(host.state().auction(&token)?.highest_bidder)
}

/// Whether bidding on the current auction of the token was closed.
#[receive(
    contract = "NftAuction",
    name = "isEnded",
    parameter = "Token",
    return_value = "bool"
)]
fn contract_is_ended<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<bool> {
    let token: Token = ctx.parameter_cursor().get()?;
    Ok(host.state().auction(&token)?.is_ended())
}

/// View the current auction of a token, or an archived one by round.
#[receive(
    contract = "NftAuction",
    name = "viewAuction",
    parameter = "ViewAuctionParams",
    return_value = "Auction"
)]
fn contract_view_auction<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<Auction> {
    let params: ViewAuctionParams = ctx.parameter_cursor().get()?;
    let state = host.state();

    match params.round {
        Some(round) => match state.auction(&params.token)? {
            current if current.round == round => Ok(current),
            _ => state.archived_auction(&params.token, round),
        },
        None => state.auction(&params.token),
    }
}

#[receive(
    contract = "NftAuction",
    name = "viewPendingWithdrawal",
    parameter = "PendingWithdrawalParams",
    return_value = "Amount"
)]
fn contract_view_pending_withdrawal<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<Amount> {
    let params: PendingWithdrawalParams = ctx.parameter_cursor().get()?;
    Ok(host
        .state()
        .pending_withdrawal(&params.token, &params.account))
}

/// Function to update values required for internal contract functionality. This includes:
/// - Max duration. Longest auction that can be started.
///
///  It rejects if:
///  - Fails to parse `InternalValue` parameters.
///  - Sender is not the contract owner.
///  - New max duration is zero.
#[receive(
    mutable,
    contract = "NftAuction",
    name = "updateInternalValue",
    parameter = "InternalValue"
)]
fn update_internal_value<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&ctx.owner()),
        CustomContractError::Unauthorized
    );

    let params: InternalValue = ctx.parameter_cursor().get()?;
    let state = host.state_mut();

    match params {
        InternalValue::MaxDuration(duration) => {
            ensure!(
                duration > Duration::from_millis(0),
                CustomContractError::InvalidDuration
            );
            state.max_duration = duration;
        }
    }

    Ok(())
}

/// Function to view values required for internal contract functionality. This includes:
/// - Max duration. Longest auction that can be started.
#[receive(
    contract = "NftAuction",
    name = "viewInternalValue",
    parameter = "ViewInternalValueParams",
    return_value = "InternalValue"
)]
fn view_internal_value<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<InternalValue> {
    let params: ViewInternalValueParams = ctx.parameter_cursor().get()?;

    let value = match params {
        ViewInternalValueParams::MaxDuration => InternalValue::MaxDuration(host.state().max_duration),
    };

    Ok(value)
}

fn sender_account(ctx: &impl HasReceiveContext) -> ContractResult<AccountAddress> {
    match ctx.sender() {
        Address::Account(account) => Ok(account),
        Address::Contract(_) => bail!(CustomContractError::OnlyAccountAddress),
    }
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use crate::state::AuctionStatus;
    use commons::test::*;
    use commons::{ContractTokenId, TransferParameter};
    use concordium_cis2::TokenIdVec;
    use test_infrastructure::*;

    const OWNER: AccountAddress = AccountAddress([0; 32]);
    const SELLER: AccountAddress = AccountAddress([1; 32]);
    const ALICE: AccountAddress = AccountAddress([2; 32]);
    const BOB: AccountAddress = AccountAddress([3; 32]);

    const NFT_CONTRACT: ContractAddress = ContractAddress {
        index: 1,
        subindex: 0,
    };
    const AUCTION: ContractAddress = ContractAddress {
        index: 2,
        subindex: 0,
    };

    const HOUR_MILLIS: u64 = 3_600_000;

    fn token() -> Token {
        let id: ContractTokenId = TokenIdVec(vec![0, 1]);
        Token {
            contract: NFT_CONTRACT,
            id,
        }
    }

    fn ccd(micro_ccd: u64) -> Amount {
        Amount::from_micro_ccd(micro_ccd)
    }

    fn entrypoint(name: &str) -> OwnedEntrypointName {
        OwnedEntrypointName::new_unchecked(name.into())
    }

    fn new_ctx<'a>(sender: AccountAddress, slot_time: u64) -> TestReceiveContext<'a> {
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(sender));
        ctx.set_owner(OWNER);
        ctx.set_self_address(AUCTION);
        ctx.set_metadata_slot_time(Timestamp::from_timestamp_millis(slot_time));
        ctx
    }

    /// Host with an initialized contract and a registry where `SELLER` holds
    /// the token and has made the auction contract its operator.
    fn new_host() -> TestHost<State<TestStateApi>> {
        let parameter_bytes = to_bytes(&InitParams {
            max_duration: Duration::from_days(7),
        });
        let mut ctx = TestInitContext::empty();
        ctx.set_init_origin(OWNER);
        ctx.set_parameter(&parameter_bytes);

        let mut state_builder = TestStateBuilder::new();
        let state = contract_init(&ctx, &mut state_builder).expect_report("Init should pass");
        let mut host = TestHost::new(state, state_builder);

        host.setup_mock_entrypoint(NFT_CONTRACT, entrypoint("balanceOf"), balance_of_mock(SELLER));
        host.setup_mock_entrypoint(NFT_CONTRACT, entrypoint("operatorOf"), operator_of_mock(true));

        host
    }

    fn start(host: &mut TestHost<State<TestStateApi>>, logger: &mut TestLogger) {
        let parameter_bytes = to_bytes(&StartAuctionParams {
            token: token(),
            duration: Duration::from_millis(HOUR_MILLIS),
        });
        let mut ctx = new_ctx(SELLER, 0);
        ctx.set_parameter(&parameter_bytes);

        contract_start_auction(&ctx, host, logger).expect_report("Starting auction should pass");
    }

    fn with_token<R>(
        sender: AccountAddress,
        slot_time: u64,
        call: impl FnOnce(&TestReceiveContext) -> R,
    ) -> R {
        let parameter_bytes = to_bytes(&token());
        let mut ctx = new_ctx(sender, slot_time);
        ctx.set_parameter(&parameter_bytes);
        call(&ctx)
    }

    fn bid(
        host: &mut TestHost<State<TestStateApi>>,
        logger: &mut TestLogger,
        bidder: AccountAddress,
        amount: Amount,
    ) -> ContractResult<()> {
        with_token(bidder, 1000, |ctx| contract_bid(ctx, host, amount, logger))
    }

    fn end(host: &mut TestHost<State<TestStateApi>>, logger: &mut TestLogger) -> ContractResult<()> {
        with_token(SELLER, HOUR_MILLIS, |ctx| {
            contract_end_auction(ctx, host, logger)
        })
    }

    fn withdraw(
        host: &mut TestHost<State<TestStateApi>>,
        logger: &mut TestLogger,
        account: AccountAddress,
    ) -> ContractResult<()> {
        with_token(account, HOUR_MILLIS, |ctx| {
            contract_withdraw(ctx, host, logger)
        })
    }

    fn claim_nft(
        host: &mut TestHost<State<TestStateApi>>,
        logger: &mut TestLogger,
        account: AccountAddress,
    ) -> ContractResult<()> {
        with_token(account, HOUR_MILLIS, |ctx| {
            contract_claim_nft(ctx, host, logger)
        })
    }

    #[concordium_test]
    fn test_init() {
        let host = new_host();

        claim_eq!(host.state().max_duration, Duration::from_days(7));
        claim_eq!(
            host.state().auction(&token()),
            Err(CustomContractError::NotFound)
        );
    }

    #[concordium_test]
    fn test_start_auction() {
        let mut host = new_host();
        let mut logger = TestLogger::init();

        start(&mut host, &mut logger);

        let auction = host.state().auction(&token()).expect_report("Auction should exist");
        claim_eq!(auction.seller, SELLER);
        claim_eq!(auction.status, AuctionStatus::Open);
        claim_eq!(
            auction.deadline,
            Timestamp::from_timestamp_millis(HOUR_MILLIS)
        );

        claim_eq!(logger.logs.len(), 1);
        claim_eq!(
            logger.logs[0],
            to_bytes(&AuctionEvents::start(
                &token(),
                &SELLER,
                Timestamp::from_timestamp_millis(HOUR_MILLIS),
            ))
        );
    }

    #[concordium_test]
    fn test_start_auction_requires_token_control() {
        let mut host = new_host();
        let mut logger = TestLogger::init();

        let parameter_bytes = to_bytes(&StartAuctionParams {
            token: token(),
            duration: Duration::from_millis(HOUR_MILLIS),
        });
        let mut ctx = new_ctx(ALICE, 0);
        ctx.set_parameter(&parameter_bytes);

        claim_eq!(
            contract_start_auction(&ctx, &mut host, &mut logger),
            Err(CustomContractError::NotAuthorized)
        );

        // Seller holds the token but did not add the auction as an operator
        host.setup_mock_entrypoint(NFT_CONTRACT, entrypoint("operatorOf"), operator_of_mock(false));
        let mut ctx = new_ctx(SELLER, 0);
        ctx.set_parameter(&parameter_bytes);

        claim_eq!(
            contract_start_auction(&ctx, &mut host, &mut logger),
            Err(CustomContractError::NotAuthorized)
        );
        claim!(logger.logs.is_empty());
    }

    #[concordium_test]
    fn test_start_auction_from_contract() {
        let mut host = new_host();
        let mut logger = TestLogger::init();

        let parameter_bytes = to_bytes(&StartAuctionParams {
            token: token(),
            duration: Duration::from_millis(HOUR_MILLIS),
        });
        let mut ctx = new_ctx(SELLER, 0);
        ctx.set_sender(Address::Contract(NFT_CONTRACT));
        ctx.set_parameter(&parameter_bytes);

        claim_eq!(
            contract_start_auction(&ctx, &mut host, &mut logger),
            Err(CustomContractError::OnlyAccountAddress)
        );
    }

    #[concordium_test]
    fn test_outbid_bidder_withdraws_exact_amount() {
        let mut host = new_host();
        let mut logger = TestLogger::init();
        start(&mut host, &mut logger);

        bid(&mut host, &mut logger, ALICE, Amount::from_ccd(1)).expect_report("1st bid");
        bid(&mut host, &mut logger, BOB, ccd(1_500_000)).expect_report("2nd bid");

        let highest_bidder = with_token(ALICE, 2000, |ctx| {
            contract_get_highest_bidder(ctx, &host)
        });
        claim_eq!(highest_bidder, Ok(Some(BOB)));

        host.set_self_balance(Amount::from_ccd(1) + ccd(1_500_000));
        withdraw(&mut host, &mut logger, ALICE).expect_report("Withdraw should pass");

        claim_eq!(host.get_transfers(), vec![(ALICE, Amount::from_ccd(1))]);
        claim_eq!(
            logger.logs.last(),
            Some(&to_bytes(&AuctionEvents::withdraw(
                &token(),
                &ALICE,
                Amount::from_ccd(1),
            )))
        );

        claim_eq!(
            withdraw(&mut host, &mut logger, ALICE),
            Err(CustomContractError::NothingToWithdraw)
        );
        claim_eq!(host.get_transfers().len(), 1);
    }

    #[concordium_test]
    fn test_bid_equal_to_highest_is_too_low() {
        let mut host = new_host();
        let mut logger = TestLogger::init();
        start(&mut host, &mut logger);

        bid(&mut host, &mut logger, ALICE, ccd(100)).expect_report("1st bid");
        claim_eq!(
            bid(&mut host, &mut logger, BOB, ccd(100)),
            Err(CustomContractError::BidTooLow)
        );

        let auction = host.state().auction(&token()).expect_report("Auction should exist");
        claim_eq!(auction.highest_bidder, Some(ALICE));
        claim_eq!(auction.highest_bid, ccd(100));
    }

    #[concordium_test]
    fn test_bid_after_deadline() {
        let mut host = new_host();
        let mut logger = TestLogger::init();
        start(&mut host, &mut logger);

        let result = with_token(ALICE, HOUR_MILLIS, |ctx| {
            contract_bid(ctx, &mut host, ccd(100), &mut logger)
        });
        claim_eq!(result, Err(CustomContractError::AuctionExpired));
    }

    #[concordium_test]
    fn test_end_auction() {
        let mut host = new_host();
        let mut logger = TestLogger::init();
        start(&mut host, &mut logger);
        bid(&mut host, &mut logger, ALICE, ccd(100)).expect_report("Bid");

        let early = with_token(SELLER, HOUR_MILLIS - 1, |ctx| {
            contract_end_auction(ctx, &mut host, &mut logger)
        });
        claim_eq!(early, Err(CustomContractError::AuctionStillOpen));

        let not_seller = with_token(ALICE, HOUR_MILLIS, |ctx| {
            contract_end_auction(ctx, &mut host, &mut logger)
        });
        claim_eq!(not_seller, Err(CustomContractError::NotSeller));

        end(&mut host, &mut logger).expect_report("Ending should pass");
        claim_eq!(
            logger.logs.last(),
            Some(&to_bytes(&AuctionEvents::end(
                &token(),
                &SELLER,
                &Some(ALICE),
                ccd(100),
            )))
        );
        claim_eq!(
            end(&mut host, &mut logger),
            Err(CustomContractError::AlreadyClosed)
        );

        let ended = with_token(ALICE, HOUR_MILLIS, |ctx| contract_is_ended(ctx, &host));
        claim_eq!(ended, Ok(true));
    }

    #[concordium_test]
    fn test_claim_and_seller_proceeds() {
        let mut host = new_host();
        let mut logger = TestLogger::init();
        start(&mut host, &mut logger);
        bid(&mut host, &mut logger, ALICE, ccd(100)).expect_report("1st bid");
        bid(&mut host, &mut logger, BOB, ccd(300)).expect_report("2nd bid");
        end(&mut host, &mut logger).expect_report("Ending should pass");

        host.setup_mock_entrypoint(
            NFT_CONTRACT,
            entrypoint("transfer"),
            parse_and_ok_mock::<TransferParameter, _>(()),
        );

        claim_eq!(
            claim_nft(&mut host, &mut logger, ALICE),
            Err(CustomContractError::NotWinner)
        );
        claim_nft(&mut host, &mut logger, BOB).expect_report("Claim should pass");
        claim_eq!(
            logger.logs.last(),
            Some(&to_bytes(&AuctionEvents::claim(&token(), &SELLER, &BOB)))
        );
        claim_eq!(
            claim_nft(&mut host, &mut logger, BOB),
            Err(CustomContractError::AlreadyClaimed)
        );

        host.set_self_balance(ccd(400));
        withdraw(&mut host, &mut logger, SELLER).expect_report("Seller withdraw should pass");
        withdraw(&mut host, &mut logger, ALICE).expect_report("Alice withdraw should pass");
        claim!(host.transfer_occurred(&SELLER, ccd(300)));
        claim!(host.transfer_occurred(&ALICE, ccd(100)));
        claim_eq!(
            withdraw(&mut host, &mut logger, BOB),
            Err(CustomContractError::NothingToWithdraw)
        );
    }

    #[concordium_test]
    fn test_claim_sees_settled_auction_on_reentry() {
        let mut host = new_host();
        let mut logger = TestLogger::init();
        start(&mut host, &mut logger);
        bid(&mut host, &mut logger, ALICE, ccd(100)).expect_report("Bid");
        end(&mut host, &mut logger).expect_report("Ending should pass");

        // Registry transfer fails unless the auction is already settled
        host.setup_mock_entrypoint(
            NFT_CONTRACT,
            entrypoint("transfer"),
            MockFn::new_v1(|_, _, _, state: &mut State<TestStateApi>| {
                match state.auction(&token()) {
                    Ok(auction) if auction.status == AuctionStatus::Settled => Ok((false, ())),
                    _ => Err(CallContractError::Trap),
                }
            }),
        );

        claim_eq!(claim_nft(&mut host, &mut logger, ALICE), Ok(()));
    }

    #[concordium_test]
    fn test_claim_fails_when_registry_rejects() {
        let mut host = new_host();
        let mut logger = TestLogger::init();
        start(&mut host, &mut logger);
        bid(&mut host, &mut logger, ALICE, ccd(100)).expect_report("Bid");
        end(&mut host, &mut logger).expect_report("Ending should pass");
        let logged = logger.logs.len();

        host.setup_mock_entrypoint(NFT_CONTRACT, entrypoint("transfer"), rejecting_mock());

        claim_eq!(
            claim_nft(&mut host, &mut logger, ALICE),
            Err(CustomContractError::TransferFailed)
        );
        claim_eq!(logger.logs.len(), logged);
    }

    #[concordium_test]
    fn test_withdraw_fails_without_balance() {
        let mut host = new_host();
        let mut logger = TestLogger::init();
        start(&mut host, &mut logger);
        bid(&mut host, &mut logger, ALICE, ccd(100)).expect_report("1st bid");
        bid(&mut host, &mut logger, BOB, ccd(200)).expect_report("2nd bid");

        host.set_self_balance(ccd(50));
        claim_eq!(
            withdraw(&mut host, &mut logger, ALICE),
            Err(CustomContractError::TransferFailed)
        );
        claim!(host.get_transfers().is_empty());
    }

    #[concordium_test]
    fn test_no_bid_auction_is_reclaimed() {
        let mut host = new_host();
        let mut logger = TestLogger::init();
        start(&mut host, &mut logger);
        end(&mut host, &mut logger).expect_report("Ending should pass");

        claim_eq!(
            withdraw(&mut host, &mut logger, ALICE),
            Err(CustomContractError::NothingToWithdraw)
        );
        withdraw(&mut host, &mut logger, SELLER).expect_report("Reclaim should pass");

        claim!(host.get_transfers().is_empty());
        claim_eq!(
            logger.logs.last(),
            Some(&to_bytes(&AuctionEvents::reclaim(&token(), &SELLER)))
        );

        let reclaim = with_token(SELLER, HOUR_MILLIS, |ctx| {
            contract_reclaim(ctx, &mut host, &mut logger)
        });
        claim_eq!(reclaim, Err(CustomContractError::AlreadyClaimed));

        let auction = host.state().auction(&token()).expect_report("Auction should exist");
        claim_eq!(auction.status, AuctionStatus::Settled);
    }

    #[concordium_test]
    fn test_reauction_keeps_archive_and_balances() {
        let mut host = new_host();
        let mut logger = TestLogger::init();
        start(&mut host, &mut logger);
        bid(&mut host, &mut logger, ALICE, ccd(100)).expect_report("1st bid");
        bid(&mut host, &mut logger, BOB, ccd(200)).expect_report("2nd bid");

        let parameter_bytes = to_bytes(&StartAuctionParams {
            token: token(),
            duration: Duration::from_millis(HOUR_MILLIS),
        });
        let mut ctx = new_ctx(SELLER, 2000);
        ctx.set_parameter(&parameter_bytes);
        claim_eq!(
            contract_start_auction(&ctx, &mut host, &mut logger),
            Err(CustomContractError::AlreadyActive)
        );

        end(&mut host, &mut logger).expect_report("Ending should pass");
        host.setup_mock_entrypoint(
            NFT_CONTRACT,
            entrypoint("transfer"),
            parse_and_ok_mock::<TransferParameter, _>(()),
        );
        claim_nft(&mut host, &mut logger, BOB).expect_report("Claim should pass");

        // Registry reflects the new owner
        host.setup_mock_entrypoint(NFT_CONTRACT, entrypoint("balanceOf"), balance_of_mock(BOB));
        let mut ctx = new_ctx(BOB, HOUR_MILLIS + 1);
        ctx.set_parameter(&parameter_bytes);
        contract_start_auction(&ctx, &mut host, &mut logger).expect_report("Restart should pass");

        let view_bytes = to_bytes(&ViewAuctionParams {
            token: token(),
            round: Some(0),
        });
        let mut ctx = new_ctx(ALICE, HOUR_MILLIS + 1);
        ctx.set_parameter(&view_bytes);
        let archived = contract_view_auction(&ctx, &host).expect_report("Archive should exist");
        claim_eq!(archived.seller, SELLER);
        claim_eq!(archived.highest_bidder, Some(BOB));
        claim_eq!(archived.status, AuctionStatus::Settled);

        let seller = with_token(ALICE, HOUR_MILLIS + 1, |ctx| contract_get_seller(ctx, &host));
        claim_eq!(seller, Ok(BOB));

        let pending_bytes = to_bytes(&PendingWithdrawalParams {
            token: token(),
            account: ALICE,
        });
        let mut ctx = new_ctx(ALICE, HOUR_MILLIS + 1);
        ctx.set_parameter(&pending_bytes);
        claim_eq!(contract_view_pending_withdrawal(&ctx, &host), Ok(ccd(100)));
    }

    #[concordium_test]
    fn test_accessors_of_unknown_token() {
        let host = new_host();

        claim_eq!(
            with_token(ALICE, 0, |ctx| contract_get_seller(ctx, &host)),
            Err(CustomContractError::NotFound)
        );
        claim_eq!(
            with_token(ALICE, 0, |ctx| contract_get_highest_bidder(ctx, &host)),
            Err(CustomContractError::NotFound)
        );
        claim_eq!(
            with_token(ALICE, 0, |ctx| contract_is_ended(ctx, &host)),
            Err(CustomContractError::NotFound)
        );
    }

    #[concordium_test]
    fn test_seller_withdraw_delivers_token_first() {
        let mut host = new_host();
        let mut logger = TestLogger::init();
        start(&mut host, &mut logger);
        bid(&mut host, &mut logger, ALICE, ccd(100)).expect_report("Bid");
        end(&mut host, &mut logger).expect_report("Ending should pass");

        claim_eq!(
            host.state().pending_withdrawal(&token(), &SELLER),
            Amount::zero()
        );

        host.setup_mock_entrypoint(
            NFT_CONTRACT,
            entrypoint("transfer"),
            parse_and_ok_mock::<TransferParameter, _>(()),
        );
        host.set_self_balance(ccd(100));
        withdraw(&mut host, &mut logger, SELLER).expect_report("Seller withdraw should pass");

        claim_eq!(host.get_transfers(), vec![(SELLER, ccd(100))]);
        let logged = logger.logs.len();
        claim_eq!(
            logger.logs[logged - 2],
            to_bytes(&AuctionEvents::claim(&token(), &SELLER, &ALICE))
        );
        claim_eq!(
            claim_nft(&mut host, &mut logger, ALICE),
            Err(CustomContractError::AlreadyClaimed)
        );
    }

    #[concordium_test]
    fn test_seller_is_not_paid_when_delivery_fails() {
        let mut host = new_host();
        let mut logger = TestLogger::init();
        start(&mut host, &mut logger);
        bid(&mut host, &mut logger, ALICE, ccd(100)).expect_report("Bid");
        end(&mut host, &mut logger).expect_report("Ending should pass");

        host.setup_mock_entrypoint(NFT_CONTRACT, entrypoint("transfer"), rejecting_mock());
        host.set_self_balance(ccd(100));

        claim_eq!(
            withdraw(&mut host, &mut logger, SELLER),
            Err(CustomContractError::TransferFailed)
        );
        claim!(host.get_transfers().is_empty());
    }

    #[concordium_test]
    fn test_winner_recovers_bid_when_seller_revokes_operator() {
        let mut host = new_host();
        let mut logger = TestLogger::init();
        start(&mut host, &mut logger);
        bid(&mut host, &mut logger, ALICE, ccd(100)).expect_report("Bid");
        end(&mut host, &mut logger).expect_report("Ending should pass");

        // Seller removes the auction as an operator, the token can not be delivered
        host.setup_mock_entrypoint(NFT_CONTRACT, entrypoint("operatorOf"), operator_of_mock(false));
        host.setup_mock_entrypoint(NFT_CONTRACT, entrypoint("transfer"), rejecting_mock());
        host.set_self_balance(ccd(100));

        withdraw(&mut host, &mut logger, ALICE).expect_report("Refund should pass");
        claim_eq!(host.get_transfers(), vec![(ALICE, ccd(100))]);
        claim_eq!(
            logger.logs.last(),
            Some(&to_bytes(&AuctionEvents::abort(
                &token(),
                &SELLER,
                &ALICE,
                ccd(100),
            )))
        );

        // Seller gets nothing for an undelivered token
        claim_eq!(
            withdraw(&mut host, &mut logger, SELLER),
            Err(CustomContractError::NothingToWithdraw)
        );
        claim_eq!(
            claim_nft(&mut host, &mut logger, ALICE),
            Err(CustomContractError::AlreadyClaimed)
        );
        claim_eq!(host.get_transfers().len(), 1);
    }

    #[concordium_test]
    fn test_update_internal_value() {
        let mut host = new_host();
        let parameter_bytes = to_bytes(&InternalValue::MaxDuration(Duration::from_days(1)));

        let mut ctx = new_ctx(ALICE, 0);
        ctx.set_parameter(&parameter_bytes);
        claim_eq!(
            update_internal_value(&ctx, &mut host),
            Err(CustomContractError::Unauthorized)
        );

        let mut ctx = new_ctx(OWNER, 0);
        ctx.set_parameter(&parameter_bytes);
        claim_eq!(update_internal_value(&ctx, &mut host), Ok(()));

        let view_bytes = to_bytes(&ViewInternalValueParams::MaxDuration);
        let mut ctx = new_ctx(ALICE, 0);
        ctx.set_parameter(&view_bytes);
        claim_eq!(
            view_internal_value(&ctx, &host),
            Ok(InternalValue::MaxDuration(Duration::from_days(1)))
        );
    }
}
