//! Client side of the CIS-2 token registry that holds auctioned tokens.
use commons::{
    ContractBalanceOfQueryParams, ContractBalanceOfQueryResponse, ContractTokenAmount,
    CustomContractError, Token, TransferParameter,
};
use concordium_cis2::{
    AdditionalData, BalanceOfQuery, OperatorOfQuery, OperatorOfQueryParams,
    OperatorOfQueryResponse, Receiver, Transfer, TransferParams,
};
use concordium_std::*;

/// Ensure that `owner` holds the token and has made `operator` its operator,
/// so that the token can later be transferred on the owner's behalf.
pub fn ensure_controls<T>(
    host: &impl HasHost<T>,
    token: &Token,
    owner: &AccountAddress,
    operator: &ContractAddress,
) -> Result<(), CustomContractError> {
    ensure!(
        balance_of(host, token, owner)? > 0,
        CustomContractError::NotAuthorized
    );
    ensure!(
        is_operator(host, token, owner, operator)?,
        CustomContractError::NotAuthorized
    );
    Ok(())
}

pub fn balance_of<T>(
    host: &impl HasHost<T>,
    token: &Token,
    owner: &AccountAddress,
) -> Result<u64, CustomContractError> {
    let params = ContractBalanceOfQueryParams {
        queries: vec![BalanceOfQuery {
            token_id: token.id.clone(),
            address: Address::Account(*owner),
        }],
    };

    let mut response = host
        .invoke_contract_read_only(
            &token.contract,
            &params,
            EntrypointName::new_unchecked("balanceOf"),
            Amount::zero(),
        )
        .map_err(handle_query_error)?
        .ok_or(CustomContractError::Incompatible)?;

    let balances = ContractBalanceOfQueryResponse::deserial(&mut response)
        .map_err(|_| CustomContractError::Incompatible)?;

    balances
        .0
        .first()
        .map(|amount| amount.0)
        .ok_or(CustomContractError::Incompatible)
}

pub fn is_operator<T>(
    host: &impl HasHost<T>,
    token: &Token,
    owner: &AccountAddress,
    operator: &ContractAddress,
) -> Result<bool, CustomContractError> {
    let params = OperatorOfQueryParams {
        queries: vec![OperatorOfQuery {
            owner: Address::Account(*owner),
            address: Address::Contract(*operator),
        }],
    };

    let mut response = host
        .invoke_contract_read_only(
            &token.contract,
            &params,
            EntrypointName::new_unchecked("operatorOf"),
            Amount::zero(),
        )
        .map_err(handle_query_error)?
        .ok_or(CustomContractError::Incompatible)?;

    let answers = OperatorOfQueryResponse::deserial(&mut response)
        .map_err(|_| CustomContractError::Incompatible)?;

    answers
        .0
        .first()
        .copied()
        .ok_or(CustomContractError::Incompatible)
}

/// Move the token from `from` to `to`. This contract must be an operator of
/// `from`. Any failure of the registry aborts with `TransferFailed`.
pub fn transfer<T>(
    host: &mut impl HasHost<T>,
    token: &Token,
    from: &AccountAddress,
    to: &AccountAddress,
) -> Result<(), CustomContractError> {
    let params: TransferParameter = TransferParams(vec![Transfer {
        token_id: token.id.clone(),
        amount: ContractTokenAmount::from(1u64),
        from: Address::Account(*from),
        to: Receiver::Account(*to),
        data: AdditionalData::empty(),
    }]);

    host.invoke_contract(
        &token.contract,
        &params,
        EntrypointName::new_unchecked("transfer"),
        Amount::zero(),
    )
    .map_err(|_| CustomContractError::TransferFailed)?;

    Ok(())
}

fn handle_query_error<R>(error: CallContractError<R>) -> CustomContractError {
    match error {
        // Registry rejects queries for unknown tokens
        CallContractError::LogicReject { .. } => CustomContractError::NotAuthorized,
        _ => CustomContractError::Incompatible,
    }
}

#[concordium_cfg_test]
mod tests {
    use commons::test::*;
    use commons::ContractTokenId;
    use concordium_cis2::TokenIdVec;
    use concordium_std::test_infrastructure::*;

    use super::*;

    const NFT_CONTRACT: ContractAddress = ContractAddress {
        index: 1,
        subindex: 0,
    };
    const AUCTION: ContractAddress = ContractAddress {
        index: 2,
        subindex: 0,
    };

    const USER_1: AccountAddress = AccountAddress([1; 32]);
    const USER_2: AccountAddress = AccountAddress([2; 32]);

    fn token() -> Token {
        let id: ContractTokenId = TokenIdVec([1; 32].into());
        Token {
            contract: NFT_CONTRACT,
            id,
        }
    }

    fn entrypoint(name: &str) -> OwnedEntrypointName {
        OwnedEntrypointName::new_unchecked(name.into())
    }

    #[concordium_test]
    fn test_transfer() {
        let state = ();
        let state_builder = TestStateBuilder::default();
        let mut host = TestHost::new(state, state_builder);

        host.setup_mock_entrypoint(
            NFT_CONTRACT,
            entrypoint("transfer"),
            parse_and_check_transfer_mock(USER_1, USER_2),
        );

        let response = transfer(&mut host, &token(), &USER_1, &USER_2);

        claim_eq!(response, Ok(()))
    }

    #[concordium_test]
    fn test_transfer_rejected() {
        let mut host = TestHost::new((), TestStateBuilder::default());

        host.setup_mock_entrypoint(NFT_CONTRACT, entrypoint("transfer"), rejecting_mock());

        let response = transfer(&mut host, &token(), &USER_1, &USER_2);

        claim_eq!(response, Err(CustomContractError::TransferFailed))
    }

    #[concordium_test]
    fn test_ensure_controls() {
        let mut host = TestHost::new((), TestStateBuilder::default());

        host.setup_mock_entrypoint(NFT_CONTRACT, entrypoint("balanceOf"), balance_of_mock(USER_1));
        host.setup_mock_entrypoint(NFT_CONTRACT, entrypoint("operatorOf"), operator_of_mock(true));

        claim_eq!(balance_of(&host, &token(), &USER_1), Ok(1));
        claim_eq!(balance_of(&host, &token(), &USER_2), Ok(0));
        claim_eq!(ensure_controls(&host, &token(), &USER_1, &AUCTION), Ok(()));
        claim_eq!(
            ensure_controls(&host, &token(), &USER_2, &AUCTION),
            Err(CustomContractError::NotAuthorized)
        );
    }

    #[concordium_test]
    fn test_ensure_controls_without_operator() {
        let mut host = TestHost::new((), TestStateBuilder::default());

        host.setup_mock_entrypoint(NFT_CONTRACT, entrypoint("balanceOf"), balance_of_mock(USER_1));
        host.setup_mock_entrypoint(NFT_CONTRACT, entrypoint("operatorOf"), operator_of_mock(false));

        claim_eq!(
            ensure_controls(&host, &token(), &USER_1, &AUCTION),
            Err(CustomContractError::NotAuthorized)
        );
    }

    #[concordium_test]
    fn test_incompatible_registry() {
        let mut host = TestHost::new((), TestStateBuilder::default());

        host.setup_mock_entrypoint(NFT_CONTRACT, entrypoint("balanceOf"), rejecting_mock());

        claim_eq!(
            ensure_controls(&host, &token(), &USER_1, &AUCTION),
            Err(CustomContractError::Incompatible)
        );
    }

    fn parse_and_check_transfer_mock<S>(from: AccountAddress, to: AccountAddress) -> MockFn<S> {
        MockFn::new_v1(move |param, _, _, _| {
            let params = TransferParameter::deserial(&mut Cursor::new(param))
                .map_err(|_| CallContractError::Trap)?;
            let transfer = params.0.first().ok_or(CallContractError::Trap)?;
            let receiver = match transfer.to {
                Receiver::Account(account) => account,
                _ => return Err(CallContractError::Trap),
            };
            if transfer.from != Address::Account(from)
                || receiver != to
                || transfer.amount != ContractTokenAmount::from(1u64)
            {
                return Err(CallContractError::Trap);
            }
            Ok((false, ()))
        })
    }
}
