use concordium_std::concordium_cfg_test;

#[concordium_cfg_test]
pub use inner::*;

#[concordium_cfg_test]
mod inner {
    use concordium_cis2::OperatorOfQueryParams;
    use concordium_cis2::OperatorOfQueryResponse;
    use concordium_std::test_infrastructure::MockFn;
    use concordium_std::*;

    use crate::{
        ContractBalanceOfQueryParams, ContractBalanceOfQueryResponse, ContractTokenAmount,
    };

    pub fn parse_and_ok_mock<D: Deserial, S>(
        return_value: impl Clone + Serial + 'static,
    ) -> MockFn<S> {
        MockFn::new(move |parameter, _amount, _balance, _state| {
            D::deserial(&mut Cursor::new(parameter)).map_err(|_| CallContractError::Trap)?;
            Ok((false, Some(return_value.clone())))
        })
    }

    pub fn parse_and_map_mock<D: Deserial, T: Serial, S>(
        f: impl Fn(&D) -> Option<T> + 'static,
    ) -> MockFn<S> {
        MockFn::new(move |parameter, _, _, _state| {
            let value =
                D::deserial(&mut Cursor::new(parameter)).map_err(|_| CallContractError::Trap)?;
            f(&value)
                .map(|r| (false, Some(r)))
                .ok_or(CallContractError::Trap)
        })
    }

    /// Entrypoint that always rejects, e.g. a registry refusing a transfer.
    pub fn rejecting_mock<S>() -> MockFn<S> {
        MockFn::new(|_parameter, _amount, _balance, _state| Err(CallContractError::<()>::Trap))
    }

    /// Registry `balanceOf` where `holder` owns exactly one of every queried token.
    pub fn balance_of_mock<S>(holder: AccountAddress) -> MockFn<S> {
        parse_and_map_mock(move |params: &ContractBalanceOfQueryParams| {
            let amounts: Vec<ContractTokenAmount> = params
                .queries
                .iter()
                .map(|query| {
                    ContractTokenAmount::from(u64::from(query.address == Address::Account(holder)))
                })
                .collect();
            Some(ContractBalanceOfQueryResponse::from(amounts))
        })
    }

    /// Registry `operatorOf` answering every query with `is_operator`.
    pub fn operator_of_mock<S>(is_operator: bool) -> MockFn<S> {
        parse_and_map_mock(move |params: &OperatorOfQueryParams| {
            let answers: Vec<bool> = params.queries.iter().map(|_| is_operator).collect();
            Some(OperatorOfQueryResponse::from(answers))
        })
    }
}
