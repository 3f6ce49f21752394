use super::*;

pub type ContractResult<A> = Result<A, CustomContractError>;

/// Contract token ID type. Registries are free to choose any token ID length.
pub type ContractTokenId = TokenIdVec;

/// Contract token amount type. Non-fungible tokens only ever hold 0 or 1, but
/// the LEB128 encoding allows reading any registry amount into `u64`.
pub type ContractTokenAmount = TokenAmountU64;

/// Parameter type for the CIS-2 function `balanceOf` specialized to the subset
/// of TokenIDs used by this contract.
pub type ContractBalanceOfQueryParams = BalanceOfQueryParams<ContractTokenId>;

/// Response type for the CIS-2 function `balanceOf` specialized to the subset
/// of TokenAmounts used by this contract.
pub type ContractBalanceOfQueryResponse = BalanceOfQueryResponse<ContractTokenAmount>;

pub type TransferParameter = TransferParams<ContractTokenId, ContractTokenAmount>;

/// Unique asset identifier: the registry contract together with the token ID
/// inside of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, SchemaType)]
pub struct Token {
    /// Registry contract that owns the token records.
    pub contract: ContractAddress,
    /// Token identifier inside the registry.
    pub id: ContractTokenId,
}
