/// Tag for the auction Start event.
pub const START_TAG: u8 = u8::MAX - 8;

/// Tag for the auction Bid event.
pub const BIDING_TAG: u8 = u8::MAX - 11;

/// Tag for the auction End event.
pub const END_TAG: u8 = u8::MAX - 12;

/// Tag for the auction Claim event.
pub const CLAIM_TAG: u8 = u8::MAX - 13;

/// Tag for the Withdraw event.
pub const WITHDRAW_TAG: u8 = u8::MAX - 14;

/// Tag for the auction Reclaim event.
pub const RECLAIM_TAG: u8 = u8::MAX - 22;

/// Tag for the auction Abort event.
pub const ABORT_TAG: u8 = u8::MAX - 23;
