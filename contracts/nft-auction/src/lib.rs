//! English auction of CIS-2 tokens. Sellers keep custody of their token and
//! make this contract its operator, bidders escrow CCD, and outbid bidders
//! pull their refunds with `withdraw`.
#![cfg_attr(not(feature = "std"), no_std)]

mod contract;
mod events;
mod external;
mod nft;
mod state;
