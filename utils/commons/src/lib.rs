//! It exposes all common structs and types shared by the auction contracts.
#![cfg_attr(not(feature = "std"), no_std)]
pub use crate::{constants::*, errors::*, types::*};
use concordium_cis2::*;
use concordium_std::*;

pub mod test;

mod constants;
mod errors;
mod types;
