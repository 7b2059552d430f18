//! The on-chain insurance module: where it lives and what it accepts.
//!
//! | Function | Arguments (in order) |
//! |---|---|
//! | `create_pool` | name: string, premium: u64, coverage: u64 |
//! | `join_pool` | pool_id: u64 |
//! | `submit_claim` | pool_id: u64, amount: u64, description: string |
//! | `vote_on_claim` | claim_id: u64, approve: bool |
//!
//! Argument order is part of the on-chain contract. A call whose arguments
//! are reordered still encodes fine locally and only fails once executed.

use securepool_agent_core::AccountAddress;

use crate::types::{ModuleId, WireType};

/// Default address of the account that published the module.
pub const MODULE_ADDRESS: &str =
    "0x1c6d89ac6b57c23e07ce431ea4e54ad340965d29aa4278c5767b211776361fc3";

const MODULE_ADDRESS_BYTES: [u8; 32] = [
    0x1c, 0x6d, 0x89, 0xac, 0x6b, 0x57, 0xc2, 0x3e, 0x07, 0xce, 0x43, 0x1e, 0xa4, 0xe5, 0x4a, 0xd3,
    0x40, 0x96, 0x5d, 0x29, 0xaa, 0x42, 0x78, 0xc5, 0x76, 0x7b, 0x21, 0x17, 0x76, 0x36, 0x1f, 0xc3,
];

/// Default module name.
pub const MODULE_NAME: &str = "MicroInsurance";

pub const CREATE_POOL: &str = "create_pool";
pub const JOIN_POOL: &str = "join_pool";
pub const SUBMIT_CLAIM: &str = "submit_claim";
pub const VOTE_ON_CLAIM: &str = "vote_on_claim";

const CREATE_POOL_ARGS: &[WireType] = &[WireType::String, WireType::U64, WireType::U64];
const JOIN_POOL_ARGS: &[WireType] = &[WireType::U64];
const SUBMIT_CLAIM_ARGS: &[WireType] = &[WireType::U64, WireType::U64, WireType::String];
const VOTE_ON_CLAIM_ARGS: &[WireType] = &[WireType::U64, WireType::Bool];

/// The module at its default address.
pub fn default_module() -> ModuleId {
    ModuleId::new(AccountAddress::new(MODULE_ADDRESS_BYTES), MODULE_NAME)
}

/// The argument signature of an insurance function, or `None` if the module
/// has no such entry function.
pub fn signature_of(function: &str) -> Option<&'static [WireType]> {
    match function {
        CREATE_POOL => Some(CREATE_POOL_ARGS),
        JOIN_POOL => Some(JOIN_POOL_ARGS),
        SUBMIT_CLAIM => Some(SUBMIT_CLAIM_ARGS),
        VOTE_ON_CLAIM => Some(VOTE_ON_CLAIM_ARGS),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_address_matches_text_form() {
        assert_eq!(default_module().address.to_hex(), MODULE_ADDRESS);
        assert_eq!(
            AccountAddress::parse(MODULE_ADDRESS).unwrap(),
            default_module().address
        );
    }

    #[test]
    fn signatures() {
        assert_eq!(signature_of(JOIN_POOL), Some(&[WireType::U64][..]));
        assert_eq!(
            signature_of(VOTE_ON_CLAIM),
            Some(&[WireType::U64, WireType::Bool][..])
        );
        assert_eq!(signature_of("withdraw"), None);
    }
}
