//! Selector-keyed decoding of pending swap calldata
//!
//! Only the router methods on the allow-list are decoded, each with its own
//! argument layout. Anything unexpected fails closed: the candidate is
//! dropped, never mis-parsed.

use alloy::primitives::{keccak256, Address, U256};
use lazy_static::lazy_static;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

/// Calldata word positions for one router method.
#[derive(Debug, Clone, Copy)]
struct SwapLayout {
    /// None when the input amount travels in the transaction value rather
    /// than calldata (ETH-input variants), which we cannot size from the
    /// feed record.
    amount_word: Option<usize>,
    path_word: usize,
}

fn selector(signature: &str) -> [u8; 4] {
    let mut out = [0u8; 4];
    out.copy_from_slice(&keccak256(signature.as_bytes())[..4]);
    out
}

lazy_static! {
    static ref SWAP_LAYOUTS: HashMap<[u8; 4], SwapLayout> = {
        let mut m = HashMap::new();
        m.insert(
            selector("swapExactTokensForTokens(uint256,uint256,address[],address,uint256)"),
            SwapLayout {
                amount_word: Some(0),
                path_word: 2,
            },
        );
        m.insert(
            selector("swapTokensForExactTokens(uint256,uint256,address[],address,uint256)"),
            SwapLayout {
                amount_word: Some(1),
                path_word: 2,
            },
        );
        m.insert(
            selector("swapExactETHForTokens(uint256,address[],address,uint256)"),
            SwapLayout {
                amount_word: None,
                path_word: 1,
            },
        );
        m.insert(
            selector("swapTokensForExactETH(uint256,uint256,address[],address,uint256)"),
            SwapLayout {
                amount_word: Some(1),
                path_word: 2,
            },
        );
        m
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSwap {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: Decimal,
}

pub fn is_swap_call(input: &[u8]) -> bool {
    match input.get(..4).and_then(|s| <[u8; 4]>::try_from(s).ok()) {
        Some(sel) => SWAP_LAYOUTS.contains_key(&sel),
        None => false,
    }
}

/// Decodes an allow-listed swap call. Returns None for unknown selectors,
/// truncated arguments, out-of-range offsets, degenerate paths, or amounts
/// that do not fit the profit math.
pub fn decode_swap(input: &[u8]) -> Option<DecodedSwap> {
    if input.len() < 4 {
        return None;
    }
    let sel: [u8; 4] = input[..4].try_into().ok()?;
    let layout = SWAP_LAYOUTS.get(&sel)?;
    let args = &input[4..];

    let amount_word = layout.amount_word?;
    let amount = read_word(args, amount_word)?;
    let path_offset = read_word(args, layout.path_word)?;
    let path = read_address_array(args, path_offset)?;

    Some(DecodedSwap {
        token_in: *path.first()?,
        token_out: *path.last()?,
        amount_in: u256_to_decimal(amount)?,
    })
}

fn read_word(args: &[u8], index: usize) -> Option<U256> {
    let start = index.checked_mul(32)?;
    let end = start.checked_add(32)?;
    args.get(start..end).map(U256::from_be_slice)
}

fn read_address_array(args: &[u8], offset: U256) -> Option<Vec<Address>> {
    let offset = usize::try_from(offset).ok()?;
    let len_word = args.get(offset..offset.checked_add(32)?)?;
    let len = usize::try_from(U256::from_be_slice(len_word)).ok()?;
    // A swap path is 2..=8 hops; anything else is a misparse.
    if !(2..=8).contains(&len) {
        return None;
    }

    let mut path = Vec::with_capacity(len);
    for i in 0..len {
        let start = offset.checked_add(32)?.checked_add(i.checked_mul(32)?)?;
        let word = args.get(start..start + 32)?;
        path.push(Address::from_slice(&word[12..]));
    }
    Some(path)
}

fn u256_to_decimal(value: U256) -> Option<Decimal> {
    Decimal::from_str(&value.to_string())
        .ok()
        .filter(|d| *d > Decimal::ZERO)
}

/// Builds calldata for `swapExactTokensForTokens`, mirroring the router ABI.
#[cfg(test)]
pub(crate) fn encode_swap_exact_tokens(amount_in: U256, path: &[Address]) -> Vec<u8> {
    let mut data =
        selector("swapExactTokensForTokens(uint256,uint256,address[],address,uint256)").to_vec();
    data.extend_from_slice(&amount_in.to_be_bytes::<32>()); // amountIn
    data.extend_from_slice(&U256::ZERO.to_be_bytes::<32>()); // amountOutMin
    data.extend_from_slice(&U256::from(160).to_be_bytes::<32>()); // path offset
    data.extend_from_slice(&[0u8; 32]); // to
    data.extend_from_slice(&U256::ZERO.to_be_bytes::<32>()); // deadline
    data.extend_from_slice(&U256::from(path.len()).to_be_bytes::<32>());
    for addr in path {
        data.extend_from_slice(&[0u8; 12]);
        data.extend_from_slice(addr.as_slice());
    }
    data
}
