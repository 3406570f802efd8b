//! Token definitions and the default Polygon registry

use alloy::primitives::{address, Address};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Token {
    pub symbol: String,
    pub address: Address,
}

impl Token {
    pub fn new(symbol: &str, address: Address) -> Self {
        Self {
            symbol: symbol.to_string(),
            address,
        }
    }
}

/// Polygon mainnet token set scanned by default.
pub fn default_tokens() -> Vec<Token> {
    vec![
        Token::new("WMATIC", address!("0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270")),
        Token::new("USDC", address!("2791Bca1f2de4661ED88A30C99A7a9449Aa84174")),
        Token::new("WETH", address!("7ceB23fD6bC0adD59E62ac25578270cFf1b9f619")),
        Token::new("WBTC", address!("1BFD67037B42Cf73acF2047067bd4F2C47D9BfD6")),
        Token::new("DAI", address!("8f3Cf7ad23Cd3CaDbD9735AFf958023239c6A063")),
        Token::new("USDT", address!("c2132D05D31c914a87C6611C10748AEb04B58e8F")),
    ]
}

/// Default 3-token cycles checked by the triangular detector.
pub fn default_triangular_paths(tokens: &[Token]) -> Vec<[Token; 3]> {
    let find = |symbol: &str| tokens.iter().find(|t| t.symbol == symbol).cloned();

    let cycles = [
        ["WMATIC", "USDC", "WETH"],
        ["WETH", "USDC", "WBTC"],
        ["WMATIC", "USDT", "WETH"],
        ["DAI", "USDC", "USDT"],
    ];

    cycles
        .iter()
        .filter_map(|[a, b, c]| Some([find(a)?, find(b)?, find(c)?]))
        .collect()
}
