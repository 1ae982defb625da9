//! Known SimpleSwap deployments
//!
//! Addresses are kept as strings, the way they are published, and parsed on
//! access. A chain with no deployed exchange yields no entry.

use anyhow::{Context, Result};
use simpleswap_amm::{Address, Exchange};

pub const MAINNET: u64 = 1;
pub const RINKEBY: u64 = 4;

/// Decimals of the USDx hub coin
pub const USDX_DECIMALS: u8 = 18;
/// Decimals of the USDT hub coin
pub const USDT_DECIMALS: u8 = 6;

/// Published addresses of one chain. Empty strings are not deployed.
#[derive(Debug, Clone, Copy)]
pub struct ChainAddresses {
    pub chain_id: u64,
    pub aggregator: &'static str,
    pub usdx_exchange: &'static str,
    pub usdt_exchange: &'static str,
    pub usdx: &'static str,
    pub usdt: &'static str,
}

pub const CHAINS: &[ChainAddresses] = &[
    ChainAddresses {
        chain_id: MAINNET,
        aggregator: "",
        usdx_exchange: "",
        usdt_exchange: "",
        usdx: "0xeb269732ab75A6fD61Ea60b06fE994cD32a83549",
        usdt: "0xdac17f958d2ee523a2206206994597c13d831ec7",
    },
    ChainAddresses {
        chain_id: RINKEBY,
        aggregator: "0x4B22F54EE6CaAd40e14939502a9d6ACC0EE1Cf86",
        usdx_exchange: "0xfA5D33176c09CcdcAcD41Dca302c367d84bfE621",
        usdt_exchange: "0xca62eE042197109f875c01F7f9c5d0E3d24Fb629",
        usdx: "0xd96cc7f80c1cb595ebcdc072531e1799b3a2436e",
        usdt: "0xe668af4AD014334670c029e59c6Ff57eBBDe30f6",
    },
];

/// Test tokens listed on Rinkeby: `(address, name, symbol, decimals)`
pub const RINKEBY_TOKENS: &[(&str, &str, &str, u8)] = &[
    ("0x19b0EcD07d9AB6C751ea804b60C60433B8cA1785", "CryptoCow", "COW", 18),
    ("0x30CD74091E33f61Cd1D130f726db43DCF6F23746", "Token 1", "T1", 18),
    ("0x9b7ADE0Ab7B123DF831C471F68fb7C018EeEd625", "Token 2", "T2", 18),
    ("0xaf21bb8ae7b7a5eec37964e478583cd486fd12e2", "Test Token", "TEST", 18),
];

pub fn parse_address(text: &str) -> Result<Address> {
    text.parse::<Address>()
        .with_context(|| format!("Invalid address: {text}"))
}

fn parse_deployed(text: &str) -> Result<Option<Address>> {
    if text.is_empty() {
        Ok(None)
    } else {
        parse_address(text).map(Some)
    }
}

impl ChainAddresses {
    pub fn for_chain(chain_id: u64) -> Option<&'static ChainAddresses> {
        CHAINS.iter().find(|chain| chain.chain_id == chain_id)
    }

    /// Hub exchanges deployed on this chain, USDx first
    pub fn exchanges(&self) -> Result<Vec<(&'static str, Exchange)>> {
        let mut exchanges = Vec::new();
        let hubs = [
            ("usdx", self.usdx_exchange, self.usdx, USDX_DECIMALS),
            ("usdt", self.usdt_exchange, self.usdt, USDT_DECIMALS),
        ];
        for (name, exchange, hub, decimals) in hubs {
            if let (Some(exchange), Some(hub)) = (parse_deployed(exchange)?, parse_deployed(hub)?) {
                exchanges.push((name, Exchange::new(exchange, hub, decimals)));
            }
        }
        Ok(exchanges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rinkeby_has_both_hubs() {
        let rinkeby = ChainAddresses::for_chain(RINKEBY).unwrap();
        let exchanges = rinkeby.exchanges().unwrap();
        assert_eq!(exchanges.len(), 2);
        assert_eq!(exchanges[0].0, "usdx");
        assert_eq!(exchanges[0].1.hub_decimals, 18);
        assert_eq!(exchanges[1].1.hub_decimals, 6);
        assert_eq!(
            exchanges[1].1.hub,
            parse_address("0xe668af4ad014334670c029e59c6ff57ebbde30f6").unwrap()
        );
    }

    #[test]
    fn test_mainnet_exchanges_not_deployed() {
        let mainnet = ChainAddresses::for_chain(MAINNET).unwrap();
        assert!(mainnet.exchanges().unwrap().is_empty());
        assert!(ChainAddresses::for_chain(137).is_none());
    }

    #[test]
    fn test_listed_tokens_parse() {
        for (address, _, _, decimals) in RINKEBY_TOKENS {
            assert!(parse_address(address).is_ok());
            assert!(*decimals <= 18);
        }
        assert!(parse_address("0x123").is_err());
    }
}
