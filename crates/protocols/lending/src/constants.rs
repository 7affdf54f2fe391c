//! Lending Protocol Constants
//!
//! Mainnet shared objects and the pool registry. All pools are defined as
//! configuration data so adding a market needs no code changes.

/// Market configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub symbol: &'static str,
    pub coin_type: &'static str,
    /// Pool shared object
    pub pool_id: &'static str,
    /// Reserve index inside storage
    pub asset_id: u8,
    pub decimals: u8,
}

/// Shared objects of the lending protocol
pub mod protocol {
    /// Used until the open API has answered once
    pub const FALLBACK_PACKAGE: &str =
        "0x81c408448d0d57b3e371ea94de1d40bf852784d3e225de1e74acab3e8395c18f";
    pub const STORAGE: &str = "0xbb4e2f4b6205c2e2a2db47aeb4f830796ec7c005f88537ee775986639bc442fe";
    pub const INCENTIVE_V2: &str =
        "0xf87a8acb8b81d14307894d12595541a73f19933f88e1326d5be349c7a6f7559c";
    pub const INCENTIVE_V3: &str =
        "0x62982dad27fb10bb314b3384d5de8d2ac2d72ab2dbeae5d801dbdb9efa816c80";
    pub const PRICE_ORACLE: &str =
        "0x1568865ed9a0b5ec414220e8f79b3d04c77acc82358f6e5ae4635687392ffbef";
    pub const FLASHLOAN_CONFIG: &str =
        "0x3672b2bf471a60c30a03325f104f92fb195c9d337ba58072dce764fe2aa5e2dc";

    pub const INCENTIVE_MODULE: &str = "incentive_v3";
    pub const LENDING_MODULE: &str = "lending";
}

/// Volo liquid staking (vSui)
pub mod volo {
    pub const PACKAGE: &str = "0x549e8b69270defbfafd4f94e17ec44cdbdd99820b33bda2278dea3b9a32d3f55";
    pub const NATIVE_POOL: &str =
        "0x7fa2faa111b8c65bea48a23049bfd81ca8f971a262d981dcd9a17c3825cb5baf";
    pub const METADATA: &str = "0x680cd26af32b2bde8d3361e804c53ec1d1cfe24c7f039eb7f549e8dfde389a60";
    /// Smallest stake the pool accepts (1 SUI)
    pub const MIN_STAKE_MIST: u64 = 1_000_000_000;
}

/// Mainnet markets
pub mod mainnet {
    use super::PoolConfig;

    pub const SUI: PoolConfig = PoolConfig {
        symbol: "SUI",
        coin_type: "0x2::sui::SUI",
        pool_id: "0x96df0fce3c471489f4debaaa762cf960b3d97820bd1f3f025ff8190730e958c5",
        asset_id: 0,
        decimals: 9,
    };

    pub const WUSDC: PoolConfig = PoolConfig {
        symbol: "wUSDC",
        coin_type: "0x5d4b302506645c37ff133b98c4b50a5ae14841659738d6d733d59d0d217a93bf::coin::COIN",
        pool_id: "0xa02a98f9c88db51c6f5efaaf2261c81f34dd56d86073387e0ef1805ca22e39c8",
        asset_id: 1,
        decimals: 6,
    };

    pub const USDT: PoolConfig = PoolConfig {
        symbol: "USDT",
        coin_type: "0xc060006111016b8a020ad5b33834984a437aaa7d3c74c18e09a95d48aceab08c::coin::COIN",
        pool_id: "0x0e060c3b5b8de00fb50511b7a45188c8e34b6995c01f69d98ea5a466fe10d103",
        asset_id: 2,
        decimals: 6,
    };

    pub const WETH: PoolConfig = PoolConfig {
        symbol: "WETH",
        coin_type: "0xaf8cd5edc19c4512f4259f0bee101a40d41ebed738ade5874359610ef8eeced5::coin::COIN",
        pool_id: "0x71b9f6e822c48ce827bceadce82201d6a7559f7b0350ed1daa1dc2ba3ac41b56",
        asset_id: 3,
        decimals: 8,
    };

    pub const CETUS: PoolConfig = PoolConfig {
        symbol: "CETUS",
        coin_type: "0x06864a6f921804860930db6ddbe2e16acdf8504495ea7481637a1c8b9a8fe54b::cetus::CETUS",
        pool_id: "0x3c376f857ec4247b8ee456c1db19e9c74e0154d4876915e54221b5052d5b1e2e",
        asset_id: 4,
        decimals: 9,
    };

    pub const VSUI: PoolConfig = PoolConfig {
        symbol: "vSUI",
        coin_type: "0x549e8b69270defbfafd4f94e17ec44cdbdd99820b33bda2278dea3b9a32d3f55::cert::CERT",
        pool_id: "0x9790c2c272e15b6bf9b341eb531ef16bcc8ed2b20dfda25d060bf47f5dd88d01",
        asset_id: 5,
        decimals: 9,
    };

    pub const HASUI: PoolConfig = PoolConfig {
        symbol: "haSUI",
        coin_type: "0xbde4ba4c2e274a60ce15c1cfff9e5c42e41654ac8b6d906a57efa4bd3c29f47d::hasui::HASUI",
        pool_id: "0x6fd9cb6ebd76bc80340a9443d72ea0ae282ee20e2fd7544f6ffcd2c070d9557a",
        asset_id: 6,
        decimals: 9,
    };

    pub const NAVX: PoolConfig = PoolConfig {
        symbol: "NAVX",
        coin_type: "0xa99b8952d4f7d947ea77fe0ecdcc9e5fc0bcab2841d6e2a5aa00c3044e5544b5::navx::NAVX",
        pool_id: "0xc0e02e7a245e855dd365422faf76f87d9f5b2148a26d48dda6e8253c3fe9fa60",
        asset_id: 7,
        decimals: 9,
    };

    pub const USDC: PoolConfig = PoolConfig {
        symbol: "USDC",
        coin_type: "0xdba34672e30cb065b1f93e3ab55318768fd6fef66c15942c9f7cb846e2f900e7::usdc::USDC",
        pool_id: "0xa3582097b4c57630046c0c49a88bfc6b202a3ec0a9db5597c31765f7563755a8",
        asset_id: 10,
        decimals: 6,
    };

    pub const POOLS: &[PoolConfig] = &[SUI, WUSDC, USDT, WETH, CETUS, VSUI, HASUI, NAVX, USDC];
}

/// Look up a pool by symbol (case-insensitive)
pub fn get_pool(symbol: &str) -> Option<&'static PoolConfig> {
    mainnet::POOLS
        .iter()
        .find(|p| p.symbol.eq_ignore_ascii_case(symbol))
}

/// Look up a pool by its coin type
pub fn get_pool_by_coin_type(coin_type: &navi_core::CoinType) -> Option<&'static PoolConfig> {
    mainnet::POOLS
        .iter()
        .find(|p| navi_core::CoinType::new(p.coin_type) == *coin_type)
}
