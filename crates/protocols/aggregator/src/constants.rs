//! Aggregator Constants
//!
//! Mainnet package and shared-object ids for every venue the route builder
//! drives, plus the aggregator's own package.

/// Aggregator package (slippage guard, fee events)
pub mod aggregator {
    pub const PACKAGE: &str = "0x88dfe5e893bc9fa984d121e4d0d5b2e873dc70ae430cf5b3228ae6cb199cb32b";

    /// Decimals the fee event expects prices in
    pub const PRICE_SCALE: u64 = 1_000_000_000;
}

/// Square-root price bounds shared by the CLMM venues
pub mod sqrt_price {
    /// Lowest price a swap may push the pool to (a→b)
    pub const MIN_SQRT_PRICE_X64: u128 = 4_295_048_016;
    /// Highest price a swap may push the pool to (b→a)
    pub const MAX_SQRT_PRICE_X64: u128 = 79_226_673_515_401_279_992_447_579_055;

    pub fn limit(a2b: bool) -> u128 {
        if a2b {
            MIN_SQRT_PRICE_X64
        } else {
            MAX_SQRT_PRICE_X64
        }
    }
}

pub mod cetus {
    pub const PACKAGE: &str = "0x1eabed72c53feb3805120a081dc15963c204dc8d091542592abaf7a35689b2fb";
    pub const GLOBAL_CONFIG: &str =
        "0xdaa46292632c3c4d8f31f23ea0f9b36a28ff3677e9684980e4438403a67a3d8f";
}

pub mod turbos {
    pub const PACKAGE: &str = "0x91bfbc386a41afcfd9b2533058d7e915a1d3829089cc268ff4333d54d6339ca1";
    pub const VERSIONED: &str = "0xf1cf0e81048df168ebeb1b8030fad24b3e0b53ae827c25053fff0779c1445b6f";
    /// Swap deadline offset from build time
    pub const DEADLINE_MS: u64 = 3 * 60 * 1000;
}

pub mod kriya_v2 {
    pub const PACKAGE: &str = "0xa0eba10b173538c8fecca1dff298e488402cc9ff374f8a12ca7758eebe830b66";
}

pub mod kriya_v3 {
    pub const PACKAGE: &str = "0xbd8d4489782042c6fafad4de4bc6a5e0b84a43c6c00647ffd7062d1e2bb7549e";
    pub const VERSION: &str = "0xf5145a7ac345ca8736cf8c76047d00d6d378f30e81be6f6eb557184d9de93c78";
}

pub mod bluefin {
    pub const PACKAGE: &str = "0x6c796c3ab3421a68158e0df18e4657b2827b1f8fed5ed4b82dba9c935988711b";
    pub const GLOBAL_CONFIG: &str =
        "0x03db251ba509a8d5d8777b6338836082335d93eecbdd09a11e190a1cff51c352";
}

pub mod aftermath {
    pub const PACKAGE: &str = "0xc4049b2d1cc0f6e017fda8260e4377cecd236bd7f56a54fee120816e72e2e0dd";
    pub const POOL_REGISTRY: &str =
        "0xfcc774493db2c45c79f688f88d28023a3e7d98e4ee9f48bbf5c7990f651577ae";
    pub const PROTOCOL_FEE_VAULT: &str =
        "0xf194d9b1bcad972e45a7dd67dd49b3ee1e3357a00a50850c52cd51bb450e13b4";
    pub const TREASURY: &str = "0x28e499dff5e864a2eafe476269a4f5035f1c16f338da7be18b103499abf271ce";
    pub const INSURANCE_FUND: &str =
        "0xf0c40d67b078000e18032334c3325c47b9ec9f3d9ae4128be820d54663d14e3b";
    pub const REFERRAL_VAULT: &str =
        "0x35d35b0e5b177593d8c3a801462485572fc30861e6ce96a55af6dc4730709278";
    /// Allowed deviation from the expected output, 1e18 fixed point (1%)
    pub const ALLOWABLE_SLIPPAGE: u64 = 10_000_000_000_000_000;
}

pub mod deepbook {
    pub const PACKAGE: &str = "0x2c8d603bc51326b8c13cef9dd07031a408a48dddb541963357661df5d3204809";
    pub const DEEP_COIN_TYPE: &str =
        "0xdeeb7a4662eec9f2f3def03fb937a663dddaa2e215b8078a284d026b7946c270::deep::DEEP";
}

pub mod volo {
    pub const PACKAGE: &str = "0x549e8b69270defbfafd4f94e17ec44cdbdd99820b33bda2278dea3b9a32d3f55";
    pub const NATIVE_POOL: &str =
        "0x7fa2faa111b8c65bea48a23049bfd81ca8f971a262d981dcd9a17c3825cb5baf";
    pub const METADATA: &str = "0x680cd26af32b2bde8d3361e804c53ec1d1cfe24c7f039eb7f549e8dfde389a60";
    pub const CERT_COIN_TYPE: &str =
        "0x549e8b69270defbfafd4f94e17ec44cdbdd99820b33bda2278dea3b9a32d3f55::cert::CERT";
}

pub mod haedal {
    pub const PACKAGE: &str = "0x3f45767c1aa95b25422f675800f02d8a813ec793a00b60667d071a77ba7178a2";
    pub const STAKING: &str = "0x47b224762220393057ebf4f70501b6e657c3e56684737568439a04f80849b2ca";
    pub const HASUI_COIN_TYPE: &str =
        "0xbde4ba4c2e274a60ce15c1cfff9e5c42e41654ac8b6d906a57efa4bd3c29f47d::hasui::HASUI";
}

pub mod aftermath_lsd {
    pub const PACKAGE: &str = "0x7f6ce7ade63857c4fd16ef7783fed2dfc4d7fb7e40615abdb653030b76aef0c6";
    pub const STAKED_SUI_VAULT: &str =
        "0x2f8f6d5da7f13ea37daa397724280483ed062769813b6f31e9788e59cc88994d";
    pub const SAFE: &str = "0xeb685899830dd5837b47007809c76d91a098d52aabbf61e8ac467c59e5cc4610";
    pub const REFERRAL_VAULT: &str =
        "0x4ce9a19b594599536c53edb25d22532f82f18038dc8ef618afd00fbbfb9845ef";
    pub const TREASURY: &str = "0xd2b95022244757b0ab9f74e2ee2fb2c3bf29dce5590fa6993a85d64bd219d7e8";
    pub const VALIDATOR: &str = "0xd30018ec3f5ff1a3c75656abf927a87d7f0529e6dc89c7ddd1bd27ecb05e3db2";
    pub const AFSUI_COIN_TYPE: &str =
        "0xf325ce1300e8dac124071d3152c5c5ee6174914f8bc2161e88329cf579246efc::afsui::AFSUI";
}
