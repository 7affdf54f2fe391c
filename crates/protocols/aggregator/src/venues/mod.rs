//! Venue Adapters
//!
//! Each adapter turns one [`Hop`] into the Move calls its venue needs. An
//! adapter receives the hop's input coin by value and must consume it: the
//! coin either disappears into the venue or comes back as a leftover.

mod aftermath;
mod bluefin;
mod cetus;
mod deepbook;
mod flash;
mod kriya;
mod staking;
mod turbos;

use std::collections::HashMap;

use navi_core::Address;
use sui_ptb::{Argument, Coin, TransactionBlock};

use crate::state::{AggregatorError, Hop, VenueKind};

pub use aftermath::AftermathAdapter;
pub use bluefin::BluefinAdapter;
pub use cetus::CetusAdapter;
pub use deepbook::DeepbookAdapter;
pub use kriya::{KriyaV2Adapter, KriyaV3Adapter};
pub use staking::{AfSuiAdapter, HaSuiAdapter, VSuiAdapter};
pub use turbos::TurbosAdapter;

/// Everything an adapter needs to emit one hop
pub struct HopRequest<'a> {
    pub hop: &'a Hop,
    /// Input coin, consumed by the adapter
    pub coin_in: Coin,
    /// `coin::value(&coin_in)` read just before the hop
    pub amount_in: Argument,
    /// Owner of the batch (venues that pay out to an address)
    pub recipient: &'a Address,
    /// Unix ms the batch is being built at
    pub now_ms: u64,
}

/// Coins a hop hands back
#[derive(Debug)]
pub struct HopOutput {
    pub coin_out: Coin,
    /// Unspent input, if the venue returns one
    pub leftover: Option<Coin>,
    /// Unspent fee-token coin (order-book venues)
    pub fee_coin: Option<Coin>,
}

impl HopOutput {
    pub fn new(coin_out: Coin) -> Self {
        Self {
            coin_out,
            leftover: None,
            fee_coin: None,
        }
    }

    pub fn with_leftover(coin_out: Coin, leftover: Coin) -> Self {
        Self {
            coin_out,
            leftover: Some(leftover),
            fee_coin: None,
        }
    }
}

/// Emits the Move calls for one venue
pub trait VenueAdapter: Send + Sync {
    fn kind(&self) -> VenueKind;

    /// Reject a hop this adapter could not emit. Runs before any command is
    /// appended, so `swap` may assume it passed.
    fn check(&self, hop: &Hop) -> Result<(), AggregatorError> {
        hop.check_pool_order(0)
    }

    /// Append the hop's commands to `tx`
    fn swap(
        &self,
        tx: &mut TransactionBlock,
        request: HopRequest<'_>,
    ) -> Result<HopOutput, AggregatorError>;
}

/// Adapters keyed by venue
pub type AdapterRegistry = HashMap<VenueKind, Box<dyn VenueAdapter>>;

/// Every mainnet adapter
pub fn mainnet_adapters() -> AdapterRegistry {
    let adapters: Vec<Box<dyn VenueAdapter>> = vec![
        Box::new(CetusAdapter::mainnet()),
        Box::new(TurbosAdapter::mainnet()),
        Box::new(KriyaV2Adapter::mainnet()),
        Box::new(KriyaV3Adapter::mainnet()),
        Box::new(AftermathAdapter::mainnet()),
        Box::new(DeepbookAdapter::mainnet()),
        Box::new(BluefinAdapter::mainnet()),
        Box::new(VSuiAdapter::mainnet()),
        Box::new(HaSuiAdapter::mainnet()),
        Box::new(AfSuiAdapter::mainnet()),
    ];
    adapters.into_iter().map(|a| (a.kind(), a)).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use navi_core::{CoinType, ObjectId};
    use sui_ptb::{Command, MoveCall, ProgrammableTransaction};

    pub(crate) fn usdc() -> CoinType {
        CoinType::new(
            "0xdba34672e30cb065b1f93e3ab55318768fd6fef66c15942c9f7cb846e2f900e7::usdc::USDC",
        )
    }

    pub(crate) fn hop(venue: VenueKind, a2b: bool) -> Hop {
        let (a, b) = (CoinType::sui(), usdc());
        let (from, target) = if a2b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        };
        let type_arguments = match venue {
            VenueKind::Turbos => vec![
                a,
                b,
                CoinType::new("0x91bfbc386a41afcfd9b2533058d7e915a1d3829089cc268ff4333d54d6339ca1::fee3000bps::FEE3000BPS"),
            ],
            VenueKind::Aftermath => vec![CoinType::new("0xaf::af_lp::AF_LP_SUI_USDC"), a, b],
            _ => vec![a, b],
        };
        Hop {
            venue,
            pool_id: ObjectId::new("0xb8d7d9e66a60c239e7a60110efcf8de6c705580ed924d0dde141f4a0e2c90105"),
            from,
            target,
            a2b,
            type_arguments,
            amount_in: 1_000_000_000,
            amount_out: 3_500_000,
            amount_limit: Some(3_400_000),
            lot_size: None,
        }
    }

    pub(crate) const NOW_MS: u64 = 1_700_000_000_000;

    /// Run one adapter against a fresh batch; leftovers go back to a test
    /// address so the batch finishes cleanly.
    pub(crate) fn run_adapter(
        adapter: &dyn VenueAdapter,
        hop: &Hop,
    ) -> Result<ProgrammableTransaction, AggregatorError> {
        let user = Address::new("0xa11ce");
        let mut tx = TransactionBlock::new();
        let coin_in = tx.split_coin(Argument::GasCoin, hop.amount_in, &hop.from);
        let amount_in = tx.coin_value(&coin_in);
        let output = adapter.swap(
            &mut tx,
            HopRequest {
                hop,
                coin_in,
                amount_in,
                recipient: &user,
                now_ms: NOW_MS,
            },
        )?;
        assert_eq!(output.coin_out.coin_type(), &hop.target);
        let mut coins = vec![output.coin_out];
        coins.extend(output.leftover);
        coins.extend(output.fee_coin);
        tx.transfer_coins(coins, &user);
        Ok(tx.finish()?)
    }

    pub(crate) fn move_calls(ptb: &ProgrammableTransaction) -> Vec<&MoveCall> {
        ptb.commands
            .iter()
            .filter_map(Command::as_move_call)
            .collect()
    }

    /// `module::function` of every move call outside `coin::value`
    pub(crate) fn call_sequence(ptb: &ProgrammableTransaction) -> Vec<String> {
        move_calls(ptb)
            .into_iter()
            .map(|c| format!("{}::{}", c.module, c.function))
            .filter(|t| t != "coin::value")
            .collect()
    }

    #[test]
    fn test_mainnet_registry_covers_every_venue() {
        let registry = mainnet_adapters();
        for kind in VenueKind::ALL {
            let adapter = registry.get(&kind).unwrap();
            assert_eq!(adapter.kind(), kind);
        }
    }

    #[test]
    fn test_every_adapter_consumes_its_input() {
        let registry = mainnet_adapters();
        for kind in VenueKind::ALL {
            if kind.is_liquid_staking() {
                continue;
            }
            for a2b in [true, false] {
                let h = hop(kind, a2b);
                let ptb = run_adapter(registry[&kind].as_ref(), &h)
                    .unwrap_or_else(|e| panic!("{} a2b={}: {}", kind, a2b, e));
                assert!(!ptb.commands.is_empty());
            }
        }
    }

    #[test]
    fn test_two_coin_pools_check_pool_order() {
        let registry = mainnet_adapters();
        for kind in VenueKind::ALL {
            if kind.is_liquid_staking() || kind == VenueKind::Aftermath {
                continue;
            }
            let adapter = registry[&kind].as_ref();
            for a2b in [true, false] {
                let mut h = hop(kind, a2b);
                assert!(adapter.check(&h).is_ok(), "{} a2b={}", kind, a2b);
                h.a2b = !a2b;
                assert!(
                    matches!(
                        adapter.check(&h),
                        Err(AggregatorError::HopDirectionMismatch { .. })
                    ),
                    "{} a2b={}",
                    kind,
                    a2b
                );
            }
        }
    }
}
