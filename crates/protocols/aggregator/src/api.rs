//! Quote service wire format
//!
//! DTOs for the `find_routes` response. Amounts arrive as strings or numbers.
//! Conversion into [`Quote`] rejects unknown providers instead of dropping
//! the hop, so a quote either decodes completely or not at all.

use serde::Deserialize;

use navi_core::serde_helpers::{opt_u64_from_str_or_num, u64_from_str_or_num};
use navi_core::{CoinType, ObjectId};

use crate::state::{AggregatorError, Hop, Path, Quote, VenueKind};

/// Top-level envelope
#[derive(Debug, Deserialize)]
pub struct QuoteEnvelope {
    pub data: Option<QuoteDto>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteDto {
    pub from: String,
    pub target: String,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub amount_in: u64,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub amount_out: u64,
    #[serde(default)]
    pub routes: Vec<RouteDto>,
}

#[derive(Debug, Deserialize)]
pub struct RouteDto {
    #[serde(default)]
    pub path: Vec<HopDto>,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub amount_in: u64,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub amount_out: u64,
}

#[derive(Debug, Deserialize)]
pub struct HopDto {
    /// Pool object id
    pub id: String,
    pub provider: String,
    pub from: String,
    pub target: String,
    pub a2b: bool,
    #[serde(default, deserialize_with = "opt_u64_from_str_or_num")]
    pub amount_in: Option<u64>,
    #[serde(default, deserialize_with = "opt_u64_from_str_or_num")]
    pub amount_out: Option<u64>,
    #[serde(default)]
    pub info_for_ptb: PtbInfoDto,
}

/// Venue extras needed to emit the hop
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PtbInfoDto {
    #[serde(default)]
    pub type_arguments: Vec<String>,
    #[serde(default, deserialize_with = "opt_u64_from_str_or_num")]
    pub amount_limit: Option<u64>,
    #[serde(default, deserialize_with = "opt_u64_from_str_or_num")]
    pub lot_size: Option<u64>,
}

impl HopDto {
    fn into_hop(self, path_amount_in: u64) -> Result<Hop, AggregatorError> {
        let venue: VenueKind = self.provider.parse()?;
        let pool_id = ObjectId::parse(&self.id).map_err(|_| {
            AggregatorError::InvalidResponse(format!("bad pool id {}", self.id))
        })?;
        let from = CoinType::new(&self.from);
        let target = CoinType::new(&self.target);

        // Without explicit type arguments the pool pair is (from, target) in
        // pool order.
        let type_arguments = if self.info_for_ptb.type_arguments.is_empty() {
            if self.a2b {
                vec![from.clone(), target.clone()]
            } else {
                vec![target.clone(), from.clone()]
            }
        } else {
            self.info_for_ptb
                .type_arguments
                .iter()
                .map(CoinType::new)
                .collect()
        };

        Ok(Hop {
            venue,
            pool_id,
            from,
            target,
            a2b: self.a2b,
            type_arguments,
            amount_in: self.amount_in.unwrap_or(path_amount_in),
            amount_out: self.amount_out.unwrap_or(0),
            amount_limit: self.info_for_ptb.amount_limit,
            lot_size: self.info_for_ptb.lot_size,
        })
    }
}

impl TryFrom<QuoteDto> for Quote {
    type Error = AggregatorError;

    fn try_from(dto: QuoteDto) -> Result<Self, Self::Error> {
        let paths = dto
            .routes
            .into_iter()
            .map(|route| {
                let amount_in = route.amount_in;
                let hops = route
                    .path
                    .into_iter()
                    .map(|hop| hop.into_hop(amount_in))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Path {
                    hops,
                    amount_in,
                    amount_out: route.amount_out,
                })
            })
            .collect::<Result<Vec<_>, AggregatorError>>()?;

        Ok(Quote {
            from: CoinType::new(&dto.from),
            target: CoinType::new(&dto.target),
            amount_in: dto.amount_in,
            amount_out: dto.amount_out,
            paths,
        })
    }
}

impl QuoteEnvelope {
    /// Decode the envelope into a validated quote
    pub fn into_quote(self) -> Result<Quote, AggregatorError> {
        let dto = self.data.ok_or_else(|| {
            AggregatorError::InvalidResponse(
                self.message
                    .unwrap_or_else(|| "response carries no data".to_string()),
            )
        })?;
        let quote = Quote::try_from(dto)?;
        quote.validate()?;
        Ok(quote)
    }
}
