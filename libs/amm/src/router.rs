//! Best-exchange selection
//!
//! When several hub exchanges list the same pair (USDx and USDT pools on the
//! same chain) each is quoted independently and the one that is better for
//! the trader receives the swap transaction.

use crate::error::{QuoteError, Result};
use crate::route::{compute_quote, Quote, SwapDirection, SwapRoute};
use ethers_core::types::U256;
use tracing::{debug, trace};

/// One route that can service the requested pair
#[derive(Debug, Clone)]
pub struct Candidate<K> {
    pub key: K,
    pub route: SwapRoute,
}

impl<K> Candidate<K> {
    pub fn new(key: K, route: SwapRoute) -> Self {
        Self { key, route }
    }
}

/// The winning candidate and its quote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<K> {
    pub key: K,
    /// Position of the winner among the candidates
    pub index: usize,
    pub quote: Quote,
}

impl<K> Selection<K> {
    pub fn dependent(&self) -> U256 {
        self.quote.dependent
    }
}

/// Quote every candidate and keep the best one.
pub fn select_best<K: Clone>(
    direction: SwapDirection,
    amount: U256,
    candidates: &[Candidate<K>],
) -> Result<Selection<K>> {
    pick_best(
        direction,
        candidates
            .iter()
            .map(|c| (c.key.clone(), compute_quote(&c.route, direction, amount))),
    )
}

/// Choose among already computed quotes.
///
/// Failed quotes count as unusable. ExactInput keeps the largest output,
/// ExactOutput the smallest required input; a tie keeps the earlier
/// candidate.
pub fn pick_best<K, I>(direction: SwapDirection, quotes: I) -> Result<Selection<K>>
where
    I: IntoIterator<Item = (K, Result<Quote>)>,
{
    let mut best: Option<Selection<K>> = None;

    for (index, (key, quote)) in quotes.into_iter().enumerate() {
        let quote = match quote {
            Ok(quote) if !quote.dependent.is_zero() => quote,
            Ok(_) => continue,
            Err(err) => {
                trace!(index, %err, "candidate unusable");
                continue;
            }
        };

        let better = match &best {
            None => true,
            Some(current) => match direction {
                SwapDirection::ExactInput => quote.dependent > current.quote.dependent,
                SwapDirection::ExactOutput => quote.dependent < current.quote.dependent,
            },
        };

        if better {
            best = Some(Selection { key, index, quote });
        }
    }

    match best {
        Some(selection) => {
            debug!(
                index = selection.index,
                dependent = %selection.quote.dependent,
                ?direction,
                "selected exchange"
            );
            Ok(selection)
        }
        None => Err(QuoteError::InsufficientLiquidity),
    }
}
