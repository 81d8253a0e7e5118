// Copyright 2025 Rocket Pool Indexer contributors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Staker balance accounting: ETH-denominated reward deltas under a moving
//! rETH exchange rate.

use alloy_primitives::{I256, U256};

use crate::{to_signed, ONE_ETHER_IN_WEI};

/// The current and previous (rETH, ETH) balance pair for one staker.
///
/// Until a staker has a balance checkpoint, the previous balances default to
/// the current ones, which makes the reward delta zero by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakerBalancePair {
    pub current_reth: U256,
    pub current_eth: U256,
    pub previous_reth: U256,
    pub previous_eth: U256,
}

impl StakerBalancePair {
    /// Builds the pair from the staker's current rETH balance, valued at the
    /// current exchange rate.
    pub fn new(current_reth: U256, current_exchange_rate: U256) -> Self {
        let current_eth = wei_value(current_reth, current_exchange_rate);
        Self { current_reth, current_eth, previous_reth: current_reth, previous_eth: current_eth }
    }

    /// Overrides the previous balances with the ones recorded on the staker's
    /// last balance checkpoint.
    pub fn with_previous(mut self, previous_reth: U256, previous_eth: U256) -> Self {
        self.previous_reth = previous_reth;
        self.previous_eth = previous_eth;
        self
    }
}

/// Values a token amount at a 1e18-scaled rate, truncating.
///
/// A zero rate means "no information yet" and values everything at zero.
pub fn wei_value(amount: U256, rate: U256) -> U256 {
    if amount.is_zero() || rate.is_zero() {
        return U256::ZERO;
    }
    amount * rate / ONE_ETHER_IN_WEI
}

/// Signed ETH rewards accrued by a staker since its previous balance
/// checkpoint, excluding principal moved in or out.
///
/// Three cases on the rETH balance:
/// - unchanged: the reward is the raw ETH value change;
/// - decreased: the ETH value that left is priced at the *previous* exchange
///   rate and removed from the baseline before comparing;
/// - increased: the received ETH value at the previous rate is removed from
///   the current balance, then the mark-to-market difference on the received
///   amount (current-rate value minus previous-rate value) is added back.
///
/// A zero previous rETH balance yields zero: there is no baseline to compare
/// against.
pub fn eth_rewards_since_checkpoint(balances: &StakerBalancePair, previous_exchange_rate: U256, current_exchange_rate: U256) -> I256 {
    if balances.previous_reth.is_zero() || balances.current_eth == balances.previous_eth {
        return I256::ZERO;
    }

    if balances.current_reth == balances.previous_reth {
        to_signed(balances.current_eth) - to_signed(balances.previous_eth)
    } else if balances.current_reth < balances.previous_reth {
        let removed_at_previous_rate =
            wei_value(balances.previous_reth - balances.current_reth, previous_exchange_rate);
        to_signed(balances.current_eth)
            - (to_signed(balances.previous_eth) - to_signed(removed_at_previous_rate))
    } else {
        let received = balances.current_reth - balances.previous_reth;
        let received_at_previous_rate = wei_value(received, previous_exchange_rate);
        let received_at_current_rate = wei_value(received, current_exchange_rate);

        // Everything excluding any rewards earned or value lost on the newly
        // received rETH since the last checkpoint.
        let base = to_signed(balances.current_eth)
            - to_signed(received_at_previous_rate)
            - to_signed(balances.previous_eth);

        // Mark-to-market on the received amount: positive if the rate rose,
        // negative if it fell.
        base + (to_signed(received_at_current_rate) - to_signed(received_at_previous_rate))
    }
}

/// Applies a balance change to a staker's rETH balance, clamping at zero on
/// decrease, and returns the new (rETH, ETH) balances at the given rate.
pub fn apply_balance_change(
    reth_balance: U256,
    amount: U256,
    exchange_rate: U256,
    increase: bool,
) -> (U256, U256) {
    let new_reth = if increase {
        reth_balance + amount
    } else if reth_balance >= amount {
        reth_balance - amount
    } else {
        // Can happen for the mint/burn counterparty of a transfer.
        U256::ZERO
    };
    (new_reth, wei_value(new_reth, exchange_rate))
}
