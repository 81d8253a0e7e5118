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

//! Accounting math for the Rocket Pool checkpoint and reward ledger.
//!
//! Everything in this crate is a pure function over `alloy` primitives:
//! staker reward deltas under a moving rETH exchange rate, node collateral
//! bounds and minipool fee averages, reward-claim classification, and dense
//! ranking. Callers own all entity state and persistence.

pub mod claims;
pub mod node;
pub mod rank;
pub mod staker;

pub use claims::{classify_reward_claimer, ClaimTally, RewardClaimerKind};

pub use node::{
    effective_rpl_bound, network_average_minipool_fee, ActiveMinipoolFee, MinipoolMetadata,
};

pub use staker::{apply_balance_change, eth_rewards_since_checkpoint, wei_value, StakerBalancePair};

pub use rank::dense_ranks;

use alloy_primitives::{I256, U256};

/// 1 ETH in wei, the fixed-point scale of every balance, rate, and price.
pub const ONE_ETHER_IN_WEI: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Converts an unsigned wei amount into the signed domain used for rewards.
///
/// Balances are bounded far below `I256::MAX` in practice; an out-of-range
/// value saturates rather than wrapping into a negative reward.
pub fn to_signed(value: U256) -> I256 {
    I256::try_from(value).unwrap_or(I256::MAX)
}
