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

//! Daily rollup over the staker checkpoint chain.
//!
//! Checkpoints land whenever the oracle submits balances, not on day
//! boundaries. The rollup walks the chain in order and emits one snapshot
//! per UTC day, linearly interpolating the reward total at each midnight
//! between the checkpoints that straddle it.

use alloy_primitives::{I256, U256};
use chrono::{DateTime, NaiveDate, Utc};
use rocketpool_accounting::to_signed;

use crate::store::EntityStore;

const SECONDS_PER_DAY: u64 = 86_400;

/// Staker reward state at the end of one UTC day. The last snapshot covers
/// the still-open day of the newest checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyStakerSnapshot {
    pub date: NaiveDate,
    pub total_staker_eth_rewards: I256,
    pub stakers_with_eth_rewards: u64,
    pub reth_exchange_rate: U256,
}

/// Rolls the full network staker checkpoint chain up into per-day snapshots.
/// Returns an empty vector until at least one checkpoint exists.
pub fn daily_staker_snapshots<S: EntityStore>(store: &S) -> Vec<DailyStakerSnapshot> {
    let Some(protocol) = store.load_protocol() else {
        return Vec::new();
    };

    // Newest to oldest via the back links, then reversed into chain order.
    let mut chain = Vec::new();
    let mut cursor = protocol.last_network_staker_balance_checkpoint;
    while let Some(id) = cursor {
        let Some(checkpoint) = store.load_network_staker_balance_checkpoint(&id) else {
            break;
        };
        cursor = checkpoint.previous_checkpoint_id.clone();
        chain.push(checkpoint);
    }
    chain.reverse();

    let mut snapshots = Vec::new();
    for pair in chain.windows(2) {
        let (earlier, later) = (&pair[0], &pair[1]);
        if later.block_time <= earlier.block_time {
            continue;
        }
        let span = later.block_time - earlier.block_time;
        let delta = later.total_staker_eth_rewards - earlier.total_staker_eth_rewards;

        let mut boundary = next_midnight(earlier.block_time);
        while boundary <= later.block_time {
            let elapsed = boundary - earlier.block_time;
            let interpolated = earlier.total_staker_eth_rewards
                + delta * to_signed(U256::from(elapsed)) / to_signed(U256::from(span));
            snapshots.push(DailyStakerSnapshot {
                // The day that ends at this midnight.
                date: utc_date(boundary - 1),
                total_staker_eth_rewards: interpolated,
                stakers_with_eth_rewards: earlier.stakers_with_eth_rewards,
                reth_exchange_rate: earlier.reth_exchange_rate,
            });
            boundary += SECONDS_PER_DAY;
        }
    }

    if let Some(last) = chain.last() {
        let date = utc_date(last.block_time);
        if snapshots.last().map(|snapshot| snapshot.date) != Some(date) {
            snapshots.push(DailyStakerSnapshot {
                date,
                total_staker_eth_rewards: last.total_staker_eth_rewards,
                stakers_with_eth_rewards: last.stakers_with_eth_rewards,
                reth_exchange_rate: last.reth_exchange_rate,
            });
        }
    }
    snapshots
}

fn utc_date(timestamp: u64) -> NaiveDate {
    DateTime::<Utc>::from_timestamp(timestamp as i64, 0)
        .map(|moment| moment.date_naive())
        .unwrap_or_default()
}

fn next_midnight(timestamp: u64) -> u64 {
    timestamp - timestamp % SECONDS_PER_DAY + SECONDS_PER_DAY
}
