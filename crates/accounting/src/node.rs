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

//! Node collateral bounds and minipool fee accounting.

use alloy_primitives::U256;

use crate::ONE_ETHER_IN_WEI;

/// RPL collateral a node operator needs for one minipool at the given
/// ETH-denominated collateral ratio and RPL price.
///
/// Returns zero when any input is zero: a missing price or ratio means no
/// bound is computable yet, and a zero price would otherwise divide by zero.
pub fn effective_rpl_bound(node_deposit_amount: U256, collateral_ratio: U256, rpl_price: U256) -> U256 {
    if node_deposit_amount.is_zero() || collateral_ratio.is_zero() || rpl_price.is_zero() {
        return U256::ZERO;
    }
    node_deposit_amount * collateral_ratio / rpl_price
}

/// Accumulates fees over a node's minipools, skipping inactive ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveMinipoolFee {
    total_fee: U256,
    active_count: U256,
}

impl ActiveMinipoolFee {
    /// Folds in one minipool. Finalized or destroyed minipools (nonzero
    /// finalized/destroyed time) never contribute.
    pub fn observe(&mut self, fee: U256, finalized_time: u64, destroyed_time: u64) {
        if finalized_time != 0 || destroyed_time != 0 {
            return;
        }
        self.active_count += U256::from(1);
        self.total_fee += fee;
    }

    /// Average fee over the active minipools, or zero when there are none.
    pub fn average(&self) -> U256 {
        if self.active_count.is_zero() || self.total_fee.is_zero() {
            return U256::ZERO;
        }
        self.total_fee / self.active_count
    }
}

/// Running totals needed to compute the network-level summaries of a node
/// balance checkpoint: the fee average across nodes with active minipools and
/// the grand-total minimum/maximum effective RPL.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinipoolMetadata {
    /// Sum of per-node average fees, in wei.
    pub total_average_fee: U256,
    /// Number of nodes contributing a nonzero average fee.
    pub nodes_with_active_minipools: U256,
    pub total_minimum_effective_rpl: U256,
    pub total_maximum_effective_rpl: U256,
}

impl MinipoolMetadata {
    /// Folds in one node's average fee and effective-RPL bounds.
    pub fn observe_node(
        &mut self,
        average_fee_for_active_minipools: U256,
        minimum_effective_rpl: U256,
        maximum_effective_rpl: U256,
    ) {
        if average_fee_for_active_minipools > U256::ZERO {
            self.total_average_fee += average_fee_for_active_minipools;
            self.nodes_with_active_minipools += U256::from(1);
        }
        self.total_minimum_effective_rpl += minimum_effective_rpl;
        self.total_maximum_effective_rpl += maximum_effective_rpl;
    }
}

/// Network-wide average minipool fee in wei, computed once after all nodes
/// have been folded into the metadata. Zero when no node has an active
/// minipool.
pub fn network_average_minipool_fee(metadata: &MinipoolMetadata) -> U256 {
    if metadata.nodes_with_active_minipools.is_zero() || metadata.total_average_fee.is_zero() {
        return U256::ZERO;
    }
    metadata.total_average_fee / metadata.nodes_with_active_minipools
}
