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

//! Read access to protocol contract state at the point in time an event is
//! being processed.
//!
//! Handlers consult this alongside event payloads: checkpoint rollups are
//! built from contract state, not from event arguments. [`FixedChainState`]
//! is the in-memory implementation used by tests and replay tooling.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainReadError {
    #[error("contract state unavailable: {0}")]
    Unavailable(String),
}

/// Protocol contract state as of the event being processed. All reads are
/// point-in-time: implementations must answer for the block the driver is
/// currently at, never for the head.
pub trait ChainStateReader {
    /// rETH/ETH exchange rate, in wei of ETH per 1e18 rETH.
    fn reth_exchange_rate(&self) -> Result<U256, ChainReadError>;
    /// Total ETH collateral backing rETH.
    fn reth_total_collateral(&self) -> Result<U256, ChainReadError>;
    /// ETH held by the deposit pool.
    fn deposit_pool_balance(&self) -> Result<U256, ChainReadError>;
    /// Deposit pool ETH above the target, not yet assigned to minipools.
    fn deposit_pool_excess_balance(&self) -> Result<U256, ChainReadError>;

    /// RPL/ETH price, in wei of ETH per 1e18 RPL.
    fn rpl_price(&self) -> Result<U256, ChainReadError>;
    /// Commission rate a minipool created right now would receive.
    fn node_fee(&self) -> Result<U256, ChainReadError>;
    /// Node-operator share of a full minipool deposit.
    fn half_deposit_amount(&self) -> Result<U256, ChainReadError>;
    /// Minimum RPL stake per minipool, as a ratio scaled by 1e18.
    fn minimum_per_minipool_stake(&self) -> Result<U256, ChainReadError>;
    /// Maximum RPL stake per minipool, as a ratio scaled by 1e18.
    fn maximum_per_minipool_stake(&self) -> Result<U256, ChainReadError>;

    fn node_rpl_stake(&self, node: Address) -> Result<U256, ChainReadError>;
    fn node_effective_rpl_stake(&self, node: Address) -> Result<U256, ChainReadError>;
    fn node_minimum_rpl_stake(&self, node: Address) -> Result<U256, ChainReadError>;
    fn node_maximum_rpl_stake(&self, node: Address) -> Result<U256, ChainReadError>;

    /// Start time of the current reward claim interval.
    fn claim_interval_start_time(&self) -> Result<u64, ChainReadError>;
    /// Nominal duration of a reward claim interval.
    fn claim_interval_duration(&self) -> Result<u64, ChainReadError>;
    /// Total RPL allocated to the current claim interval.
    fn claim_interval_rewards_total(&self) -> Result<U256, ChainReadError>;
    /// Whether the address is an oracle DAO (trusted node) member.
    fn is_oracle_node(&self, address: Address) -> Result<bool, ChainReadError>;
    /// Address of the protocol DAO claim contract.
    fn protocol_dao_claim_contract(&self) -> Result<Address, ChainReadError>;
}

/// Settable [`ChainStateReader`] with per-node stake maps. Tests mutate its
/// fields between events to simulate contract state moving.
#[derive(Debug, Clone, Default)]
pub struct FixedChainState {
    pub reth_exchange_rate: U256,
    pub reth_total_collateral: U256,
    pub deposit_pool_balance: U256,
    pub deposit_pool_excess_balance: U256,
    pub rpl_price: U256,
    pub node_fee: U256,
    pub half_deposit_amount: U256,
    pub minimum_per_minipool_stake: U256,
    pub maximum_per_minipool_stake: U256,
    pub node_rpl_stakes: HashMap<Address, U256>,
    pub node_effective_rpl_stakes: HashMap<Address, U256>,
    pub node_minimum_rpl_stakes: HashMap<Address, U256>,
    pub node_maximum_rpl_stakes: HashMap<Address, U256>,
    pub claim_interval_start_time: u64,
    pub claim_interval_duration: u64,
    pub claim_interval_rewards_total: U256,
    pub oracle_nodes: Vec<Address>,
    pub protocol_dao_claim_contract: Address,
}

impl FixedChainState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_node_rpl_stake(&mut self, node: Address, staked: U256, effective: U256) {
        self.node_rpl_stakes.insert(node, staked);
        self.node_effective_rpl_stakes.insert(node, effective);
    }

    pub fn set_node_rpl_bounds(&mut self, node: Address, minimum: U256, maximum: U256) {
        self.node_minimum_rpl_stakes.insert(node, minimum);
        self.node_maximum_rpl_stakes.insert(node, maximum);
    }
}

impl ChainStateReader for FixedChainState {
    fn reth_exchange_rate(&self) -> Result<U256, ChainReadError> {
        Ok(self.reth_exchange_rate)
    }

    fn reth_total_collateral(&self) -> Result<U256, ChainReadError> {
        Ok(self.reth_total_collateral)
    }

    fn deposit_pool_balance(&self) -> Result<U256, ChainReadError> {
        Ok(self.deposit_pool_balance)
    }

    fn deposit_pool_excess_balance(&self) -> Result<U256, ChainReadError> {
        Ok(self.deposit_pool_excess_balance)
    }

    fn rpl_price(&self) -> Result<U256, ChainReadError> {
        Ok(self.rpl_price)
    }

    fn node_fee(&self) -> Result<U256, ChainReadError> {
        Ok(self.node_fee)
    }

    fn half_deposit_amount(&self) -> Result<U256, ChainReadError> {
        Ok(self.half_deposit_amount)
    }

    fn minimum_per_minipool_stake(&self) -> Result<U256, ChainReadError> {
        Ok(self.minimum_per_minipool_stake)
    }

    fn maximum_per_minipool_stake(&self) -> Result<U256, ChainReadError> {
        Ok(self.maximum_per_minipool_stake)
    }

    fn node_rpl_stake(&self, node: Address) -> Result<U256, ChainReadError> {
        Ok(self.node_rpl_stakes.get(&node).copied().unwrap_or_default())
    }

    fn node_effective_rpl_stake(&self, node: Address) -> Result<U256, ChainReadError> {
        Ok(self.node_effective_rpl_stakes.get(&node).copied().unwrap_or_default())
    }

    fn node_minimum_rpl_stake(&self, node: Address) -> Result<U256, ChainReadError> {
        Ok(self.node_minimum_rpl_stakes.get(&node).copied().unwrap_or_default())
    }

    fn node_maximum_rpl_stake(&self, node: Address) -> Result<U256, ChainReadError> {
        Ok(self.node_maximum_rpl_stakes.get(&node).copied().unwrap_or_default())
    }

    fn claim_interval_start_time(&self) -> Result<u64, ChainReadError> {
        Ok(self.claim_interval_start_time)
    }

    fn claim_interval_duration(&self) -> Result<u64, ChainReadError> {
        Ok(self.claim_interval_duration)
    }

    fn claim_interval_rewards_total(&self) -> Result<U256, ChainReadError> {
        Ok(self.claim_interval_rewards_total)
    }

    fn is_oracle_node(&self, address: Address) -> Result<bool, ChainReadError> {
        Ok(self.oracle_nodes.contains(&address))
    }

    fn protocol_dao_claim_contract(&self) -> Result<Address, ChainReadError> {
        Ok(self.protocol_dao_claim_contract)
    }
}
