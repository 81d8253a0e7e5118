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

//! Decoded protocol events and their on-chain provenance.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// On-chain provenance of one event. Each (transaction, log index) pair is
/// unique and anchors the event-rooted entity ids.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EventMeta {
    pub transaction_hash: B256,
    pub log_index: u64,
    pub block_number: u64,
    pub block_time: u64,
}

impl EventMeta {
    pub fn new(transaction_hash: B256, log_index: u64, block_number: u64, block_time: u64) -> Self {
        Self { transaction_hash, log_index, block_number, block_time }
    }

    /// Id for the entity rooted at this event.
    pub fn entity_id(&self) -> String {
        format!("{:#x}-{}", self.transaction_hash, self.log_index)
    }
}

/// A decoded protocol event, stripped down to the fields the handlers
/// consume. Fields the handlers re-read from contract state instead of
/// trusting the log payload are deliberately absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// ERC-20 transfer of rETH, mints and burns included via the zero
    /// address.
    RethTransfer { from: Address, to: Address, amount: U256 },
    /// Oracle network-balance submission; triggers a network staker balance
    /// checkpoint built entirely from contract state.
    BalancesUpdated,
    /// Oracle RPL price submission; triggers a network node balance
    /// checkpoint.
    PricesUpdated { rpl_price: U256 },

    NodeRegistered { node: Address },
    NodeSmoothingPoolChanged { node: Address, opted_in: bool },
    RplStaked { node: Address, amount: U256 },
    RplWithdrawn { node: Address, amount: U256 },
    RplSlashed { node: Address, amount: U256 },
    RplRewardsClaimed { claiming_address: Address, claiming_contract: Address, amount: U256 },

    MinipoolCreated { node: Address, minipool: Address },
    MinipoolEnteredStaking { minipool: Address },
    MinipoolMarkedWithdrawable { minipool: Address },
    MinipoolFinalized { minipool: Address },
    MinipoolDestroyed { minipool: Address },
    UnbondedValidatorAdded { node: Address },
    UnbondedValidatorRemoved { node: Address },
}
