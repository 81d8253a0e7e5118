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

//! Incremental checkpoint and reward-accounting indexer for a liquid-staking
//! protocol.
//!
//! Decoded protocol events flow through an [`Indexer`] in on-chain order.
//! Each event mutates a derived entity model held behind an [`EntityStore`]:
//! staker and node balances, doubly linked checkpoint chains, reward claim
//! intervals, and dense participant rankings. Contract state needed beyond
//! the event payload is read through a [`ChainStateReader`] at the event's
//! point in time.

pub mod chain;
pub mod config;
pub mod entity;
pub mod events;
pub mod handlers;
pub mod indexer;
pub mod rollup;
pub mod store;

pub use chain::{ChainReadError, ChainStateReader, FixedChainState};
pub use config::IndexerConfig;
pub use events::{Event, EventMeta};
pub use indexer::Indexer;
pub use store::{EntityStore, MemoryStore};
