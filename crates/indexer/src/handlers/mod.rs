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

//! Per-event-family handler implementations on [`crate::Indexer`].
//!
//! Handlers share a common shape: dedup check first, guard clauses that
//! return `Ok(())` for events touching unknown participants, contract reads
//! through `?`, then entity saves.

mod minipools;
mod nodes;
mod prices;
mod rewards;
mod stakers;
