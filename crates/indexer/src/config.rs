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

use serde::{Deserialize, Serialize};

/// Indexer behavior toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Skip balance- and price-update events whose checkpoint id already
    /// exists. On by default so replaying a block range is idempotent; turn
    /// off only when the event source is known to deliver exactly once.
    pub enforce_checkpoint_dedup: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self { enforce_checkpoint_dedup: true }
    }
}
