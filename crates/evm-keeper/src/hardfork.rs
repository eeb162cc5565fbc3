use alloy_hardforks::{EthereumHardfork, ForkCondition, Hardfork};
use alloy_primitives::BlockNumber;
use auto_impl::auto_impl;
use serde::{Deserialize, Serialize};

/// Fork activation heights of an EVM chain, in the `camelCase` layout of the geth chain config.
///
/// A missing height means the fork never activates on this chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    /// `Homestead` switch block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homestead_block: Option<BlockNumber>,
    /// The DAO hard-fork switch block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dao_fork_block: Option<BlockNumber>,
    /// EIP-150 (`Tangerine Whistle`) switch block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eip150_block: Option<BlockNumber>,
    /// EIP-158 (`Spurious Dragon`) switch block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eip158_block: Option<BlockNumber>,
    /// `Byzantium` switch block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byzantium_block: Option<BlockNumber>,
    /// `Constantinople` switch block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constantinople_block: Option<BlockNumber>,
    /// `Petersburg` switch block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub petersburg_block: Option<BlockNumber>,
    /// `Istanbul` switch block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub istanbul_block: Option<BlockNumber>,
    /// `Berlin` switch block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub berlin_block: Option<BlockNumber>,
    /// `London` switch block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub london_block: Option<BlockNumber>,
}

impl Default for ChainConfig {
    /// Every supported fork is active from genesis.
    fn default() -> Self {
        Self {
            homestead_block: Some(0),
            dao_fork_block: Some(0),
            eip150_block: Some(0),
            eip158_block: Some(0),
            byzantium_block: Some(0),
            constantinople_block: Some(0),
            petersburg_block: Some(0),
            istanbul_block: Some(0),
            berlin_block: Some(0),
            london_block: Some(0),
        }
    }
}

impl ChainConfig {
    /// The configured forks in activation order, paired with their switch blocks.
    fn ordered_forks(&self) -> [(EthereumHardfork, Option<BlockNumber>); 10] {
        [
            (EthereumHardfork::Homestead, self.homestead_block),
            (EthereumHardfork::Dao, self.dao_fork_block),
            (EthereumHardfork::Tangerine, self.eip150_block),
            (EthereumHardfork::SpuriousDragon, self.eip158_block),
            (EthereumHardfork::Byzantium, self.byzantium_block),
            (EthereumHardfork::Constantinople, self.constantinople_block),
            (EthereumHardfork::Petersburg, self.petersburg_block),
            (EthereumHardfork::Istanbul, self.istanbul_block),
            (EthereumHardfork::Berlin, self.berlin_block),
            (EthereumHardfork::London, self.london_block),
        ]
    }

    /// Checks that the forks are scheduled in order.
    ///
    /// A fork may not activate before its predecessor, nor be enabled while its predecessor is
    /// disabled. The DAO fork is optional and does not take part in the ordering.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut last: Option<(EthereumHardfork, Option<BlockNumber>)> = None;
        for (fork, block) in self.ordered_forks() {
            if fork == EthereumHardfork::Dao {
                continue;
            }
            if let Some((prev, prev_block)) = last {
                match (prev_block, block) {
                    (None, Some(block)) => {
                        return Err(ConfigError::ForkNotEnabled {
                            fork: prev.name(),
                            next: fork.name(),
                            next_block: block,
                        })
                    }
                    (Some(prev_block), Some(block)) if block < prev_block => {
                        return Err(ConfigError::ForkOrder {
                            fork: prev.name(),
                            block: prev_block,
                            next: fork.name(),
                            next_block: block,
                        })
                    }
                    _ => {}
                }
            }
            last = Some((fork, block));
        }
        Ok(())
    }

    /// Builds the ordered hardfork lookup for this configuration.
    pub fn hardforks(&self) -> ChainHardforks {
        let mut hardforks = ChainHardforks::empty();
        hardforks.insert(EthereumHardfork::Frontier, ForkCondition::Block(0));
        for (fork, block) in self.ordered_forks() {
            hardforks.insert(fork, block.map_or(ForkCondition::Never, ForkCondition::Block));
        }
        hardforks
    }
}

/// Error type for an invalid [`ChainConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A fork is scheduled before its predecessor.
    #[error(
        "unsupported fork ordering: {fork} enabled at {block}, but {next} enabled at {next_block}"
    )]
    ForkOrder {
        /// The earlier fork.
        fork: &'static str,
        /// Switch block of the earlier fork.
        block: BlockNumber,
        /// The later fork.
        next: &'static str,
        /// Switch block of the later fork.
        next_block: BlockNumber,
    },
    /// A fork is enabled while its predecessor is disabled.
    #[error("unsupported fork ordering: {fork} not enabled, but {next} enabled at {next_block}")]
    ForkNotEnabled {
        /// The disabled fork.
        fork: &'static str,
        /// The enabled later fork.
        next: &'static str,
        /// Switch block of the later fork.
        next_block: BlockNumber,
    },
}

/// Access to the activation conditions of the Ethereum hardforks of a chain.
#[auto_impl(&, Box, Arc)]
pub trait EvmHardforks {
    /// Retrieves the [`ForkCondition`] of a hardfork. If `fork` is not present, returns
    /// [`ForkCondition::Never`].
    fn fork_activation(&self, fork: EthereumHardfork) -> ForkCondition;

    /// Returns `true` if `fork` is active at the given block.
    fn is_fork_active_at_block(&self, fork: EthereumHardfork, block: BlockNumber) -> bool {
        self.fork_activation(fork).active_at_block(block)
    }

    /// Returns `true` if [`EthereumHardfork::Homestead`] is active at the given block.
    fn is_homestead_active_at_block(&self, block: BlockNumber) -> bool {
        self.is_fork_active_at_block(EthereumHardfork::Homestead, block)
    }

    /// Returns `true` if [`EthereumHardfork::Istanbul`] is active at the given block.
    fn is_istanbul_active_at_block(&self, block: BlockNumber) -> bool {
        self.is_fork_active_at_block(EthereumHardfork::Istanbul, block)
    }

    /// Returns `true` if [`EthereumHardfork::Berlin`] is active at the given block.
    fn is_berlin_active_at_block(&self, block: BlockNumber) -> bool {
        self.is_fork_active_at_block(EthereumHardfork::Berlin, block)
    }
}

/// Ordered lookup from hardfork to its activation condition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainHardforks {
    forks: Vec<(EthereumHardfork, ForkCondition)>,
}

impl ChainHardforks {
    /// Creates a lookup without any hardfork.
    pub const fn empty() -> Self {
        Self { forks: Vec::new() }
    }

    /// Inserts a hardfork. An already present hardfork keeps its position and gets the new
    /// condition, otherwise the hardfork is appended.
    pub fn insert(&mut self, fork: EthereumHardfork, condition: ForkCondition) {
        match self.forks.iter_mut().find(|(f, _)| *f == fork) {
            Some((_, existing)) => *existing = condition,
            None => self.forks.push((fork, condition)),
        }
    }

    /// Iterates over the hardforks in activation order.
    pub fn iter(&self) -> impl Iterator<Item = &(EthereumHardfork, ForkCondition)> {
        self.forks.iter()
    }

    /// Returns the latest hardfork in the lookup that is active at `block`.
    pub fn latest_active_at_block(&self, block: BlockNumber) -> Option<EthereumHardfork> {
        self.forks
            .iter()
            .rev()
            .find(|(_, condition)| condition.active_at_block(block))
            .map(|(fork, _)| *fork)
    }
}

impl EvmHardforks for ChainHardforks {
    fn fork_activation(&self, fork: EthereumHardfork) -> ForkCondition {
        self.forks
            .iter()
            .find(|(f, _)| *f == fork)
            .map_or(ForkCondition::Never, |(_, condition)| *condition)
    }
}
