//! Engine configuration.
//!
//! One explicit [Config] is constructed at process start (from a YAML file or
//! [Config::default]) and passed by reference into the engine and its store;
//! nothing in this crate reads ambient global state.

use anyhow::Context;
use perch_types::{ResourceKind, Resources, DEFAULT_ADJUST_ATTEMPTS};
use serde::Deserialize;
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Resources and coins granted to a freshly created account.
    #[serde(default)]
    pub starting: StartingResources,
    /// Unit prices for shop purchases.
    #[serde(default)]
    pub shop: ShopConfig,
    #[serde(default)]
    pub wager: WagerConfig,
}

impl Config {
    /// Parse a YAML configuration document.
    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(contents).context("could not parse config")
    }

    /// Load and parse a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;
        Self::parse(&contents)
    }
}

/// Resources and coins granted to every freshly created account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartingResources {
    #[serde(default)]
    pub coins: u64,
    #[serde(default = "default_ram")]
    pub ram: u64,
    #[serde(default = "default_disk")]
    pub disk: u64,
    #[serde(default = "default_cpu")]
    pub cpu: u64,
    #[serde(default = "default_one")]
    pub allocations: u64,
    #[serde(default = "default_one")]
    pub databases: u64,
    #[serde(default = "default_one")]
    pub backups: u64,
    #[serde(default = "default_one")]
    pub slots: u64,
}

impl StartingResources {
    pub fn resources(&self) -> Resources {
        Resources {
            ram: self.ram,
            disk: self.disk,
            cpu: self.cpu,
            allocations: self.allocations,
            databases: self.databases,
            backups: self.backups,
            slots: self.slots,
        }
    }
}

impl Default for StartingResources {
    fn default() -> Self {
        Self {
            coins: 0,
            ram: default_ram(),
            disk: default_disk(),
            cpu: default_cpu(),
            allocations: default_one(),
            databases: default_one(),
            backups: default_one(),
            slots: default_one(),
        }
    }
}

/// Unit price in coins for each resource kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShopConfig {
    #[serde(default = "default_ram_price")]
    pub ram: u64,
    #[serde(default = "default_disk_price")]
    pub disk: u64,
    #[serde(default = "default_cpu_price")]
    pub cpu: u64,
    #[serde(default = "default_addon_price")]
    pub allocations: u64,
    #[serde(default = "default_addon_price")]
    pub databases: u64,
    #[serde(default = "default_addon_price")]
    pub backups: u64,
    #[serde(default = "default_slot_price")]
    pub slots: u64,
}

impl ShopConfig {
    /// Price per unit of a resource kind.
    pub fn price(&self, kind: ResourceKind) -> u64 {
        match kind {
            ResourceKind::Ram => self.ram,
            ResourceKind::Disk => self.disk,
            ResourceKind::Cpu => self.cpu,
            ResourceKind::Allocations => self.allocations,
            ResourceKind::Databases => self.databases,
            ResourceKind::Backups => self.backups,
            ResourceKind::Slots => self.slots,
        }
    }
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            ram: default_ram_price(),
            disk: default_disk_price(),
            cpu: default_cpu_price(),
            allocations: default_addon_price(),
            databases: default_addon_price(),
            backups: default_addon_price(),
            slots: default_slot_price(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WagerConfig {
    /// Compare-and-swap attempts before a settlement reports a conflict.
    #[serde(default = "default_adjust_attempts")]
    pub adjust_attempts: u32,
}

impl Default for WagerConfig {
    fn default() -> Self {
        Self {
            adjust_attempts: default_adjust_attempts(),
        }
    }
}

fn default_ram() -> u64 {
    1_024
}

fn default_disk() -> u64 {
    5_120
}

fn default_cpu() -> u64 {
    100
}

fn default_one() -> u64 {
    1
}

fn default_ram_price() -> u64 {
    10
}

fn default_disk_price() -> u64 {
    5
}

fn default_cpu_price() -> u64 {
    25
}

fn default_addon_price() -> u64 {
    50
}

fn default_slot_price() -> u64 {
    100
}

fn default_adjust_attempts() -> u32 {
    DEFAULT_ADJUST_ATTEMPTS
}
