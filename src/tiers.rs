// src/tiers.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Hosting plan sold through the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Tier {
    Limited,
    Unlimited,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ResourceLimits {
    /// MB
    pub memory: i64,
    /// MB
    pub swap: i64,
    /// MB
    pub disk: i64,
    pub io: i64,
    /// percent of one core
    pub cpu: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct FeatureLimits {
    pub databases: i64,
    pub allocations: i64,
    pub backups: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TierInfo {
    pub plan: Tier,
    pub price: f64,
    pub limits: ResourceLimits,
    pub feature_limits: FeatureLimits,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown plan: {0}")]
pub struct UnknownTier(pub String);

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Limited, Tier::Unlimited, Tier::Admin];

    /// Price in KES.
    pub fn price(self) -> f64 {
        match self {
            Tier::Limited => 50.0,
            Tier::Unlimited => 100.0,
            Tier::Admin => 200.0,
        }
    }

    pub fn limits(self) -> ResourceLimits {
        match self {
            Tier::Limited => ResourceLimits {
                memory: 2048,
                swap: 0,
                disk: 10240,
                io: 500,
                cpu: 100,
            },
            Tier::Unlimited => ResourceLimits {
                memory: 4096,
                swap: 0,
                disk: 20480,
                io: 500,
                cpu: 200,
            },
            Tier::Admin => ResourceLimits {
                memory: 8192,
                swap: 0,
                disk: 51200,
                io: 1000,
                cpu: 400,
            },
        }
    }

    pub fn feature_limits(self) -> FeatureLimits {
        match self {
            Tier::Limited => FeatureLimits {
                databases: 1,
                allocations: 1,
                backups: 1,
            },
            Tier::Unlimited => FeatureLimits {
                databases: 2,
                allocations: 2,
                backups: 2,
            },
            Tier::Admin => FeatureLimits {
                databases: 5,
                allocations: 5,
                backups: 5,
            },
        }
    }

    pub fn info(self) -> TierInfo {
        TierInfo {
            plan: self,
            price: self.price(),
            limits: self.limits(),
            feature_limits: self.feature_limits(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tier::Limited => "Limited",
            Tier::Unlimited => "Unlimited",
            Tier::Admin => "Admin",
        }
    }

    /// Tag written into the panel server description so the plan can be read back.
    pub fn description_tag(self) -> String {
        format!("WolfHost {} plan", self.name())
    }

    pub fn from_description(description: &str) -> Option<Tier> {
        let rest = description.split("WolfHost ").nth(1)?;
        let name = rest.split_whitespace().next()?;
        name.parse().ok()
    }

    /// Guesses the plan from raw limits for servers created before plan tags existed.
    /// `0` means unlimited on the panel.
    pub fn infer_from_limits(memory: i64, cpu: i64) -> Tier {
        if memory == 0 || cpu == 0 || memory >= 8192 || cpu >= 400 {
            Tier::Admin
        } else if memory >= 4096 || cpu >= 200 {
            Tier::Unlimited
        } else {
            Tier::Limited
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTier(s.to_string()))
    }
}
