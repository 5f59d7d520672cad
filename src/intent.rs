//! Document intents and the policy that assigns one to each batch slot.

use std::fmt;
use std::str::FromStr;

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::template::ConfigError;

/// Category of generated document. Each intent has its own template bank and
/// data shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Résumé / candidate analysis.
    Curriculo,
    /// Disciplinary suspension notice.
    Suspensao,
    /// Financial or payroll report.
    Financeiro,
}

impl Intent {
    /// Every intent, in canonical order.
    pub const ALL: [Intent; 3] = [Intent::Curriculo, Intent::Suspensao, Intent::Financeiro];

    /// Stable identifier used in files, CLI flags and JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Curriculo => "curriculo",
            Self::Suspensao => "suspensao",
            Self::Financeiro => "financeiro",
        }
    }

    /// Human-readable Portuguese label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Curriculo => "análise de currículo",
            Self::Suspensao => "suspensão disciplinar",
            Self::Financeiro => "relatório financeiro",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "curriculo" | "currículo" | "curriculos" | "currículos" => Ok(Self::Curriculo),
            "suspensao" | "suspensão" => Ok(Self::Suspensao),
            "financeiro" => Ok(Self::Financeiro),
            other => Err(ConfigError::UnknownIntent(other.to_owned())),
        }
    }
}

/// How batch slots are mapped to intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntentMode {
    /// Every document uses the same intent.
    Fixed(Intent),
    /// Slot `i` uses `pool[i % pool.len()]`.
    #[default]
    RoundRobin,
    /// Each slot draws an intent uniformly from the pool.
    Random,
}

impl IntentMode {
    /// Intent for batch slot `index`, drawn from the enabled `pool`.
    ///
    /// Returns `None` when the pool is empty or a fixed intent is not enabled.
    pub fn pick<R: Rng + ?Sized>(self, index: usize, pool: &[Intent], rng: &mut R) -> Option<Intent> {
        match self {
            Self::Fixed(intent) => pool.contains(&intent).then_some(intent),
            Self::RoundRobin => index
                .checked_rem(pool.len())
                .and_then(|slot| pool.get(slot))
                .copied(),
            Self::Random => pool.choose(rng).copied(),
        }
    }
}

impl fmt::Display for IntentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(intent) => write!(f, "fixed({intent})"),
            Self::RoundRobin => f.write_str("round-robin"),
            Self::Random => f.write_str("random"),
        }
    }
}

impl FromStr for IntentMode {
    type Err = ConfigError;

    /// Accepts `round-robin`, `random`, or an intent name for a fixed batch.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "round-robin" | "roundrobin" | "round_robin" => Ok(Self::RoundRobin),
            "random" | "aleatorio" | "aleatório" => Ok(Self::Random),
            other => other.parse().map(Self::Fixed),
        }
    }
}
