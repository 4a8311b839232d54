use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// A tracked asset. Each one is rendered as a planet on the page.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetId {
    Eth,
    Bsc,
    Arb,
    Base,
    Mult,
    Pol,
    Sol,
    Tron,
}

impl AssetId {
    /// Every tracked asset, in display order.
    pub const ALL: [AssetId; 8] = [
        AssetId::Eth,
        AssetId::Bsc,
        AssetId::Arb,
        AssetId::Base,
        AssetId::Mult,
        AssetId::Pol,
        AssetId::Sol,
        AssetId::Tron,
    ];

    /// The lowercase token used as cache, store and fallback key.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetId::Eth => "eth",
            AssetId::Bsc => "bsc",
            AssetId::Arb => "arb",
            AssetId::Base => "base",
            AssetId::Mult => "mult",
            AssetId::Pol => "pol",
            AssetId::Sol => "sol",
            AssetId::Tron => "tron",
        }
    }

    /// Coinranking coin uuid for this asset.
    pub fn coinranking_uuid(&self) -> &'static str {
        match self {
            AssetId::Eth => "razxDUgYGNAdQ",
            AssetId::Bsc => "WcwrkfNI4FUAe",
            AssetId::Arb => "1Uo6s62Oc",
            AssetId::Base => "aFCovYtljC",
            AssetId::Mult => "omwkOTglq",
            AssetId::Pol => "iDZ0tG-wI",
            AssetId::Sol => "zNZHO_Sjf",
            AssetId::Tron => "qUhEFk1I61atv",
        }
    }

    /// Case-folds a caller-supplied identifier.
    pub fn normalize(input: &str) -> String {
        input.trim().to_lowercase()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetId {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = Self::normalize(s);
        AssetId::ALL
            .into_iter()
            .find(|asset| asset.as_str() == normalized)
            .ok_or(MarketDataError::UnknownAsset(normalized))
    }
}
