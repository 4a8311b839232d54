use serde::Serialize;

use crate::models::MarketRecord;

/// Outcome of consulting a single layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Lookup {
    Hit(MarketRecord),
    Miss,
}

impl Lookup {
    pub fn into_option(self) -> Option<MarketRecord> {
        match self {
            Lookup::Hit(record) => Some(record),
            Lookup::Miss => None,
        }
    }
}

impl From<Option<MarketRecord>> for Lookup {
    fn from(value: Option<MarketRecord>) -> Self {
        value.map_or(Lookup::Miss, Lookup::Hit)
    }
}

/// Which layer answered.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionSource {
    Cache,
    Store,
    Api,
    Fallback,
}

/// A resolved record together with the layer it came from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    pub record: MarketRecord,
    pub source: ResolutionSource,
}
