//! Supported pool assets.
//!
//! The module serves a single exchange pool, so the supported set is the
//! pool's two currencies. Every ledger and escrow is keyed by [`Asset`];
//! cross-asset mixing is impossible at the type level.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two fungible assets of the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Asset {
    /// The pool's base currency.
    Base,
    /// The pool's quote currency.
    Quote,
}

impl Asset {
    /// All supported assets, in a fixed order.
    pub const ALL: [Asset; 2] = [Asset::Base, Asset::Quote];

    /// The other asset of the pair.
    pub fn other(self) -> Asset {
        match self {
            Asset::Base => Asset::Quote,
            Asset::Quote => Asset::Base,
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Base => write!(f, "base"),
            Asset::Quote => write!(f, "quote"),
        }
    }
}
