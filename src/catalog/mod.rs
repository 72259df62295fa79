// TPC-DS query catalog
// Query texts are embedded at compile time, one tier per dataset scale range

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest scale (in GB) still served by the v2.4 query texts.
pub const TIER_A_MAX_SCALE_GB: u32 = 3000;

/// The 24 TPC-DS tables
pub const TPCDS_TABLES: &[&str] = &[
    "call_center",
    "catalog_page",
    "catalog_returns",
    "catalog_sales",
    "customer",
    "customer_address",
    "customer_demographics",
    "date_dim",
    "household_demographics",
    "income_band",
    "inventory",
    "item",
    "promotion",
    "reason",
    "ship_mode",
    "store",
    "store_returns",
    "store_sales",
    "time_dim",
    "warehouse",
    "web_page",
    "web_returns",
    "web_sales",
    "web_site",
];

macro_rules! tpcds_queries {
    ($tier:literal: $($name:ident),+ $(,)?) => {
        &[$((
            stringify!($name),
            include_str!(concat!("queries/", $tier, "/", stringify!($name), ".sql")),
        )),+]
    };
}

const TIER_A_QUERIES: &[(&str, &str)] = tpcds_queries!("tier_a":
    q3, q7, q19, q39a, q39b, q42, q43, q52, q55, q96, q98,
);

// Qualification parameters that differ at SF10000; everything else is shared
const TIER_B_OVERRIDES: &[(&str, &str)] = tpcds_queries!("tier_b":
    q19, q42, q52, q55, q96,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogTier {
    /// TPC-DS v2.4 queries, scale <= 3000 GB
    V2_4,
    /// TPC-DS v2.4 queries with SF10000 substitutions, scale > 3000 GB
    V2_4Sf10000,
}

impl CatalogTier {
    pub fn for_scale(scale_in_gb: u32) -> Self {
        if scale_in_gb <= TIER_A_MAX_SCALE_GB {
            CatalogTier::V2_4
        } else {
            CatalogTier::V2_4Sf10000
        }
    }
}

impl fmt::Display for CatalogTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogTier::V2_4 => write!(f, "tpcds-v2.4"),
            CatalogTier::V2_4Sf10000 => write!(f, "tpcds-v2.4-sf10000"),
        }
    }
}

/// Query name to SQL text, iterated in ascending name order.
#[derive(Debug, Clone)]
pub struct QueryCatalog {
    tier: CatalogTier,
    queries: BTreeMap<&'static str, &'static str>,
}

impl QueryCatalog {
    pub fn for_tier(tier: CatalogTier) -> Self {
        let mut queries: BTreeMap<_, _> = TIER_A_QUERIES.iter().copied().collect();
        if tier == CatalogTier::V2_4Sf10000 {
            queries.extend(TIER_B_OVERRIDES.iter().copied());
        }

        Self { tier, queries }
    }

    pub fn tier(&self) -> CatalogTier {
        self.tier
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&'static str> {
        self.queries.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.queries.keys().copied()
    }

    /// Entries in ascending lexical name order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.queries.iter().map(|(name, sql)| (*name, *sql))
    }
}

/// Pick the query catalog for a dataset scale.
pub fn select_catalog(scale_in_gb: u32) -> QueryCatalog {
    QueryCatalog::for_tier(CatalogTier::for_scale(scale_in_gb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use datafusion::sql::parser::DFParser;
    use datafusion::sql::sqlparser::dialect::GenericDialect;

    #[test]
    fn test_tier_boundary() {
        assert_eq!(select_catalog(1).tier(), CatalogTier::V2_4);
        assert_eq!(select_catalog(3000).tier(), CatalogTier::V2_4);
        assert_eq!(select_catalog(3001).tier(), CatalogTier::V2_4Sf10000);
        assert_eq!(select_catalog(10000).tier(), CatalogTier::V2_4Sf10000);
    }

    #[test]
    fn test_tiers_share_query_names() {
        let a = select_catalog(100);
        let b = select_catalog(10000);
        assert_eq!(a.names().collect::<Vec<_>>(), b.names().collect::<Vec<_>>());
        assert_eq!(a.get("q3"), b.get("q3"));
        assert_ne!(a.get("q42"), b.get("q42"));
    }

    #[test]
    fn test_iteration_is_lexically_sorted() {
        let names: Vec<_> = select_catalog(1).names().collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        // Lexical, not numeric
        assert_eq!(names.first(), Some(&"q19"));
    }

    #[test]
    fn test_every_query_parses() {
        for tier in [CatalogTier::V2_4, CatalogTier::V2_4Sf10000] {
            for (name, sql) in QueryCatalog::for_tier(tier).iter() {
                let statements = DFParser::parse_sql_with_dialect(sql, &GenericDialect {})
                    .unwrap_or_else(|e| panic!("{} {} failed to parse: {:?}", tier, name, e));
                assert_eq!(statements.len(), 1, "{} {}", tier, name);
            }
        }
    }
}
