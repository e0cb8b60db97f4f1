//! Fixed set of search queries: every restaurant shard crossed with every
//! restaurant category, then the administrative categories on the single
//! nationwide shard.

use crate::config::Config;

/// Geo-center of one search shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoCenter {
    pub latitude: &'static str,
    pub longitude: &'static str,
    pub radius: &'static str,
}

impl GeoCenter {
    const fn from_tuple(t: (&'static str, &'static str, &'static str)) -> Self {
        Self {
            latitude: t.0,
            longitude: t.1,
            radius: t.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shard {
    Restaurant(GeoCenter),
    Administrative(GeoCenter),
}

impl Shard {
    pub fn center(&self) -> &GeoCenter {
        match self {
            Shard::Restaurant(c) | Shard::Administrative(c) => c,
        }
    }
}

/// One search request: a shard plus a job-category code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuerySpec {
    pub shard: Shard,
    pub category: &'static str,
}

impl QuerySpec {
    /// Form parameters as the search endpoint expects them.
    pub fn form_params(&self) -> [(&'static str, &'static str); 4] {
        let center = self.shard.center();
        [
            ("latitude", center.latitude),
            ("longitude", center.longitude),
            ("radius", center.radius),
            ("pos", self.category),
        ]
    }
}

impl std::fmt::Display for QuerySpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.shard {
            Shard::Restaurant(_) => "restaurant",
            Shard::Administrative(_) => "administrative",
        };
        let c = self.shard.center();
        write!(
            f,
            "{} {} @ ({}, {}) r={}",
            kind, self.category, c.latitude, c.longitude, c.radius
        )
    }
}

pub fn generate_queries() -> Vec<QuerySpec> {
    let mut queries = Vec::with_capacity(
        Config::RESTAURANT_SHARDS.len() * Config::RESTAURANT_CATEGORIES.len()
            + Config::ADMINISTRATIVE_CATEGORIES.len(),
    );

    for shard in Config::RESTAURANT_SHARDS {
        let center = GeoCenter::from_tuple(shard);
        for category in Config::RESTAURANT_CATEGORIES {
            queries.push(QuerySpec {
                shard: Shard::Restaurant(center),
                category,
            });
        }
    }

    let admin = GeoCenter::from_tuple(Config::ADMINISTRATIVE_SHARD);
    for category in Config::ADMINISTRATIVE_CATEGORIES {
        queries.push(QuerySpec {
            shard: Shard::Administrative(admin),
            category,
        });
    }

    queries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_query_count() {
        assert_eq!(generate_queries().len(), 17 * 5 + 3);
    }

    #[test]
    fn test_queries_are_deterministic_and_distinct() {
        let a = generate_queries();
        let b = generate_queries();
        assert_eq!(a, b);

        let distinct: HashSet<_> = a.iter().map(|q| q.form_params()).collect();
        assert_eq!(distinct.len(), a.len());
    }

    #[test]
    fn test_order_restaurant_first_then_administrative() {
        let queries = generate_queries();

        let first = queries[0];
        assert!(matches!(first.shard, Shard::Restaurant(_)));
        assert_eq!(first.category, "INT_REST_EMP");
        assert_eq!(queries[1].category, "MINIJOB");
        assert_eq!(queries[1].shard, first.shard);
        assert_ne!(queries[5].shard, first.shard);

        let tail: Vec<_> = queries[85..].iter().map(|q| q.category).collect();
        assert_eq!(tail, vec!["INT_VW_BE", "INT_VW_AZDS", "INT_VW_PRWS"]);
        assert!(queries[85..]
            .iter()
            .all(|q| matches!(q.shard, Shard::Administrative(_))));
    }

    #[test]
    fn test_form_params() {
        let admin = generate_queries().pop().unwrap();
        assert_eq!(
            admin.form_params(),
            [
                ("latitude", "50.664954"),
                ("longitude", "10.96041"),
                ("radius", "350"),
                ("pos", "INT_VW_PRWS"),
            ]
        );
    }
}
