//! Query interface over a harvested proxy pool
//!
//! [`ProxyQuery`] wraps an ordered collection of proxies and offers a
//! closed set of read-only combinators: every call returns a new query
//! (or a scalar) and leaves the receiver untouched. The two documented
//! exceptions are the `+=` accumulate operator used while a pipeline
//! run merges provider results, and [`ProxyQuery::check_health`], which
//! flips per-proxy probe flags without touching the sequence itself.

use crate::error::ConfigError;
use crate::proxy::checker::ProxyChecker;
use crate::proxy::models::Proxy;
use crate::Result;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Index};
use std::slice::SliceIndex;
use std::str::FromStr;

/// Sortable fields of a [`Proxy`], parsed from their snake_case names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyField {
    Host,
    Port,
    CountryCode,
    Country,
    Anonymity,
    Google,
    Https,
    LastChecked,
    Verified,
    Working,
}

impl FromStr for ProxyField {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "host" => Ok(Self::Host),
            "port" => Ok(Self::Port),
            "country_code" => Ok(Self::CountryCode),
            "country" => Ok(Self::Country),
            "anonymity" => Ok(Self::Anonymity),
            "google" => Ok(Self::Google),
            "https" => Ok(Self::Https),
            "last_checked" => Ok(Self::LastChecked),
            "verified" => Ok(Self::Verified),
            "working" => Ok(Self::Working),
            _ => Err(ConfigError::UnknownField(s.to_string())),
        }
    }
}

impl ProxyField {
    fn compare(self, a: &Proxy, b: &Proxy) -> Ordering {
        match self {
            Self::Host => a.host.cmp(&b.host),
            Self::Port => a.port.cmp(&b.port),
            Self::CountryCode => a.country_code.cmp(&b.country_code),
            Self::Country => a.country.cmp(&b.country),
            Self::Anonymity => a.anonymity.cmp(&b.anonymity),
            Self::Google => a.google.cmp(&b.google),
            Self::Https => a.https.cmp(&b.https),
            Self::LastChecked => a.last_checked.cmp(&b.last_checked),
            Self::Verified => a.verified().cmp(&b.verified()),
            Self::Working => a.working().cmp(&b.working()),
        }
    }
}

/// A field predicate matching either one value or any of a set.
#[derive(Debug, Clone)]
pub enum FieldMatch<T> {
    One(T),
    Any(Vec<T>),
}

impl<T: PartialEq> FieldMatch<T> {
    fn matches(&self, value: &T) -> bool {
        match self {
            FieldMatch::One(expected) => expected == value,
            FieldMatch::Any(expected) => expected.contains(value),
        }
    }
}

impl<T> From<T> for FieldMatch<T> {
    fn from(value: T) -> Self {
        Self::One(value)
    }
}

impl<T> From<Vec<T>> for FieldMatch<T> {
    fn from(values: Vec<T>) -> Self {
        Self::Any(values)
    }
}

impl From<&str> for FieldMatch<String> {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<Vec<&str>> for FieldMatch<String> {
    fn from(values: Vec<&str>) -> Self {
        Self::Any(values.into_iter().map(String::from).collect())
    }
}

type CustomPredicate = Box<dyn Fn(&Proxy) -> bool + Send + Sync>;

/// Conjunction of field predicates for [`ProxyQuery::filter`].
///
/// Only the fields that were set participate; an empty filter matches
/// everything. Scalar-or-set fields take anything convertible into a
/// [`FieldMatch`], so both `.port(8080)` and `.port(vec![80, 8080])`
/// read naturally.
#[derive(Default)]
pub struct ProxyFilter {
    host: Option<String>,
    port: Option<FieldMatch<u16>>,
    country_code: Option<FieldMatch<String>>,
    country: Option<FieldMatch<String>>,
    anonymity: Option<FieldMatch<String>>,
    google: Option<bool>,
    https: Option<bool>,
    verified: Option<bool>,
    working: Option<bool>,
    last_checked: Option<FieldMatch<String>>,
    custom: Vec<CustomPredicate>,
}

impl ProxyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: impl Into<FieldMatch<u16>>) -> Self {
        self.port = Some(port.into());
        self
    }

    pub fn country_code(mut self, code: impl Into<FieldMatch<String>>) -> Self {
        self.country_code = Some(code.into());
        self
    }

    pub fn country(mut self, country: impl Into<FieldMatch<String>>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn anonymity(mut self, anonymity: impl Into<FieldMatch<String>>) -> Self {
        self.anonymity = Some(anonymity.into());
        self
    }

    pub fn google(mut self, google: bool) -> Self {
        self.google = Some(google);
        self
    }

    pub fn https(mut self, https: bool) -> Self {
        self.https = Some(https);
        self
    }

    pub fn verified(mut self, verified: bool) -> Self {
        self.verified = Some(verified);
        self
    }

    pub fn working(mut self, working: bool) -> Self {
        self.working = Some(working);
        self
    }

    pub fn last_checked(mut self, text: impl Into<FieldMatch<String>>) -> Self {
        self.last_checked = Some(text.into());
        self
    }

    /// Add a custom predicate; it is ANDed with every other predicate.
    pub fn custom(mut self, predicate: impl Fn(&Proxy) -> bool + Send + Sync + 'static) -> Self {
        self.custom.push(Box::new(predicate));
        self
    }

    /// True when every set predicate accepts the proxy.
    pub fn matches(&self, proxy: &Proxy) -> bool {
        if let Some(host) = &self.host {
            if *host != proxy.host {
                return false;
            }
        }
        if let Some(m) = &self.port {
            if !m.matches(&proxy.port) {
                return false;
            }
        }
        if let Some(m) = &self.country_code {
            if !matches_opt(m, &proxy.country_code) {
                return false;
            }
        }
        if let Some(m) = &self.country {
            if !matches_opt(m, &proxy.country) {
                return false;
            }
        }
        if let Some(m) = &self.anonymity {
            if !matches_opt(m, &proxy.anonymity) {
                return false;
            }
        }
        if let Some(google) = self.google {
            if proxy.google != google {
                return false;
            }
        }
        if let Some(https) = self.https {
            if proxy.https != https {
                return false;
            }
        }
        if let Some(verified) = self.verified {
            if proxy.verified() != verified {
                return false;
            }
        }
        if let Some(working) = self.working {
            if proxy.working() != working {
                return false;
            }
        }
        if let Some(m) = &self.last_checked {
            if !matches_opt(m, &proxy.last_checked) {
                return false;
            }
        }
        self.custom.iter().all(|predicate| predicate(proxy))
    }
}

fn matches_opt(m: &FieldMatch<String>, value: &Option<String>) -> bool {
    value.as_ref().is_some_and(|v| m.matches(v))
}

/// An ordered pool of proxies plus the time it was assembled.
#[derive(Debug, Clone)]
pub struct ProxyQuery {
    proxies: Vec<Proxy>,
    created_at: DateTime<Utc>,
}

impl Default for ProxyQuery {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ProxyQuery {
    pub fn new(proxies: Vec<Proxy>) -> Self {
        Self {
            proxies,
            created_at: Utc::now(),
        }
    }

    /// When this collection was assembled. Diagnostic only.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Proxy> {
        self.proxies.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Proxy> {
        self.proxies.iter()
    }

    pub fn as_slice(&self) -> &[Proxy] {
        &self.proxies
    }

    /// Keep the proxies accepted by every predicate in `filter`.
    ///
    /// An empty filter yields a copy of the whole collection.
    pub fn filter(&self, filter: &ProxyFilter) -> ProxyQuery {
        ProxyQuery::new(
            self.proxies
                .iter()
                .filter(|proxy| filter.matches(proxy))
                .cloned()
                .collect(),
        )
    }

    /// Stable ascending sort by the named field's natural ordering.
    ///
    /// Unset optional fields sort before set ones. An unknown field
    /// name is a [`ConfigError`]; sorting an empty collection is not.
    pub fn order_by(&self, field: &str) -> Result<ProxyQuery> {
        let field = ProxyField::from_str(field)?;
        let mut proxies = self.proxies.clone();
        proxies.sort_by(|a, b| field.compare(a, b));
        Ok(ProxyQuery::new(proxies))
    }

    /// The collection in reverse order.
    pub fn reverse(&self) -> ProxyQuery {
        let mut proxies = self.proxies.clone();
        proxies.reverse();
        ProxyQuery::new(proxies)
    }

    /// At most the first `n` proxies; shorter collections are returned whole.
    pub fn limit(&self, n: usize) -> ProxyQuery {
        ProxyQuery::new(self.proxies[..n.min(self.proxies.len())].to_vec())
    }

    /// Uniform random draw from the caller-supplied random source.
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Proxy> {
        self.proxies.choose(rng)
    }

    pub fn first(&self) -> Option<&Proxy> {
        self.proxies.first()
    }

    pub fn last(&self) -> Option<&Proxy> {
        self.proxies.last()
    }

    /// Left-then-right concatenation. Duplicates are kept.
    pub fn union(&self, other: &ProxyQuery) -> ProxyQuery {
        let mut proxies = self.proxies.clone();
        proxies.extend(other.proxies.iter().cloned());
        ProxyQuery::new(proxies)
    }

    /// Probe every proxy through itself, concurrently, flipping each
    /// proxy's `verified`/`working` flags. Returns only after every
    /// probe has completed; collection order is preserved.
    pub async fn check_health(&mut self, checker: &ProxyChecker) {
        let proxies = std::mem::take(&mut self.proxies);
        self.proxies = checker.check_all(proxies).await;
    }
}

impl Add for ProxyQuery {
    type Output = ProxyQuery;

    fn add(self, other: ProxyQuery) -> ProxyQuery {
        self.union(&other)
    }
}

/// In-place accumulate used while a pipeline run merges provider
/// results. This is the one operator that mutates its left operand's
/// backing sequence.
impl AddAssign for ProxyQuery {
    fn add_assign(&mut self, other: ProxyQuery) {
        self.proxies.extend(other.proxies);
    }
}

impl<I: SliceIndex<[Proxy]>> Index<I> for ProxyQuery {
    type Output = I::Output;

    fn index(&self, index: I) -> &Self::Output {
        &self.proxies[index]
    }
}

impl IntoIterator for ProxyQuery {
    type Item = Proxy;
    type IntoIter = std::vec::IntoIter<Proxy>;

    fn into_iter(self) -> Self::IntoIter {
        self.proxies.into_iter()
    }
}

impl<'a> IntoIterator for &'a ProxyQuery {
    type Item = &'a Proxy;
    type IntoIter = std::slice::Iter<'a, Proxy>;

    fn into_iter(self) -> Self::IntoIter {
        self.proxies.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample() -> ProxyQuery {
        ProxyQuery::new(vec![
            Proxy::builder()
                .host("1.1.1.1")
                .port(8080)
                .country_code("US")
                .anonymity("elite proxy")
                .google(true)
                .build(),
            Proxy::builder()
                .host("2.2.2.2")
                .port(3128)
                .country_code("DE")
                .anonymity("anonymous")
                .https(true)
                .build(),
            Proxy::builder()
                .host("3.3.3.3")
                .port(80)
                .country_code("US")
                .anonymity("transparent")
                .https(true)
                .build(),
            Proxy::builder()
                .host("4.4.4.4")
                .port(1080)
                .country_code("FR")
                .anonymity("elite proxy")
                .build(),
        ])
    }

    #[test]
    fn test_filter_scalar_equality() {
        let result = sample().filter(&ProxyFilter::new().port(3128));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].host, "2.2.2.2");
    }

    #[test]
    fn test_filter_set_membership() {
        let result = sample().filter(&ProxyFilter::new().country_code(vec!["US", "FR"]));
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|p| {
            let code = p.country_code.as_deref();
            code == Some("US") || code == Some("FR")
        }));
    }

    #[test]
    fn test_filter_is_a_conjunction() {
        let result = sample().filter(
            &ProxyFilter::new()
                .country_code("US")
                .anonymity("elite proxy"),
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].host, "1.1.1.1");
    }

    #[test]
    fn test_filter_chaining_equals_conjoined_filter() {
        let query = sample();
        let chained = query
            .filter(&ProxyFilter::new().country_code("US"))
            .filter(&ProxyFilter::new().https(true));
        let conjoined = query.filter(&ProxyFilter::new().country_code("US").https(true));

        assert_eq!(chained.len(), conjoined.len());
        for (a, b) in chained.iter().zip(conjoined.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_filter_custom_predicate() {
        let result = sample().filter(&ProxyFilter::new().custom(|p| p.port < 2000));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_empty_filter_copies_everything() {
        let query = sample();
        let result = query.filter(&ProxyFilter::new());
        assert_eq!(result.len(), query.len());
    }

    #[test]
    fn test_filter_on_probe_flags() {
        let mut proxies: Vec<Proxy> = sample().into_iter().collect();
        proxies[0].mark_checked(true);
        proxies[1].mark_checked(false);
        let query = ProxyQuery::new(proxies);

        let verified = query.filter(&ProxyFilter::new().verified(true));
        assert_eq!(verified.len(), 2);

        let working = query.filter(&ProxyFilter::new().working(true));
        assert_eq!(working.len(), 1);
        assert_eq!(working[0].host, "1.1.1.1");
    }

    #[test]
    fn test_order_by_port_ascending() {
        let result = sample().order_by("port").unwrap();
        let ports: Vec<u16> = result.iter().map(|p| p.port).collect();
        assert_eq!(ports, vec![80, 1080, 3128, 8080]);
    }

    #[test]
    fn test_order_by_then_reverse_is_descending() {
        let result = sample().order_by("port").unwrap().reverse();
        let ports: Vec<u16> = result.iter().map(|p| p.port).collect();
        assert_eq!(ports, vec![8080, 3128, 1080, 80]);
    }

    #[test]
    fn test_order_by_empty_collection() {
        let result = ProxyQuery::default().order_by("port").unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_order_by_unknown_field() {
        let err = sample().order_by("latency").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::UnknownField(name)) if name == "latency"
        ));
    }

    #[test]
    fn test_order_by_does_not_mutate_receiver() {
        let query = sample();
        let _sorted = query.order_by("port").unwrap();
        assert_eq!(query[0].host, "1.1.1.1");
    }

    #[test]
    fn test_limit_clamps_beyond_length() {
        let query = sample();
        let result = query.limit(100);
        assert_eq!(result.len(), query.len());
        for (a, b) in result.iter().zip(query.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_limit_prefix() {
        let result = sample().limit(2);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].host, "1.1.1.1");
        assert_eq!(result[1].host, "2.2.2.2");
    }

    #[test]
    fn test_random_draws_a_member() {
        let query = sample();
        let mut rng = StdRng::seed_from_u64(7);
        let drawn = query.random(&mut rng).unwrap();
        assert!(query.iter().any(|p| p == drawn));
    }

    #[test]
    fn test_random_is_deterministic_with_seeded_rng() {
        let query = sample();
        let a = query.random(&mut StdRng::seed_from_u64(42)).unwrap().clone();
        let b = query.random(&mut StdRng::seed_from_u64(42)).unwrap().clone();
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_on_empty_is_none() {
        let query = ProxyQuery::default();
        let mut rng = StdRng::seed_from_u64(7);
        assert!(query.random(&mut rng).is_none());
    }

    #[test]
    fn test_first_and_last() {
        let query = sample();
        assert_eq!(query.first().unwrap().host, "1.1.1.1");
        assert_eq!(query.last().unwrap().host, "4.4.4.4");

        let empty = ProxyQuery::default();
        assert!(empty.first().is_none());
        assert!(empty.last().is_none());
    }

    #[test]
    fn test_union_preserves_order_and_duplicates() {
        let a = ProxyQuery::new(vec![Proxy::new("1.1.1.1", 80)]);
        let b = ProxyQuery::new(vec![Proxy::new("2.2.2.2", 80), Proxy::new("1.1.1.1", 80)]);

        let result = a.union(&b);
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].host, "1.1.1.1");
        assert_eq!(result[1].host, "2.2.2.2");
        assert_eq!(result[2].host, "1.1.1.1");
    }

    #[test]
    fn test_union_is_associative() {
        let a = ProxyQuery::new(vec![Proxy::new("1.1.1.1", 80)]);
        let b = ProxyQuery::new(vec![Proxy::new("2.2.2.2", 80)]);
        let c = ProxyQuery::new(vec![Proxy::new("3.3.3.3", 80)]);

        let left = a.union(&b).union(&c);
        let right = a.union(&b.union(&c));
        assert_eq!(left.len(), 3);
        for (x, y) in left.iter().zip(right.iter()) {
            assert_eq!(x, y);
        }
        let hosts: Vec<&str> = left.iter().map(|p| p.host.as_str()).collect();
        assert_eq!(hosts, vec!["1.1.1.1", "2.2.2.2", "3.3.3.3"]);
    }

    #[test]
    fn test_add_assign_accumulates_in_place() {
        let mut pool = ProxyQuery::default();
        pool += ProxyQuery::new(vec![Proxy::new("1.1.1.1", 80)]);
        pool += ProxyQuery::new(vec![Proxy::new("2.2.2.2", 81)]);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool[0].host, "1.1.1.1");
        assert_eq!(pool[1].host, "2.2.2.2");
    }

    #[test]
    fn test_indexing_and_slicing() {
        let query = sample();
        assert_eq!(query[1].host, "2.2.2.2");
        assert_eq!(query[1..3].len(), 2);
        assert_eq!(query[..].len(), 4);
        assert!(query.get(99).is_none());
    }
}
