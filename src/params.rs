use std::collections::btree_map::{self, BTreeMap};

use crate::encode::percent_encode;

/// Key-unique string parameters with canonical (ascending byte order) iteration.
///
/// Inserting an existing key overwrites its value; every iterator yields
/// entries sorted by key, which is the order OAuth signing and the
/// `Authorization` header require.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    inner: BTreeMap<String, String>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets `key` to `value`, returning the previous value if any.
    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<String>
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.inner.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Writes every entry of `other` over this set; `other` wins on collision.
    pub fn overlay<I, K, V>(&mut self, other: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in other {
            self.insert(k, v);
        }
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.inner.iter(),
        }
    }

    /// Percent-encodes keys and values independently and recombines them.
    ///
    /// Two keys that encode to the same string collapse into one entry; the
    /// one iterated later wins.
    pub fn encoded(&self) -> ParameterSet {
        self.iter()
            .map(|(k, v)| (percent_encode(k), percent_encode(v)))
            .collect()
    }

    /// `key=value` pairs joined with `&`, in key order, without any encoding.
    pub fn to_pair_string(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<String>>()
            .join("&")
    }
}

pub struct Iter<'a> {
    inner: btree_map::Iter<'a, String, String>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl IntoIterator for ParameterSet {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = ParameterSet::new();
        set.overlay(iter);
        set
    }
}

impl<K, V> Extend<(K, V)> for ParameterSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.overlay(iter);
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for ParameterSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}
