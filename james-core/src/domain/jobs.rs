//! Views over a pipeline's jobs
//!
//! The set of jobs is fixed once a pipeline is built. These views hand out
//! the jobs themselves but offer no way to add or remove one.

use std::collections::BTreeMap;
use std::collections::btree_map;

/// Read-only view of a pipeline's jobs, keyed by name
#[derive(Debug)]
pub struct Jobs<'a, J> {
    inner: &'a BTreeMap<String, J>,
}

impl<J> Clone for Jobs<'_, J> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<J> Copy for Jobs<'_, J> {}

impl<'a, J> Jobs<'a, J> {
    pub(crate) fn new(inner: &'a BTreeMap<String, J>) -> Self {
        Self { inner }
    }

    pub fn get(&self, name: &str) -> Option<&'a J> {
        self.inner.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Job names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &'a str> + use<'a, J> {
        self.inner.keys().map(String::as_str)
    }

    pub fn iter(&self) -> Iter<'a, J> {
        Iter {
            inner: self.inner.iter(),
        }
    }
}

impl<'a, J> IntoIterator for Jobs<'a, J> {
    type Item = (&'a str, &'a J);
    type IntoIter = Iter<'a, J>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over `(name, job)` pairs
#[derive(Debug)]
pub struct Iter<'a, J> {
    inner: btree_map::Iter<'a, String, J>,
}

impl<'a, J> Iterator for Iter<'a, J> {
    type Item = (&'a str, &'a J);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(name, job)| (name.as_str(), job))
    }
}

/// View of a pipeline's jobs allowing each job to be modified
///
/// Jobs can be changed in place, but none can be inserted or removed.
#[derive(Debug)]
pub struct JobsMut<'a, J> {
    inner: &'a mut BTreeMap<String, J>,
}

impl<'a, J> JobsMut<'a, J> {
    pub(crate) fn new(inner: &'a mut BTreeMap<String, J>) -> Self {
        Self { inner }
    }

    pub fn get(&self, name: &str) -> Option<&J> {
        self.inner.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut J> {
        self.inner.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut J)> {
        self.inner.iter_mut().map(|(name, job)| (name.as_str(), job))
    }
}
