//! Attribute diffing with ignore lists.
//!
//! An attribute has changed when its value differs between the before and
//! after snapshots; a key missing from one side reads as `null`. Changes to
//! attributes in the [`IgnoreSet`] never count and never appear in a diff.

use std::collections::{BTreeMap, BTreeSet};

use activity_config::TrackingConfig;
use activity_core::Attributes;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::trackable::Trackable;

static NULL: Value = Value::Null;

/// Deduplicated union of the global and subject-declared ignore lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet(BTreeSet<String>);

impl IgnoreSet {
    pub fn merged<G, D>(global: G, declared: D) -> Self
    where
        G: IntoIterator,
        G::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        Self(
            global
                .into_iter()
                .map(|a| a.as_ref().to_string())
                .chain(declared.into_iter().map(|a| a.as_ref().to_string()))
                .collect(),
        )
    }

    /// The ignore set in effect for `subject`.
    pub fn for_subject<T: Trackable + ?Sized>(config: &TrackingConfig, subject: &T) -> Self {
        Self::merged(&config.ignore_attributes, subject.ignored_attributes())
    }

    #[must_use]
    pub fn contains(&self, attribute: &str) -> bool {
        self.0.contains(attribute)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Pre- and post-mutation value of one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    pub old: Value,
    pub new: Value,
}

/// Changed attributes keyed by name.
pub type Changes = BTreeMap<String, AttributeChange>;

fn changed<'a>(
    before: &'a Attributes,
    after: &'a Attributes,
) -> impl Iterator<Item = (&'a str, &'a Value, &'a Value)> {
    let assigned = after.iter().filter_map(move |(key, new)| {
        let old = before.get(key).unwrap_or(&NULL);
        (old != new).then_some((key.as_str(), old, new))
    });
    let removed = before.iter().filter_map(move |(key, old)| {
        (!old.is_null() && !after.contains_key(key)).then_some((key.as_str(), old, &NULL))
    });
    assigned.chain(removed)
}

/// Whether any attribute outside `ignored` changed.
#[must_use]
pub fn has_meaningful_change(before: &Attributes, after: &Attributes, ignored: &IgnoreSet) -> bool {
    changed(before, after).any(|(key, _, _)| !ignored.contains(key))
}

/// Changed attributes outside `ignored`, with their old and new values.
#[must_use]
pub fn diff(before: &Attributes, after: &Attributes, ignored: &IgnoreSet) -> Changes {
    changed(before, after)
        .filter(|(key, _, _)| !ignored.contains(key))
        .map(|(key, old, new)| {
            (
                key.to_string(),
                AttributeChange {
                    old: old.clone(),
                    new: new.clone(),
                },
            )
        })
        .collect()
}

/// Shape a diff as recorded `properties`: `{name: {old, new}}`.
#[must_use]
pub fn changes_to_properties(changes: Changes) -> Attributes {
    changes
        .into_iter()
        .map(|(key, change)| (key, json!({"old": change.old, "new": change.new})))
        .collect()
}
