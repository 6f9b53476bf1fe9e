//! Values partitioned into named groups whose relative order can be
//! constrained.
//!
//! Groups are ordered by first appearance. [`OrderedGroup::set_group_position`]
//! records a `before`/`after` constraint, and [`OrderedGroup::sorted_groups`]
//! applies the constraints in a single left-to-right pass: each constrained
//! group, taken in first-seen order, is pulled out and reinserted next to the
//! target's position at that moment. Later moves can therefore shift earlier
//! ones, and contradictory constraints produce whatever the pass yields.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_GROUP: &str = "__main__";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Entry<T> {
    value: T,
    group: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPosition {
    pub before: Option<String>,
    pub after: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedGroup<T> {
    values: Vec<Entry<T>>,
    groups: HashMap<String, GroupPosition>,
}

impl<T> Default for OrderedGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OrderedGroup<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            groups: HashMap::new(),
        }
    }

    pub fn append_value(&mut self, value: T, group: &str) -> &mut Self {
        self.values.push(Entry {
            value,
            group: group.to_string(),
        });
        self
    }

    pub fn append_values<I>(&mut self, values: I, group: &str) -> &mut Self
    where
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.append_value(value, group);
        }
        self
    }

    pub fn prepend_value(&mut self, value: T, group: &str) -> &mut Self {
        self.values.insert(
            0,
            Entry {
                value,
                group: group.to_string(),
            },
        );
        self
    }

    /// Prepends `values` as a block, keeping their given order.
    pub fn prepend_values<I>(&mut self, values: I, group: &str) -> &mut Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut values: Vec<T> = values.into_iter().collect();
        values.reverse();
        for value in values {
            self.prepend_value(value, group);
        }
        self
    }

    /// Constrains `group` to sit right before `before` or right after `after`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidArgument`] when neither target is given
    /// or both name the same group. Nothing is recorded in that case.
    pub fn set_group_position(
        &mut self,
        group: &str,
        before: Option<&str>,
        after: Option<&str>,
    ) -> Result<&mut Self> {
        if before.is_none() && after.is_none() {
            return Err(ConfigError::invalid_argument(
                "group position needs `before` or `after`",
            ));
        }
        if before == after {
            return Err(ConfigError::invalid_argument(
                "`before` and `after` must name different groups",
            ));
        }

        self.groups.insert(
            group.to_string(),
            GroupPosition {
                before: before.map(str::to_string),
                after: after.map(str::to_string),
            },
        );
        Ok(self)
    }

    #[must_use]
    pub fn group_position(&self, group: &str) -> Option<&GroupPosition> {
        self.groups.get(group)
    }

    /// Values tagged with `group`, in insertion order.
    #[must_use]
    pub fn group_values(&self, group: &str) -> Vec<&T> {
        self.values
            .iter()
            .filter(|e| e.group == group)
            .map(|e| &e.value)
            .collect()
    }

    /// Every group in use, in first-seen order.
    #[must_use]
    pub fn all_groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for entry in &self.values {
            if !groups.contains(&entry.group.as_str()) {
                groups.push(&entry.group);
            }
        }
        groups
    }

    #[must_use]
    pub fn sorted_groups(&self) -> Vec<&str> {
        let seen = self.all_groups();
        let mut groups = seen.clone();

        for group in seen {
            let Some(position) = self.groups.get(group) else {
                continue;
            };

            if let Some(before) = position.before.as_deref() {
                groups.retain(|g| *g != group);
                let offset = groups.iter().position(|g| *g == before).unwrap_or(0);
                groups.insert(offset, group);
            }

            if let Some(after) = position.after.as_deref() {
                groups.retain(|g| *g != group);
                let offset = groups
                    .iter()
                    .position(|g| *g == after)
                    .map_or(1, |i| i + 1)
                    .min(groups.len());
                groups.insert(offset, group);
            }
        }

        groups
    }

    /// All values, group by group in [`sorted_groups`](Self::sorted_groups)
    /// order.
    #[must_use]
    pub fn all_values(&self) -> Vec<&T> {
        self.sorted_groups()
            .into_iter()
            .flat_map(|group| self.group_values(group))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.all_values().into_iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
