//! Group selectors.
//!
//! A manifest may declare named groups of dependency names:
//!
//! ```json
//! "group": { "frontend": ["jquery", "bootstrap"] }
//! ```
//!
//! A selector keeps the members of a group (`"frontend"`), drops them
//! (`"!frontend"`), or unions several selectors.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::resolver::errors::CollectError;

/// Prefix marking an excluding selector.
pub const EXCLUSION_MARKER: char = '!';

type Groups = IndexMap<String, Vec<String>>;

/// Which dependencies to keep, by group.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawSelector")]
pub enum GroupSelector {
    /// Keep members of the group.
    Single(String),
    /// Keep everything except members of the group.
    Excluded(String),
    /// Union of the listed selectors.
    List(Vec<GroupSelector>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSelector {
    One(String),
    Many(Vec<String>),
}

impl From<RawSelector> for GroupSelector {
    fn from(raw: RawSelector) -> Self {
        match raw {
            RawSelector::One(s) => GroupSelector::from(s.as_str()),
            RawSelector::Many(list) => {
                GroupSelector::List(list.iter().map(|s| GroupSelector::from(s.as_str())).collect())
            }
        }
    }
}

impl From<&str> for GroupSelector {
    fn from(s: &str) -> Self {
        match s.strip_prefix(EXCLUSION_MARKER) {
            Some(name) => GroupSelector::Excluded(name.to_string()),
            None => GroupSelector::Single(s.to_string()),
        }
    }
}

impl FromStr for GroupSelector {
    type Err = String;

    /// Parse a CLI selector. Commas separate list members: `a,!b`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
        match parts.as_slice() {
            [] => Err("empty group selector".to_string()),
            [one] => Ok(GroupSelector::from(*one)),
            many => Ok(GroupSelector::List(
                many.iter().map(|p| GroupSelector::from(*p)).collect(),
            )),
        }
    }
}

impl fmt::Display for GroupSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupSelector::Single(name) => write!(f, "{}", name),
            GroupSelector::Excluded(name) => write!(f, "{}{}", EXCLUSION_MARKER, name),
            GroupSelector::List(list) => {
                let parts: Vec<String> = list.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(","))
            }
        }
    }
}

/// Whether an excluding selector actually excludes anything.
///
/// An exclusion over an empty or undeclared group is not an exclusion: it
/// lets every dependency through.
fn is_effective_exclusion(name: &str, groups: &Groups) -> bool {
    groups.get(name).is_some_and(|members| !members.is_empty())
}

impl GroupSelector {
    /// Check that every referenced group is declared.
    ///
    /// A manifest without a `group` section declares no groups.
    pub fn validate(&self, groups: Option<&Groups>) -> Result<(), CollectError> {
        match self {
            GroupSelector::Single(name) => {
                if groups.is_some_and(|g| g.contains_key(name)) {
                    Ok(())
                } else {
                    Err(CollectError::GroupNotFound {
                        group: name.clone(),
                    })
                }
            }
            // Excluding an empty or undeclared group is accepted and acts as no filter.
            GroupSelector::Excluded(_) => Ok(()),
            GroupSelector::List(list) => list.iter().try_for_each(|s| s.validate(groups)),
        }
    }

    /// Keep the dependencies this selector admits, in declaration order.
    ///
    /// Lists merge their members' results; a name kept by several selectors
    /// stays at its first position.
    pub fn filter<V: Clone>(
        &self,
        deps: &IndexMap<String, V>,
        groups: Option<&Groups>,
    ) -> IndexMap<String, V> {
        let empty = Groups::new();
        let groups = groups.unwrap_or(&empty);

        match self {
            GroupSelector::Single(name) => {
                let members = groups.get(name).map(Vec::as_slice).unwrap_or(&[]);
                deps.iter()
                    .filter(|(dep, _)| members.contains(*dep))
                    .map(|(dep, v)| (dep.clone(), v.clone()))
                    .collect()
            }
            GroupSelector::Excluded(name) => {
                if !is_effective_exclusion(name, groups) {
                    return deps.clone();
                }
                let members = &groups[name.as_str()];
                deps.iter()
                    .filter(|(dep, _)| !members.contains(*dep))
                    .map(|(dep, v)| (dep.clone(), v.clone()))
                    .collect()
            }
            GroupSelector::List(list) => {
                let mut merged = IndexMap::new();
                for selector in list {
                    for (dep, v) in selector.filter(deps, Some(groups)) {
                        merged.insert(dep, v);
                    }
                }
                merged
            }
        }
    }
}
