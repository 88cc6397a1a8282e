use ahash::AHashSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Insertion-ordered set of operation UIDs.
///
/// Serialized as a plain sequence; deserialization rejects duplicates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct OperationOrder {
    order: Vec<String>,
    members: AHashSet<String>,
}

impl OperationOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `uid` unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, uid: impl Into<String>) -> bool {
        let uid = uid.into();
        if self.members.contains(&uid) {
            return false;
        }
        self.members.insert(uid.clone());
        self.order.push(uid);
        true
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.members.contains(uid)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.order.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl PartialEq for OperationOrder {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
    }
}

impl TryFrom<Vec<String>> for OperationOrder {
    type Error = String;

    fn try_from(order: Vec<String>) -> Result<Self, Self::Error> {
        let duplicates: Vec<&String> = order.iter().duplicates().collect();
        if !duplicates.is_empty() {
            return Err(format!(
                "operationOrder contains duplicate UIDs: {}",
                duplicates.iter().join(", ")
            ));
        }
        let members = order.iter().cloned().collect();
        Ok(Self { order, members })
    }
}

impl From<OperationOrder> for Vec<String> {
    fn from(order: OperationOrder) -> Self {
        order.order
    }
}

impl<'a> IntoIterator for &'a OperationOrder {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}
