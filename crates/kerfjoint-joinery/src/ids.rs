//! Session-scoped identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a registered tab face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u32);

/// Identifier shared by a tab face and every face linked to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab#{}", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

/// Hands out fresh identifiers for one session. Two sessions never share an
/// allocator, so their identifiers are independent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdAllocator {
    next_tab: u32,
    next_group: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_tab_id(&mut self) -> TabId {
        let id = TabId(self.next_tab);
        self.next_tab += 1;
        id
    }

    pub fn next_group_id(&mut self) -> GroupId {
        let id = GroupId(self.next_group);
        self.next_group += 1;
        id
    }

    /// Moves the counters past identifiers restored from storage.
    pub fn reserve(&mut self, tab: TabId, group: GroupId) {
        self.next_tab = self.next_tab.max(tab.0 + 1);
        self.next_group = self.next_group.max(group.0 + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocators_are_independent() {
        let mut first = IdAllocator::new();
        let mut second = IdAllocator::new();
        assert_eq!(first.next_tab_id(), TabId(0));
        assert_eq!(first.next_tab_id(), TabId(1));
        assert_eq!(second.next_tab_id(), TabId(0));
        assert_eq!(first.next_group_id(), GroupId(0));
    }

    #[test]
    fn test_reserve_skips_restored_ids() {
        let mut ids = IdAllocator::new();
        ids.reserve(TabId(4), GroupId(2));
        assert_eq!(ids.next_tab_id(), TabId(5));
        assert_eq!(ids.next_group_id(), GroupId(3));
    }
}
