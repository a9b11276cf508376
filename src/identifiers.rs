//! Item and resource identifiers
//!
//! Every transformed question gets an assessment identifier of the form
//! `item-00001` and a manifest resource identifier derived from it.

use std::fmt;

/// Prefix of assessment item identifiers
pub const ITEM_PREFIX: &str = "item-";

/// Prefix prepended to an item identifier to form its resource identifier
pub const RESOURCE_PREFIX: &str = "resource-";

/// Identifiers issued for one question
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentifierPair {
    /// Assessment item identifier, also the archive entry stem
    pub item: String,
    /// Manifest resource identifier
    pub resource: String,
}

impl IdentifierPair {
    fn from_sequence(sequence: u32) -> Self {
        let item = format!("{}{:05}", ITEM_PREFIX, sequence);
        let resource = format!("{}{}", RESOURCE_PREFIX, item);
        Self { item, resource }
    }

    /// File name of the item inside the package
    pub fn href(&self) -> String {
        format!("{}.xml", self.item)
    }
}

impl fmt::Display for IdentifierPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.item)
    }
}

/// Issues strictly increasing identifiers, starting at 1.
///
/// One allocator belongs to one conversion run.
#[derive(Debug)]
pub struct IdentifierAllocator {
    next: u32,
}

impl IdentifierAllocator {
    /// Create an allocator whose first identifier is `item-00001`
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Issue the next identifier pair
    pub fn allocate(&mut self) -> IdentifierPair {
        let pair = IdentifierPair::from_sequence(self.next);
        self.next += 1;
        pair
    }

    /// Number of identifiers issued so far
    pub fn issued(&self) -> u32 {
        self.next - 1
    }
}

impl Default for IdentifierAllocator {
    fn default() -> Self {
        Self::new()
    }
}
