/// Transaction: a batch of proxy changes applied at a frame boundary.
///
/// Producers never touch the proxy store directly. Every creation,
/// move/resize or destruction is recorded in a Transaction, handed to the
/// Collection, merged with the other pending transactions when a frame is
/// cut, and applied by the single consumer.
///
/// Each entry carries a stamp local to its Transaction. Merging appends the
/// other batch's entries (resets, then removes, then updates) and shifts
/// their stamps past the receiver's, so a merged frame still knows the order
/// in which its entries were recorded. The frame is replayed in that order.

use std::iter::FusedIterator;
use super::proxy::{ProxyId, Sphere};

/// Recording order of an entry within its Transaction
pub(crate) type Stamp = u64;

pub(crate) type Reset = (Stamp, ProxyId, Sphere);
pub(crate) type Remove = (Stamp, ProxyId);
pub(crate) type Update = (Stamp, ProxyId, Sphere);

/// A batch of reset/update/remove operations
///
/// # Example
///
/// ```
/// use galaxy_3d_workload::galaxy3d::workload::{ProxyId, Sphere, Transaction};
/// use galaxy_3d_workload::glam::Vec3;
///
/// let mut a = Transaction::new();
/// a.reset(ProxyId::new(1), Sphere::new(Vec3::ZERO, 1.0));
///
/// let mut b = Transaction::new();
/// b.remove(ProxyId::new(2));
///
/// a.merge_owned(b);
/// assert_eq!(a.num_resets(), 1);
/// assert!(a.has_removals());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transaction {
    reset_items: Vec<Reset>,
    removed_items: Vec<Remove>,
    updated_items: Vec<Update>,
    next_stamp: Stamp,
}

impl Transaction {
    /// Create an empty transaction
    pub fn new() -> Self {
        Self::default()
    }

    fn stamp(&mut self) -> Stamp {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        stamp
    }

    // ===== PRODUCER API =====

    /// Declare that `id` exists with `sphere`, creating it or replacing its payload
    pub fn reset(&mut self, id: ProxyId, sphere: Sphere) {
        let stamp = self.stamp();
        self.reset_items.push((stamp, id, sphere));
    }

    /// Change the payload of an existing proxy; ignored if `id` is absent when applied
    pub fn update(&mut self, id: ProxyId, sphere: Sphere) {
        let stamp = self.stamp();
        self.updated_items.push((stamp, id, sphere));
    }

    /// Destroy `id`; ignored if it is absent when applied
    pub fn remove(&mut self, id: ProxyId) {
        let stamp = self.stamp();
        self.removed_items.push((stamp, id));
    }

    pub fn has_removals(&self) -> bool {
        !self.removed_items.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.reset_items.is_empty() && self.removed_items.is_empty() && self.updated_items.is_empty()
    }

    pub fn num_resets(&self) -> usize {
        self.reset_items.len()
    }

    pub fn num_removes(&self) -> usize {
        self.removed_items.len()
    }

    pub fn num_updates(&self) -> usize {
        self.updated_items.len()
    }

    /// Total number of recorded operations
    pub fn len(&self) -> usize {
        self.num_resets() + self.num_removes() + self.num_updates()
    }

    /// Empty all three sequences
    pub fn clear(&mut self) {
        self.reset_items.clear();
        self.removed_items.clear();
        self.updated_items.clear();
        self.next_stamp = 0;
    }

    // ===== MERGE =====

    /// Reserve room for merging every transaction of `transactions`
    pub fn reserve(&mut self, transactions: &[Transaction]) {
        let (resets, removes, updates) = transactions.iter().fold((0, 0, 0), |acc, t| {
            (acc.0 + t.num_resets(), acc.1 + t.num_removes(), acc.2 + t.num_updates())
        });
        self.reset_items.reserve(resets);
        self.removed_items.reserve(removes);
        self.updated_items.reserve(updates);
    }

    /// Append a copy of `other` after this transaction's entries; `other` is unchanged
    pub fn merge(&mut self, other: &Transaction) {
        let offset = self.next_stamp;
        self.reset_items.extend(
            other.reset_items.iter().map(|&(stamp, id, sphere)| (stamp + offset, id, sphere)),
        );
        self.removed_items.extend(
            other.removed_items.iter().map(|&(stamp, id)| (stamp + offset, id)),
        );
        self.updated_items.extend(
            other.updated_items.iter().map(|&(stamp, id, sphere)| (stamp + offset, id, sphere)),
        );
        self.next_stamp += other.next_stamp;
    }

    /// Append `other` after this transaction's entries, taking its storage
    pub fn merge_owned(&mut self, mut other: Transaction) {
        if self.next_stamp == 0 && self.is_empty() {
            *self = other;
            return;
        }

        let offset = self.next_stamp;
        for item in &mut other.reset_items {
            item.0 += offset;
        }
        for item in &mut other.removed_items {
            item.0 += offset;
        }
        for item in &mut other.updated_items {
            item.0 += offset;
        }
        self.reset_items.append(&mut other.reset_items);
        self.removed_items.append(&mut other.removed_items);
        self.updated_items.append(&mut other.updated_items);
        self.next_stamp += other.next_stamp;
    }

    /// Move `other`'s entries into this transaction, leaving `other` empty
    pub fn merge_from(&mut self, other: &mut Transaction) {
        self.merge_owned(std::mem::take(other));
    }

    /// Merge copies of `transactions`, in sequence order
    pub fn merge_all(&mut self, transactions: &[Transaction]) {
        self.reserve(transactions);
        for transaction in transactions {
            self.merge(transaction);
        }
    }

    /// Merge `transactions` by transfer, in sequence order
    pub fn merge_all_owned<I>(&mut self, transactions: I)
    where
        I: IntoIterator<Item = Transaction>,
    {
        for transaction in transactions {
            self.merge_owned(transaction);
        }
    }

    // ===== CONSOLIDATION API =====

    /// Raw sequences, for the frame processor only
    pub(crate) fn items(&self) -> (&[Reset], &[Remove], &[Update]) {
        (&self.reset_items, &self.removed_items, &self.updated_items)
    }

    /// Every entry in recording order
    pub(crate) fn operations(&self) -> Operations<'_> {
        let (resets, removes, updates) = self.items();
        Operations { resets, removes, updates }
    }
}

/// One entry of a transaction, as replayed by the frame processor
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Operation {
    Reset(ProxyId, Sphere),
    Remove(ProxyId),
    Update(ProxyId, Sphere),
}

/// Merges the three stamp-sorted sequences back into recording order
pub(crate) struct Operations<'a> {
    resets: &'a [Reset],
    removes: &'a [Remove],
    updates: &'a [Update],
}

impl Iterator for Operations<'_> {
    type Item = Operation;

    fn next(&mut self) -> Option<Operation> {
        let reset = self.resets.first().map(|r| r.0).unwrap_or(Stamp::MAX);
        let remove = self.removes.first().map(|r| r.0).unwrap_or(Stamp::MAX);
        let update = self.updates.first().map(|u| u.0).unwrap_or(Stamp::MAX);

        if let Some((&(_, id, sphere), rest)) = self.resets.split_first() {
            if reset <= remove && reset <= update {
                self.resets = rest;
                return Some(Operation::Reset(id, sphere));
            }
        }
        if let Some((&(_, id), rest)) = self.removes.split_first() {
            if remove <= update {
                self.removes = rest;
                return Some(Operation::Remove(id));
            }
        }
        let (&(_, id, sphere), rest) = self.updates.split_first()?;
        self.updates = rest;
        Some(Operation::Update(id, sphere))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.resets.len() + self.removes.len() + self.updates.len();
        (len, Some(len))
    }
}

impl ExactSizeIterator for Operations<'_> {}

impl FusedIterator for Operations<'_> {}

#[cfg(test)]
#[path = "transaction_tests.rs"]
mod tests;
