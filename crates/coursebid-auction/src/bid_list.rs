//! Priority bid list for a single course.
//!
//! A singly linked list kept in a node arena:
//! - order is amount descending, ties broken by insertion (earlier first)
//! - a `HashMap<Identity, handle>` index finds a claimant's node in O(1)
//! - freed nodes go onto a free list and are reused by later inserts
//!
//! Insertion and removal walk the list, so both are O(n) in the number of
//! bids on the course.

use std::collections::HashMap;

use coursebid_types::{BidEntry, CourseCode, CoursebidError, Identity, Result};

#[derive(Debug, Clone)]
struct Node {
    entry: BidEntry,
    next: Option<usize>,
}

/// Bids on one course, highest amount first.
#[derive(Debug, Clone)]
pub struct PriorityBidList {
    course: CourseCode,
    nodes: Vec<Node>,
    free: Vec<usize>,
    head: Option<usize>,
    index: HashMap<Identity, usize>,
    /// Next insertion sequence number. Never reused.
    next_rank: u64,
}

impl PriorityBidList {
    #[must_use]
    pub fn new(course: CourseCode) -> Self {
        Self {
            course,
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            index: HashMap::new(),
            next_rank: 0,
        }
    }

    #[must_use]
    pub fn course(&self) -> &CourseCode {
        &self.course
    }

    // =================================================================
    // Mutation
    // =================================================================

    /// Insert a bid before the first entry with a strictly lower amount.
    ///
    /// Equal amounts keep arrival order, so an earlier bid outranks a later
    /// one of the same size.
    pub fn insert(&mut self, claimant: Identity, amount: u64) -> Result<BidEntry> {
        if self.index.contains_key(&claimant) {
            return Err(CoursebidError::DuplicateBid {
                course: self.course.clone(),
                claimant,
            });
        }

        let entry = BidEntry {
            claimant,
            amount,
            rank: self.next_rank,
        };
        self.next_rank += 1;

        let mut prev = None;
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            if self.nodes[idx].entry.amount < amount {
                break;
            }
            prev = Some(idx);
            cursor = self.nodes[idx].next;
        }

        let handle = self.alloc(Node {
            entry,
            next: cursor,
        });
        match prev {
            None => self.head = Some(handle),
            Some(p) => self.nodes[p].next = Some(handle),
        }
        self.index.insert(claimant, handle);
        Ok(entry)
    }

    /// Remove a claimant's bid. Returns `None` if they have none.
    pub fn remove(&mut self, claimant: &Identity) -> Option<BidEntry> {
        let handle = self.index.remove(claimant)?;

        let mut prev = None;
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            if idx == handle {
                break;
            }
            prev = Some(idx);
            cursor = self.nodes[idx].next;
        }

        let next = self.nodes[handle].next.take();
        match prev {
            None => self.head = next,
            Some(p) => self.nodes[p].next = next,
        }
        self.free.push(handle);
        Some(self.nodes[handle].entry)
    }

    /// Change a claimant's amount and re-sort it.
    ///
    /// The bid takes a fresh rank, so it queues behind existing bids of the
    /// same amount.
    ///
    /// # Errors
    /// Returns `NoSuchBid` if the claimant has no bid on this course.
    pub fn update(&mut self, claimant: &Identity, amount: u64) -> Result<BidEntry> {
        if self.remove(claimant).is_none() {
            return Err(CoursebidError::NoSuchBid {
                course: self.course.clone(),
                claimant: *claimant,
            });
        }
        self.insert(*claimant, amount)
    }

    /// Empty the list, returning every entry in priority order.
    pub fn drain(&mut self) -> Vec<BidEntry> {
        let entries: Vec<BidEntry> = self.entries().collect();
        self.nodes.clear();
        self.free.clear();
        self.index.clear();
        self.head = None;
        entries
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn get(&self, claimant: &Identity) -> Option<BidEntry> {
        self.index.get(claimant).map(|&h| self.nodes[h].entry)
    }

    #[must_use]
    pub fn contains(&self, claimant: &Identity) -> bool {
        self.index.contains_key(claimant)
    }

    /// Zero-based position of a claimant's bid in priority order.
    #[must_use]
    pub fn position(&self, claimant: &Identity) -> Option<usize> {
        self.entries().position(|e| e.claimant == *claimant)
    }

    /// Entries in priority order.
    pub fn entries(&self) -> Entries<'_> {
        Entries {
            list: self,
            cursor: self.head,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    fn alloc(&mut self, node: Node) -> usize {
        if let Some(slot) = self.free.pop() {
            self.nodes[slot] = node;
            slot
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        }
    }
}

/// Iterator over a [`PriorityBidList`] in priority order.
pub struct Entries<'a> {
    list: &'a PriorityBidList,
    cursor: Option<usize>,
}

impl Iterator for Entries<'_> {
    type Item = BidEntry;

    fn next(&mut self) -> Option<BidEntry> {
        let idx = self.cursor?;
        let node = &self.list.nodes[idx];
        self.cursor = node.next;
        Some(node.entry)
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    fn list() -> PriorityBidList {
        PriorityBidList::new(CourseCode::new("CS101").unwrap())
    }

    fn amounts(list: &PriorityBidList) -> Vec<u64> {
        list.entries().map(|e| e.amount).collect()
    }

    fn assert_sorted(list: &PriorityBidList) {
        let entries: Vec<BidEntry> = list.entries().collect();
        for pair in entries.windows(2) {
            assert!(
                pair[0].amount > pair[1].amount
                    || (pair[0].amount == pair[1].amount && pair[0].rank < pair[1].rank),
                "out of order: {pair:?}"
            );
        }
        assert_eq!(entries.len(), list.len());
    }

    #[test]
    fn insert_sorts_descending() {
        let mut list = list();
        list.insert(Identity::random(), 10).unwrap();
        list.insert(Identity::random(), 30).unwrap();
        list.insert(Identity::random(), 20).unwrap();
        assert_eq!(amounts(&list), vec![30, 20, 10]);
    }

    #[test]
    fn ties_keep_arrival_order() {
        let mut list = list();
        let (a, b, c) = (Identity::random(), Identity::random(), Identity::random());
        list.insert(a, 50).unwrap();
        list.insert(b, 50).unwrap();
        list.insert(c, 60).unwrap();
        let order: Vec<Identity> = list.entries().map(|e| e.claimant).collect();
        assert_eq!(order, vec![c, a, b]);
    }

    #[test]
    fn duplicate_rejected() {
        let mut list = list();
        let a = Identity::random();
        list.insert(a, 10).unwrap();
        let err = list.insert(a, 20).unwrap_err();
        assert!(matches!(err, CoursebidError::DuplicateBid { .. }));
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(&a).unwrap().amount, 10);
    }

    #[test]
    fn remove_head_middle_tail() {
        let mut list = list();
        let ids: Vec<Identity> = (0..4).map(|_| Identity::random()).collect();
        for (i, id) in ids.iter().enumerate() {
            list.insert(*id, 100 - i as u64 * 10).unwrap();
        }
        assert_eq!(list.remove(&ids[0]).unwrap().amount, 100);
        assert_eq!(list.remove(&ids[2]).unwrap().amount, 80);
        assert_eq!(list.remove(&ids[3]).unwrap().amount, 70);
        assert_eq!(amounts(&list), vec![90]);
        assert!(list.remove(&ids[0]).is_none());
    }

    #[test]
    fn update_resorts_and_takes_fresh_rank() {
        let mut list = list();
        let (a, b) = (Identity::random(), Identity::random());
        list.insert(a, 40).unwrap();
        list.insert(b, 30).unwrap();
        list.update(&a, 30).unwrap();
        let order: Vec<Identity> = list.entries().map(|e| e.claimant).collect();
        assert_eq!(order, vec![b, a]);
        assert_eq!(list.position(&a), Some(1));
    }

    #[test]
    fn update_missing_fails() {
        let mut list = list();
        let err = list.update(&Identity::random(), 5).unwrap_err();
        assert!(matches!(err, CoursebidError::NoSuchBid { .. }));
    }

    #[test]
    fn freed_slots_reused() {
        let mut list = list();
        let (a, b, c) = (Identity::random(), Identity::random(), Identity::random());
        list.insert(a, 1).unwrap();
        list.insert(b, 2).unwrap();
        list.remove(&a);
        list.insert(c, 3).unwrap();
        assert_eq!(list.nodes.len(), 2);
        assert_eq!(amounts(&list), vec![3, 2]);
    }

    #[test]
    fn drain_empties_in_order() {
        let mut list = list();
        list.insert(Identity::random(), 5).unwrap();
        list.insert(Identity::random(), 9).unwrap();
        let drained: Vec<u64> = list.drain().iter().map(|e| e.amount).collect();
        assert_eq!(drained, vec![9, 5]);
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn random_operations_keep_list_sorted() {
        let mut rng = rand::thread_rng();
        let mut list = list();
        let users: Vec<Identity> = (0..12).map(|_| Identity::random()).collect();

        for _ in 0..3_000 {
            let user = users[rng.gen_range(0..users.len())];
            let amount = rng.gen_range(1..20u64);
            match rng.gen_range(0..3) {
                0 => {
                    let had = list.contains(&user);
                    assert_eq!(list.insert(user, amount).is_err(), had);
                }
                1 => {
                    let had = list.contains(&user);
                    assert_eq!(list.remove(&user).is_some(), had);
                }
                _ => {
                    let had = list.contains(&user);
                    assert_eq!(list.update(&user, amount).is_ok(), had);
                }
            }
            assert_sorted(&list);
        }
    }
}
