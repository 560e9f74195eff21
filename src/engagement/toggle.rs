//! Toggle-state engine
//!
//! Flips a user's membership in a relation set (liked / subscribed) with a
//! lookup-then-branch sequence. The sequence is not atomic against a concurrent
//! identical request, so the store's uniqueness constraint is the backstop: a
//! constraint violation on insert means another caller already created the row,
//! and both callers must land on the same observable outcome.

use anyhow::Result;
use serde::Serialize;

use crate::store::models::{Like, LikeTargetKind, Subscription};
use crate::store::full_store::EngagementStore;

/// Identity of a like relation row: (target kind, target id, acting user).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LikeKey {
    pub target_kind: LikeTargetKind,
    pub target_id: String,
    pub user_id: usize,
}

/// Identity of a subscription relation row: (channel, subscriber).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionKey {
    pub channel_id: usize,
    pub subscriber_id: usize,
}

impl LikeKey {
    /// Binds this key to a store so [`toggle`] can flip it.
    pub fn on_store<'a, S: EngagementStore + ?Sized>(&'a self, store: &'a S) -> LikeRelation<'a, S> {
        LikeRelation { store, key: self }
    }
}

impl SubscriptionKey {
    pub fn on_store<'a, S: EngagementStore + ?Sized>(
        &'a self,
        store: &'a S,
    ) -> SubscriptionRelation<'a, S> {
        SubscriptionRelation { store, key: self }
    }
}

pub struct LikeRelation<'a, S: EngagementStore + ?Sized> {
    store: &'a S,
    key: &'a LikeKey,
}

impl<S: EngagementStore + ?Sized> ToggleRelation for LikeRelation<'_, S> {
    type Row = Like;

    fn lookup(&self) -> Result<Option<Like>> {
        self.store.find_like(self.key)
    }

    fn insert(&self) -> Result<RelationInsert<Like>> {
        self.store.insert_like(self.key)
    }

    fn remove(&self) -> Result<bool> {
        self.store.delete_like(self.key)
    }
}

pub struct SubscriptionRelation<'a, S: EngagementStore + ?Sized> {
    store: &'a S,
    key: &'a SubscriptionKey,
}

impl<S: EngagementStore + ?Sized> ToggleRelation for SubscriptionRelation<'_, S> {
    type Row = Subscription;

    fn lookup(&self) -> Result<Option<Subscription>> {
        self.store.find_subscription(self.key)
    }

    fn insert(&self) -> Result<RelationInsert<Subscription>> {
        self.store.insert_subscription(self.key)
    }

    fn remove(&self) -> Result<bool> {
        self.store.delete_subscription(self.key)
    }
}

/// Result of inserting a relation row under a uniqueness constraint.
pub enum RelationInsert<R> {
    Inserted(R),
    /// The unique constraint fired: an identical row already exists.
    AlreadyExists,
}

/// Observable outcome of a toggle call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "relation")]
pub enum ToggleOutcome<R> {
    Created(R),
    Removed,
}

/// A single relation set viewed through one key, ready to be flipped.
///
/// Implementations bind a store reference and a key; the engine itself only
/// sequences lookup/insert/remove.
pub trait ToggleRelation {
    type Row;

    fn lookup(&self) -> Result<Option<Self::Row>>;
    fn insert(&self) -> Result<RelationInsert<Self::Row>>;
    fn remove(&self) -> Result<bool>;
}

/// Flips the relation: absent rows are inserted, present rows are removed.
///
/// Calling this twice in sequence returns the relation to its original state.
/// A constraint violation during insert is resolved by re-reading the row and
/// reporting it as `Created` — the racing caller that lost the insert observes
/// the same final state as the one that won.
pub fn toggle<R: ToggleRelation>(relation: &R) -> Result<ToggleOutcome<R::Row>> {
    match relation.lookup()? {
        None => match relation.insert()? {
            RelationInsert::Inserted(row) => Ok(ToggleOutcome::Created(row)),
            RelationInsert::AlreadyExists => match relation.lookup()? {
                Some(row) => Ok(ToggleOutcome::Created(row)),
                // A second racer removed the row between our failed insert and
                // the re-read. The relation is absent, report that state.
                None => Ok(ToggleOutcome::Removed),
            },
        },
        Some(_) => {
            relation.remove()?;
            Ok(ToggleOutcome::Removed)
        }
    }
}
