//! Optimistic entity patches and their reversible receipts.
//!
//! A patch edits cached pages in place. Every edit records its pre-image in
//! the [`PatchReceipt`], so reverting is a data operation rather than a
//! snapshot restore: later patches to other rows survive a rollback.

use std::collections::HashMap;

use crate::domain::page_key::PageKey;
use crate::domain::{User, UserId};

use super::CacheEntry;

/// Change to apply to every cached page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityPatch {
    /// Insert at index 0 of every cached first page whose filters match.
    InsertFront(User),
    /// Replace the user with the same id wherever it appears.
    Replace(User),
    /// Remove the user with this id wherever it appears.
    Remove(UserId),
}

impl EntityPatch {
    /// Id of the user the patch touches.
    pub fn user_id(&self) -> UserId {
        match self {
            Self::InsertFront(user) | Self::Replace(user) => user.id,
            Self::Remove(id) => *id,
        }
    }

    pub(super) fn kind(&self) -> &'static str {
        match self {
            Self::InsertFront(_) => "insert_front",
            Self::Replace(_) => "replace",
            Self::Remove(_) => "remove",
        }
    }
}

/// One edit made to one cached page, with what it displaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchEdit {
    /// `id` was inserted at the front; `evicted` fell off a full page.
    Inserted {
        key: PageKey,
        id: UserId,
        evicted: Option<User>,
    },
    /// The row was replaced; `previous` is the old value.
    Replaced { key: PageKey, previous: User },
    /// `user` was removed from position `index`.
    Removed {
        key: PageKey,
        index: usize,
        user: User,
    },
}

impl PatchEdit {
    /// Key of the page the edit touched.
    pub fn key(&self) -> &PageKey {
        match self {
            Self::Inserted { key, .. } | Self::Replaced { key, .. } | Self::Removed { key, .. } => {
                key
            }
        }
    }
}

/// Record of every edit a patch made, used to revert it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use = "a receipt is needed to revert or reconcile an optimistic patch"]
pub struct PatchReceipt {
    edits: Vec<PatchEdit>,
}

impl PatchReceipt {
    /// Edits in the order they were applied.
    pub fn edits(&self) -> &[PatchEdit] {
        &self.edits
    }

    /// Whether the patch changed nothing.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Whether the patch edited the page under `key`.
    pub fn touches(&self, key: &PageKey) -> bool {
        self.edits.iter().any(|edit| edit.key() == key)
    }
}

pub(super) fn apply(
    entries: &mut HashMap<PageKey, CacheEntry>,
    patch: &EntityPatch,
) -> PatchReceipt {
    let mut edits = Vec::new();
    for (key, entry) in entries.iter_mut() {
        let page = &mut entry.page;
        match patch {
            EntityPatch::InsertFront(user) => {
                if !key.is_first_page()
                    || !key.matches(user)
                    || page.position(|row| row.id == user.id).is_some()
                {
                    continue;
                }
                let evicted = page.insert_front(user.clone());
                page.increment_total();
                edits.push(PatchEdit::Inserted {
                    key: key.clone(),
                    id: user.id,
                    evicted,
                });
            }
            EntityPatch::Replace(user) => {
                if let Some(previous) = page.replace_where(|row| row.id == user.id, user.clone()) {
                    edits.push(PatchEdit::Replaced {
                        key: key.clone(),
                        previous,
                    });
                }
            }
            EntityPatch::Remove(id) => {
                if let Some((index, user)) = page.remove_where(|row| row.id == *id) {
                    page.decrement_total();
                    edits.push(PatchEdit::Removed {
                        key: key.clone(),
                        index,
                        user,
                    });
                }
            }
        }
    }
    PatchReceipt { edits }
}

pub(super) fn revert(entries: &mut HashMap<PageKey, CacheEntry>, receipt: PatchReceipt) {
    for edit in receipt.edits.into_iter().rev() {
        let Some(entry) = entries.get_mut(edit.key()) else {
            continue;
        };
        let page = &mut entry.page;
        match edit {
            PatchEdit::Inserted { id, evicted, .. } => {
                if page.remove_where(|row| row.id == id).is_some() {
                    page.decrement_total();
                    if let Some(user) = evicted {
                        page.push_back(user);
                    }
                }
            }
            PatchEdit::Replaced { previous, .. } => {
                let id = previous.id;
                page.replace_where(|row| row.id == id, previous);
            }
            PatchEdit::Removed { index, user, .. } => {
                if page.position(|row| row.id == user.id).is_none() {
                    page.insert_at(index, user);
                    page.increment_total();
                }
            }
        }
    }
}
