//! Temporal name-to-id resolution with auto-ingestion
//!
//! All state (entities, aliases, memo) lives behind a single mutex, so
//! auto-ingestion is an insert-if-absent: when two threads race on the same
//! unseen name, the first writer mints the entity and the second observes it.
//! The memo is keyed on `(kind, name, date)` and never invalidated within a
//! session; resolution is monotonic because aliases are never deleted.
//!
//! Alias windows are unique per `(kind, text)`: one text may name a team and
//! a venue at the same time, and the overlap check applies within a kind.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};

use super::entity::{Alias, Entity, EntityId, EntityKind};
use super::errors::{RegistryError, RegistryResult};

#[derive(Debug, Default)]
struct RegistryState {
    entities: HashMap<EntityId, Entity>,
    /// Aliases bucketed by text, each bucket ordered by `valid_from`.
    aliases: HashMap<String, Vec<Alias>>,
    memo: HashMap<(EntityKind, String, NaiveDate), EntityId>,
    next_id: u64,
}

/// Thread-safe identity registry.
#[derive(Debug)]
pub struct IdentityRegistry {
    state: Mutex<RegistryState>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState {
                next_id: 1,
                ..Default::default()
            }),
        }
    }

    /// Resolves a name to an entity id as of a date.
    ///
    /// The alias table is filtered on
    /// `valid_from <= as_of && (valid_to is null || valid_to >= as_of)`.
    /// A hit populates the memo. A miss with `auto_ingest` mints a new entity
    /// plus an alias starting at `as_of`, open-ended unless a later window of
    /// the same kind already holds the text; a miss without it fails with
    /// `EntityNotFound`.
    pub fn resolve(
        &self,
        name: &str,
        kind: EntityKind,
        as_of: NaiveDate,
        auto_ingest: bool,
    ) -> RegistryResult<EntityId> {
        let mut state = self.state.lock().expect("registry lock poisoned");

        let memo_key = (kind, name.to_string(), as_of);
        if let Some(id) = state.memo.get(&memo_key) {
            return Ok(*id);
        }

        let found = state.aliases.get(name).and_then(|bucket| {
            bucket
                .iter()
                .find(|alias| {
                    alias.covers(as_of)
                        && state
                            .entities
                            .get(&alias.entity_id)
                            .map_or(false, |e| e.kind == kind)
                })
                .map(|alias| alias.entity_id)
        });

        if let Some(id) = found {
            state.memo.insert(memo_key, id);
            return Ok(id);
        }

        if !auto_ingest {
            return Err(RegistryError::EntityNotFound {
                name: name.to_string(),
                kind,
                as_of,
            });
        }

        let id = EntityId(state.next_id);
        state.next_id += 1;

        // Later windows for the same text and kind must stay reachable, so
        // the minted alias ends where the next such window begins.
        let valid_to = state
            .aliases
            .get(name)
            .into_iter()
            .flatten()
            .filter(|alias| {
                alias.valid_from > as_of
                    && state
                        .entities
                        .get(&alias.entity_id)
                        .map_or(false, |e| e.kind == kind)
            })
            .map(|alias| alias.valid_from)
            .min()
            .and_then(|next_from| next_from.pred_opt());

        state.entities.insert(
            id,
            Entity {
                id,
                kind,
                primary_name: name.to_string(),
            },
        );
        state
            .aliases
            .entry(name.to_string())
            .or_default()
            .push(Alias {
                alias_text: name.to_string(),
                entity_id: id,
                valid_from: as_of,
                valid_to,
            });
        state.memo.insert(memo_key, id);
        Ok(id)
    }

    /// Registers an additional name for an existing entity, valid over the
    /// given window. Overlapping windows for the same text and kind are
    /// rejected so resolution stays unambiguous at every date.
    pub fn add_alias(
        &self,
        alias_text: &str,
        entity_id: EntityId,
        valid_from: NaiveDate,
        valid_to: Option<NaiveDate>,
    ) -> RegistryResult<()> {
        let mut state = self.state.lock().expect("registry lock poisoned");
        // The alias must name a known entity; its kind scopes the check.
        let kind = state
            .entities
            .get(&entity_id)
            .ok_or_else(|| RegistryError::EntityNotFound {
                name: alias_text.to_string(),
                kind: EntityKind::Player,
                as_of: valid_from,
            })?
            .kind;
        if let Some(bucket) = state.aliases.get(alias_text) {
            let conflict = bucket.iter().find(|a| {
                a.overlaps(valid_from, valid_to)
                    && state
                        .entities
                        .get(&a.entity_id)
                        .map_or(false, |e| e.kind == kind)
            });
            if let Some(existing) = conflict {
                return Err(RegistryError::AliasOverlap {
                    alias_text: alias_text.to_string(),
                    existing_from: existing.valid_from,
                });
            }
        }
        let bucket = state.aliases.entry(alias_text.to_string()).or_default();
        bucket.push(Alias {
            alias_text: alias_text.to_string(),
            entity_id,
            valid_from,
            valid_to,
        });
        bucket.sort_by_key(|a| a.valid_from);
        Ok(())
    }

    /// Closes the open-ended window of an existing alias at `end`, so a
    /// successor window can be registered afterwards.
    pub fn end_alias(&self, alias_text: &str, end: NaiveDate) -> RegistryResult<()> {
        let mut state = self.state.lock().expect("registry lock poisoned");
        let bucket = state.aliases.get_mut(alias_text).ok_or_else(|| {
            RegistryError::EntityNotFound {
                name: alias_text.to_string(),
                kind: EntityKind::Player,
                as_of: end,
            }
        })?;
        for alias in bucket.iter_mut() {
            if alias.valid_to.is_none() {
                alias.valid_to = Some(end);
            }
        }
        Ok(())
    }

    /// Looks up an entity record by id.
    pub fn entity(&self, id: EntityId) -> Option<Entity> {
        let state = self.state.lock().expect("registry lock poisoned");
        state.entities.get(&id).cloned()
    }

    /// Resolves a player name as of a match date.
    pub fn resolve_player(
        &self,
        name: &str,
        as_of: NaiveDate,
        auto_ingest: bool,
    ) -> RegistryResult<EntityId> {
        self.resolve(name, EntityKind::Player, as_of, auto_ingest)
    }

    /// Resolves a team name; defaults to today when no date is given.
    pub fn resolve_team(
        &self,
        name: &str,
        as_of: Option<NaiveDate>,
        auto_ingest: bool,
    ) -> RegistryResult<EntityId> {
        let date = as_of.unwrap_or_else(|| Utc::now().date_naive());
        self.resolve(name, EntityKind::Team, date, auto_ingest)
    }

    /// Resolves a venue name; defaults to today when no date is given.
    pub fn resolve_venue(
        &self,
        name: &str,
        as_of: Option<NaiveDate>,
        auto_ingest: bool,
    ) -> RegistryResult<EntityId> {
        let date = as_of.unwrap_or_else(|| Utc::now().date_naive());
        self.resolve(name, EntityKind::Venue, date, auto_ingest)
    }
}

impl Default for IdentityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_auto_ingest_mints_sequential_ids() {
        let registry = IdentityRegistry::new();
        let a = registry
            .resolve("V Kohli", EntityKind::Player, d(2023, 5, 21), true)
            .unwrap();
        let b = registry
            .resolve("J Bumrah", EntityKind::Player, d(2023, 5, 21), true)
            .unwrap();
        assert_eq!(a, EntityId(1));
        assert_eq!(b, EntityId(2));
    }

    #[test]
    fn test_resolution_idempotent() {
        let registry = IdentityRegistry::new();
        let first = registry
            .resolve("V Kohli", EntityKind::Player, d(2023, 5, 21), true)
            .unwrap();
        let second = registry
            .resolve("V Kohli", EntityKind::Player, d(2023, 5, 21), true)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_miss_without_auto_ingest_fails() {
        let registry = IdentityRegistry::new();
        let err = registry
            .resolve("Nobody", EntityKind::Player, d(2023, 1, 1), false)
            .unwrap_err();
        assert_eq!(err.code().code(), "PITCH_ENTITY_NOT_FOUND");
    }

    #[test]
    fn test_kinds_do_not_collide() {
        let registry = IdentityRegistry::new();
        let team = registry
            .resolve("Mumbai", EntityKind::Team, d(2023, 1, 1), true)
            .unwrap();
        // Same text as a venue is a different entity.
        let venue = registry
            .resolve("Mumbai", EntityKind::Venue, d(2023, 1, 1), true)
            .unwrap();
        assert_ne!(team, venue);
    }

    #[test]
    fn test_same_text_allowed_across_kinds() {
        let registry = IdentityRegistry::new();
        let team = registry
            .resolve("Mumbai", EntityKind::Team, d(2020, 1, 1), true)
            .unwrap();
        let venue = registry
            .resolve("Brabourne Stadium", EntityKind::Venue, d(2020, 1, 1), true)
            .unwrap();
        // The venue may carry the team's text over an overlapping window.
        registry.add_alias("Mumbai", venue, d(2019, 1, 1), None).unwrap();

        let as_team = registry
            .resolve("Mumbai", EntityKind::Team, d(2021, 1, 1), false)
            .unwrap();
        let as_venue = registry
            .resolve("Mumbai", EntityKind::Venue, d(2021, 1, 1), false)
            .unwrap();
        assert_eq!(as_team, team);
        assert_eq!(as_venue, venue);
    }

    #[test]
    fn test_alias_for_unknown_entity_rejected() {
        let registry = IdentityRegistry::new();
        let err = registry
            .add_alias("Ghost", EntityId(99), d(2020, 1, 1), None)
            .unwrap_err();
        assert_eq!(err.code().code(), "PITCH_ENTITY_NOT_FOUND");
    }

    #[test]
    fn test_auto_ingest_window_bounded_by_later_alias() {
        let registry = IdentityRegistry::new();
        // First seen in a 2024 match.
        let newer = registry
            .resolve("Gotham Giants", EntityKind::Team, d(2024, 4, 1), true)
            .unwrap();
        // An older match arrives later; its entity must not shadow the 2024
        // window for the same text.
        let older = registry
            .resolve("Gotham Giants", EntityKind::Team, d(2022, 4, 1), true)
            .unwrap();
        assert_ne!(older, newer);

        assert_eq!(
            registry
                .resolve("Gotham Giants", EntityKind::Team, d(2023, 6, 1), false)
                .unwrap(),
            older
        );
        assert_eq!(
            registry
                .resolve("Gotham Giants", EntityKind::Team, d(2024, 4, 1), false)
                .unwrap(),
            newer
        );
        assert_eq!(
            registry
                .resolve("Gotham Giants", EntityKind::Team, d(2025, 1, 1), false)
                .unwrap(),
            newer
        );
    }

    #[test]
    fn test_temporal_windows_resolve_per_date() {
        let registry = IdentityRegistry::new();
        let id = registry
            .resolve("Delhi Capitals", EntityKind::Team, d(2019, 1, 1), true)
            .unwrap();
        registry
            .add_alias(
                "Delhi Daredevils",
                id,
                d(2008, 1, 1),
                Some(d(2018, 12, 31)),
            )
            .unwrap();

        let old_name = registry
            .resolve("Delhi Daredevils", EntityKind::Team, d(2012, 5, 1), false)
            .unwrap();
        assert_eq!(old_name, id);

        // Outside the bounded window the old name no longer resolves.
        let err = registry
            .resolve("Delhi Daredevils", EntityKind::Team, d(2020, 5, 1), false)
            .unwrap_err();
        assert_eq!(err.code().code(), "PITCH_ENTITY_NOT_FOUND");
    }

    #[test]
    fn test_overlapping_alias_rejected() {
        let registry = IdentityRegistry::new();
        let id = registry
            .resolve("Punjab Kings", EntityKind::Team, d(2021, 1, 1), true)
            .unwrap();
        registry
            .add_alias("Kings XI", id, d(2008, 1, 1), Some(d(2020, 12, 31)))
            .unwrap();
        let err = registry
            .add_alias("Kings XI", id, d(2020, 1, 1), None)
            .unwrap_err();
        assert_eq!(err.code().code(), "PITCH_ALIAS_OVERLAP");
    }

    #[test]
    fn test_end_alias_allows_successor_window() {
        let registry = IdentityRegistry::new();
        let id = registry
            .resolve("Old Ground", EntityKind::Venue, d(2010, 1, 1), true)
            .unwrap();
        registry.end_alias("Old Ground", d(2015, 12, 31)).unwrap();
        let successor = registry
            .resolve("New Ground", EntityKind::Venue, d(2016, 1, 1), true)
            .unwrap();
        registry
            .add_alias("Old Ground", successor, d(2016, 1, 1), None)
            .unwrap();

        // Fresh registry session state: the memo already holds the 2010
        // resolution, which is fine: same date, same answer.
        assert_eq!(
            registry
                .resolve("Old Ground", EntityKind::Venue, d(2012, 1, 1), false)
                .unwrap(),
            id
        );
        assert_eq!(
            registry
                .resolve("Old Ground", EntityKind::Venue, d(2017, 1, 1), false)
                .unwrap(),
            successor
        );
    }

    #[test]
    fn test_concurrent_auto_ingest_single_entity() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(IdentityRegistry::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                registry
                    .resolve("R Jadeja", EntityKind::Player, d(2023, 5, 21), true)
                    .unwrap()
            }));
        }
        let ids: Vec<EntityId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
    }
}
