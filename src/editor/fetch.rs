use crate::workflow::{CapabilityRef, ServiceRef, StepId};
use ahash::AHashMap;

/// Receipt for an outstanding parameter-schema fetch.
///
/// Results are matched back by step id, never by position, so a reorder while
/// the fetch is in flight is harmless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub step_id: StepId,
    pub service: ServiceRef,
    pub capability: CapabilityRef,
    generation: u64,
}

/// What happened to a schema fetch result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaOutcome {
    /// The schema defaults now populate the step's parameters.
    Applied { parameters: usize },
    /// The fetch failed; the step keeps an empty parameter list.
    Failed { warning: String },
    /// The step was deleted or re-targeted since the fetch started.
    Discarded,
}

/// Tracks the newest fetch per step.
///
/// `latest` maps a step's current id to its newest generation and `owners`
/// maps every outstanding generation back to that id, so both always hold
/// the same entries.
#[derive(Debug, Default)]
pub(crate) struct PendingFetches {
    latest: AHashMap<StepId, u64>,
    owners: AHashMap<u64, StepId>,
    next_generation: u64,
}

impl PendingFetches {
    pub(crate) fn issue(
        &mut self,
        step_id: StepId,
        service: ServiceRef,
        capability: CapabilityRef,
    ) -> FetchTicket {
        self.next_generation += 1;
        let generation = self.next_generation;
        if let Some(superseded) = self.latest.insert(step_id.clone(), generation) {
            self.owners.remove(&superseded);
        }
        self.owners.insert(generation, step_id.clone());
        FetchTicket {
            step_id,
            service,
            capability,
            generation,
        }
    }

    /// Consumes the ticket if it is the newest one for its step and returns
    /// the step's current id.
    pub(crate) fn redeem(&mut self, ticket: &FetchTicket) -> Option<StepId> {
        let current = self.owners.remove(&ticket.generation)?;
        self.latest.remove(&current);
        Some(current)
    }

    /// Re-keys outstanding fetches after their steps were assigned new ids.
    ///
    /// The pairs are applied as one batch, so new ids may overlap old ones.
    pub(crate) fn rename_all(&mut self, renames: &[(StepId, StepId)]) {
        let moved: Vec<(StepId, u64)> = renames
            .iter()
            .filter_map(|(old, new)| {
                self.latest
                    .remove(old)
                    .map(|generation| (new.clone(), generation))
            })
            .collect();
        for (new, generation) in moved {
            self.owners.insert(generation, new.clone());
            self.latest.insert(new, generation);
        }
    }

    pub(crate) fn forget(&mut self, step_id: &StepId) {
        if let Some(generation) = self.latest.remove(step_id) {
            self.owners.remove(&generation);
        }
    }

    pub(crate) fn is_pending(&self, step_id: &StepId) -> bool {
        self.latest.contains_key(step_id)
    }

    pub(crate) fn len(&self) -> usize {
        self.latest.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_newest_ticket_redeems() {
        let mut pending = PendingFetches::default();
        let step = StepId::Saved(3);
        let first = pending.issue(
            step.clone(),
            ServiceRef::new("calendar"),
            CapabilityRef::new("event-created"),
        );
        let second = pending.issue(
            step.clone(),
            ServiceRef::new("calendar"),
            CapabilityRef::new("event-updated"),
        );

        assert_eq!(pending.redeem(&first), None);
        assert_eq!(pending.redeem(&second), Some(step.clone()));
        assert_eq!(pending.redeem(&second), None);
        assert!(!pending.is_pending(&step));
    }

    #[test]
    fn tickets_follow_renamed_steps() {
        let mut pending = PendingFetches::default();
        let draft = StepId::draft();
        let ticket = pending.issue(
            draft.clone(),
            ServiceRef::new("mail"),
            CapabilityRef::new("send"),
        );
        pending.rename_all(&[(draft.clone(), StepId::Saved(12))]);

        assert!(pending.is_pending(&StepId::Saved(12)));
        assert_eq!(pending.redeem(&ticket), Some(StepId::Saved(12)));
    }

    #[test]
    fn overlapping_renames_keep_every_ticket() {
        let mut pending = PendingFetches::default();
        let second = pending.issue(
            StepId::Saved(2),
            ServiceRef::new("mail"),
            CapabilityRef::new("send"),
        );
        let third = pending.issue(
            StepId::Saved(3),
            ServiceRef::new("chat"),
            CapabilityRef::new("post-message"),
        );

        pending.rename_all(&[
            (StepId::Saved(2), StepId::Saved(3)),
            (StepId::Saved(3), StepId::Saved(4)),
        ]);

        assert_eq!(pending.redeem(&second), Some(StepId::Saved(3)));
        assert_eq!(pending.redeem(&third), Some(StepId::Saved(4)));
        assert_eq!(pending.len(), 0);
        assert!(pending.owners.is_empty());
    }

    #[test]
    fn superseded_and_forgotten_tickets_are_pruned() {
        let mut pending = PendingFetches::default();
        let step = StepId::Saved(5);
        pending.issue(step.clone(), ServiceRef::new("a"), CapabilityRef::new("x"));
        pending.issue(step.clone(), ServiceRef::new("a"), CapabilityRef::new("y"));
        assert_eq!(pending.owners.len(), 1);

        pending.forget(&step);
        assert!(pending.owners.is_empty());
        assert_eq!(pending.len(), 0);
    }
}
