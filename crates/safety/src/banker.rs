//! Banker's algorithm: admission control for multi-unit resource requests.
//!
//! A request is granted only if the state it would produce still admits an
//! order in which every process can obtain its remaining need and finish.

use std::collections::{BTreeMap, BTreeSet};
use schedsim_core::{Pid, ResourceId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use crate::error::{Result, SafetyError};

/// Units per resource type. Missing entries count as zero.
pub type ResourceVector = BTreeMap<ResourceId, u64>;

fn units(vector: &ResourceVector, resource: &str) -> u64 {
    vector.get(resource).copied().unwrap_or(0)
}

/// What a process holds and the most it may ever hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessClaim {
    /// Units currently held
    #[serde(default)]
    pub allocation: ResourceVector,
    /// Declared maximum per resource
    #[serde(default)]
    pub max_need: ResourceVector,
}

impl ProcessClaim {
    /// Create a claim.
    pub fn new(allocation: ResourceVector, max_need: ResourceVector) -> Self {
        Self { allocation, max_need }
    }

    /// Remaining need for one resource.
    pub fn need(&self, resource: &str) -> u64 {
        units(&self.max_need, resource).saturating_sub(units(&self.allocation, resource))
    }

    /// Remaining need for every resource the claim mentions.
    pub fn need_vector(&self) -> ResourceVector {
        self.max_need
            .keys()
            .chain(self.allocation.keys())
            .map(|r| (r.clone(), self.need(r)))
            .collect()
    }

    /// Whether the remaining need fits in `work` for every resource.
    pub fn fits_within(&self, work: &ResourceVector) -> bool {
        self.max_need
            .keys()
            .all(|r| self.need(r) <= units(work, r))
    }
}

/// Ascending-pid finishing order that lets every process complete, if any.
///
/// Each round scans unfinished processes from the lowest pid and finishes the
/// first whose need fits in the working pool, returning its allocation to the
/// pool. A round with no eligible process while some remain means unsafe.
pub fn safe_sequence(
    processes: &BTreeMap<Pid, ProcessClaim>,
    available: &ResourceVector,
) -> Option<Vec<Pid>> {
    let mut work = available.clone();
    let mut finished: BTreeSet<Pid> = BTreeSet::new();
    let mut sequence = Vec::with_capacity(processes.len());

    while let Some((&pid, claim)) = processes
        .iter()
        .find(|(pid, claim)| !finished.contains(*pid) && claim.fits_within(&work))
    {
        for (resource, &held) in &claim.allocation {
            let pool = work.entry(resource.clone()).or_insert(0);
            *pool = pool.saturating_add(held);
        }
        finished.insert(pid);
        sequence.push(pid);
    }

    (sequence.len() == processes.len()).then_some(sequence)
}

/// Whether every process can finish from this state.
pub fn is_safe(processes: &BTreeMap<Pid, ProcessClaim>, available: &ResourceVector) -> bool {
    safe_sequence(processes, available).is_some()
}

/// Flat `(granted, reason)` view of a request result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOutcome {
    /// Whether the request was committed
    pub granted: bool,
    /// "Request granted" or the rejection reason
    pub reason: String,
}

impl From<&Result<()>> for RequestOutcome {
    fn from(result: &Result<()>) -> Self {
        match result {
            Ok(()) => Self {
                granted: true,
                reason: "Request granted".to_string(),
            },
            Err(e) => Self {
                granted: false,
                reason: e.reason(),
            },
        }
    }
}

/// Free units plus every process's claim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyState {
    available: ResourceVector,
    processes: BTreeMap<Pid, ProcessClaim>,
}

impl SafetyState {
    /// Start with `available` free units and no processes.
    pub fn new(available: ResourceVector) -> Self {
        Self {
            available,
            processes: BTreeMap::new(),
        }
    }

    /// Register a process.
    ///
    /// Every resource it mentions must be tracked in `available`, and no
    /// allocation may exceed the declared maximum.
    pub fn add_process(
        &mut self,
        pid: Pid,
        allocation: ResourceVector,
        max_need: ResourceVector,
    ) -> Result<()> {
        if self.processes.contains_key(&pid) {
            return Err(SafetyError::DuplicatePid(pid));
        }
        self.ensure_tracked(allocation.keys().chain(max_need.keys()))?;

        for (resource, &held) in &allocation {
            let max = units(&max_need, resource);
            if held > max {
                return Err(SafetyError::InvalidClaim {
                    pid,
                    resource: resource.clone(),
                    allocation: held,
                    max_need: max,
                });
            }
        }

        self.processes.insert(pid, ProcessClaim::new(allocation, max_need));
        Ok(())
    }

    /// Free units per resource.
    pub fn available(&self) -> &ResourceVector {
        &self.available
    }

    /// All claims, keyed by pid.
    pub fn processes(&self) -> &BTreeMap<Pid, ProcessClaim> {
        &self.processes
    }

    /// One process's claim.
    pub fn process(&self, pid: Pid) -> Option<&ProcessClaim> {
        self.processes.get(&pid)
    }

    /// Remaining need of one process.
    pub fn need(&self, pid: Pid) -> Option<ResourceVector> {
        self.processes.get(&pid).map(ProcessClaim::need_vector)
    }

    /// Whether the current state is safe.
    pub fn is_safe(&self) -> bool {
        is_safe(&self.processes, &self.available)
    }

    /// Finishing order proving the current state safe.
    pub fn safe_sequence(&self) -> Option<Vec<Pid>> {
        safe_sequence(&self.processes, &self.available)
    }

    /// Grant `request` to `pid` if doing so keeps the state safe.
    ///
    /// Checks run in order: unknown pid, untracked resource, request above
    /// remaining need, request above free units, then the safety test on a
    /// tentative copy. Nothing changes unless every check passes.
    ///
    /// A resource missing from `available` is rejected as `ResourceNotFound`
    /// before any need check, even for a zero-unit request. That is the one
    /// rejection outside the need/available/unsafe trio.
    pub fn request_resources(&mut self, pid: Pid, request: &ResourceVector) -> Result<()> {
        let claim = self.processes.get(&pid).ok_or(SafetyError::PidNotFound(pid))?;
        self.ensure_tracked(request.keys())?;

        for (resource, &requested) in request {
            let need = claim.need(resource);
            if requested > need {
                return Err(SafetyError::ExceedsMaxNeed {
                    pid,
                    resource: resource.clone(),
                    requested,
                    need,
                });
            }
        }

        for (resource, &requested) in request {
            let available = units(&self.available, resource);
            if requested > available {
                return Err(SafetyError::InsufficientAvailable {
                    pid,
                    resource: resource.clone(),
                    requested,
                    available,
                });
            }
        }

        let mut available = self.available.clone();
        let mut processes = self.processes.clone();
        if let Some(claim) = processes.get_mut(&pid) {
            for (resource, &requested) in request {
                *available.entry(resource.clone()).or_insert(0) -= requested;
                *claim.allocation.entry(resource.clone()).or_insert(0) += requested;
            }
        }

        match safe_sequence(&processes, &available) {
            Some(sequence) => {
                debug!("Safe sequence after granting {}: {:?}", pid, sequence);
                self.available = available;
                self.processes = processes;
                info!("Granted {:?} to {}", request, pid);
                Ok(())
            }
            None => {
                warn!("Denied {:?} to {}: state would be unsafe", request, pid);
                Err(SafetyError::UnsafeState(pid))
            }
        }
    }

    /// Return units held by `pid` to the free pool.
    pub fn release_resources(&mut self, pid: Pid, release: &ResourceVector) -> Result<()> {
        let claim = self.processes.get(&pid).ok_or(SafetyError::PidNotFound(pid))?;
        self.ensure_tracked(release.keys())?;

        for (resource, &released) in release {
            let allocated = units(&claim.allocation, resource);
            if released > allocated {
                return Err(SafetyError::ExceedsAllocation {
                    pid,
                    resource: resource.clone(),
                    released,
                    allocated,
                });
            }
        }

        if let Some(claim) = self.processes.get_mut(&pid) {
            for (resource, &released) in release {
                *claim.allocation.entry(resource.clone()).or_insert(0) -= released;
                let pool = self.available.entry(resource.clone()).or_insert(0);
                *pool = pool.saturating_add(released);
            }
        }
        debug!("{} released {:?}", pid, release);
        Ok(())
    }

    fn ensure_tracked<'a>(&self, resources: impl IntoIterator<Item = &'a ResourceId>) -> Result<()> {
        for resource in resources {
            if !self.available.contains_key(resource) {
                return Err(SafetyError::ResourceNotFound(resource.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(pairs: &[(&str, u64)]) -> ResourceVector {
        pairs.iter().map(|&(r, n)| (r.to_string(), n)).collect()
    }

    fn abc(a: u64, b: u64, c: u64) -> ResourceVector {
        vector(&[("A", a), ("B", b), ("C", c)])
    }

    fn single() -> SafetyState {
        let mut state = SafetyState::new(vector(&[("A", 3)]));
        state
            .add_process(Pid::new(1), vector(&[("A", 1)]), vector(&[("A", 4)]))
            .unwrap();
        state
    }

    fn textbook() -> SafetyState {
        let mut state = SafetyState::new(abc(3, 3, 2));
        let claims = [
            (abc(0, 1, 0), abc(7, 5, 3)),
            (abc(2, 0, 0), abc(3, 2, 2)),
            (abc(3, 0, 2), abc(9, 0, 2)),
            (abc(2, 1, 1), abc(2, 2, 2)),
            (abc(0, 0, 2), abc(4, 3, 3)),
        ];
        for (i, (allocation, max_need)) in claims.into_iter().enumerate() {
            state.add_process(Pid::new(i as u32 + 1), allocation, max_need).unwrap();
        }
        state
    }

    #[test]
    fn test_single_process_request_granted() {
        let mut state = single();
        let result = state.request_resources(Pid::new(1), &vector(&[("A", 2)]));

        let outcome = RequestOutcome::from(&result);
        assert!(outcome.granted);
        assert_eq!(outcome.reason, "Request granted");
        assert_eq!(state.available(), &vector(&[("A", 1)]));
        assert_eq!(state.process(Pid::new(1)).unwrap().allocation, vector(&[("A", 3)]));
    }

    #[test]
    fn test_request_above_need_is_rejected() {
        let mut state = single();
        let before = state.clone();
        let result = state.request_resources(Pid::new(1), &vector(&[("A", 4)]));

        assert!(matches!(result, Err(SafetyError::ExceedsMaxNeed { need: 3, .. })));
        assert_eq!(RequestOutcome::from(&result).reason, "exceeds maximum need");
        assert_eq!(state, before);
    }

    #[test]
    fn test_unknown_pid() {
        let mut state = single();
        let result = state.request_resources(Pid::new(9), &vector(&[("A", 1)]));
        assert_eq!(result, Err(SafetyError::PidNotFound(Pid::new(9))));
        assert_eq!(RequestOutcome::from(&result).reason, "PID not found");
    }

    #[test]
    fn test_untracked_resource() {
        let mut state = single();
        let result = state.request_resources(Pid::new(1), &vector(&[("Z", 1)]));
        assert_eq!(result, Err(SafetyError::ResourceNotFound("Z".to_string())));
    }

    #[test]
    fn test_textbook_safe_sequence() {
        let state = textbook();
        let expected: Vec<Pid> = [2, 4, 1, 3, 5].into_iter().map(Pid::new).collect();
        assert_eq!(state.safe_sequence(), Some(expected));
        assert!(state.is_safe());
    }

    #[test]
    fn test_textbook_request_sequence() {
        let mut state = textbook();

        state.request_resources(Pid::new(2), &abc(1, 0, 2)).unwrap();
        assert_eq!(state.available(), &abc(2, 3, 0));
        assert_eq!(state.need(Pid::new(2)), Some(abc(0, 2, 0)));

        let before = state.clone();
        let result = state.request_resources(Pid::new(5), &abc(3, 3, 0));
        assert!(matches!(result, Err(SafetyError::InsufficientAvailable { available: 2, .. })));
        assert_eq!(RequestOutcome::from(&result).reason, "insufficient available");
        assert_eq!(state, before);

        let result = state.request_resources(Pid::new(1), &abc(0, 2, 0));
        assert_eq!(result, Err(SafetyError::UnsafeState(Pid::new(1))));
        assert_eq!(
            RequestOutcome::from(&result).reason,
            "Request denied (unsafe state)"
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_deadlocked_state_is_unsafe() {
        // Each process holds one unit and needs the other's
        let mut state = SafetyState::new(vector(&[("A", 0), ("B", 0)]));
        state
            .add_process(Pid::new(1), vector(&[("A", 1)]), vector(&[("A", 1), ("B", 1)]))
            .unwrap();
        state
            .add_process(Pid::new(2), vector(&[("B", 1)]), vector(&[("A", 1), ("B", 1)]))
            .unwrap();
        assert!(!state.is_safe());
        assert!(state.safe_sequence().is_none());
    }

    #[test]
    fn test_no_processes_is_safe() {
        assert!(SafetyState::new(vector(&[("A", 0)])).is_safe());
    }

    #[test]
    fn test_add_process_validation() {
        let mut state = single();
        assert_eq!(
            state.add_process(Pid::new(1), ResourceVector::new(), ResourceVector::new()),
            Err(SafetyError::DuplicatePid(Pid::new(1)))
        );
        assert!(matches!(
            state.add_process(Pid::new(2), vector(&[("A", 3)]), vector(&[("A", 2)])),
            Err(SafetyError::InvalidClaim { allocation: 3, max_need: 2, .. })
        ));
        assert_eq!(
            state.add_process(Pid::new(3), ResourceVector::new(), vector(&[("Q", 1)])),
            Err(SafetyError::ResourceNotFound("Q".to_string()))
        );
        assert_eq!(state.processes().len(), 1);
    }

    #[test]
    fn test_release_returns_units() {
        let mut state = single();
        state.release_resources(Pid::new(1), &vector(&[("A", 1)])).unwrap();
        assert_eq!(state.available(), &vector(&[("A", 4)]));
        assert_eq!(state.need(Pid::new(1)), Some(vector(&[("A", 4)])));
    }

    #[test]
    fn test_release_more_than_held() {
        let mut state = single();
        let before = state.clone();
        let result = state.release_resources(Pid::new(1), &vector(&[("A", 2)]));
        assert!(matches!(result, Err(SafetyError::ExceedsAllocation { allocated: 1, .. })));
        assert_eq!(state, before);
    }

    #[test]
    fn test_need_ignores_over_allocation_underflow() {
        let claim = ProcessClaim::new(vector(&[("A", 2)]), vector(&[("A", 2), ("B", 1)]));
        assert_eq!(claim.need("A"), 0);
        assert_eq!(claim.need("B"), 1);
        assert!(claim.fits_within(&vector(&[("B", 1)])));
        assert!(!claim.fits_within(&vector(&[("A", 5)])));
    }

    #[test]
    fn test_huge_pool_does_not_overflow() {
        let mut state = SafetyState::new(vector(&[("A", u64::MAX)]));
        state
            .add_process(Pid::new(1), vector(&[("A", 1)]), vector(&[("A", 1)]))
            .unwrap();
        assert!(state.is_safe());
        assert_eq!(state.safe_sequence(), Some(vec![Pid::new(1)]));

        state.release_resources(Pid::new(1), &vector(&[("A", 1)])).unwrap();
        assert_eq!(state.available(), &vector(&[("A", u64::MAX)]));
    }

    #[test]
    fn test_zero_unit_request_for_untracked_resource() {
        let mut state = single();
        let before = state.clone();
        let result = state.request_resources(Pid::new(1), &vector(&[("Z", 0)]));
        assert_eq!(result, Err(SafetyError::ResourceNotFound("Z".to_string())));
        assert_eq!(state, before);
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let state = single();
        let json = serde_json::to_string(&state).unwrap();
        let back: SafetyState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
