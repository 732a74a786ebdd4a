use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use shared::models::{City, SubscribeRequest, UpdateKind, VoteUpdate};
use shared::validation::{
    normalize_city_name, validate_city, validate_email, validate_subscribe_request, ValidationError,
};
use tracing::{debug, error, info, warn};

/// Receives one update per accepted ledger mutation.
pub trait UpdateSink: Send + Sync {
    fn publish(&self, update: VoteUpdate);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteOutcome {
    pub city: City,
    pub duplicate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCityOutcome {
    pub city: City,
    pub is_new_city: bool,
    pub duplicate: bool,
}

pub fn demo_cities() -> Vec<City> {
    vec![
        City::new("Los Angeles", 850),
        City::new("San Francisco", 1480),
        City::new("New York", 1056),
        City::new("Mexico City", 832),
        City::new("Austin", 869),
    ]
}

#[derive(Debug, Default)]
struct LedgerState {
    // Insertion order doubles as the tie-breaker when sorting by votes.
    cities: Vec<City>,
    index: HashMap<String, usize>,
    records: HashSet<(String, String)>,
    subscribers: HashSet<String>,
}

impl LedgerState {
    fn find(&self, key: &str) -> Option<&City> {
        self.index.get(key).map(|&i| &self.cities[i])
    }

    /// Index of the city for `key`, creating it with zero votes if needed.
    fn city_slot(&mut self, key: &str) -> (usize, bool) {
        if let Some(&i) = self.index.get(key) {
            return (i, false);
        }
        self.cities.push(City::new(key, 0));
        let i = self.cities.len() - 1;
        self.index.insert(key.to_string(), i);
        (i, true)
    }

    fn has_voted(&self, city_key: &str, voter_key: &str) -> bool {
        self.records.contains(&(city_key.to_string(), voter_key.to_string()))
    }

    /// Counts the vote unless this voter already has one for the city.
    fn record_vote(&mut self, slot: usize, city_key: &str, voter_key: &str) -> bool {
        if !self.records.insert((city_key.to_string(), voter_key.to_string())) {
            return false;
        }
        self.cities[slot].votes = self.cities[slot].votes.saturating_add(1);
        true
    }

    fn set_subscription(&mut self, voter_key: &str, consent: bool) {
        if consent {
            self.subscribers.insert(voter_key.to_string());
        } else {
            self.subscribers.remove(voter_key);
        }
    }

    fn sorted(&self) -> Vec<City> {
        let mut cities = self.cities.clone();
        cities.sort_by(|a, b| b.votes.cmp(&a.votes));
        cities
    }

    fn replace_cities(&mut self, external: Vec<City>) {
        self.cities.clear();
        self.index.clear();
        for city in external {
            let key = normalize_city_name(&city.name);
            if key.is_empty() {
                warn!("Skipping unnamed city in snapshot");
                continue;
            }
            let (slot, created) = self.city_slot(&key);
            if !created {
                warn!("Snapshot lists {} more than once; keeping the later count", key);
            }
            self.cities[slot].votes = city.votes;
        }
    }
}

/// Process-wide, in-memory vote store. Every public operation runs under
/// a single lock, and updates are published before the lock is released so
/// listeners observe mutations in commit order.
pub struct VoteLedger {
    state: Mutex<LedgerState>,
    sink: Arc<dyn UpdateSink>,
}

impl VoteLedger {
    pub fn new(sink: Arc<dyn UpdateSink>) -> Self {
        Self::with_cities(Vec::new(), sink)
    }

    pub fn with_cities(cities: Vec<City>, sink: Arc<dyn UpdateSink>) -> Self {
        let mut state = LedgerState::default();
        state.replace_cities(cities);
        Self { state: Mutex::new(state), sink }
    }

    // Every mutation completes without panicking, so a poisoned guard still
    // holds consistent state.
    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            error!("Ledger lock poisoned; recovering");
            poisoned.into_inner()
        })
    }

    fn validate(raw_city: &str, voter_email: &str) -> Result<(String, String), ValidationError> {
        let city_key = validate_city(raw_city)?;
        let voter_key = validate_email(voter_email)?;
        Ok((city_key, voter_key))
    }

    /// Cities by vote count, highest first; ties keep insertion order.
    pub fn list_cities(&self) -> Vec<City> {
        self.lock().sorted()
    }

    pub fn city(&self, raw_city: &str) -> Option<City> {
        let key = normalize_city_name(raw_city);
        self.lock().find(&key).cloned()
    }

    pub fn subscribers(&self) -> Vec<String> {
        let mut subscribers: Vec<String> = self.lock().subscribers.iter().cloned().collect();
        subscribers.sort();
        subscribers
    }

    pub fn cast_vote(&self, raw_city: &str, voter_email: &str, consent: bool) -> Result<VoteOutcome, ValidationError> {
        let (city_key, voter_key) = Self::validate(raw_city, voter_email)?;
        let mut state = self.lock();

        if state.has_voted(&city_key, &voter_key) {
            debug!("Duplicate vote for {}", city_key);
            // A reconcile may have dropped the city while its records survive.
            let city = state.find(&city_key).cloned().unwrap_or_else(|| City::new(city_key, 0));
            return Ok(VoteOutcome { city, duplicate: true });
        }

        let (slot, created) = state.city_slot(&city_key);
        state.record_vote(slot, &city_key, &voter_key);
        if consent {
            state.set_subscription(&voter_key, true);
        }

        let city = state.cities[slot].clone();
        let kind = if created { UpdateKind::NewCity } else { UpdateKind::Vote };
        self.sink.publish(VoteUpdate::now(kind, &city));
        debug!("Vote recorded for {} ({} total)", city.name, city.votes);

        Ok(VoteOutcome { city, duplicate: false })
    }

    /// Like [`cast_vote`](Self::cast_vote), but a first mention always
    /// creates the city. The requester's vote counts unless they already
    /// voted for it, and no update is published when nothing changed.
    pub fn request_city(&self, raw_city: &str, voter_email: &str, consent: bool) -> Result<RequestCityOutcome, ValidationError> {
        let (city_key, voter_key) = Self::validate(raw_city, voter_email)?;
        let mut state = self.lock();

        let (slot, created) = state.city_slot(&city_key);
        let voted = state.record_vote(slot, &city_key, &voter_key);
        if consent {
            state.set_subscription(&voter_key, true);
        }

        let city = state.cities[slot].clone();
        if created || voted {
            let kind = if created { UpdateKind::NewCity } else { UpdateKind::Vote };
            self.sink.publish(VoteUpdate::now(kind, &city));
        }
        if created {
            info!("🏙️ New city requested: {}", city.name);
        }

        Ok(RequestCityOutcome { city, is_new_city: created, duplicate: !voted })
    }

    /// Adds or removes the voter from the subscriber set; returns the new
    /// membership.
    pub fn subscribe(&self, request: &SubscribeRequest) -> Result<bool, ValidationError> {
        let voter_key = validate_subscribe_request(request)?;
        self.lock().set_subscription(&voter_key, request.consent);
        Ok(request.consent)
    }

    /// Replaces every city and count with `external`. Vote records and
    /// subscribers are kept, so voters still cannot vote twice for a city
    /// they voted for before the snapshot.
    pub fn reconcile(&self, external: Vec<City>) -> usize {
        let mut state = self.lock();
        state.replace_cities(external);
        info!("🔄 Reconciled ledger to {} cities", state.cities.len());
        state.cities.len()
    }
}
