/// What `commit` does about the chain a node leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityPolicy {
    /// No check; chain topology is the caller's concern.
    Unchecked,
    /// Refuse moves that take the last node of a chain.
    RejectEmptying,
    /// Refuse moves that empty or split a chain.
    PreserveConnectivity,
}

/// How `delta_shift` scores the required edge, if any, between the two chains of the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePairAccounting {
    /// The two chains are taken to stay in contact, which holds whenever the moving node keeps a
    /// neighbour in its old chain.
    Assumed,
    /// The pair is scored from the ledger like every other pair, so the score equals the change
    /// in satisfied edges exactly.
    Exact,
}

/// Options for the swap-shift engine and the repair drivers
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub connectivity: ConnectivityPolicy,
    pub source_pair: SourcePairAccounting,
    pub max_steps: usize,
    pub seed: usize,
    pub verbose: usize,
}

impl EngineOptions {
    pub fn new() -> Self {
        Self {
            connectivity: ConnectivityPolicy::Unchecked,
            source_pair: SourcePairAccounting::Assumed,
            max_steps: 10_000,
            seed: 0,
            verbose: 0,
        }
    }

    pub fn set_connectivity_policy(&mut self, policy: Option<String>) {
        if let Some(s) = policy {
            match s.as_str() {
                "Unchecked" => self.connectivity = ConnectivityPolicy::Unchecked,
                "RejectEmptying" => self.connectivity = ConnectivityPolicy::RejectEmptying,
                "PreserveConnectivity" => {
                    self.connectivity = ConnectivityPolicy::PreserveConnectivity;
                }
                _ => {}
            }
        }
    }

    pub fn set_source_pair_accounting(&mut self, accounting: Option<String>) {
        if let Some(s) = accounting {
            match s.as_str() {
                "Assumed" => self.source_pair = SourcePairAccounting::Assumed,
                "Exact" => self.source_pair = SourcePairAccounting::Exact,
                _ => {}
            }
        }
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::new()
    }
}
