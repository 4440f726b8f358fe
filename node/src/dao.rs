//! The DAO core: extension registry, proposal execution record, and the
//! authority every privileged call is checked against.

use edao_types::{Authority, BlockHeight, ErrorCode, Principal};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DaoError {
    #[error("caller is not the DAO or an enabled extension")]
    Unauthorised,

    #[error("proposal {0} has already been executed")]
    AlreadyExecuted(String),

    #[error("{0} cannot be an extension")]
    InvalidExtension(String),

    #[error("proposal {0} is not deployed")]
    UnknownProposal(String),
}

impl ErrorCode for DaoError {
    fn code(&self) -> u32 {
        match self {
            Self::Unauthorised => 1000,
            Self::AlreadyExecuted(_) => 1001,
            Self::InvalidExtension(_) => 1002,
            Self::UnknownProposal(_) => 1003,
        }
    }

    fn contract(&self) -> &'static str {
        "edao-core"
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum DaoEvent {
    Construct { bootstrap: Principal },
    Extension { extension: Principal, enabled: bool },
    Execute { proposal: Principal },
}

#[derive(Clone, Debug)]
pub struct DaoCore {
    principal: Principal,
    deployer: Principal,
    constructed: bool,
    extensions: BTreeSet<Principal>,
    /// Proposal -> height it was executed at.
    executed: BTreeMap<Principal, BlockHeight>,
    events: Vec<DaoEvent>,
}

/// Serialisable DAO core state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaoSnapshot {
    pub principal: Principal,
    pub deployer: Principal,
    pub constructed: bool,
    pub extensions: Vec<Principal>,
    pub executed: Vec<(Principal, BlockHeight)>,
}

impl DaoCore {
    pub fn new(principal: Principal, deployer: Principal) -> Self {
        Self {
            principal,
            deployer,
            constructed: false,
            extensions: BTreeSet::new(),
            executed: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn deployer(&self) -> &Principal {
        &self.deployer
    }

    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    pub fn is_extension(&self, who: &Principal) -> bool {
        self.extensions.contains(who)
    }

    pub fn extensions(&self) -> impl Iterator<Item = &Principal> {
        self.extensions.iter()
    }

    pub fn executed_at(&self, proposal: &Principal) -> Option<BlockHeight> {
        self.executed.get(proposal).copied()
    }

    pub fn take_events(&mut self) -> Vec<DaoEvent> {
        std::mem::take(&mut self.events)
    }

    /// Hand control to the DAO. Only the deployer may, and only once; the
    /// caller then executes `bootstrap` as the DAO.
    pub fn construct(
        &mut self,
        bootstrap: &Principal,
        sender: &Principal,
        height: BlockHeight,
    ) -> Result<(), DaoError> {
        if sender != &self.deployer || self.constructed {
            return Err(DaoError::Unauthorised);
        }
        self.constructed = true;
        self.record_execution(bootstrap, height)?;
        info!(%bootstrap, "dao constructed");
        self.events.push(DaoEvent::Construct {
            bootstrap: bootstrap.clone(),
        });
        Ok(())
    }

    /// Enable or disable an extension. Only the DAO or an extension may.
    pub fn set_extension(
        &mut self,
        extension: &Principal,
        enabled: bool,
        caller: &Principal,
    ) -> Result<(), DaoError> {
        if !self.is_dao_or_extension(caller) {
            return Err(DaoError::Unauthorised);
        }
        if !extension.is_contract() || extension == &self.principal {
            return Err(DaoError::InvalidExtension(extension.to_string()));
        }
        if enabled {
            self.extensions.insert(extension.clone());
        } else {
            self.extensions.remove(extension);
        }
        info!(%extension, enabled, "extension set");
        self.events.push(DaoEvent::Extension {
            extension: extension.clone(),
            enabled,
        });
        Ok(())
    }

    /// Mark `proposal` executed on behalf of `caller`. The actions
    /// themselves are run by the state that owns every engine.
    pub fn execute(
        &mut self,
        proposal: &Principal,
        caller: &Principal,
        height: BlockHeight,
    ) -> Result<(), DaoError> {
        if !self.is_dao_or_extension(caller) {
            return Err(DaoError::Unauthorised);
        }
        self.record_execution(proposal, height)
    }

    fn record_execution(
        &mut self,
        proposal: &Principal,
        height: BlockHeight,
    ) -> Result<(), DaoError> {
        if self.executed.contains_key(proposal) {
            return Err(DaoError::AlreadyExecuted(proposal.to_string()));
        }
        self.executed.insert(proposal.clone(), height);
        info!(%proposal, %height, "proposal executed");
        self.events.push(DaoEvent::Execute {
            proposal: proposal.clone(),
        });
        Ok(())
    }

    pub fn snapshot(&self) -> DaoSnapshot {
        DaoSnapshot {
            principal: self.principal.clone(),
            deployer: self.deployer.clone(),
            constructed: self.constructed,
            extensions: self.extensions.iter().cloned().collect(),
            executed: self
                .executed
                .iter()
                .map(|(p, &h)| (p.clone(), h))
                .collect(),
        }
    }

    pub fn from_snapshot(snapshot: DaoSnapshot) -> Self {
        Self {
            principal: snapshot.principal,
            deployer: snapshot.deployer,
            constructed: snapshot.constructed,
            extensions: snapshot.extensions.into_iter().collect(),
            executed: snapshot.executed.into_iter().collect(),
            events: Vec::new(),
        }
    }
}

impl Authority for DaoCore {
    fn is_dao_or_extension(&self, caller: &Principal) -> bool {
        caller == &self.principal || self.extensions.contains(caller)
    }
}
