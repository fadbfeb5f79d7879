//! Call-site redirection: one binding per specialized call site, from its
//! exact invocation location to the (possibly shared) generated method.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use sqlbind_core::callsite::{CallSite, EffectiveOptions, OperationKind};
use sqlbind_core::errors::error_code::{self, SqlbindErrorCode};
use sqlbind_core::{ArtifactId, Location};

use crate::synth::GeneratedArtifact;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectBinding {
    pub location: Location,
    pub artifact: ArtifactId,
    pub method: String,
    pub operation: OperationKind,
    pub is_async: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RedirectError {
    #[error("Another call site is already bound at {location}")]
    DuplicateLocation { location: Location },

    #[error("Call site at {location} is in a region opted out of specialization")]
    OptedOut { location: Location },
}

impl SqlbindErrorCode for RedirectError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateLocation { .. } => error_code::REDIRECT_DUPLICATE_LOCATION,
            Self::OptedOut { .. } => error_code::REDIRECT_OPTED_OUT,
        }
    }
}

#[derive(Debug, Default)]
pub struct CallSiteRedirector {
    bindings: BTreeMap<Location, RedirectBinding>,
}

impl CallSiteRedirector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `site` to `artifact`. The location must be unused and the site
    /// must not be opted out.
    pub fn bind(
        &mut self,
        site: &CallSite,
        options: &EffectiveOptions,
        artifact: &GeneratedArtifact,
    ) -> Result<&RedirectBinding, RedirectError> {
        if !options.enabled {
            return Err(RedirectError::OptedOut {
                location: site.location.clone(),
            });
        }
        match self.bindings.entry(site.location.clone()) {
            std::collections::btree_map::Entry::Occupied(_) => Err(RedirectError::DuplicateLocation {
                location: site.location.clone(),
            }),
            std::collections::btree_map::Entry::Vacant(slot) => Ok(slot.insert(RedirectBinding {
                location: site.location.clone(),
                artifact: artifact.id,
                method: artifact.method_name.clone(),
                operation: site.operation,
                is_async: site.is_async,
            })),
        }
    }

    pub fn get(&self, location: &Location) -> Option<&RedirectBinding> {
        self.bindings.get(location)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// All bindings, ordered by location.
    pub fn finish(self) -> Vec<RedirectBinding> {
        self.bindings.into_values().collect()
    }
}

/// Locations claimed by more than one call site.
pub fn find_duplicate_locations(sites: &[CallSite]) -> BTreeSet<Location> {
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for site in sites {
        if !seen.insert(&site.location) {
            duplicates.insert(site.location.clone());
        }
    }
    duplicates
}
