//! Rendering model adapter.
//!
//! Projects a [`RequestSnapshot`] into display order and decides the status
//! banner. The phase is a pure function of whether browser data arrived;
//! nothing here is stored between requests.

use crate::reflection::{MultiMap, RequestSnapshot};

pub const COLLECTING_MESSAGE: &str = "Collecting additional details from your browser...";
pub const ENRICHED_MESSAGE: &str = "Browser-supplied metadata is shown below.";

/// Where a page sits in the two-phase collection flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionPhase {
    /// First render: the embedded script will post browser data.
    AwaitingClientData,
    /// Browser data was received and is part of this render.
    EnrichedRendered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
}

impl Severity {
    /// Suffix of the banner CSS class.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBanner {
    pub message: &'static str,
    pub severity: Severity,
}

impl CollectionPhase {
    pub fn banner(&self) -> StatusBanner {
        match self {
            CollectionPhase::AwaitingClientData => StatusBanner {
                message: COLLECTING_MESSAGE,
                severity: Severity::Info,
            },
            CollectionPhase::EnrichedRendered => StatusBanner {
                message: ENRICHED_MESSAGE,
                severity: Severity::Success,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValues {
    pub key: String,
    pub values: Vec<String>,
}

/// Display-ready view of one snapshot.
#[derive(Debug, Clone)]
pub struct RenderModel {
    pub snapshot: RequestSnapshot,
    pub headers: Vec<KeyValues>,
    pub query: Vec<KeyValues>,
    pub client_json: Option<String>,
    pub phase: CollectionPhase,
    pub status: StatusBanner,
}

impl RenderModel {
    pub fn new(snapshot: RequestSnapshot) -> Self {
        let phase = if snapshot.client_data.is_supplied() {
            CollectionPhase::EnrichedRendered
        } else {
            CollectionPhase::AwaitingClientData
        };
        Self {
            headers: sorted_pairs(snapshot.headers.as_ref()),
            query: sorted_pairs(snapshot.query.as_ref()),
            client_json: snapshot.client_data.to_pretty_json(),
            status: phase.banner(),
            phase,
            snapshot,
        }
    }

    pub fn has_client_data(&self) -> bool {
        self.phase == CollectionPhase::EnrichedRendered
    }
}

fn sorted_pairs(map: Option<&MultiMap>) -> Vec<KeyValues> {
    map.into_iter()
        .flatten()
        .map(|(key, values)| KeyValues {
            key: key.clone(),
            values: values.clone(),
        })
        .collect()
}
