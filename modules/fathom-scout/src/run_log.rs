//! Run log: persisted JSON timeline of every stage of a discovery run.
//!
//! Each run produces a single `{out_dir}/run.json` containing an ordered
//! list of events with timestamps, so an operator can assess data
//! completeness without reading raw logs.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub struct RunLog {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    events: Vec<RunEvent>,
    seq: u32,
}

#[derive(Serialize)]
struct RunEvent {
    seq: u32,
    ts: DateTime<Utc>,
    #[serde(flatten)]
    kind: EventKind,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    SeedsClassified {
        classified: u32,
        no_signal: u32,
    },
    RelationshipsExtracted {
        seeds: u32,
        relationships: u32,
        filtered: u32,
        budget_exhausted: bool,
        permission_denied: bool,
    },
    SnapshotLoaded {
        files: u32,
        relationships: u32,
    },
    GraphBuilt {
        nodes: u32,
        edges: u32,
        pagerank_converged: bool,
        pagerank_iterations: u32,
    },
    CommunitiesDetected {
        communities: u32,
        method: String,
        modularity: f64,
        bridges: u32,
    },
    Ranked {
        candidates: u32,
        multi_source: u32,
    },
}

#[derive(Serialize)]
struct RunLogFile<'a> {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    events: &'a [RunEvent],
}

impl RunLog {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            events: Vec::new(),
            seq: 0,
        }
    }

    pub fn record(&mut self, kind: EventKind) {
        self.seq += 1;
        self.events.push(RunEvent {
            seq: self.seq,
            ts: Utc::now(),
            kind,
        });
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = RunLogFile {
            run_id: self.run_id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            events: &self.events,
        };
        std::fs::write(path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}
