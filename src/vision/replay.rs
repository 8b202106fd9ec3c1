//! Landmark replay from JSON Lines, for running the pipeline without a model.
//!
//! One record per line: `{"frame": 12, "face": [[x, y], ...], "hand": [[x, y], ...]}`.
//! Either list may be omitted or `null` when that subject was not detected.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{Frame, FrameStamp, Landmark, LandmarkProvider, Landmarks};

/// Which subject a replay provider answers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkKind {
    Face,
    Hand,
}

#[derive(Debug, Deserialize)]
struct ReplayRecord {
    frame: u64,
    #[serde(default)]
    face: Option<Vec<[f32; 2]>>,
    #[serde(default)]
    hand: Option<Vec<[f32; 2]>>,
}

/// Serves recorded landmarks keyed by frame index.
#[derive(Debug, Clone)]
pub struct JsonlLandmarks {
    kind: LandmarkKind,
    records: HashMap<u64, Landmarks>,
}

impl JsonlLandmarks {
    pub fn open(path: &Path, kind: LandmarkKind) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open landmark replay {}", path.display()))?;
        Self::from_reader(BufReader::new(file), kind)
            .with_context(|| format!("invalid landmark replay {}", path.display()))
    }

    pub fn from_reader<R: BufRead>(reader: R, kind: LandmarkKind) -> Result<Self> {
        let mut records = HashMap::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let record: ReplayRecord = serde_json::from_str(trimmed)
                .with_context(|| format!("line {}", line_no + 1))?;
            let points = match kind {
                LandmarkKind::Face => record.face,
                LandmarkKind::Hand => record.hand,
            };
            if let Some(points) = points {
                let points = points
                    .into_iter()
                    .map(|[x, y]| Landmark::new(x, y))
                    .collect();
                records.insert(record.frame, Landmarks::new(points));
            }
        }
        Ok(Self { kind, records })
    }

    pub fn kind(&self) -> LandmarkKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl LandmarkProvider for JsonlLandmarks {
    fn detect(&mut self, _frame: &Frame, stamp: FrameStamp) -> Result<Option<Landmarks>> {
        Ok(self
            .records
            .get(&stamp.index)
            .filter(|marks| !marks.points.is_empty())
            .cloned())
    }
}
