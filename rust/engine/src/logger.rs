use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::game::{Phase, Winner};
use crate::player::{ActionKind, PlayerId};

/// Records a single accepted action, tagged with the phase it happened in.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub player_id: PlayerId,
    pub phase: Phase,
    pub action: ActionKind,
    /// Chips moved by the action (raise records the increment)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u32>,
}

/// Complete record of a finished hand.
/// Serialized to JSONL format for hand history storage.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandRecord {
    /// Unique per room (format: YYYYMMDD-NNNNNN)
    pub hand_id: String,
    pub room_code: String,
    /// Chronological list of all player actions
    pub actions: Vec<ActionRecord>,
    /// Community cards on the board (up to 5 cards)
    pub board: Vec<Card>,
    pub winners: Vec<Winner>,
    pub pot: u32,
    #[serde(default)]
    pub remainder: u32,
    /// Timestamp when the hand finished (RFC3339 format)
    #[serde(default)]
    pub ts: Option<String>,
}

pub fn format_hand_id(yyyymmdd: &str, seq: u32) -> String {
    format!("{}-{:06}", yyyymmdd, seq)
}

use chrono::{SecondsFormat, Utc};
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Appends finished hands to a JSONL file, one record per line.
pub struct HandLogger {
    writer: BufWriter<File>,
}

impl HandLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(f),
        })
    }

    pub fn write(&mut self, record: &HandRecord) -> std::io::Result<()> {
        // inject timestamp if missing
        let mut rec = record.clone();
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

impl std::fmt::Debug for HandLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandLogger").finish_non_exhaustive()
    }
}
