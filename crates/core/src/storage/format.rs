//! CSV codec for the persisted event log and holdings snapshot.
//!
//! Column sets are stable so historical files stay loadable as the schema
//! evolves: the event log's `bonus` column was added later, and files
//! without it load with the flag defaulting to false.
//!
//! Event log columns:
//! `date,kind,code,name,quantity,unit_price,avg_price,realized_pl,bonus`
//!
//! Holdings snapshot columns:
//! `code,name,quantity,avg_price,original_avg_price,realized_pl`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;
use crate::models::event::TradeEvent;
use crate::models::holding::Holding;

/// One row of the holdings snapshot file. The in-memory map is keyed by
/// code, so the key is flattened into a column here.
#[derive(Debug, Serialize, Deserialize)]
struct HoldingRow {
    code: String,
    name: String,
    quantity: u32,
    avg_price: f64,
    #[serde(default)]
    original_avg_price: f64,
    realized_pl: f64,
}

/// Serialize the event log to CSV text.
pub fn write_events(events: &[TradeEvent]) -> Result<String, LedgerError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for event in events {
        writer
            .serialize(event)
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;
    }
    into_string(writer)
}

/// Parse an event log from CSV text. Empty input is an empty log.
pub fn read_events(data: &str) -> Result<Vec<TradeEvent>, LedgerError> {
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_reader(data.as_bytes());
    let mut events = Vec::new();
    for record in reader.deserialize() {
        let event: TradeEvent = record?;
        events.push(event);
    }
    Ok(events)
}

/// Serialize the holdings snapshot to CSV text, one row per instrument.
pub fn write_holdings(holdings: &BTreeMap<String, Holding>) -> Result<String, LedgerError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for (code, holding) in holdings {
        let row = HoldingRow {
            code: code.clone(),
            name: holding.name.clone(),
            quantity: holding.quantity,
            avg_price: holding.avg_price,
            original_avg_price: holding.original_avg_price,
            realized_pl: holding.realized_pl,
        };
        writer
            .serialize(row)
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;
    }
    into_string(writer)
}

/// Parse a holdings snapshot from CSV text.
///
/// Only used for display before the first replay finishes; the snapshot is
/// a cache and the event log always wins.
pub fn read_holdings(data: &str) -> Result<BTreeMap<String, Holding>, LedgerError> {
    if data.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let mut reader = csv::Reader::from_reader(data.as_bytes());
    let mut holdings = BTreeMap::new();
    for record in reader.deserialize() {
        let row: HoldingRow = record?;
        holdings.insert(
            row.code,
            Holding {
                name: row.name,
                quantity: row.quantity,
                avg_price: row.avg_price,
                original_avg_price: row.original_avg_price,
                realized_pl: row.realized_pl,
            },
        );
    }
    Ok(holdings)
}

fn into_string(writer: csv::Writer<Vec<u8>>) -> Result<String, LedgerError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| LedgerError::Serialization(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| LedgerError::Serialization(e.to_string()))
}
