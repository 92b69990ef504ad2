//! Parallel rule application - every rule over every document
//!
//! The rule set is split into contiguous chunks, one task per chunk, on
//! a dedicated fixed-size pool built for the batch. Documents were fully
//! normalized at parse time, so the parallel phase reads them without
//! any synchronization; the only shared mutable structure is the
//! compiled-locator cache, which is atomic behind its mutex.
//!
//! The submitting thread blocks on a fan-in channel and takes results in
//! completion order. One overall deadline bounds the batch. Any task
//! error or a timeout raises the shared cancel flag, the remaining tasks
//! bail out at their next checkpoint, and the call returns the error
//! with no partial results.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Instant;

use rayon::ThreadPoolBuilder;
use tracing::debug;

use crate::config::EngineConfig;
use crate::dom::{Document, DocumentSet};
use crate::error::{Error, Result};
use crate::rules::RuleSet;
use crate::xpath::{self, XPathValue};

/// Extraction result of one rule: one value-or-absent per document, in
/// document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleExtraction {
    pub rule: String,
    pub values: Vec<Option<String>>,
}

/// Evaluate every rule in `rules` against every document in `docs`.
/// The order of the returned extractions is not specified.
pub fn apply_rules(
    rules: &RuleSet,
    docs: &DocumentSet,
    config: &EngineConfig,
) -> Result<Vec<RuleExtraction>> {
    if rules.is_empty() || docs.is_empty() {
        return Ok(Vec::new());
    }

    let workers = config.resolved_workers();
    let timeout = config.apply_timeout();
    let rule_list: Vec<&str> = rules.iter().collect();
    let chunk_size = rule_list.len().div_ceil(workers);
    let chunks: Vec<&[&str]> = rule_list.chunks(chunk_size).collect();

    debug!(
        rules = rule_list.len(),
        docs = docs.len(),
        workers,
        chunks = chunks.len(),
        timeout_ms = config.apply_timeout_ms,
        "rule application batch"
    );

    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("wrapgen-apply-{}", i))
        .build()
        .map_err(|e| Error::Worker(e.to_string()))?;
    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel();
    let deadline = Instant::now() + timeout;

    let mut collected = Vec::with_capacity(rule_list.len());
    let mut outcome: Result<()> = Ok(());

    pool.in_place_scope(|scope| {
        for (task_index, &chunk) in chunks.iter().enumerate() {
            let tx = tx.clone();
            let cancel = Arc::clone(&cancel);
            scope.spawn(move |_| {
                let out = run_chunk(chunk, docs, task_index, &cancel);
                // The receiver is gone once the batch aborted; fine
                let _ = tx.send(out);
            });
        }
        drop(tx);

        for _ in 0..chunks.len() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok(Ok(part)) => collected.extend(part),
                Ok(Err(error)) => {
                    cancel.store(true, Ordering::Relaxed);
                    outcome = Err(error);
                    break;
                }
                Err(_) => {
                    cancel.store(true, Ordering::Relaxed);
                    outcome = Err(Error::Timeout(timeout));
                    break;
                }
            }
        }
        // Leaving the scope waits for the remaining tasks, which see the
        // cancel flag at their next checkpoint
    });

    outcome.map(|_| collected)
}

/// Evaluate one chunk of rules against the whole collection. The scan
/// starts at a per-task round-robin offset so concurrent tasks spread
/// their reads across the collection instead of marching in lockstep.
fn run_chunk(
    chunk: &[&str],
    docs: &DocumentSet,
    task_index: usize,
    cancel: &AtomicBool,
) -> Result<Vec<RuleExtraction>> {
    let offset = task_index % docs.len();
    let mut results = Vec::with_capacity(chunk.len());

    for &rule in chunk {
        let compiled = xpath::get_or_compile(rule)
            .map_err(|message| Error::Locator(format!("{}: {}", rule, message)))?;
        let mut values: Vec<Option<String>> = vec![None; docs.len()];
        for i in 0..docs.len() {
            if cancel.load(Ordering::Relaxed) {
                return Err(Error::Worker("batch cancelled".to_string()));
            }
            let index = (offset + i) % docs.len();
            let doc = docs.get(index);
            let value = xpath::evaluate_compiled(&compiled, &xpath::root_context(doc))
                .map_err(|message| Error::Locator(format!("{}: {}", rule, message)))?;
            values[index] = extract_value(doc, &value)?;
        }
        results.push(RuleExtraction {
            rule: rule.to_string(),
            values,
        });
    }
    Ok(results)
}

/// A non-empty node-set whose first node (document order) is text yields
/// that node's text; an empty node-set is an absent value; a non-node-set
/// result means the locator does not address nodes at all and fails the
/// batch.
fn extract_value(doc: &Document, value: &XPathValue) -> Result<Option<String>> {
    match value {
        XPathValue::NodeSet(nodes) => match nodes.first() {
            Some(&node) if doc.is_text(node) => Ok(Some(doc.text(node).to_string())),
            _ => Ok(None),
        },
        _ => Err(Error::Worker(
            "locator produced a non-node-set result".to_string(),
        )),
    }
}
