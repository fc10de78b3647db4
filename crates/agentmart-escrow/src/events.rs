//! Job id extraction from `JobCreated` logs

use std::str::FromStr;

use agentmart_types::JobId;
use alloy_primitives::B256;
use alloy_sol_types::SolEvent;

use crate::client::{decode_hex, RpcLog};
use crate::contract::{job_id_from_u256, IJobEscrow};

fn decode_job_created(log: &RpcLog) -> Option<JobId> {
    let topics = log
        .topics
        .iter()
        .map(|t| B256::from_str(t).ok())
        .collect::<Option<Vec<_>>>()?;

    if topics.first() != Some(&IJobEscrow::JobCreated::SIGNATURE_HASH) {
        return None;
    }

    let data = decode_hex(&log.data).ok()?;
    match IJobEscrow::JobCreated::decode_raw_log(topics, &data, true) {
        Ok(event) => job_id_from_u256(event.jobId).ok(),
        Err(e) => {
            tracing::debug!(error = %e, "JobCreated topic matched but log did not decode");
            None
        }
    }
}

/// First `JobCreated` job id among a receipt's logs
///
/// Logs from other contracts or events are skipped. When `escrow` is given,
/// only logs emitted by that address are considered.
pub fn job_id_from_logs(logs: &[RpcLog], escrow: Option<&str>) -> Option<JobId> {
    logs.iter()
        .filter(|log| match escrow {
            Some(address) => log.address.eq_ignore_ascii_case(address),
            None => true,
        })
        .find_map(decode_job_created)
}
