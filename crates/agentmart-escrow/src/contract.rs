//! Job escrow contract bindings

use agentmart_types::{mnee_from_base_units, Job, JobId, JobStatus};
use alloy_primitives::U256;
use alloy_sol_types::sol;

use crate::error::{EscrowError, Result};

sol! {
    interface IJobEscrow {
        struct Job {
            uint256 id;
            address client;
            address agent;
            uint256 amount;
            string taskType;
            string inputDataHash;
            string resultHash;
            uint8 status;
        }

        event JobCreated(
            uint256 indexed jobId,
            address indexed client,
            address indexed agent,
            uint256 amount,
            string taskType
        );

        function createJob(address agent, uint256 amount, string taskType, string inputData) external returns (uint256);
        function approveJob(uint256 jobId) external;
        function getJob(uint256 jobId) external view returns (Job memory);
        function getJobsByClient(address client) external view returns (uint256[] memory);
    }
}

pub(crate) fn job_id_from_u256(value: U256) -> Result<JobId> {
    u64::try_from(value)
        .map(JobId)
        .map_err(|_| EscrowError::Decode(format!("job id out of range: {}", value)))
}

impl TryFrom<IJobEscrow::Job> for Job {
    type Error = EscrowError;

    fn try_from(raw: IJobEscrow::Job) -> Result<Self> {
        let base_units = u128::try_from(raw.amount)
            .map_err(|_| EscrowError::Decode(format!("amount out of range: {}", raw.amount)))?;

        Ok(Job {
            id: job_id_from_u256(raw.id)?,
            client: raw.client.to_checksum(None),
            agent: raw.agent.to_checksum(None),
            amount_base_units: base_units.to_string(),
            amount: mnee_from_base_units(base_units)?,
            task_type: raw.taskType,
            input_hash: raw.inputDataHash,
            result_hash: raw.resultHash,
            status: JobStatus::from_code(raw.status)?,
        })
    }
}
