//! Dense-rank shift applied to the stored job collection.

use crate::model::job::{Job, JobId};

/// Why a shift could not be computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShiftError {
    UnknownJob(JobId),
    OutOfRange { from: i64, to: i64, len: usize },
    /// The moving job is not at `from` in the stored ranking.
    StalePosition { job_id: JobId, stored: i64, from: i64 },
}

/// Moves `job_id` from rank `from` to rank `to`, shifting the jobs between.
///
/// Moving down decrements every rank in `(from, to]`; moving up increments
/// every rank in `[to, from)`. Returns indices of records whose `order`
/// changed. Nothing is touched when an error is returned.
pub fn shift_orders(
    jobs: &mut [Job],
    job_id: JobId,
    from: i64,
    to: i64,
) -> Result<Vec<usize>, ShiftError> {
    let len = jobs.len();
    let in_range = |index: i64| index >= 0 && (index as usize) < len;
    if !in_range(from) || !in_range(to) {
        return Err(ShiftError::OutOfRange { from, to, len });
    }

    let moving = jobs
        .iter()
        .position(|job| job.id == job_id)
        .ok_or(ShiftError::UnknownJob(job_id))?;
    if jobs[moving].order != from {
        return Err(ShiftError::StalePosition {
            job_id,
            stored: jobs[moving].order,
            from,
        });
    }
    if from == to {
        return Ok(Vec::new());
    }

    let mut changed = Vec::new();
    for (index, job) in jobs.iter_mut().enumerate() {
        if index == moving {
            job.order = to;
            changed.push(index);
        } else if from < to && job.order > from && job.order <= to {
            job.order -= 1;
            changed.push(index);
        } else if from > to && job.order >= to && job.order < from {
            job.order += 1;
            changed.push(index);
        }
    }
    Ok(changed)
}
