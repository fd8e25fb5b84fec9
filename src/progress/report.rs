//! Report rendering: turns snapshots into the human-readable progress text
//! and the structured final report.

use super::types::{success_rate, ProgressSnapshot, RunReport, WorkerReport};

/// Renders the intermediate progress text published while a run is going.
pub fn render_progress(snapshot: &ProgressSnapshot) -> String {
    let mut text = String::from("Invite progress\n");

    for (worker, record) in &snapshot.workers {
        text.push_str(&format!(
            "  {}: invited {}, failed {} [{}]\n",
            worker, record.invited, record.failed, record.status
        ));
    }

    let invited = snapshot.total_invited();
    let failed = snapshot.total_failed();
    text.push_str(&format!(
        "total: invited {}, failed {}, success rate {}%, elapsed {}s",
        invited,
        failed,
        success_rate(invited, failed),
        snapshot.elapsed_secs
    ));

    text
}

/// Builds the structured final report from a snapshot.
pub fn build_report(snapshot: &ProgressSnapshot) -> RunReport {
    let workers = snapshot
        .workers
        .iter()
        .map(|(worker, record)| WorkerReport {
            worker: worker.clone(),
            invited: record.invited,
            failed: record.failed,
            success_rate: success_rate(record.invited, record.failed),
            final_status: record.status.clone(),
        })
        .collect();

    let invited = snapshot.total_invited();
    let failed = snapshot.total_failed();

    RunReport {
        workers,
        total_invited: invited,
        total_failed: failed,
        success_rate: success_rate(invited, failed),
        duration_secs: snapshot.elapsed_secs,
    }
}

/// Renders the final report text.
pub fn render_final(report: &RunReport) -> String {
    let mut text = String::from("Invite process completed\n");

    for line in &report.workers {
        text.push_str(&format!(
            "  {}: invited {}, failed {}, success rate {}% [{}]\n",
            line.worker, line.invited, line.failed, line.success_rate, line.final_status
        ));
    }

    text.push_str(&format!(
        "total: invited {}, failed {}, success rate {}%, duration {}s",
        report.total_invited, report.total_failed, report.success_rate, report.duration_secs
    ));

    text
}
