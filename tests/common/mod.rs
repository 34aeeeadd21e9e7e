use flowcov::stats::{ActivityStat, ApplicationStat, ArchiveStat, ProcessStat};

/// Build one sampling pass: a single-archive application where every row is
/// `(process, activity, execution_count, execution_since_reset)`. Rows for
/// the same process merge, so the process's own counts are the sums over
/// its rows.
pub fn sample_pass(app_name: &str, rows: &[(&str, &str, u64, u64)]) -> ApplicationStat {
    let mut archive = ArchiveStat::new("engine-1");
    for &(process_name, activity, count, since_reset) in rows {
        let mut process = ProcessStat::new(process_name, count, since_reset);
        process.add_activity(ActivityStat::new(process_name, activity, count, since_reset));
        archive.add_process(process);
    }
    let mut app = ApplicationStat::new(app_name);
    app.add_archive(archive);
    app
}
