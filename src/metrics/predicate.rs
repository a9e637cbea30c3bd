use crate::metrics::snapshot::MetricsSnapshot;

/// Decides whether observed counters have converged on the expected total.
///
/// Both sides must match independently: every frame the topology was
/// configured to send has been counted out AND counted back in. Sums run over
/// all records present in the snapshot; an entity missing from the snapshot
/// contributes zero, which reads as "not yet converged" rather than an error.
pub fn counters_converged(snapshot: &MetricsSnapshot, expected: u64) -> bool {
    let tx = snapshot.total_tx();
    let rx = snapshot.total_rx();
    log::debug!("snapshot tx={} rx={} expected={} {:?}", tx, rx, expected, snapshot);
    tx == expected && rx == expected
}
