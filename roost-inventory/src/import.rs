use crate::seat::{SeatError, SeatRepository};
use serde::Serialize;
use tracing::warn;

/// Outcome counts for a bulk import batch.
///
/// Rows are processed independently: a bad row is counted and skipped, it
/// never aborts the rest of the batch.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ImportReport {
    pub total_rows: u64,
    pub created: u64,
    pub skipped_duplicate: u64,
    pub failed: u64,
}

impl ImportReport {
    pub fn note_created(&mut self) {
        self.total_rows += 1;
        self.created += 1;
    }

    pub fn note_skipped_duplicate(&mut self) {
        self.total_rows += 1;
        self.skipped_duplicate += 1;
    }

    pub fn note_failed(&mut self) {
        self.total_rows += 1;
        self.failed += 1;
    }
}

/// Creates one seat per raw row, with row-level isolation.
///
/// The rows arrive as opaque strings from the upload collaborator; validation
/// and normalization are the same as for single-seat creation.
pub async fn import_seats<I, S>(repo: &dyn SeatRepository, rows: I) -> ImportReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut report = ImportReport::default();

    for row in rows {
        let raw = row.as_ref();
        match repo.create(raw).await {
            Ok(_) => report.note_created(),
            Err(SeatError::DuplicateSeatNumber(number)) => {
                warn!(seat_number = %number, "bulk import: duplicate seat number skipped");
                report.note_skipped_duplicate();
            }
            Err(err) => {
                warn!(row = raw, error = %err, "bulk import: row failed");
                report.note_failed();
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::MemorySeatStore;

    #[tokio::test]
    async fn batch_counts_each_row_outcome() {
        let store = MemorySeatStore::new();
        store.create("A-1").await.unwrap();

        let rows = ["A-2", "a-1", "  ", "A-3", "A-2"];
        let report = import_seats(&store, rows).await;

        assert_eq!(
            report,
            ImportReport {
                total_rows: 5,
                created: 2,
                skipped_duplicate: 2,
                failed: 1,
            }
        );

        // The failing and duplicate rows did not block the valid ones.
        let numbers: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.seat_number)
            .collect();
        assert_eq!(numbers, vec!["A-1", "A-2", "A-3"]);
    }

    #[tokio::test]
    async fn import_into_empty_inventory() {
        let store = MemorySeatStore::new();
        let report = import_seats(&store, ["A-1", "A-2"]).await;
        assert_eq!(report.created, 2);
        assert_eq!(report.failed, 0);
        assert_eq!(report.skipped_duplicate, 0);
    }
}
