use std::collections::HashMap;

use anyhow::{bail, Result};
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::log_warn;
use crate::models::Appointment;

const ENABLE_LOGS: bool = true;

/// Anything with an id and a `[start, end)` wall-clock span can be laid out.
pub trait TimeBlock {
    fn id(&self) -> &str;
    fn start(&self) -> NaiveDateTime;
    fn end(&self) -> NaiveDateTime;
}

impl TimeBlock for Appointment {
    fn id(&self) -> &str {
        &self.id
    }

    fn start(&self) -> NaiveDateTime {
        self.start
    }

    fn end(&self) -> NaiveDateTime {
        self.end
    }
}

/// Column assignment for one appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub column: usize,
    pub total_columns: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    EndNotAfterStart,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedAppointment {
    pub id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub reason: RejectReason,
}

/// Result of laying out one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayLayout {
    pub placements: HashMap<String, Placement>,
    pub rejected: Vec<RejectedAppointment>,
    pub cluster_count: usize,
}

impl DayLayout {
    pub fn get(&self, id: &str) -> Option<Placement> {
        self.placements.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Fails if any input was rejected, for callers that treat malformed
    /// appointments as a hard error.
    pub fn ensure_valid(&self) -> Result<()> {
        if self.rejected.is_empty() {
            return Ok(());
        }
        let ids: Vec<&str> = self.rejected.iter().map(|r| r.id.as_str()).collect();
        bail!(
            "{} appointment(s) end at or before their start: {}",
            ids.len(),
            ids.join(", ")
        )
    }
}

/// Assigns every well-formed appointment a column so that overlapping
/// appointments never share one. Appointments whose end is not after their
/// start are left out and listed in `rejected`.
pub fn layout<T: TimeBlock>(appointments: &[T]) -> DayLayout {
    let mut result = DayLayout::default();

    let mut accepted: Vec<(usize, &T)> = Vec::with_capacity(appointments.len());
    for (index, appointment) in appointments.iter().enumerate() {
        if appointment.end() <= appointment.start() {
            log_warn!(
                "Skipping appointment {} in layout: end {} is not after start {}",
                appointment.id(),
                appointment.end(),
                appointment.start()
            );
            result.rejected.push(RejectedAppointment {
                id: appointment.id().to_string(),
                start: appointment.start(),
                end: appointment.end(),
                reason: RejectReason::EndNotAfterStart,
            });
            continue;
        }
        accepted.push((index, appointment));
    }

    // Ties on start fall back to id, then input position, so any permutation
    // of the same input lays out identically.
    accepted.sort_by(|(ia, a), (ib, b)| {
        a.start()
            .cmp(&b.start())
            .then_with(|| a.id().cmp(b.id()))
            .then_with(|| ia.cmp(ib))
    });
    let sorted: Vec<&T> = accepted.into_iter().map(|(_, appointment)| appointment).collect();

    let clusters = form_clusters(sorted);
    result.cluster_count = clusters.len();

    for cluster in &clusters {
        pack_cluster(cluster, &mut result.placements);
    }

    result
}

/// Splits start-sorted appointments into overlap clusters by tracking the
/// latest end seen in the open cluster.
pub fn form_clusters<T: TimeBlock>(sorted: Vec<&T>) -> Vec<Vec<&T>> {
    let mut clusters = Vec::new();
    let mut current: Vec<&T> = Vec::new();
    let mut cluster_end: Option<NaiveDateTime> = None;

    for appointment in sorted {
        match cluster_end {
            Some(end) if appointment.start() < end => {
                current.push(appointment);
                cluster_end = Some(end.max(appointment.end()));
            }
            _ => {
                if !current.is_empty() {
                    clusters.push(std::mem::take(&mut current));
                }
                current.push(appointment);
                cluster_end = Some(appointment.end());
            }
        }
    }

    if !current.is_empty() {
        clusters.push(current);
    }

    clusters
}

/// First-fit column packing. `column_ends[i]` is when column `i` frees up.
fn pack_cluster<T: TimeBlock>(cluster: &[&T], placements: &mut HashMap<String, Placement>) {
    let mut column_ends: Vec<NaiveDateTime> = Vec::new();
    let mut columns: Vec<(&str, usize)> = Vec::with_capacity(cluster.len());

    for appointment in cluster {
        let column = match column_ends
            .iter()
            .position(|&free_at| free_at <= appointment.start())
        {
            Some(index) => {
                column_ends[index] = appointment.end();
                index
            }
            None => {
                column_ends.push(appointment.end());
                column_ends.len() - 1
            }
        };
        columns.push((appointment.id(), column));
    }

    let total_columns = column_ends.len();
    for (id, column) in columns {
        placements.insert(
            id.to_string(),
            Placement {
                column,
                total_columns,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[derive(Debug, Clone)]
    struct Block {
        id: &'static str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    }

    impl TimeBlock for Block {
        fn id(&self) -> &str {
            self.id
        }

        fn start(&self) -> NaiveDateTime {
            self.start
        }

        fn end(&self) -> NaiveDateTime {
            self.end
        }
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn block(id: &'static str, start: (u32, u32), end: (u32, u32)) -> Block {
        Block {
            id,
            start: at(start.0, start.1),
            end: at(end.0, end.1),
        }
    }

    fn placement(column: usize, total_columns: usize) -> Placement {
        Placement {
            column,
            total_columns,
        }
    }

    /// Maximum number of blocks in progress at any instant.
    fn max_concurrency(blocks: &[Block]) -> usize {
        blocks
            .iter()
            .map(|point| {
                blocks
                    .iter()
                    .filter(|b| b.start <= point.start && point.start < b.end)
                    .count()
            })
            .max()
            .unwrap_or(0)
    }

    fn overlaps(a: &Block, b: &Block) -> bool {
        a.start < b.end && b.start < a.end
    }

    fn random_day(seed: u64, count: usize) -> Vec<Block> {
        const IDS: [&str; 12] = [
            "p0", "p1", "p2", "p3", "p4", "p5", "p6", "p7", "p8", "p9", "p10", "p11",
        ];
        let mut rng = StdRng::seed_from_u64(seed);

        (0..count.min(IDS.len()))
            .map(|i| {
                let start = at(8, 0) + Duration::minutes(15 * rng.gen_range(0..40));
                let length = Duration::minutes(15 * rng.gen_range(1..=8));
                Block {
                    id: IDS[i],
                    start,
                    end: start + length,
                }
            })
            .collect()
    }

    #[test]
    fn empty_input_yields_empty_layout() {
        let result = layout::<Block>(&[]);
        assert!(result.is_empty());
        assert!(result.rejected.is_empty());
        assert_eq!(result.cluster_count, 0);
        assert!(result.ensure_valid().is_ok());
    }

    #[test]
    fn single_appointment_takes_whole_width() {
        let result = layout(&[block("a", (9, 0), (9, 45))]);
        assert_eq!(result.get("a"), Some(placement(0, 1)));
    }

    #[test]
    fn identical_slots_share_a_cluster() {
        let result = layout(&[block("A", (10, 0), (11, 0)), block("B", (10, 0), (11, 0))]);
        assert_eq!(result.get("A"), Some(placement(0, 2)));
        assert_eq!(result.get("B"), Some(placement(1, 2)));
        assert_eq!(result.cluster_count, 1);
    }

    #[test]
    fn back_to_back_appointments_do_not_overlap() {
        let result = layout(&[block("A", (10, 0), (11, 0)), block("C", (11, 0), (12, 0))]);
        assert_eq!(result.get("A"), Some(placement(0, 1)));
        assert_eq!(result.get("C"), Some(placement(0, 1)));
        assert_eq!(result.cluster_count, 2);
    }

    #[test]
    fn late_joiner_reuses_freed_column() {
        let result = layout(&[
            block("A", (10, 0), (11, 30)),
            block("B", (10, 30), (11, 0)),
            block("D", (11, 0), (12, 0)),
        ]);
        assert_eq!(result.cluster_count, 1);
        assert_eq!(result.get("A"), Some(placement(0, 2)));
        assert_eq!(result.get("B"), Some(placement(1, 2)));
        assert_eq!(result.get("D"), Some(placement(1, 2)));
    }

    #[test]
    fn malformed_appointment_is_reported_not_laid_out() {
        let result = layout(&[
            block("bad", (12, 0), (11, 0)),
            block("x", (10, 0), (11, 0)),
            block("y", (10, 30), (11, 30)),
        ]);

        assert_eq!(result.len(), 2);
        assert_eq!(result.get("bad"), None);
        assert_eq!(result.get("x"), Some(placement(0, 2)));
        assert_eq!(result.get("y"), Some(placement(1, 2)));
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].id, "bad");
        assert_eq!(result.rejected[0].reason, RejectReason::EndNotAfterStart);
        assert!(result.ensure_valid().is_err());
    }

    #[test]
    fn zero_length_appointment_is_rejected() {
        let result = layout(&[block("z", (10, 0), (10, 0))]);
        assert!(result.is_empty());
        assert_eq!(result.rejected.len(), 1);
    }

    #[test]
    fn chained_overlap_forms_one_cluster() {
        // a and c never touch directly but b links them.
        let result = layout(&[
            block("a", (9, 0), (10, 0)),
            block("b", (9, 30), (10, 30)),
            block("c", (10, 15), (11, 0)),
        ]);
        assert_eq!(result.cluster_count, 1);
        assert_eq!(result.get("a"), Some(placement(0, 2)));
        assert_eq!(result.get("b"), Some(placement(1, 2)));
        assert_eq!(result.get("c"), Some(placement(0, 2)));
    }

    #[test]
    fn disjoint_clusters_do_not_share_column_counts() {
        let result = layout(&[
            block("m1", (9, 0), (10, 0)),
            block("m2", (9, 0), (10, 0)),
            block("m3", (9, 0), (10, 0)),
            block("late", (15, 0), (16, 0)),
        ]);
        assert_eq!(result.cluster_count, 2);
        assert_eq!(result.get("m3"), Some(placement(2, 3)));
        assert_eq!(result.get("late"), Some(placement(0, 1)));
    }

    #[test]
    fn unsorted_input_matches_sorted_input() {
        let sorted = vec![
            block("a", (9, 0), (10, 0)),
            block("b", (9, 30), (11, 0)),
            block("c", (10, 0), (10, 30)),
            block("d", (10, 45), (12, 0)),
        ];
        let mut shuffled = sorted.clone();
        shuffled.reverse();
        shuffled.swap(0, 2);

        assert_eq!(layout(&sorted), layout(&shuffled));
    }

    #[test]
    fn identical_starts_are_order_independent() {
        let forward = layout(&[block("A", (10, 0), (11, 0)), block("B", (10, 0), (12, 0))]);
        let backward = layout(&[block("B", (10, 0), (12, 0)), block("A", (10, 0), (11, 0))]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn clusters_follow_running_end() {
        let blocks = vec![
            block("a", (9, 0), (12, 0)),
            block("b", (9, 30), (10, 0)),
            block("c", (11, 0), (11, 30)),
            block("d", (12, 0), (13, 0)),
        ];
        let sorted: Vec<&Block> = blocks.iter().collect();
        let clusters = form_clusters(sorted);

        let ids: Vec<Vec<&str>> = clusters
            .iter()
            .map(|c| c.iter().map(|b| b.id).collect())
            .collect();
        assert_eq!(ids, vec![vec!["a", "b", "c"], vec!["d"]]);
    }

    #[test]
    fn layout_properties_hold_on_generated_days() {
        for seed in 0..64u64 {
            let blocks = random_day(seed, 12);
            let result = layout(&blocks);
            assert_eq!(result.len(), blocks.len(), "seed {seed}");

            let sorted = {
                let mut sorted: Vec<&Block> = blocks.iter().collect();
                sorted.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(b.id)));
                sorted
            };

            for cluster in form_clusters(sorted) {
                let members: Vec<Block> = cluster.iter().map(|b| (*b).clone()).collect();
                let expected_columns = max_concurrency(&members);

                for a in &members {
                    let pa = result.get(a.id).unwrap();
                    assert_eq!(pa.total_columns, expected_columns, "seed {seed}");
                    assert!(pa.column < pa.total_columns);

                    for b in &members {
                        if a.id == b.id {
                            continue;
                        }
                        let pb = result.get(b.id).unwrap();
                        if pa.column == pb.column {
                            assert!(!overlaps(a, b), "seed {seed}: {} and {}", a.id, b.id);
                        }
                    }
                }
            }

            let mut reversed = blocks.clone();
            reversed.reverse();
            assert_eq!(layout(&reversed), result, "seed {seed}");
        }
    }
}
