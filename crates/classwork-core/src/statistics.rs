//! Class-wide correctness aggregation.
//!
//! Reduces the per-student score of every roster member over one list into
//! a single ratio. Students who never touched the list do not count.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ClassworkError, Result};
use crate::model::{ExerciseList, ProgressRecord, StudentId};
use crate::report::{ClassReport, ListPerformance, StudentScore, UnavailableList};
use crate::roster::ClassRoster;
use crate::scoring::score;
use crate::traits::{ExerciseSource, ProgressStore};

/// Aggregated correctness of a class on one list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// List storage key.
    pub list: String,
    /// Correct answers across contributing students.
    pub numerator: usize,
    /// Exercises with a defined correct option, once per contributing student.
    pub denominator: usize,
    /// Students with any progress on the list.
    pub students_counted: usize,
    /// Percentage in `[0, 100]`, `None` when the denominator is zero.
    pub ratio: Option<f64>,
}

impl AggregateResult {
    fn empty(list: &str) -> Self {
        Self {
            list: list.to_string(),
            numerator: 0,
            denominator: 0,
            students_counted: 0,
            ratio: None,
        }
    }

    fn add(&mut self, correct: usize, counted: usize) {
        self.numerator += correct;
        self.denominator += counted;
        self.students_counted += 1;
        self.ratio = ratio(self.numerator, self.denominator);
    }
}

fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64 * 100.0)
}

/// One student's contribution: `(correct, counted)`, or `None` without progress.
///
/// The record is normalized first, so responses at or past the cursor never
/// count.
fn contribution(list: &ExerciseList, record: &ProgressRecord) -> Option<(usize, usize)> {
    let record = record.clone().normalized(list);
    record
        .has_progress()
        .then(|| (score(list, &record.responses).correct, list.keyed_count()))
}

/// Aggregate a set of records for one list.
///
/// The result does not depend on the order of `records`.
pub fn aggregate_records<'r>(
    list: &ExerciseList,
    records: impl IntoIterator<Item = &'r ProgressRecord>,
) -> AggregateResult {
    let mut result = AggregateResult::empty(&list.name);
    for record in records {
        if let Some((correct, counted)) = contribution(list, record) {
            result.add(correct, counted);
        }
    }
    result
}

fn ensure_assigned(roster: &ClassRoster, list_name: &str) -> Result<()> {
    if roster.has_list(list_name) {
        Ok(())
    } else {
        Err(ClassworkError::NotFound(format!(
            "list '{list_name}' is not assigned to class '{}'",
            roster.name
        )))
    }
}

/// Each distinct roster student with their record normalized against `list`.
fn roster_records<P: ProgressStore + ?Sized>(
    roster: &ClassRoster,
    list: &ExerciseList,
    progress: &P,
) -> Result<Vec<(StudentId, Option<ProgressRecord>)>> {
    let mut seen = BTreeSet::new();
    roster
        .students
        .iter()
        .filter(|&&student| seen.insert(student))
        .map(|&student| Ok((student, progress.load_normalized(student, list)?)))
        .collect()
}

/// Aggregate every roster member's progress on one assigned list.
pub fn aggregate<L, P>(
    roster: &ClassRoster,
    list_name: &str,
    lists: &L,
    progress: &P,
) -> Result<AggregateResult>
where
    L: ExerciseSource + ?Sized,
    P: ProgressStore + ?Sized,
{
    ensure_assigned(roster, list_name)?;
    let list = lists.load_list(list_name)?;
    let records = roster_records(roster, &list, progress)?;
    let result = aggregate_records(&list, records.iter().filter_map(|(_, r)| r.as_ref()));
    tracing::debug!(
        class = %roster.name,
        list = list_name,
        students = result.students_counted,
        "aggregated list"
    );
    Ok(result)
}

fn list_performance<L, P>(
    roster: &ClassRoster,
    list_name: &str,
    lists: &L,
    progress: &P,
) -> Result<ListPerformance>
where
    L: ExerciseSource + ?Sized,
    P: ProgressStore + ?Sized,
{
    let list = lists.load_list(list_name)?;
    let mut result = AggregateResult::empty(list_name);
    let mut per_student = Vec::with_capacity(roster.students.len());

    for (student, record) in roster_records(roster, &list, progress)? {
        let entry = match record.as_ref().and_then(|r| contribution(&list, r).map(|c| (r, c))) {
            Some((record, (correct, counted))) => {
                result.add(correct, counted);
                StudentScore {
                    student,
                    correct,
                    counted,
                    status: Some(record.status),
                }
            }
            None => StudentScore {
                student,
                correct: 0,
                counted: 0,
                status: None,
            },
        };
        per_student.push(entry);
    }

    Ok(ListPerformance {
        result,
        per_student,
    })
}

/// Aggregate every list assigned to a class, with a per-student breakdown.
///
/// A list whose file is missing or corrupt is recorded in
/// [`ClassReport::unavailable`] and the remaining lists are still reported.
/// I/O failures abort the report.
pub fn class_report<L, P>(roster: &ClassRoster, lists: &L, progress: &P) -> Result<ClassReport>
where
    L: ExerciseSource + ?Sized,
    P: ProgressStore + ?Sized,
{
    let mut report = ClassReport::new(roster);
    for name in &roster.lists {
        match list_performance(roster, name, lists, progress) {
            Ok(performance) => report.lists.push(performance),
            Err(err @ (ClassworkError::NotFound(_) | ClassworkError::DataCorrupt { .. })) => {
                tracing::warn!(
                    class = %roster.name,
                    list = %name,
                    error = %err,
                    "list left out of report"
                );
                report.unavailable.push(UnavailableList {
                    list: name.clone(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    tracing::info!(
        class = %roster.name,
        lists = report.lists.len(),
        unavailable = report.unavailable.len(),
        students = report.students.len(),
        "built class report"
    );
    Ok(report)
}

/// Report on a single assigned list; other lists of the class are not read.
pub fn list_report<L, P>(
    roster: &ClassRoster,
    list_name: &str,
    lists: &L,
    progress: &P,
) -> Result<ClassReport>
where
    L: ExerciseSource + ?Sized,
    P: ProgressStore + ?Sized,
{
    ensure_assigned(roster, list_name)?;
    let mut report = ClassReport::new(roster);
    report
        .lists
        .push(list_performance(roster, list_name, lists, progress)?);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MemoryStore;
    use crate::model::{Exercise, Status, NOT_OFFERED};

    fn exercise(key: Option<&str>) -> Exercise {
        Exercise::new(
            "Tema",
            "?",
            vec!["x".into(), "y".into(), NOT_OFFERED.into()],
            key,
        )
        .unwrap()
    }

    fn record(responses: &[(usize, char)], cursor: usize, len: usize) -> ProgressRecord {
        ProgressRecord {
            cursor,
            responses: responses.iter().copied().collect(),
            status: Status::for_cursor(cursor, len),
        }
    }

    fn class(students: &[StudentId], lists: &[&str]) -> ClassRoster {
        let mut roster = ClassRoster::new("t1");
        roster.students = students.to_vec();
        roster.lists = lists.iter().map(|s| s.to_string()).collect();
        roster
    }

    #[test]
    fn two_students_half_right() {
        let store = MemoryStore::with_list(ExerciseList::new("l", vec![exercise(Some("a"))]));
        store.seed_progress(1000001, "l", record(&[(0, 'a')], 1, 1));
        store.seed_progress(1000002, "l", record(&[(0, 'b')], 1, 1));

        let result = aggregate(&class(&[1000001, 1000002], &["l"]), "l", &store, &store).unwrap();
        assert_eq!((result.numerator, result.denominator), (1, 2));
        assert_eq!(result.students_counted, 2);
        assert_eq!(result.ratio, Some(50.0));
    }

    #[test]
    fn untouched_students_do_not_count() {
        let list = ExerciseList::new("l", vec![exercise(Some("a")), exercise(Some("b"))]);
        let idle = ProgressRecord::new();
        let started = record(&[(0, 'a')], 1, 2);
        let result = aggregate_records(&list, [&idle, &started]);
        assert_eq!(result.students_counted, 1);
        assert_eq!((result.numerator, result.denominator), (1, 2));
    }

    #[test]
    fn unkeyed_exercises_are_left_out() {
        let list = ExerciseList::new("l", vec![exercise(None), exercise(Some("b"))]);
        let result = aggregate_records(&list, [&record(&[(0, 'a'), (1, 'b')], 2, 2)]);
        assert_eq!((result.numerator, result.denominator), (1, 1));
        assert_eq!(result.ratio, Some(100.0));
    }

    #[test]
    fn no_progress_has_no_ratio() {
        let list = ExerciseList::new("l", vec![exercise(Some("a"))]);
        let result = aggregate_records(&list, std::iter::empty());
        assert_eq!(result.ratio, None);
        assert_eq!(result.students_counted, 0);
    }

    #[test]
    fn order_does_not_matter() {
        let list = ExerciseList::new("l", vec![exercise(Some("a")), exercise(Some("b"))]);
        let a = record(&[(0, 'a'), (1, 'a')], 2, 2);
        let b = record(&[(0, 'b')], 1, 2);
        let c = record(&[(0, 'a'), (1, 'b')], 2, 2);
        let forward = aggregate_records(&list, [&a, &b, &c]);
        let backward = aggregate_records(&list, [&c, &b, &a]);
        assert_eq!(forward, backward);
        let ratio = forward.ratio.unwrap();
        assert!((0.0..=100.0).contains(&ratio));
    }

    #[test]
    fn unassigned_list_is_not_found() {
        let store = MemoryStore::with_list(ExerciseList::new("l", vec![exercise(Some("a"))]));
        let err = aggregate(&class(&[1000001], &[]), "l", &store, &store).unwrap_err();
        assert!(matches!(err, ClassworkError::NotFound(_)));
    }

    #[test]
    fn report_breaks_down_per_student() {
        let store = MemoryStore::with_list(ExerciseList::new("l", vec![exercise(Some("a"))]));
        store.seed_progress(1000001, "l", record(&[(0, 'a')], 1, 1));

        let report = class_report(&class(&[1000001, 1000002], &["l"]), &store, &store).unwrap();
        assert_eq!(report.class_name, "t1");
        let perf = &report.lists[0];
        assert_eq!(perf.result.ratio, Some(100.0));
        assert_eq!(perf.per_student.len(), 2);
        assert!(perf.per_student[0].is_finished());
        assert_eq!(perf.per_student[1].status, None);
        assert_eq!(perf.per_student[1].counted, 0);
    }

    #[test]
    fn responses_past_the_cursor_do_not_count() {
        let list = ExerciseList::new("l", vec![exercise(Some("a")), exercise(Some("a"))]);
        let store = MemoryStore::with_list(list.clone());
        let stale = ProgressRecord {
            cursor: 1,
            responses: [(0, 'b'), (1, 'a')].into_iter().collect(),
            status: Status::InProgress,
        };
        store.seed_progress(1000001, "l", stale.clone());

        let pure = aggregate_records(&list, [&stale]);
        assert_eq!((pure.numerator, pure.denominator), (0, 2));

        let roster = class(&[1000001], &["l"]);
        let result = aggregate(&roster, "l", &store, &store).unwrap();
        assert_eq!((result.numerator, result.denominator), (0, 2));
        assert_eq!(result.ratio, Some(0.0));

        let report = class_report(&roster, &store, &store).unwrap();
        assert_eq!(report.lists[0].per_student[0].correct, 0);
    }

    #[test]
    fn repeated_roster_student_counts_once() {
        let store = MemoryStore::with_list(ExerciseList::new("l", vec![exercise(Some("a"))]));
        store.seed_progress(1000001, "l", record(&[(0, 'a')], 1, 1));
        store.seed_progress(1000002, "l", record(&[(0, 'b')], 1, 1));

        let roster = class(&[1000001, 1000001, 1000002], &["l"]);
        let result = aggregate(&roster, "l", &store, &store).unwrap();
        assert_eq!(result.students_counted, 2);
        assert_eq!(result.ratio, Some(50.0));

        let report = class_report(&roster, &store, &store).unwrap();
        assert_eq!(report.students, vec![1000001, 1000002]);
        assert_eq!(report.lists[0].per_student.len(), 2);
    }

    #[test]
    fn missing_list_file_is_reported_not_fatal() {
        let store = MemoryStore::with_list(ExerciseList::new("um.json", vec![exercise(Some("a"))]));
        store.seed_progress(1000001, "um.json", record(&[(0, 'a')], 1, 1));
        let roster = class(&[1000001], &["um.json", "dois.json"]);

        let report = class_report(&roster, &store, &store).unwrap();
        assert_eq!(report.lists.len(), 1);
        assert_eq!(report.lists[0].result.ratio, Some(100.0));
        assert_eq!(report.unavailable.len(), 1);
        assert_eq!(report.unavailable[0].list, "dois.json");

        let single = list_report(&roster, "um.json", &store, &store).unwrap();
        assert_eq!(single.lists.len(), 1);
        assert!(single.unavailable.is_empty());

        let err = list_report(&roster, "tres.json", &store, &store).unwrap_err();
        assert!(matches!(err, ClassworkError::NotFound(_)));
    }

    #[test]
    fn key_on_missing_option_stays_out_of_denominator() {
        let broken = Exercise::from_parts(
            "Tema".into(),
            "?".into(),
            vec!["x".into(), "y".into(), NOT_OFFERED.into()],
            Some('c'),
        );
        let list = ExerciseList::new("l", vec![broken, exercise(Some("a"))]);
        let result = aggregate_records(&list, [&record(&[(0, 'a'), (1, 'a')], 2, 2)]);
        assert_eq!((result.numerator, result.denominator), (1, 1));
    }
}
