//! Class rosters: which students belong to a class and which lists it has.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{ClassworkError, Result};
use crate::model::StudentId;

/// A class (turma) as stored in the roster file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRoster {
    /// Class name; the roster file stores it as the entry key.
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "alunos", default)]
    pub students: Vec<StudentId>,
    #[serde(rename = "listas", default)]
    pub lists: Vec<String>,
}

impl ClassRoster {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn has_student(&self, student: StudentId) -> bool {
        self.students.contains(&student)
    }

    pub fn has_list(&self, list: &str) -> bool {
        self.lists.iter().any(|l| l == list)
    }

    /// Drop repeated students and lists, keeping first occurrences.
    /// Returns `true` if anything was removed.
    pub fn dedup(&mut self) -> bool {
        let students = dedup_in_order(&mut self.students);
        let lists = dedup_in_order(&mut self.lists);
        students || lists
    }
}

fn dedup_in_order<T: Ord + Clone>(items: &mut Vec<T>) -> bool {
    let before = items.len();
    let mut seen = BTreeSet::new();
    items.retain(|item| seen.insert(item.clone()));
    items.len() != before
}

/// Every class, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, ClassRoster>",
    into = "BTreeMap<String, ClassRoster>"
)]
pub struct RosterBook {
    classes: BTreeMap<String, ClassRoster>,
}

impl From<BTreeMap<String, ClassRoster>> for RosterBook {
    fn from(mut classes: BTreeMap<String, ClassRoster>) -> Self {
        for (name, roster) in classes.iter_mut() {
            roster.name = name.clone();
            if roster.dedup() {
                tracing::warn!(class = %name, "duplicate roster entries dropped");
            }
        }
        Self { classes }
    }
}

impl From<RosterBook> for BTreeMap<String, ClassRoster> {
    fn from(book: RosterBook) -> Self {
        book.classes
    }
}

impl RosterBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, class: &str) -> Result<&ClassRoster> {
        self.classes
            .get(class)
            .ok_or_else(|| ClassworkError::NotFound(format!("class '{class}'")))
    }

    fn get_mut(&mut self, class: &str) -> Result<&mut ClassRoster> {
        self.classes
            .get_mut(class)
            .ok_or_else(|| ClassworkError::NotFound(format!("class '{class}'")))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassRoster> {
        self.classes.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Create an empty class.
    pub fn create_class(&mut self, class: &str) -> Result<()> {
        let class = class.trim();
        if class.is_empty() {
            return Err(ClassworkError::InvalidInput("class name is empty".into()));
        }
        if self.classes.contains_key(class) {
            return Err(ClassworkError::InvalidInput(format!(
                "class '{class}' already exists"
            )));
        }
        self.classes
            .insert(class.to_string(), ClassRoster::new(class));
        Ok(())
    }

    /// Add a student to a class. Returns `false` if already enrolled.
    pub fn add_student(&mut self, class: &str, student: StudentId) -> Result<bool> {
        let roster = self.get_mut(class)?;
        if roster.has_student(student) {
            return Ok(false);
        }
        roster.students.push(student);
        Ok(true)
    }

    /// Remove a student from a class.
    pub fn remove_student(&mut self, class: &str, student: StudentId) -> Result<()> {
        let roster = self.get_mut(class)?;
        let before = roster.students.len();
        roster.students.retain(|&s| s != student);
        if roster.students.len() == before {
            return Err(ClassworkError::NotFound(format!(
                "student {student} in class '{class}'"
            )));
        }
        Ok(())
    }

    /// Assign an exercise list to a class. Returns `false` if already assigned.
    pub fn assign_list(&mut self, class: &str, list: &str) -> Result<bool> {
        let roster = self.get_mut(class)?;
        if roster.has_list(list) {
            return Ok(false);
        }
        roster.lists.push(list.to_string());
        Ok(true)
    }

    /// Classes a student belongs to, each with its assigned lists.
    pub fn classes_for_student(&self, student: StudentId) -> Vec<&ClassRoster> {
        self.classes
            .values()
            .filter(|r| r.has_student(student))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> RosterBook {
        serde_json::from_str(
            r#"{
                "Turma A": {"alunos": [1234567], "listas": ["matematica.json"]},
                "Turma B": {"alunos": [], "listas": []}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn names_filled_from_keys() {
        let book = book();
        assert_eq!(book.get("Turma A").unwrap().name, "Turma A");
        assert!(matches!(
            book.get("Turma Z"),
            Err(ClassworkError::NotFound(_))
        ));
    }

    #[test]
    fn create_class_rejects_duplicates() {
        let mut book = book();
        book.create_class("Turma C").unwrap();
        assert!(book.get("Turma C").unwrap().students.is_empty());
        assert!(book.create_class("Turma C").unwrap_err().is_input_error());
        assert!(book.create_class("  ").is_err());
    }

    #[test]
    fn add_and_remove_student() {
        let mut book = book();
        assert!(book.add_student("Turma B", 7654321).unwrap());
        assert!(!book.add_student("Turma B", 7654321).unwrap());
        book.remove_student("Turma B", 7654321).unwrap();
        assert!(!book.get("Turma B").unwrap().has_student(7654321));
        assert!(book.remove_student("Turma B", 7654321).is_err());
        assert!(book.add_student("Nope", 1).is_err());
    }

    #[test]
    fn assign_list_once() {
        let mut book = book();
        assert!(book.assign_list("Turma B", "port.json").unwrap());
        assert!(!book.assign_list("Turma B", "port.json").unwrap());
        assert_eq!(book.get("Turma B").unwrap().lists, vec!["port.json"]);
    }

    #[test]
    fn classes_for_student_lists_lists() {
        let book = book();
        let classes = book.classes_for_student(1234567);
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].name, "Turma A");
        assert_eq!(classes[0].lists, vec!["matematica.json"]);
        assert!(book.classes_for_student(1).is_empty());
    }

    #[test]
    fn repeated_entries_are_dropped_on_load() {
        let book: RosterBook = serde_json::from_str(
            r#"{"t1": {"alunos": [1000001, 1000001, 1000002], "listas": ["a.json", "a.json"]}}"#,
        )
        .unwrap();
        let roster = book.get("t1").unwrap();
        assert_eq!(roster.students, vec![1000001, 1000002]);
        assert_eq!(roster.lists, vec!["a.json"]);
    }

    #[test]
    fn wire_format_omits_name() {
        let value = serde_json::to_value(book()).unwrap();
        assert_eq!(
            value["Turma A"],
            serde_json::json!({"alunos": [1234567], "listas": ["matematica.json"]})
        );
    }
}
