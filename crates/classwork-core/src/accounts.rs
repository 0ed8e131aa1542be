//! User accounts: registration field validation and login.
//!
//! Passwords are stored as given; the user store format leaves no room for
//! anything else.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ClassworkError, Result};
use crate::model::StudentId;

/// Smallest valid matrícula (7 digits).
pub const MIN_ID: StudentId = 1_000_000;
/// Largest valid matrícula (7 digits).
pub const MAX_ID: StudentId = 9_999_999;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "aluno")]
    Student,
    #[serde(rename = "professor")]
    Teacher,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => write!(f, "aluno"),
            Role::Teacher => write!(f, "professor"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ClassworkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "aluno" | "student" => Ok(Role::Student),
            "professor" | "teacher" => Ok(Role::Teacher),
            other => Err(ClassworkError::InvalidInput(format!(
                "unknown role '{other}' (expected aluno or professor)"
            ))),
        }
    }
}

/// A stored user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "matricula")]
    pub id: StudentId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "idade")]
    pub age: u32,
    #[serde(rename = "tipo")]
    pub role: Role,
    #[serde(rename = "senha")]
    pub password: String,
}

/// Unvalidated registration form fields.
#[derive(Debug, Clone)]
pub struct Registration {
    pub id: String,
    pub name: String,
    pub age: String,
    pub role: String,
    pub password: String,
    pub password_confirmation: String,
}

impl Registration {
    /// Validate every field, returning the user to store.
    pub fn validate(&self) -> Result<User> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ClassworkError::InvalidInput("name is empty".into()));
        }
        let role: Role = self.role.parse()?;
        let id = parse_id(&self.id)?;
        let age = self
            .age
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|&a| a > 0)
            .ok_or_else(|| {
                ClassworkError::InvalidInput(format!("invalid age '{}'", self.age.trim()))
            })?;
        if self.password.is_empty() {
            return Err(ClassworkError::InvalidInput("password is empty".into()));
        }
        if self.password != self.password_confirmation {
            return Err(ClassworkError::InvalidInput(
                "password confirmation does not match".into(),
            ));
        }
        Ok(User {
            id,
            name: name.to_string(),
            age,
            role,
            password: self.password.clone(),
        })
    }
}

/// Parse a 7-digit matrícula.
pub fn parse_id(input: &str) -> Result<StudentId> {
    let trimmed = input.trim();
    trimmed
        .parse::<StudentId>()
        .ok()
        .filter(|id| (MIN_ID..=MAX_ID).contains(id) && trimmed.chars().all(|c| c.is_ascii_digit()))
        .ok_or_else(|| {
            ClassworkError::InvalidInput(format!("invalid matricula '{trimmed}' (7 digits)"))
        })
}

/// Every user, keyed by matrícula string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserBook {
    users: BTreeMap<String, User>,
}

impl UserBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: StudentId) -> Option<&User> {
        self.users.get(&id.to_string())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Insert a validated user; the matrícula must be unused.
    pub fn register(&mut self, user: User) -> Result<()> {
        let key = user.id.to_string();
        if self.users.contains_key(&key) {
            return Err(ClassworkError::InvalidInput(format!(
                "matricula {} is already registered",
                user.id
            )));
        }
        self.users.insert(key, user);
        Ok(())
    }

    /// Check credentials, returning the user on success.
    pub fn login(&self, id: &str, password: &str) -> Result<&User> {
        let id = parse_id(id)?;
        let user = self
            .get(id)
            .ok_or_else(|| ClassworkError::NotFound(format!("matricula {id}")))?;
        if user.password != password {
            return Err(ClassworkError::InvalidInput("wrong password".into()));
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> Registration {
        Registration {
            id: "1234567".into(),
            name: "Ana".into(),
            age: "20".into(),
            role: "aluno".into(),
            password: "abc".into(),
            password_confirmation: "abc".into(),
        }
    }

    #[test]
    fn valid_registration() {
        let user = form().validate().unwrap();
        assert_eq!(user.id, 1234567);
        assert_eq!(user.role, Role::Student);
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "matricula": 1234567, "nome": "Ana", "idade": 20, "tipo": "aluno", "senha": "abc"
            })
        );
    }

    #[test]
    fn registration_field_checks() {
        let mut f = form();
        f.id = "123".into();
        assert!(f.validate().unwrap_err().to_string().contains("matricula"));

        let mut f = form();
        f.age = "0".into();
        assert!(f.validate().unwrap_err().to_string().contains("age"));

        let mut f = form();
        f.role = "diretor".into();
        assert!(f.validate().is_err());

        let mut f = form();
        f.password_confirmation = "abd".into();
        assert!(f.validate().unwrap_err().to_string().contains("confirmation"));
    }

    #[test]
    fn parse_id_rejects_signs() {
        assert!(parse_id("+1234567").is_err());
        assert!(parse_id("10000000").is_err());
        assert_eq!(parse_id(" 7654321 ").unwrap(), 7654321);
    }

    #[test]
    fn register_and_login() {
        let mut users = UserBook::new();
        users.register(form().validate().unwrap()).unwrap();
        assert!(users.register(form().validate().unwrap()).is_err());

        assert_eq!(users.login("1234567", "abc").unwrap().name, "Ana");
        assert!(users.login("1234567", "errada").unwrap_err().is_input_error());
        assert!(matches!(
            users.login("7654321", "abc"),
            Err(ClassworkError::NotFound(_))
        ));
    }
}
