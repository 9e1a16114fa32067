//! Question templates.
//!
//! Templates live in a TOML file as named tables:
//!
//! ```toml
//! [loanword]
//! question = "LOANWORD의 순화어로 알맞은 것은?"
//! ```
//!
//! The placeholder (`LOANWORD` above) is chosen per generator.

use std::path::Path;

use figment::{
    providers::{Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A question template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizTemplate {
    /// Question text containing the placeholder.
    pub question: String,
}

impl QuizTemplate {
    /// Replace every occurrence of `placeholder` with `term`.
    #[must_use]
    pub fn render(&self, placeholder: &str, term: &str) -> String {
        if placeholder.is_empty() {
            return self.question.clone();
        }
        self.question.replace(placeholder, term)
    }
}

/// Built-in templates by key.
fn builtin(key: &str) -> Option<QuizTemplate> {
    let question = match key {
        "loanword" => "LOANWORD의 순화어로 알맞은 것은?",
        "standard" => "다음 설명에 해당하는 건설 용어로 알맞은 것은?\n\nSTANDARD",
        _ => return None,
    };
    Some(QuizTemplate {
        question: question.to_string(),
    })
}

/// Templates from an optional file, falling back to built-ins.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    file: Option<Figment>,
}

impl TemplateSet {
    /// Only the built-in templates.
    #[must_use]
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Templates from a TOML file, with built-ins for keys it lacks.
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("template file {} not found", path.display()),
            )));
        }
        Ok(Self {
            file: Some(Figment::from(Toml::file(path))),
        })
    }

    /// Templates from `path` when given, else the built-ins.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is given but doesn't exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::builtin()), Self::from_file)
    }

    /// Look up a template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateNotFound`] if neither the file nor the
    /// built-ins define `key`, or a config error if the file entry is malformed.
    pub fn get(&self, key: &str) -> Result<QuizTemplate> {
        if let Some(figment) = &self.file {
            if figment.contains(key) {
                return Ok(figment.extract_inner(key)?);
            }
        }
        builtin(key).ok_or_else(|| Error::TemplateNotFound {
            key: key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_replaces_all() {
        let template = QuizTemplate {
            question: "X와 X의 차이는?".to_string(),
        };
        assert_eq!(template.render("X", "데나오시"), "데나오시와 데나오시의 차이는?");
        assert_eq!(template.render("", "무시"), "X와 X의 차이는?");
    }

    #[test]
    fn test_builtin_templates() {
        let set = TemplateSet::builtin();
        let loanword = set.get("loanword").unwrap();
        assert_eq!(
            loanword.render("LOANWORD", "가꾸목"),
            "가꾸목의 순화어로 알맞은 것은?"
        );
        assert!(set.get("standard").unwrap().question.contains("STANDARD"));
    }

    #[test]
    fn test_unknown_key() {
        let err = TemplateSet::builtin().get("blueprint").unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound { .. }));
    }

    #[test]
    fn test_file_overrides_and_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.toml");
        std::fs::write(
            &path,
            "[loanword]\nquestion = \"LOANWORD를 우리말로 바꾸면?\"\n\n[component]\nquestion = \"COMPONENT의 구성 요소는?\"\n",
        )
        .unwrap();

        let set = TemplateSet::from_file(&path).unwrap();
        assert_eq!(set.get("loanword").unwrap().question, "LOANWORD를 우리말로 바꾸면?");
        assert_eq!(set.get("component").unwrap().question, "COMPONENT의 구성 요소는?");
        assert!(set.get("standard").unwrap().question.contains("STANDARD"));
    }

    #[test]
    fn test_malformed_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.toml");
        std::fs::write(&path, "[loanword]\ntext = \"no question field\"\n").unwrap();

        let err = TemplateSet::from_file(&path).unwrap().get("loanword").unwrap_err();
        assert!(matches!(err, Error::ConfigLoad(_)));
    }

    #[test]
    fn test_missing_file() {
        assert!(TemplateSet::load(Some(Path::new("/nonexistent.toml"))).is_err());
        assert!(TemplateSet::load(None).is_ok());
    }
}
