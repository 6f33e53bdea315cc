//! 🩺 Diagnostics: the accumulator of bad news.
//!
//! Validation and conversion never bail on the first problem. They write it down here,
//! keep going, and let the caller decide whether the pile contains an error. Users get
//! every complaint at once instead of playing whack-a-mole with their plan. 🦆
//!
//! ⚠️ Diagnostics are for *user* mistakes. Provider bugs (a type the schema guaranteed
//! turned out to be something else, an enum code nobody registered) go through
//! [`report_bug`] and panic. Those are not the user's fault and should never be dressed
//! up as if they were.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// 📋 One complaint, optionally pinned to an attribute path like `auth.password`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        match &self.path {
            Some(path) => write!(f, "{label} at {path}: {}: {}", self.summary, self.detail),
            None => write!(f, "{label}: {}: {}", self.summary, self.detail),
        }
    }
}

/// 📦 The pile. Append-only, order-preserving, serializes as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Severity::Error, None, summary.into(), detail.into());
    }

    pub fn add_warning(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Severity::Warning, None, summary.into(), detail.into());
    }

    pub fn add_attribute_error(
        &mut self,
        path: impl Into<String>,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.push(Severity::Error, Some(path.into()), summary.into(), detail.into());
    }

    pub fn add_attribute_warning(
        &mut self,
        path: impl Into<String>,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.push(Severity::Warning, Some(path.into()), summary.into(), detail.into());
    }

    fn push(&mut self, severity: Severity, path: Option<String>, summary: String, detail: String) {
        self.0.push(Diagnostic {
            severity,
            summary,
            detail,
            path,
        });
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn has_error(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Error)
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

// 🎁 so the CLI can hand a pile of diagnostics to anyhow and walk away
impl std::error::Error for Diagnostics {}

/// 💀 A provider bug, not a user error. Panics with the "please tell us" message.
#[track_caller]
pub(crate) fn report_bug(message: impl fmt::Display) -> ! {
    panic!(
        "💀 {message}. This is always a bug in the provider. \
         Please report this issue to the provider developers."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_one_where_warnings_alone_do_not_ruin_the_party() {
        let mut the_pile = Diagnostics::new();
        the_pile.add_warning("Deprecated", "this attribute has seen better days");
        assert!(!the_pile.has_error());

        the_pile.add_attribute_error("auth.user", "Missing user", "basic auth needs a user");
        assert!(the_pile.has_error());
        assert_eq!(the_pile.len(), 2);
        assert_eq!(the_pile.errors().count(), 1);
    }

    #[test]
    fn the_one_where_display_puts_each_complaint_on_its_own_line() {
        let mut the_pile = Diagnostics::new();
        the_pile.add_error("Boom", "it went boom");
        the_pile.add_attribute_error("uri", "Bad uri", "no scheme");
        assert_eq!(
            the_pile.to_string(),
            "error: Boom: it went boom\nerror at uri: Bad uri: no scheme"
        );
    }

    #[test]
    #[should_panic(expected = "report this issue")]
    fn the_one_where_provider_bugs_panic_instead_of_blaming_the_user() {
        report_bug("unexpected thing");
    }
}
