//! Notices — announcements with an optional visibility window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_core::{DomainError, DomainResult, FieldError, NoticeId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    General,
    Academic,
    Exam,
    Event,
    Holiday,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticePriority {
    Low,
    Normal,
    High,
    Urgent,
}

/// Target-audience tags. Closed set, never free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    All,
    Students,
    Teachers,
    Parents,
    Staff,
}

/// # Invariants
/// - When both dates are set, `end_date >= start_date`.
/// - A notice is active iff `now` is within `[start_date, end_date]`,
///   with an unset bound treated as open.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: NoticeId,
    pub author_id: UserId,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: NoticeKind,
    pub priority: NoticePriority,
    pub audience: Vec<Audience>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
}

impl Notice {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        let started = self.start_date.is_none_or(|start| now >= start);
        let not_ended = self.end_date.is_none_or(|end| now <= end);
        started && not_ended
    }
}

#[derive(Debug, Clone)]
pub struct NoticeDraft {
    pub author_id: UserId,
    pub title: String,
    pub content: String,
    pub kind: NoticeKind,
    pub priority: NoticePriority,
    pub audience: Vec<Audience>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub pinned: bool,
}

impl NoticeDraft {
    pub(crate) fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "must not be empty"));
        }
        if self.content.trim().is_empty() {
            errors.push(FieldError::new("content", "must not be empty"));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                errors.push(FieldError::new("startDate", "must not be after endDate"));
                errors.push(FieldError::new("endDate", "must not be before startDate"));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation_all(errors))
        }
    }

    pub(crate) fn into_notice(self, id: NoticeId, now: DateTime<Utc>) -> Notice {
        Notice {
            id,
            author_id: self.author_id,
            title: self.title.trim().to_string(),
            content: self.content,
            kind: self.kind,
            priority: self.priority,
            audience: self.audience,
            start_date: self.start_date,
            end_date: self.end_date,
            pinned: self.pinned,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NoticePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub kind: Option<NoticeKind>,
    pub priority: Option<NoticePriority>,
    pub audience: Option<Vec<Audience>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub pinned: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct NoticeFilter {
    pub kind: Option<NoticeKind>,
    pub priority: Option<NoticePriority>,
    pub pinned: Option<bool>,
    /// Keep only notices whose window contains "now".
    pub active_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn draft() -> NoticeDraft {
        NoticeDraft {
            author_id: UserId::new(),
            title: "Sports day".into(),
            content: "Annual sports day".into(),
            kind: NoticeKind::Event,
            priority: NoticePriority::Normal,
            audience: vec![Audience::All],
            start_date: None,
            end_date: None,
            pinned: false,
        }
    }

    #[test]
    fn inverted_window_names_both_date_fields() {
        let mut d = draft();
        d.start_date = Some("2025-03-01T00:00:00Z".parse().unwrap());
        d.end_date = Some("2025-02-01T00:00:00Z".parse().unwrap());
        let err = d.validate().unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.iter().any(|f| f.field == "startDate"));
        assert!(fields.iter().any(|f| f.field == "endDate"));
    }

    #[test]
    fn active_window_semantics() {
        let now = Utc::now();
        let mut notice = draft().into_notice(NoticeId::new(), now);
        assert!(notice.is_active_at(now)); // both bounds unset

        notice.start_date = Some(now - Duration::days(1));
        notice.end_date = Some(now + Duration::days(1));
        assert!(notice.is_active_at(now));

        notice.end_date = Some(now - Duration::hours(1));
        assert!(!notice.is_active_at(now));

        notice.start_date = Some(now + Duration::hours(1));
        notice.end_date = None;
        assert!(!notice.is_active_at(now));
    }
}
