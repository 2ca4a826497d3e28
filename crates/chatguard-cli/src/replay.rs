//! Transcript replay through the moderation engine

use anyhow::{bail, Context};
use async_trait::async_trait;
use chatguard_core::{ConversationTarget, UserId};
use chatguard_escalation::{InteractionHistory, MessageContext, ModerationEngine, ModerationOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One transcript line
#[derive(Debug, Deserialize)]
struct TranscriptLine {
    sender: String,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    group: Option<String>,
    text: String,
    #[serde(default)]
    at: Option<DateTime<Utc>>,
    #[serde(default)]
    id: Option<String>,
}

impl TranscriptLine {
    fn into_context(self, default_at: DateTime<Utc>) -> anyhow::Result<MessageContext> {
        let target = match (self.to, self.group) {
            (Some(user), None) => ConversationTarget::direct(user),
            (None, Some(group)) => ConversationTarget::group(group),
            (Some(_), Some(_)) => bail!("message has both \"to\" and \"group\""),
            (None, None) => bail!("message needs \"to\" or \"group\""),
        };

        let mut ctx = MessageContext::new(self.sender, target, self.text)
            .sent_at(self.at.unwrap_or(default_at));
        if let Some(id) = self.id {
            ctx = ctx.with_message_id(id);
        }
        Ok(ctx)
    }
}

/// Parse a JSON-lines transcript; blank lines are skipped.
///
/// Lines without `at` are stamped `default_at`.
pub fn parse_transcript(content: &str, default_at: DateTime<Utc>) -> anyhow::Result<Vec<MessageContext>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            let parsed: TranscriptLine = serde_json::from_str(line)
                .with_context(|| format!("transcript line {}", idx + 1))?;
            parsed
                .into_context(default_at)
                .with_context(|| format!("transcript line {}", idx + 1))
        })
        .collect()
}

/// Relationship lists from a JSON file; no message history
#[derive(Debug, Default)]
pub struct ContactList {
    contacts: HashMap<UserId, HashSet<UserId>>,
}

impl ContactList {
    /// Parse `{"alice": ["bob", "carol"], ...}`
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let raw: HashMap<String, Vec<String>> =
            serde_json::from_str(json).context("invalid contacts file")?;
        let contacts = raw
            .into_iter()
            .map(|(user, list)| (UserId::from(user), list.into_iter().map(UserId::from).collect()))
            .collect();
        Ok(Self { contacts })
    }
}

#[async_trait]
impl InteractionHistory for ContactList {
    async fn trusted_contacts(&self, user: &UserId) -> chatguard_core::Result<HashSet<UserId>> {
        Ok(self.contacts.get(user).cloned().unwrap_or_default())
    }

    async fn count_messages_between(
        &self,
        _sender: &UserId,
        _target: &ConversationTarget,
        _since: DateTime<Utc>,
    ) -> chatguard_core::Result<u64> {
        Ok(0)
    }
}

/// Outcome for one replayed message
#[derive(Debug, Serialize)]
pub struct ReplayRecord {
    pub sender: UserId,
    pub target: ConversationTarget,
    pub text: String,
    #[serde(flatten)]
    pub outcome: ModerationOutcome,
}

/// Feed messages through `engine` in order
pub async fn replay(
    engine: &ModerationEngine,
    messages: Vec<MessageContext>,
) -> anyhow::Result<Vec<ReplayRecord>> {
    let mut records = Vec::with_capacity(messages.len());
    for ctx in messages {
        let sender = ctx.sender.clone();
        let target = ctx.target.clone();
        let text = ctx.text.clone();
        let outcome = engine
            .evaluate_message(ctx)
            .await
            .with_context(|| format!("evaluating message from {sender}"))?;
        records.push(ReplayRecord {
            sender,
            target,
            text,
            outcome,
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatguard_classifiers::{KeywordClassifier, KeywordStore};
    use chatguard_core::{LanguageCode, Severity};
    use chatguard_escalation::{EngineConfig, NotificationVerdict};
    use std::sync::Arc;

    #[test]
    fn test_parse_transcript() {
        let content = r#"
{"sender": "alice", "to": "bob", "text": "hi", "at": "2024-06-01T10:00:00Z", "id": "m1"}

{"sender": "carol", "group": "g1", "text": "hello"}
"#;
        let now = Utc::now();
        let messages = parse_transcript(content, now).unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].target, ConversationTarget::direct("bob"));
        assert_eq!(messages[0].message_id.as_deref(), Some("m1"));
        assert_eq!(messages[1].target, ConversationTarget::group("g1"));
        assert_eq!(messages[1].sent_at, now);
    }

    #[test]
    fn test_transcript_errors_name_the_line() {
        let err = parse_transcript("{\"sender\": \"a\", \"text\": \"x\"}", Utc::now()).unwrap_err();
        assert!(format!("{err:#}").contains("line 1"));

        let both = r#"{"sender": "a", "to": "b", "group": "g", "text": "x"}"#;
        assert!(parse_transcript(both, Utc::now()).is_err());
    }

    #[tokio::test]
    async fn test_replay_with_contacts() {
        let store = KeywordStore::builder()
            .keywords(LanguageCode::English, Severity::Medium, ["idiot"])
            .build();
        let contacts = ContactList::from_json(r#"{"alice": ["bob"]}"#).unwrap();
        let engine = ModerationEngine::new(
            Arc::new(KeywordClassifier::new(Arc::new(store))),
            Arc::new(contacts),
            &EngineConfig::default(),
        )
        .unwrap();

        let messages = parse_transcript(
            "{\"sender\": \"alice\", \"to\": \"bob\", \"text\": \"idiot\"}\n\
             {\"sender\": \"alice\", \"to\": \"dave\", \"text\": \"idiot\"}\n\
             {\"sender\": \"alice\", \"to\": \"dave\", \"text\": \"thanks\"}",
            Utc::now(),
        )
        .unwrap();
        let records = replay(&engine, messages).await.unwrap();

        let verdicts: Vec<_> = records.iter().map(|r| r.outcome.verdict).collect();
        assert_eq!(
            verdicts,
            vec![
                NotificationVerdict::Suppressed,
                NotificationVerdict::WarnSender,
                NotificationVerdict::None,
            ]
        );
    }
}
