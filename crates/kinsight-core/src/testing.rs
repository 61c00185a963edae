//! Conversation fixtures shared by unit tests

use kinsight_records::{validate_conversation, Conversation};
use serde_json::{json, Value};

/// Raw record JSON, overriding top-level fields with `extra`
pub(crate) fn record(id: &str, started_at: &str, emotion: &str, extra: Value) -> Value {
    let mut base = json!({
        "id": id,
        "childId": "c1",
        "startedAt": started_at,
        "endedAt": started_at,
        "durationSeconds": 300,
        "summary": format!("Conversation {id}"),
        "topics": [],
        "dominantEmotion": emotion,
        "sentimentScore": 50,
        "conversationInsight": {},
        "learningInsight": {},
        "socialInsight": {},
        "wellbeingInsight": {}
    });
    if let (Some(obj), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            obj.insert(k.clone(), v.clone());
        }
    }
    base
}

pub(crate) fn conversation(id: &str, started_at: &str, emotion: &str, extra: Value) -> Conversation {
    validate_conversation(&record(id, started_at, emotion, extra)).unwrap()
}

/// Conversation at 09:00 UTC on `date`
pub(crate) fn on(date: &str, id: &str, emotion: &str, extra: Value) -> Conversation {
    conversation(id, &format!("{date}T09:00:00Z"), emotion, extra)
}
