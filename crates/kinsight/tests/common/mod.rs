#![allow(dead_code)]

use serde_json::{json, Value};

/// A complete conversation record for child "c1"; `extra` overrides top-level fields
pub fn record(id: &str, started_at: &str, emotion: &str, extra: Value) -> Value {
    let mut base = json!({
        "id": id,
        "childId": "c1",
        "startedAt": started_at,
        "endedAt": started_at,
        "durationSeconds": 300,
        "summary": format!("Conversation {id}"),
        "keyPhrases": [],
        "topics": [],
        "dominantEmotion": emotion,
        "sentimentScore": 50,
        "conversationInsight": {
            "engagementLevel": "medium",
            "questionCount": 0,
            "questionTypes": [],
            "avgUtteranceLength": 6.5,
            "vocabularyComplexity": 40
        },
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

/// Record at `hour`:00 UTC on `date`
pub fn record_on(date: &str, hour: u32, id: &str, emotion: &str, extra: Value) -> Value {
    record(id, &format!("{date}T{hour:02}:00:00Z"), emotion, extra)
}

pub fn date(s: &str) -> chrono::NaiveDate {
    s.parse().unwrap()
}
