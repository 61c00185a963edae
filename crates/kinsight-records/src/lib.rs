//! Conversation records produced by the companion's annotation pipeline

mod conversation;
mod io;
mod month;
mod paths;
mod validate;

pub use conversation::{
    Conversation, ConversationInsight, Emotion, EmotionSample, EngagementLevel, Flags,
    LearningInsight, SocialInsight, WellbeingInsight, COMPLEX_QUESTION_TYPES,
};
pub use io::{append_jsonl, atomic_write, read_records, InputRecord, Origin, RecordLine};
pub use month::YearMonth;
pub use paths::Paths;
pub use validate::{validate_conversation, ValidationError, REQUIRED_FIELDS};
