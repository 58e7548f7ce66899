use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod draw;
pub mod gate;

pub use draw::{
    allocate_triplets, assemble, check_pool, draw, is_single_cycle, pair_in_cycle,
    resolve_triplets, shuffle_in_cycle, Draft, DrawError, Pairing, Triplet,
};
pub use gate::{validate_pin, GateError, PIN_MAX_LEN, PIN_MIN_LEN};

pub type ParticipantId = String;
pub type AdjectiveId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub pin: Option<String>,
    pub has_accessed: bool,
    pub joined_at: u64,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, name: impl Into<String>, joined_at: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pin: None,
            has_accessed: false,
            joined_at,
        }
    }
}

/// Fixed, global set of word categories. Rooms do not own categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Color,
    Texture,
    Style,
    Mood,
    Utility,
    Interest,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Color,
        Category::Texture,
        Category::Style,
        Category::Mood,
        Category::Utility,
        Category::Interest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Color => "color",
            Category::Texture => "texture",
            Category::Style => "style",
            Category::Mood => "mood",
            Category::Utility => "utility",
            Category::Interest => "interest",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Color => "Color",
            Category::Texture => "Texture",
            Category::Style => "Style",
            Category::Mood => "Mood",
            Category::Utility => "Utility",
            Category::Interest => "Interest",
        }
    }

    /// Short description used when asking for words in this category.
    pub fn hint(self) -> &'static str {
        match self {
            Category::Color => "colors and color moods, like crimson or pastel",
            Category::Texture => "how something feels to the touch, like fuzzy or smooth",
            Category::Style => "aesthetic styles, like vintage or minimalist",
            Category::Mood => "feelings a gift evokes, like cozy or playful",
            Category::Utility => "how useful or practical something is, like portable or handy",
            Category::Interest => "hobbies and interests, like musical or outdoorsy",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Adjective {
    pub id: AdjectiveId,
    pub category: Category,
    pub word: String,
    pub generated: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    PendingGiftIdeas,
    PendingImages,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GiftIdea {
    pub title: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assignment {
    pub id: String,
    pub gifter_id: ParticipantId,
    pub receiver_id: ParticipantId,
    pub adjective_ids: Triplet,
    pub access_url: String,
    pub status: AssignmentStatus,
    #[serde(default)]
    pub gift_ideas: Vec<GiftIdea>,
}

impl Assignment {
    pub fn from_draft(draft: Draft, id: impl Into<String>, access_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            gifter_id: draft.gifter_id,
            receiver_id: draft.receiver_id,
            adjective_ids: draft.adjective_ids,
            access_url: access_url.into(),
            status: AssignmentStatus::PendingGiftIdeas,
            gift_ideas: Vec::new(),
        }
    }

    pub fn involves(&self, participant_id: &str) -> bool {
        self.gifter_id == participant_id || self.receiver_id == participant_id
    }

    pub fn uses_adjective(&self, adjective_id: &str) -> bool {
        self.adjective_ids.iter().any(|id| id == adjective_id)
    }

    /// Stores generated ideas and moves to `PendingImages`. Only valid while
    /// ideas are still pending; later statuses are left untouched. An empty
    /// list is not an answer and leaves the assignment pending.
    pub fn record_gift_ideas(&mut self, titles: Vec<String>) -> bool {
        if self.status != AssignmentStatus::PendingGiftIdeas || titles.is_empty() {
            return false;
        }
        self.gift_ideas = titles
            .into_iter()
            .map(|title| GiftIdea {
                title,
                image_url: None,
            })
            .collect();
        self.status = AssignmentStatus::PendingImages;
        true
    }

    /// Attaches one image per idea (by position) and completes the assignment.
    pub fn record_images(&mut self, urls: Vec<Option<String>>) -> bool {
        if self.status != AssignmentStatus::PendingImages {
            return false;
        }
        for (idea, url) in self.gift_ideas.iter_mut().zip(urls) {
            idea.image_url = url;
        }
        self.status = AssignmentStatus::Completed;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment() -> Assignment {
        Assignment::from_draft(
            Draft {
                gifter_id: "a".into(),
                receiver_id: "b".into(),
                adjective_ids: ["x".into(), "y".into(), "z".into()],
            },
            "as1",
            "token",
        )
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Texture".parse::<Category>(), Ok(Category::Texture));
        assert_eq!(" mood ".parse::<Category>(), Ok(Category::Mood));
        assert_eq!(
            "flavor".parse::<Category>(),
            Err(UnknownCategory("flavor".into()))
        );
    }

    #[test]
    fn status_serializes_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&AssignmentStatus::PendingGiftIdeas).unwrap(),
            "\"PENDING_GIFT_IDEAS\""
        );
        assert_eq!(
            serde_json::to_string(&Category::Interest).unwrap(),
            "\"interest\""
        );
    }

    #[test]
    fn gift_idea_status_only_moves_forward() {
        let mut a = assignment();
        assert!(!a.record_images(vec![Some("u".into())]));
        assert_eq!(a.status, AssignmentStatus::PendingGiftIdeas);

        assert!(a.record_gift_ideas(vec!["scarf".into(), "mug".into()]));
        assert_eq!(a.status, AssignmentStatus::PendingImages);
        assert!(!a.record_gift_ideas(vec!["other".into()]));
        assert_eq!(a.gift_ideas.len(), 2);

        assert!(a.record_images(vec![Some("https://img/1".into()), None]));
        assert_eq!(a.status, AssignmentStatus::Completed);
        assert_eq!(a.gift_ideas[0].image_url.as_deref(), Some("https://img/1"));
        assert_eq!(a.gift_ideas[1].image_url, None);
        assert!(!a.record_images(vec![]));
    }

    #[test]
    fn empty_gift_ideas_leave_assignment_pending() {
        let mut a = assignment();
        assert!(!a.record_gift_ideas(vec![]));
        assert_eq!(a.status, AssignmentStatus::PendingGiftIdeas);
        assert!(a.gift_ideas.is_empty());
    }

    #[test]
    fn involvement_checks() {
        let a = assignment();
        assert!(a.involves("a"));
        assert!(a.involves("b"));
        assert!(!a.involves("c"));
        assert!(a.uses_adjective("y"));
        assert!(!a.uses_adjective("w"));
    }
}
