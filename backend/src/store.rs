//! Room records and the explicit "remove dependents first" steps that keep
//! assignments from pointing at deleted participants or words.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use santa_core::{
    Adjective, Assignment, AssignmentStatus, Category, Draft, GiftIdea, Participant,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

pub const ROOM_CODE_LEN: usize = 6;
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const NAME_MAX_LEN: usize = 40;
pub const WORD_MAX_LEN: usize = 32;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoomRecord {
    pub code: String,
    pub created_at: u64,
    pub participants: Vec<Participant>,
    pub adjectives: Vec<Adjective>,
    pub assignments: Vec<Assignment>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParticipantView {
    pub id: String,
    pub name: String,
    pub has_pin: bool,
    pub has_accessed: bool,
    pub joined_at: u64,
}

impl From<&Participant> for ParticipantView {
    fn from(p: &Participant) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            has_pin: p.has_pin(),
            has_accessed: p.has_accessed,
            joined_at: p.joined_at,
        }
    }
}

/// What the organiser sees: who holds which link, never who they draw.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssignmentLink {
    pub id: String,
    pub gifter_id: String,
    pub gifter_name: String,
    pub access_url: String,
    pub status: AssignmentStatus,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssignmentReveal {
    pub gifter_name: String,
    pub receiver_name: String,
    pub adjectives: Vec<Adjective>,
    pub status: AssignmentStatus,
    pub gift_ideas: Vec<GiftIdea>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateStatus {
    pub gifter_name: String,
    pub has_pin: bool,
    pub has_accessed: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoomView {
    pub code: String,
    pub created_at: u64,
    pub participants: Vec<ParticipantView>,
    pub adjectives: Vec<Adjective>,
    pub assignments: Vec<AssignmentLink>,
}

impl RoomRecord {
    pub fn new(code: impl Into<String>, created_at: u64) -> Self {
        Self {
            code: code.into(),
            created_at,
            participants: Vec::new(),
            adjectives: Vec::new(),
            assignments: Vec::new(),
        }
    }

    pub fn view(&self) -> RoomView {
        RoomView {
            code: self.code.clone(),
            created_at: self.created_at,
            participants: self.participant_views(),
            adjectives: self.adjectives.clone(),
            assignments: self.links(),
        }
    }

    pub fn participant_views(&self) -> Vec<ParticipantView> {
        self.participants.iter().map(ParticipantView::from).collect()
    }

    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn add_participant(&mut self, raw_name: &str, now: u64) -> Result<ParticipantView, ApiError> {
        let name = clean_text(raw_name, NAME_MAX_LEN, "name")?;
        if self
            .participants
            .iter()
            .any(|p| p.name.to_lowercase() == name.to_lowercase())
        {
            return Err(ApiError::bad_request(format!("{name} is already in this room")));
        }

        let participant = Participant::new(Uuid::new_v4().to_string(), name, now);
        let view = ParticipantView::from(&participant);
        self.participants.push(participant);
        Ok(view)
    }

    /// Drops the participant's assignments first, then the participant.
    pub fn remove_participant(&mut self, id: &str) -> bool {
        self.assignments.retain(|a| !a.involves(id));
        let before = self.participants.len();
        self.participants.retain(|p| p.id != id);
        self.participants.len() != before
    }

    pub fn clear_participants(&mut self) {
        let ids = self
            .participants
            .iter()
            .map(|p| p.id.as_str())
            .collect::<HashSet<_>>();
        self.assignments
            .retain(|a| !ids.contains(a.gifter_id.as_str()) && !ids.contains(a.receiver_id.as_str()));
        self.participants.clear();
    }

    pub fn has_word(&self, category: Category, word: &str) -> bool {
        let word = word.to_lowercase();
        self.adjectives
            .iter()
            .any(|a| a.category == category && a.word.to_lowercase() == word)
    }

    pub fn add_adjective(
        &mut self,
        category: Category,
        raw_word: &str,
        generated: bool,
    ) -> Result<Adjective, ApiError> {
        let word = clean_text(raw_word, WORD_MAX_LEN, "word")?;
        if self.has_word(category, &word) {
            return Err(ApiError::bad_request(format!(
                "{word} is already a {category} word in this room"
            )));
        }

        let adjective = Adjective {
            id: Uuid::new_v4().to_string(),
            category,
            word,
            generated,
        };
        self.adjectives.push(adjective.clone());
        Ok(adjective)
    }

    /// Drops assignments that use the word, then the word.
    pub fn remove_adjective(&mut self, id: &str) -> bool {
        self.assignments.retain(|a| !a.uses_adjective(id));
        let before = self.adjectives.len();
        self.adjectives.retain(|a| a.id != id);
        self.adjectives.len() != before
    }

    pub fn clear_adjectives(&mut self) {
        let ids = self
            .adjectives
            .iter()
            .map(|a| a.id.as_str())
            .collect::<HashSet<_>>();
        self.assignments
            .retain(|a| !a.adjective_ids.iter().any(|id| ids.contains(id.as_str())));
        self.adjectives.clear();
    }

    pub fn clear_assignments(&mut self) {
        self.assignments.clear();
    }

    /// Removes everything the room owns, children before parents.
    pub fn clear_all(&mut self) {
        self.clear_assignments();
        self.clear_adjectives();
        self.clear_participants();
    }

    /// Replaces the room's assignments with freshly drawn ones.
    ///
    /// The draw was made from a snapshot; if participants or words changed in
    /// the meantime the drafts no longer describe this room and are refused.
    pub fn replace_assignments(&mut self, drafts: Vec<Draft>) -> Result<(), ApiError> {
        let stale = || {
            ApiError::bad_request(
                "the room changed while assignments were being generated, try again",
            )
        };

        let participant_ids = self
            .participants
            .iter()
            .map(|p| p.id.as_str())
            .collect::<HashSet<_>>();
        let gifters = drafts
            .iter()
            .map(|d| d.gifter_id.as_str())
            .collect::<HashSet<_>>();
        if gifters != participant_ids || drafts.len() != participant_ids.len() {
            return Err(stale());
        }
        if drafts
            .iter()
            .any(|d| !participant_ids.contains(d.receiver_id.as_str()))
        {
            return Err(stale());
        }

        let adjective_ids = self
            .adjectives
            .iter()
            .map(|a| a.id.as_str())
            .collect::<HashSet<_>>();
        if drafts
            .iter()
            .flat_map(|d| d.adjective_ids.iter())
            .any(|id| !adjective_ids.contains(id.as_str()))
        {
            return Err(stale());
        }

        self.assignments = drafts
            .into_iter()
            .map(|draft| Assignment::from_draft(draft, Uuid::new_v4().to_string(), new_access_token()))
            .collect();
        Ok(())
    }

    pub fn links(&self) -> Vec<AssignmentLink> {
        self.assignments
            .iter()
            .map(|a| AssignmentLink {
                id: a.id.clone(),
                gifter_id: a.gifter_id.clone(),
                gifter_name: self.name_of(&a.gifter_id),
                access_url: a.access_url.clone(),
                status: a.status,
            })
            .collect()
    }

    pub fn assignment_index(&self, access_url: &str) -> Option<usize> {
        self.assignments
            .iter()
            .position(|a| a.access_url == access_url)
    }

    pub fn gate_status(&self, index: usize) -> Result<GateStatus, ApiError> {
        let assignment = self.assignment_at(index)?;
        let gifter = self
            .participant(&assignment.gifter_id)
            .ok_or_else(|| ApiError::not_found("participant"))?;
        Ok(GateStatus {
            gifter_name: gifter.name.clone(),
            has_pin: gifter.has_pin(),
            has_accessed: gifter.has_accessed,
        })
    }

    pub fn gifter_mut(&mut self, index: usize) -> Result<&mut Participant, ApiError> {
        let gifter_id = self.assignment_at(index)?.gifter_id.clone();
        self.participants
            .iter_mut()
            .find(|p| p.id == gifter_id)
            .ok_or_else(|| ApiError::not_found("participant"))
    }

    pub fn assignment_at(&self, index: usize) -> Result<&Assignment, ApiError> {
        self.assignments
            .get(index)
            .ok_or_else(|| ApiError::not_found("assignment"))
    }

    pub fn assignment_at_mut(&mut self, index: usize) -> Result<&mut Assignment, ApiError> {
        self.assignments
            .get_mut(index)
            .ok_or_else(|| ApiError::not_found("assignment"))
    }

    pub fn adjectives_of(&self, assignment: &Assignment) -> Vec<Adjective> {
        assignment
            .adjective_ids
            .iter()
            .filter_map(|id| self.adjectives.iter().find(|a| &a.id == id))
            .cloned()
            .collect()
    }

    pub fn reveal(&self, index: usize) -> Result<AssignmentReveal, ApiError> {
        let assignment = self.assignment_at(index)?;
        Ok(AssignmentReveal {
            gifter_name: self.name_of(&assignment.gifter_id),
            receiver_name: self.name_of(&assignment.receiver_id),
            adjectives: self.adjectives_of(assignment),
            status: assignment.status,
            gift_ideas: assignment.gift_ideas.clone(),
        })
    }

    fn name_of(&self, participant_id: &str) -> String {
        self.participant(participant_id)
            .map(|p| p.name.clone())
            .unwrap_or_default()
    }
}

/// Finds the room holding the assignment behind `access_url`.
pub fn locate_mut<'a>(
    rooms: &'a mut HashMap<String, RoomRecord>,
    access_url: &str,
) -> Option<(&'a mut RoomRecord, usize)> {
    rooms.values_mut().find_map(|room| {
        let index = room.assignment_index(access_url)?;
        Some((room, index))
    })
}

pub fn locate<'a>(
    rooms: &'a HashMap<String, RoomRecord>,
    access_url: &str,
) -> Option<(&'a RoomRecord, usize)> {
    rooms.values().find_map(|room| {
        let index = room.assignment_index(access_url)?;
        Some((room, index))
    })
}

pub fn new_room_code<R: Rng>(rng: &mut R) -> String {
    (0..ROOM_CODE_LEN)
        .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

pub fn new_access_token() -> String {
    Uuid::new_v4().simple().to_string()
}

fn clean_text(raw: &str, max_len: usize, what: &str) -> Result<String, ApiError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ApiError::bad_request(format!("{what} required")));
    }
    if text.chars().count() > max_len {
        return Err(ApiError::bad_request(format!(
            "{what} must be at most {max_len} characters"
        )));
    }
    Ok(text.to_string())
}
