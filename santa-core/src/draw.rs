//! Assignment drawing: who gives to whom, and which three magic words travel
//! with each pairing.
//!
//! Participants are shuffled once and linked into a single ring, so the
//! result is always one cycle covering everybody. Word triplets are chosen
//! independently of the ring.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::{Adjective, AdjectiveId, Category, Participant, ParticipantId};

pub const MIN_PARTICIPANTS: usize = 2;
pub const WORDS_PER_ASSIGNMENT: usize = 3;

pub type Triplet = [AdjectiveId; WORDS_PER_ASSIGNMENT];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    pub gifter_id: ParticipantId,
    pub receiver_id: ParticipantId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub gifter_id: ParticipantId,
    pub receiver_id: ParticipantId,
    pub adjective_ids: Triplet,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrawError {
    #[error("at least 2 participants are needed, found {found}")]
    NotEnoughParticipants { found: usize },
    #[error("{needed} magic words are needed for {participants} participants, found {found}")]
    NotEnoughAdjectives {
        participants: usize,
        needed: usize,
        found: usize,
    },
    #[error("expected {expected} word triplets, got {found}")]
    TripletCount { expected: usize, found: usize },
    #[error("word {0:?} is not in the room's pool")]
    UnknownWord(String),
    #[error("word {0:?} appears twice in one triplet")]
    RepeatedWord(String),
}

pub fn check_pool(participants: usize, adjectives: usize) -> Result<(), DrawError> {
    if participants < MIN_PARTICIPANTS {
        return Err(DrawError::NotEnoughParticipants {
            found: participants,
        });
    }
    let needed = participants * WORDS_PER_ASSIGNMENT;
    if adjectives < needed {
        return Err(DrawError::NotEnoughAdjectives {
            participants,
            needed,
            found: adjectives,
        });
    }
    Ok(())
}

/// Links `order[i]` to `order[i + 1]`, wrapping the last back to the first.
///
/// With two or more distinct ids this is a single cycle of length `order.len()`.
pub fn pair_in_cycle(order: &[ParticipantId]) -> Vec<Pairing> {
    let n = order.len();
    (0..n)
        .map(|i| Pairing {
            gifter_id: order[i].clone(),
            receiver_id: order[(i + 1) % n].clone(),
        })
        .collect()
}

pub fn shuffle_in_cycle<R: Rng + ?Sized>(
    participants: &[Participant],
    rng: &mut R,
) -> Result<Vec<Pairing>, DrawError> {
    if participants.len() < MIN_PARTICIPANTS {
        return Err(DrawError::NotEnoughParticipants {
            found: participants.len(),
        });
    }
    let mut order = participants
        .iter()
        .map(|p| p.id.clone())
        .collect::<Vec<_>>();
    order.shuffle(rng);
    Ok(pair_in_cycle(&order))
}

/// True when following gifter -> receiver from any participant visits every
/// participant exactly once before returning.
pub fn is_single_cycle(pairings: &[Pairing]) -> bool {
    let n = pairings.len();
    if n < MIN_PARTICIPANTS {
        return false;
    }

    let next: HashMap<&str, &str> = pairings
        .iter()
        .map(|p| (p.gifter_id.as_str(), p.receiver_id.as_str()))
        .collect();
    if next.len() != n {
        return false;
    }

    let start = pairings[0].gifter_id.as_str();
    let mut current = start;
    for step in 1..=n {
        let Some(&receiver) = next.get(current) else {
            return false;
        };
        if receiver == start {
            return step == n;
        }
        current = receiver;
    }
    false
}

/// Picks `count` disjoint triplets from the pool.
///
/// Each round takes one word from each of the three fullest categories, so a
/// triplet only repeats a category once fewer than three categories remain.
pub fn allocate_triplets<R: Rng + ?Sized>(
    pool: &[Adjective],
    count: usize,
    rng: &mut R,
) -> Result<Vec<Triplet>, DrawError> {
    let needed = count * WORDS_PER_ASSIGNMENT;
    let not_enough = || DrawError::NotEnoughAdjectives {
        participants: count,
        needed,
        found: pool.len(),
    };
    if pool.len() < needed {
        return Err(not_enough());
    }

    let mut grouped: BTreeMap<Category, Vec<&Adjective>> = BTreeMap::new();
    for adjective in pool {
        grouped.entry(adjective.category).or_default().push(adjective);
    }
    let mut buckets = grouped.into_values().collect::<Vec<_>>();
    for bucket in buckets.iter_mut() {
        bucket.shuffle(rng);
    }

    let mut triplets = Vec::with_capacity(count);
    for _ in 0..count {
        // shuffle first so the stable sort breaks ties randomly
        buckets.shuffle(rng);
        buckets.sort_by(|a, b| b.len().cmp(&a.len()));

        let mut picked = Vec::with_capacity(WORDS_PER_ASSIGNMENT);
        for bucket in buckets.iter_mut().take(WORDS_PER_ASSIGNMENT) {
            if let Some(adjective) = bucket.pop() {
                picked.push(adjective.id.clone());
            }
        }
        while picked.len() < WORDS_PER_ASSIGNMENT {
            buckets.sort_by(|a, b| b.len().cmp(&a.len()));
            let adjective = buckets
                .first_mut()
                .and_then(|bucket| bucket.pop())
                .ok_or_else(not_enough)?;
            picked.push(adjective.id.clone());
        }
        buckets.retain(|bucket| !bucket.is_empty());

        triplets.push(into_triplet(picked).ok_or_else(not_enough)?);
    }

    Ok(triplets)
}

/// Maps word triplets proposed by an outside collaborator back onto the pool.
///
/// Matching ignores case and surrounding whitespace. When the same word
/// exists in several categories, each occurrence can be used once per triplet.
pub fn resolve_triplets(
    pool: &[Adjective],
    words: &[[String; WORDS_PER_ASSIGNMENT]],
    count: usize,
) -> Result<Vec<Triplet>, DrawError> {
    if words.len() != count {
        return Err(DrawError::TripletCount {
            expected: count,
            found: words.len(),
        });
    }

    let mut by_word: HashMap<String, Vec<&AdjectiveId>> = HashMap::new();
    for adjective in pool {
        by_word
            .entry(normalize(&adjective.word))
            .or_default()
            .push(&adjective.id);
    }

    words
        .iter()
        .map(|triple| {
            let mut picked: Vec<AdjectiveId> = Vec::with_capacity(WORDS_PER_ASSIGNMENT);
            for word in triple {
                let candidates = by_word
                    .get(&normalize(word))
                    .ok_or_else(|| DrawError::UnknownWord(word.clone()))?;
                let id = candidates
                    .iter()
                    .find(|id| !picked.contains(id))
                    .ok_or_else(|| DrawError::RepeatedWord(word.clone()))?;
                picked.push((*id).clone());
            }
            into_triplet(picked).ok_or(DrawError::TripletCount {
                expected: count,
                found: words.len(),
            })
        })
        .collect()
}

pub fn assemble(pairings: Vec<Pairing>, triplets: Vec<Triplet>) -> Result<Vec<Draft>, DrawError> {
    if pairings.len() != triplets.len() {
        return Err(DrawError::TripletCount {
            expected: pairings.len(),
            found: triplets.len(),
        });
    }
    Ok(pairings
        .into_iter()
        .zip(triplets)
        .map(|(pairing, adjective_ids)| Draft {
            gifter_id: pairing.gifter_id,
            receiver_id: pairing.receiver_id,
            adjective_ids,
        })
        .collect())
}

/// Full local draw: ring of participants plus locally allocated triplets.
pub fn draw<R: Rng + ?Sized>(
    participants: &[Participant],
    pool: &[Adjective],
    rng: &mut R,
) -> Result<Vec<Draft>, DrawError> {
    check_pool(participants.len(), pool.len())?;
    let pairings = shuffle_in_cycle(participants, rng)?;
    let triplets = allocate_triplets(pool, participants.len(), rng)?;
    assemble(pairings, triplets)
}

fn into_triplet(ids: Vec<AdjectiveId>) -> Option<Triplet> {
    ids.try_into().ok()
}

fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn participants(n: usize) -> Vec<Participant> {
        (0..n)
            .map(|i| Participant::new(format!("p{i}"), format!("player {i}"), 0))
            .collect()
    }

    fn pool(per_category: usize, categories: &[Category]) -> Vec<Adjective> {
        categories
            .iter()
            .flat_map(|category| {
                (0..per_category).map(move |i| Adjective {
                    id: format!("{category}-{i}"),
                    category: *category,
                    word: format!("{category}word{i}"),
                    generated: false,
                })
            })
            .collect()
    }

    fn category_of<'a>(pool: &'a [Adjective], id: &str) -> &'a Category {
        &pool.iter().find(|a| a.id == id).unwrap().category
    }

    fn pairings_of(drafts: &[Draft]) -> Vec<Pairing> {
        drafts
            .iter()
            .map(|d| Pairing {
                gifter_id: d.gifter_id.clone(),
                receiver_id: d.receiver_id.clone(),
            })
            .collect()
    }

    #[test]
    fn ring_follows_shuffled_order() {
        let pairings = pair_in_cycle(&["B".into(), "C".into(), "A".into()]);
        let as_tuples = pairings
            .iter()
            .map(|p| (p.gifter_id.as_str(), p.receiver_id.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(as_tuples, vec![("B", "C"), ("C", "A"), ("A", "B")]);
        assert!(is_single_cycle(&pairings));
    }

    #[test]
    fn draws_form_one_cycle_with_distinct_words() {
        for n in 2..=12 {
            let people = participants(n);
            let words = pool(n, &Category::ALL[..3]);
            for seed in 0..25 {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let drafts = draw(&people, &words, &mut rng).unwrap();

                assert_eq!(drafts.len(), n);
                assert!(drafts.iter().all(|d| d.gifter_id != d.receiver_id));
                assert!(is_single_cycle(&pairings_of(&drafts)), "n={n} seed={seed}");

                let gifters = drafts.iter().map(|d| &d.gifter_id).collect::<HashSet<_>>();
                let receivers = drafts.iter().map(|d| &d.receiver_id).collect::<HashSet<_>>();
                assert_eq!(gifters.len(), n);
                assert_eq!(receivers.len(), n);

                for draft in &drafts {
                    let unique = draft.adjective_ids.iter().collect::<HashSet<_>>();
                    assert_eq!(unique.len(), 3);
                }
            }
        }
    }

    #[test]
    fn seeded_draw_is_deterministic() {
        let people = participants(5);
        let words = pool(5, &Category::ALL);
        let first = draw(&people, &words, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        let second = draw(&people, &words, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_small_rooms_and_pools() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = draw(&participants(1), &pool(3, &Category::ALL), &mut rng).unwrap_err();
        assert_eq!(err, DrawError::NotEnoughParticipants { found: 1 });

        let err = draw(&participants(3), &pool(4, &[Category::Color, Category::Mood]), &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            DrawError::NotEnoughAdjectives {
                participants: 3,
                needed: 9,
                found: 8
            }
        );
    }

    #[test]
    fn triplets_span_categories_when_possible() {
        let words = pool(2, &Category::ALL);
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let triplets = allocate_triplets(&words, 4, &mut rng).unwrap();
            assert_eq!(triplets.len(), 4);

            let mut used = HashSet::new();
            for triplet in &triplets {
                let categories = triplet
                    .iter()
                    .map(|id| category_of(&words, id))
                    .collect::<HashSet<_>>();
                assert_eq!(categories.len(), 3, "seed={seed}");
                for id in triplet {
                    assert!(used.insert(id.clone()), "word reused across triplets");
                }
            }
        }
    }

    #[test]
    fn single_category_pool_still_fills_triplets() {
        let words = pool(6, &[Category::Utility]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let triplets = allocate_triplets(&words, 2, &mut rng).unwrap();
        assert_eq!(triplets.len(), 2);
        for triplet in triplets {
            assert_eq!(triplet.iter().collect::<HashSet<_>>().len(), 3);
        }
    }

    #[test]
    fn resolves_proposed_words_against_pool() {
        let words = pool(2, &[Category::Color, Category::Mood, Category::Style]);
        let proposed = vec![
            ["ColorWord0".to_string(), " moodword0".into(), "styleword0".into()],
            ["colorword1".to_string(), "moodword1".into(), "styleword1".into()],
        ];
        let triplets = resolve_triplets(&words, &proposed, 2).unwrap();
        assert_eq!(
            triplets[0],
            ["color-0".to_string(), "mood-0".into(), "style-0".into()]
        );

        let err = resolve_triplets(&words, &proposed, 3).unwrap_err();
        assert_eq!(err, DrawError::TripletCount { expected: 3, found: 2 });

        let unknown = vec![["colorword0".to_string(), "sparkly".into(), "moodword1".into()]];
        assert_eq!(
            resolve_triplets(&words, &unknown, 1).unwrap_err(),
            DrawError::UnknownWord("sparkly".into())
        );

        let repeated = vec![["colorword0".to_string(), "colorword0".into(), "moodword1".into()]];
        assert_eq!(
            resolve_triplets(&words, &repeated, 1).unwrap_err(),
            DrawError::RepeatedWord("colorword0".into())
        );
    }

    #[test]
    fn same_word_in_two_categories_can_fill_one_triplet() {
        let words = vec![
            Adjective { id: "a".into(), category: Category::Color, word: "warm".into(), generated: false },
            Adjective { id: "b".into(), category: Category::Mood, word: "warm".into(), generated: true },
            Adjective { id: "c".into(), category: Category::Style, word: "bold".into(), generated: false },
        ];
        let proposed = vec![["warm".to_string(), "warm".into(), "bold".into()]];
        let triplets = resolve_triplets(&words, &proposed, 1).unwrap();
        assert_eq!(triplets[0], ["a".to_string(), "b".into(), "c".into()]);
    }

    #[test]
    fn cycle_check_rejects_split_rings_and_self_gifts() {
        let pair = |g: &str, r: &str| Pairing {
            gifter_id: g.into(),
            receiver_id: r.into(),
        };
        let two_rings = vec![pair("a", "b"), pair("b", "a"), pair("c", "d"), pair("d", "c")];
        assert!(!is_single_cycle(&two_rings));

        let self_gift = vec![pair("a", "a"), pair("b", "c"), pair("c", "b")];
        assert!(!is_single_cycle(&self_gift));

        let dangling = vec![pair("a", "b"), pair("b", "z")];
        assert!(!is_single_cycle(&dangling));

        assert!(is_single_cycle(&[pair("a", "b"), pair("b", "a")]));
        assert!(!is_single_cycle(&[pair("a", "a")]));
    }

    #[test]
    fn assemble_requires_matching_lengths() {
        let pairings = pair_in_cycle(&["a".into(), "b".into()]);
        let triplets = vec![["1".to_string(), "2".into(), "3".into()]];
        assert_eq!(
            assemble(pairings, triplets).unwrap_err(),
            DrawError::TripletCount { expected: 2, found: 1 }
        );
    }
}
