//! The AI collaborator behind magic words, word pairing, gift ideas and
//! images. Handlers only see the `AiClient` trait; which implementation sits
//! behind it is decided once in `main`.

pub mod openai;

use futures::future::{self, BoxFuture, FutureExt};
use rand::seq::SliceRandom;
use santa_core::{Adjective, Category};

pub use openai::OpenAiClient;

pub type AiFuture<'a, T> = BoxFuture<'a, Result<T, AiError>>;

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Malformed(String),
    #[error("{0}")]
    Unavailable(String),
}

pub trait AiClient: Send + Sync {
    /// Up to `count` fresh adjectives for `category`.
    fn adjectives(&self, category: Category, count: usize) -> AiFuture<'_, Vec<String>>;

    /// `participants` triples of words taken from `pool`. `None` leaves the
    /// choice to the local allocator.
    fn pair_words(
        &self,
        pool: Vec<Adjective>,
        participants: usize,
    ) -> AiFuture<'_, Option<Vec<[String; 3]>>>;

    /// Short gift idea titles inspired by an assignment's three words.
    fn gift_ideas(&self, adjectives: Vec<Adjective>) -> AiFuture<'_, Vec<String>>;

    /// An image URL for one gift idea, if this client can draw.
    fn illustrate(&self, idea: String) -> AiFuture<'_, Option<String>>;
}

/// Works without network access: a built-in word bank, local pairing and
/// templated gift ideas. No images.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineAi;

impl AiClient for OfflineAi {
    fn adjectives(&self, category: Category, count: usize) -> AiFuture<'_, Vec<String>> {
        let words = word_bank(category)
            .choose_multiple(&mut rand::thread_rng(), count)
            .map(|w| w.to_string())
            .collect::<Vec<_>>();
        future::ready(Ok(words)).boxed()
    }

    fn pair_words(
        &self,
        _pool: Vec<Adjective>,
        _participants: usize,
    ) -> AiFuture<'_, Option<Vec<[String; 3]>>> {
        future::ready(Ok(None)).boxed()
    }

    fn gift_ideas(&self, adjectives: Vec<Adjective>) -> AiFuture<'_, Vec<String>> {
        let ideas = adjectives
            .iter()
            .map(|a| format!("{} {}", a.word, gift_noun(a.category)))
            .collect::<Vec<_>>();
        future::ready(Ok(ideas)).boxed()
    }

    fn illustrate(&self, _idea: String) -> AiFuture<'_, Option<String>> {
        future::ready(Ok(None)).boxed()
    }
}

pub fn word_bank(category: Category) -> &'static [&'static str] {
    match category {
        Category::Color => &[
            "crimson", "golden", "emerald", "pastel", "midnight", "silver", "rosy", "amber",
            "icy", "forest",
        ],
        Category::Texture => &[
            "fuzzy", "silky", "knitted", "smooth", "velvety", "chunky", "plush", "woven",
            "glossy", "rugged",
        ],
        Category::Style => &[
            "vintage", "minimalist", "quirky", "rustic", "sleek", "retro", "bohemian",
            "classic", "handmade", "nordic",
        ],
        Category::Mood => &[
            "cozy", "playful", "calming", "nostalgic", "cheerful", "whimsical", "dreamy",
            "festive", "soothing", "bold",
        ],
        Category::Utility => &[
            "portable", "handy", "reusable", "compact", "practical", "durable", "foldable",
            "rechargeable", "versatile", "clever",
        ],
        Category::Interest => &[
            "musical", "outdoorsy", "bookish", "artsy", "sporty", "culinary", "techy",
            "gardening", "crafty", "adventurous",
        ],
    }
}

fn gift_noun(category: Category) -> &'static str {
    match category {
        Category::Color => "scarf",
        Category::Texture => "throw blanket",
        Category::Style => "desk lamp",
        Category::Mood => "scented candle",
        Category::Utility => "pocket tool kit",
        Category::Interest => "hobby starter kit",
    }
}
