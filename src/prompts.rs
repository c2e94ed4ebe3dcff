//! Prompt text suppliers.
//!
//! The controller pulls exactly one prompt per round and does not care how
//! the corpus is ordered or refilled.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::path::Path;
use tokio::sync::Mutex;

/// Errors that can occur while loading a prompt corpus
#[derive(Debug, thiserror::Error)]
pub enum PromptLoadError {
    #[error("Failed to read prompts file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Prompts file contains no prompts")]
    Empty,
}

#[async_trait]
pub trait PromptSource: Send + Sync {
    /// Next prompt text to play
    async fn next_prompt(&self) -> String;
}

struct Deck {
    prompts: Vec<String>,
    cursor: usize,
    shuffle: bool,
}

impl Deck {
    fn draw(&mut self) -> String {
        if self.cursor >= self.prompts.len() {
            self.cursor = 0;
            if self.shuffle {
                self.prompts.shuffle(&mut rand::rng());
            }
        }
        let prompt = self.prompts[self.cursor].clone();
        self.cursor += 1;
        prompt
    }
}

/// Serves a fixed list in order, starting over when exhausted
pub struct StaticPromptSource {
    deck: Mutex<Deck>,
}

impl StaticPromptSource {
    pub fn new(prompts: Vec<String>) -> Result<Self, PromptLoadError> {
        if prompts.is_empty() {
            return Err(PromptLoadError::Empty);
        }
        Ok(Self {
            deck: Mutex::new(Deck {
                prompts,
                cursor: 0,
                shuffle: false,
            }),
        })
    }
}

#[async_trait]
impl PromptSource for StaticPromptSource {
    async fn next_prompt(&self) -> String {
        self.deck.lock().await.draw()
    }
}

/// Prompts read from a file, one per line, shuffled and reshuffled on every
/// pass through the corpus
pub struct FilePromptSource {
    deck: Mutex<Deck>,
}

impl FilePromptSource {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PromptLoadError> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await?;
        let mut prompts = parse_prompts(&contents);
        if prompts.is_empty() {
            return Err(PromptLoadError::Empty);
        }
        prompts.shuffle(&mut rand::rng());

        Ok(Self {
            deck: Mutex::new(Deck {
                prompts,
                cursor: 0,
                shuffle: true,
            }),
        })
    }

    pub async fn prompt_count(&self) -> usize {
        self.deck.lock().await.prompts.len()
    }
}

#[async_trait]
impl PromptSource for FilePromptSource {
    async fn next_prompt(&self) -> String {
        self.deck.lock().await.draw()
    }
}

/// One prompt per non-blank line
fn parse_prompts(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
