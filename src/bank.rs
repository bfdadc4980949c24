// src/bank.rs

use std::collections::HashMap;
use std::path::Path;

use rand::seq::SliceRandom;

use crate::models::question::Question;

/// Static topic → question-pool mapping, loaded once at startup.
///
/// The bank is read-only configuration: rooms copy questions out of it, so a
/// later reload can never affect an already-created room.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    pools: HashMap<String, Vec<Question>>,
}

impl QuestionBank {
    /// Builds a bank from in-memory pools, rejecting malformed questions
    /// (a correct answer that is not one of its options).
    pub fn from_pools(
        pools: HashMap<String, Vec<Question>>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        for (topic, pool) in &pools {
            for q in pool {
                if !q.is_well_formed() {
                    return Err(format!(
                        "malformed question in topic '{}': correct answer '{}' is not an option",
                        topic, q.correct
                    )
                    .into());
                }
            }
        }
        Ok(Self { pools })
    }

    /// Loads the bank from a JSON file of shape `{"topic": [question, ...]}`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let raw = std::fs::read_to_string(path)?;
        let pools: HashMap<String, Vec<Question>> = serde_json::from_str(&raw)?;
        Self::from_pools(pools)
    }

    pub fn topics(&self) -> Vec<&str> {
        self.pools.keys().map(String::as_str).collect()
    }

    pub fn pool_size(&self, topic: &str) -> usize {
        self.pools.get(topic).map_or(0, Vec::len)
    }

    /// Samples `count` questions without replacement from the topic's pool.
    /// Returns `None` when the topic is unknown or the pool is too small.
    pub fn sample(&self, topic: &str, count: usize) -> Option<Vec<Question>> {
        let pool = self.pools.get(topic)?;
        if pool.len() < count {
            return None;
        }

        let mut picked = pool.clone();
        picked.shuffle(&mut rand::thread_rng());
        picked.truncate(count);
        Some(picked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(prompt: &str) -> Question {
        Question {
            question: prompt.to_string(),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct: "A".to_string(),
        }
    }

    fn bank_with(count: usize) -> QuestionBank {
        let pool = (0..count).map(|i| question(&format!("Q{}", i))).collect();
        QuestionBank::from_pools(HashMap::from([("react".to_string(), pool)])).unwrap()
    }

    #[test]
    fn sample_returns_distinct_questions() {
        let bank = bank_with(12);
        let picked = bank.sample("react", 10).unwrap();
        assert_eq!(picked.len(), 10);

        let mut prompts: Vec<&str> = picked.iter().map(|q| q.question.as_str()).collect();
        prompts.sort();
        prompts.dedup();
        assert_eq!(prompts.len(), 10, "sampling must be without replacement");
    }

    #[test]
    fn sample_rejects_short_pool_and_unknown_topic() {
        let bank = bank_with(9);
        assert!(bank.sample("react", 10).is_none());
        assert!(bank.sample("java", 10).is_none());
    }

    #[test]
    fn malformed_question_is_rejected_at_load() {
        let bad = Question {
            question: "Q".to_string(),
            options: vec!["A".into(), "B".into()],
            correct: "Z".to_string(),
        };
        let result = QuestionBank::from_pools(HashMap::from([("react".to_string(), vec![bad])]));
        assert!(result.is_err());
    }
}
