//! Heart-health quiz.

/// One multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub prompt: &'static str,
    pub options: &'static [&'static str],
    pub answer: &'static str,
    pub fact: &'static str,
}

pub static QUESTIONS: [Question; 4] = [
    Question {
        prompt: "What is considered a normal blood pressure reading?",
        options: &["120/80", "140/90", "160/100", "90/60"],
        answer: "120/80",
        fact: "120/80 mmHg or lower is considered normal.",
    },
    Question {
        prompt: "Which food nutrient increases blood pressure the most?",
        options: &["Sugar", "Sodium (Salt)", "Protein", "Fiber"],
        answer: "Sodium (Salt)",
        fact: "Excess sodium causes the body to hold onto water, putting stress on your heart.",
    },
    Question {
        prompt: "True or False: High blood pressure always has obvious symptoms.",
        options: &["True", "False"],
        answer: "False",
        fact: "It is called the 'Silent Killer' because it usually has NO symptoms.",
    },
    Question {
        prompt: "What lifestyle change helps lower BP?",
        options: &["Smoking", "Sitting all day", "Regular Exercise", "Drinking alcohol"],
        answer: "Regular Exercise",
        fact: "150 minutes of moderate activity a week helps keep your heart strong.",
    },
];

/// Outcome of answering the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub correct: bool,
    pub fact: &'static str,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("the quiz is over")]
    Finished,
    #[error("'{0}' is not one of the options")]
    UnknownOption(String),
}

/// Progress through [`QUESTIONS`].
#[derive(Debug, Clone, Default)]
pub struct Quiz {
    current: usize,
    score: usize,
}

impl Quiz {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> Option<&'static Question> {
        QUESTIONS.get(self.current)
    }

    /// Answer the current question and move to the next one.
    ///
    /// # Errors
    ///
    /// [`QuizError::Finished`] after the last question, or
    /// [`QuizError::UnknownOption`] if `choice` is not offered.
    pub fn answer(&mut self, choice: &str) -> Result<Feedback, QuizError> {
        let question = self.current().ok_or(QuizError::Finished)?;
        let choice = choice.trim();
        if !question.options.iter().any(|o| o.eq_ignore_ascii_case(choice)) {
            return Err(QuizError::UnknownOption(choice.to_owned()));
        }
        let correct = question.answer.eq_ignore_ascii_case(choice);
        if correct {
            self.score += 1;
        }
        self.current += 1;
        Ok(Feedback { correct, fact: question.fact })
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.current >= QUESTIONS.len()
    }

    #[must_use]
    pub fn verdict(&self) -> &'static str {
        if self.score == QUESTIONS.len() {
            "Perfect! You are a Heart Health Expert!"
        } else {
            "Good job! Keep learning to stay healthy."
        }
    }

    /// Start over.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[path = "quiz_test.rs"]
mod tests;
