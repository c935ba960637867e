use super::*;

#[test]
fn every_answer_is_an_option() {
    for q in &QUESTIONS {
        assert!(q.options.contains(&q.answer), "{}", q.prompt);
    }
}

#[test]
fn perfect_run() {
    let mut quiz = Quiz::new();
    for q in &QUESTIONS {
        let feedback = quiz.answer(q.answer).unwrap();
        assert!(feedback.correct);
        assert_eq!(feedback.fact, q.fact);
    }
    assert!(quiz.is_finished());
    assert_eq!(quiz.score(), 4);
    assert_eq!(quiz.verdict(), "Perfect! You are a Heart Health Expert!");
    assert_eq!(quiz.answer("True"), Err(QuizError::Finished));
}

#[test]
fn wrong_answer_still_advances() {
    let mut quiz = Quiz::new();
    assert!(!quiz.answer("140/90").unwrap().correct);
    assert_eq!(quiz.current().unwrap().answer, "Sodium (Salt)");
    assert!(quiz.answer("sodium (salt)").unwrap().correct);
    assert_eq!(quiz.score(), 1);
}

#[test]
fn unknown_option_does_not_advance() {
    let mut quiz = Quiz::new();
    assert_eq!(quiz.answer("Coffee"), Err(QuizError::UnknownOption("Coffee".into())));
    assert_eq!(quiz.current(), Some(&QUESTIONS[0]));
}

#[test]
fn imperfect_verdict_and_reset() {
    let mut quiz = Quiz::new();
    for q in &QUESTIONS {
        quiz.answer(q.options.iter().find(|o| **o != q.answer).unwrap()).unwrap();
    }
    assert_eq!(quiz.score(), 0);
    assert_eq!(quiz.verdict(), "Good job! Keep learning to stay healthy.");
    quiz.reset();
    assert!(!quiz.is_finished());
    assert_eq!(quiz.score(), 0);
}
