use std::collections::HashMap;

use crate::models::domain::{AttemptAnswer, QuizQuestion};
use crate::models::dto::request::AnswerInput;

/// Result of grading one submission against the quiz's question set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredAttempt {
    pub answers: Vec<AttemptAnswer>,
    pub score: i16, // rounded percentage, 0-100
    pub correct_count: i16,
    pub incorrect_count: i16,
}

/// Grade a submission. The quiz's questions are the source of truth: every
/// question produces exactly one answer row in question order, submissions
/// for unknown question ids are ignored, and a missing or null selection
/// counts as incorrect.
pub fn score_attempt(questions: &[QuizQuestion], submitted: &[AnswerInput]) -> ScoredAttempt {
    let selections: HashMap<&str, Option<i16>> = submitted
        .iter()
        .map(|a| (a.quiz_question_id.as_str(), a.selected_option))
        .collect();

    let mut answers = Vec::with_capacity(questions.len());
    let mut correct_count: i16 = 0;

    for question in questions {
        let selected_option = selections
            .get(question.id.as_str())
            .copied()
            .flatten();
        let is_correct = selected_option == Some(question.correct_option);
        if is_correct {
            correct_count += 1;
        }
        answers.push(AttemptAnswer {
            quiz_question_id: question.id.clone(),
            selected_option,
            is_correct,
        });
    }

    let total = questions.len() as i16;
    let incorrect_count = total - correct_count;
    let score = if total == 0 {
        0
    } else {
        ((correct_count as f64 / total as f64) * 100.0).round() as i16
    };

    ScoredAttempt {
        answers,
        score,
        correct_count,
        incorrect_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_question;

    fn answer(question_id: &str, selected: Option<i16>) -> AnswerInput {
        AnswerInput {
            quiz_question_id: question_id.to_string(),
            selected_option: selected,
        }
    }

    #[test]
    fn two_question_quiz_with_one_correct_scores_fifty() {
        let questions = vec![
            sample_question("quiz-1", 0),
            sample_question("quiz-1", 1),
        ];
        let submitted = vec![
            answer(&questions[0].id, Some(0)),
            answer(&questions[1].id, Some(0)),
        ];

        let scored = score_attempt(&questions, &submitted);

        assert_eq!(scored.score, 50);
        assert_eq!(scored.correct_count, 1);
        assert_eq!(scored.incorrect_count, 1);
        assert!(scored.answers[0].is_correct);
        assert!(!scored.answers[1].is_correct);
    }

    #[test]
    fn null_selection_counts_as_incorrect() {
        let questions = vec![sample_question("quiz-1", 2)];
        let submitted = vec![answer(&questions[0].id, None)];

        let scored = score_attempt(&questions, &submitted);

        assert_eq!(scored.score, 0);
        assert_eq!(scored.answers[0].selected_option, None);
        assert!(!scored.answers[0].is_correct);
    }

    #[test]
    fn missing_submission_rows_still_produce_answers() {
        let questions = vec![
            sample_question("quiz-1", 0),
            sample_question("quiz-1", 3),
        ];
        let submitted = vec![answer(&questions[0].id, Some(0))];

        let scored = score_attempt(&questions, &submitted);

        assert_eq!(scored.answers.len(), 2);
        assert_eq!(scored.answers[1].selected_option, None);
        assert_eq!(scored.score, 50);
    }

    #[test]
    fn unknown_question_ids_are_ignored() {
        let questions = vec![sample_question("quiz-1", 1)];
        let submitted = vec![
            answer("not-a-question", Some(1)),
            answer(&questions[0].id, Some(1)),
        ];

        let scored = score_attempt(&questions, &submitted);

        assert_eq!(scored.answers.len(), 1);
        assert_eq!(scored.score, 100);
    }

    #[test]
    fn empty_question_set_scores_zero() {
        let scored = score_attempt(&[], &[answer("q-1", Some(0))]);

        assert!(scored.answers.is_empty());
        assert_eq!(scored.score, 0);
        assert_eq!(scored.correct_count, 0);
        assert_eq!(scored.incorrect_count, 0);
    }

    #[test]
    fn one_of_three_rounds_to_thirty_three() {
        let questions = vec![
            sample_question("quiz-1", 0),
            sample_question("quiz-1", 0),
            sample_question("quiz-1", 0),
        ];
        let submitted = vec![
            answer(&questions[0].id, Some(0)),
            answer(&questions[1].id, Some(1)),
            answer(&questions[2].id, Some(1)),
        ];

        let scored = score_attempt(&questions, &submitted);
        assert_eq!(scored.score, 33);
    }

    #[test]
    fn two_of_three_rounds_to_sixty_seven() {
        let questions = vec![
            sample_question("quiz-1", 0),
            sample_question("quiz-1", 0),
            sample_question("quiz-1", 0),
        ];
        let submitted = vec![
            answer(&questions[0].id, Some(0)),
            answer(&questions[1].id, Some(0)),
            answer(&questions[2].id, Some(1)),
        ];

        let scored = score_attempt(&questions, &submitted);
        assert_eq!(scored.score, 67);
    }
}
