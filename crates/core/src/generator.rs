//! Builds multiple-choice quizzes from a unit's vocabulary or grammar examples.
//!
//! Every function takes the random source as a parameter. Production callers
//! pass `rand::rng()`; tests pass a seeded `StdRng` to pin orderings.
//! Shuffles are Fisher–Yates (`SliceRandom::shuffle`).

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::model::{ExerciseKind, GrammarExample, Question, Word};

/// Placeholder that replaces the missing word in gap-fill prompts.
pub const BLANK: &str = "______";

/// Wrong options added to each question when the pool allows it.
pub const DISTRACTORS_PER_QUESTION: usize = 3;

/// Fixed filler options offered next to the missing word of a fill-the-blank grammar question.
pub const GRAMMAR_FILLERS: [&str; 4] = ["was", "were", "the", "a"];

const PLACEHOLDER_EXAMPLES: usize = 3;
const GAPFILL_TEMPLATES: usize = 4;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum GeneratorError {
    #[error("{0} questions are built from grammar examples, not from words")]
    NotAWordExercise(ExerciseKind),
}

//
// ─── WORD EXERCISES ────────────────────────────────────────────────────────────
//

/// Generate up to `count` questions of a word exercise.
///
/// The pool is de-duplicated by `word`, shuffled once, and the first `count`
/// words become the question subjects in that order, so no word is asked
/// twice. Each question gets up to three distractors drawn from the rest of
/// the pool; smaller pools produce questions with fewer options.
///
/// # Errors
///
/// Returns `GeneratorError::NotAWordExercise` for [`ExerciseKind::Grammar`].
///
/// # Examples
///
/// ```
/// # use els_core::generator::generate;
/// # use els_core::model::{ExerciseKind, Word};
/// let words = vec![
///     Word::new("key", "a tool that opens a lock", "kalit"),
///     Word::new("door", "a movable barrier", "eshik"),
/// ];
/// let quiz = generate(&words, ExerciseKind::EngToUz, 10, &mut rand::rng()).unwrap();
/// assert_eq!(quiz.len(), 2);
/// assert!(quiz.iter().all(|q| q.options.contains(&q.correct)));
/// ```
pub fn generate<R: Rng>(
    words: &[Word],
    kind: ExerciseKind,
    count: usize,
    rng: &mut R,
) -> Result<Vec<Question>, GeneratorError> {
    if !kind.is_word_exercise() {
        return Err(GeneratorError::NotAWordExercise(kind));
    }

    let mut pool = unique_by_word(words);
    pool.shuffle(rng);
    let count = count.min(pool.len());

    let mut questions = Vec::with_capacity(count);
    for subject in &pool[..count] {
        questions.push(word_question(subject, &pool, kind, rng));
    }
    Ok(questions)
}

fn unique_by_word(words: &[Word]) -> Vec<&Word> {
    let mut seen = HashSet::new();
    words
        .iter()
        .filter(|w| seen.insert(w.word.as_str()))
        .collect()
}

fn option_value(kind: ExerciseKind, word: &Word) -> &str {
    match kind {
        ExerciseKind::Definition => &word.definition,
        ExerciseKind::EngToUz => &word.translation,
        ExerciseKind::UzToEng | ExerciseKind::Gapfill | ExerciseKind::Grammar => &word.word,
    }
}

fn word_question<R: Rng>(
    subject: &Word,
    pool: &[&Word],
    kind: ExerciseKind,
    rng: &mut R,
) -> Question {
    let correct = option_value(kind, subject).to_owned();

    let mut candidates: Vec<&Word> = pool
        .iter()
        .copied()
        .filter(|w| w.word != subject.word)
        .collect();
    candidates.shuffle(rng);

    // Two words may share a translation or definition; skip repeated values.
    let mut options = vec![correct.clone()];
    for candidate in candidates {
        if options.len() > DISTRACTORS_PER_QUESTION {
            break;
        }
        let value = option_value(kind, candidate);
        if !options.iter().any(|o| o == value) {
            options.push(value.to_owned());
        }
    }
    options.shuffle(rng);

    let text = match kind {
        ExerciseKind::Definition => format!("What is the definition of \"{}\"?", subject.word),
        ExerciseKind::EngToUz => format!("Translate \"{}\" to Uzbek:", subject.word),
        ExerciseKind::UzToEng => {
            format!("What is the English word for \"{}\"?", subject.translation)
        }
        ExerciseKind::Gapfill | ExerciseKind::Grammar => gapfill_sentence(subject, rng),
    };

    Question {
        text,
        options,
        correct,
        kind,
    }
}

fn gapfill_sentence<R: Rng>(subject: &Word, rng: &mut R) -> String {
    match rng.random_range(0..GAPFILL_TEMPLATES) {
        0 => format!("The word \"{BLANK}\" means \"{}\".", subject.definition),
        1 => format!("In the text, \"{BLANK}\" was used to describe a situation."),
        2 => format!("The translation of \"{BLANK}\" is \"{}\".", subject.translation),
        _ => format!("To understand the passage, you need to know what \"{BLANK}\" means."),
    }
}

//
// ─── GRAMMAR EXERCISES ─────────────────────────────────────────────────────────
//

/// Generate up to `count` grammar questions, one per example in order.
///
/// Each example becomes either a "pick the correct sentence" question with
/// corrupted variants as distractors, or a "fill the blank" question missing
/// its middle word. Blank examples are skipped; with none left, placeholder
/// examples are synthesized so the result is never empty unless `count` is 0.
pub fn generate_grammar<R: Rng>(
    structure: &str,
    examples: &[GrammarExample],
    count: usize,
    rng: &mut R,
) -> Vec<Question> {
    let mut examples: Vec<String> = examples
        .iter()
        .map(|e| e.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|e| !e.is_empty())
        .collect();
    if examples.is_empty() {
        examples = (1..=PLACEHOLDER_EXAMPLES)
            .map(|n| format!("Example {n} with {structure}"))
            .collect();
    }

    let mut questions = Vec::with_capacity(count.min(examples.len()));
    for example in examples.iter().take(count) {
        let question = if rng.random_bool(0.5) {
            pick_sentence_question(structure, example, rng)
        } else {
            fill_blank_question(structure, example, rng)
        };
        questions.push(question);
    }
    questions
}

fn pick_sentence_question<R: Rng>(structure: &str, example: &str, rng: &mut R) -> Question {
    let mut options = vec![example.to_owned()];
    for variant in corruptions(example) {
        if options.len() > DISTRACTORS_PER_QUESTION {
            break;
        }
        if !options.contains(&variant) {
            options.push(variant);
        }
    }
    options.shuffle(rng);

    Question {
        text: format!("Which sentence correctly uses \"{structure}\"?"),
        options,
        correct: example.to_owned(),
        kind: ExerciseKind::Grammar,
    }
}

fn fill_blank_question<R: Rng>(structure: &str, example: &str, rng: &mut R) -> Question {
    let mut words: Vec<&str> = example.split_whitespace().collect();
    let middle = words.len() / 2;
    let Some(missing) = words.get(middle).map(|w| (*w).to_owned()) else {
        return pick_sentence_question(structure, example, rng);
    };
    words[middle] = BLANK;

    let mut options = vec![missing.clone()];
    options.extend(
        GRAMMAR_FILLERS
            .iter()
            .filter(|filler| **filler != missing)
            .map(|filler| (*filler).to_owned()),
    );
    options.shuffle(rng);

    Question {
        text: words.join(" "),
        options,
        correct: missing,
        kind: ExerciseKind::Grammar,
    }
}

/// Wrong variants of a sentence, most plausible first.
///
/// Variants may equal the sentence (no `was` to swap, one-word sentences);
/// callers filter those out.
fn corruptions(sentence: &str) -> Vec<String> {
    const TENSE: &[(&str, &str)] = &[("was", "were"), ("were", "was"), ("Was", "Were"), ("Were", "Was")];
    const ARTICLE: &[(&str, &str)] = &[("the", "a"), ("a", "the"), ("The", "A"), ("A", "The")];

    let words: Vec<&str> = sentence.split_whitespace().collect();
    let swapped = |pairs: &[(&str, &str)]| {
        words
            .iter()
            .map(|w| swap_token(w, pairs))
            .collect::<Vec<_>>()
            .join(" ")
    };

    let mut variants = vec![swapped(TENSE), swapped(ARTICLE)];

    let mut reversed = words.clone();
    reversed.reverse();
    variants.push(reversed.join(" "));

    if words.len() >= 2 {
        let mut adjacent = words.clone();
        adjacent.swap(0, 1);
        variants.push(adjacent.join(" "));
        variants.push(words[..words.len() - 1].join(" "));
    }
    variants
}

/// Replace a token by its pair, keeping trailing punctuation (`was,` -> `were,`).
fn swap_token(token: &str, pairs: &[(&str, &str)]) -> String {
    let core = token.trim_end_matches(|c: char| c.is_ascii_punctuation());
    let suffix = &token[core.len()..];
    pairs
        .iter()
        .find(|(from, _)| *from == core)
        .map_or_else(|| token.to_owned(), |(_, to)| format!("{to}{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pool(n: usize) -> Vec<Word> {
        (0..n)
            .map(|i| Word::new(format!("word{i}"), format!("definition {i}"), format!("tarjima {i}")))
            .collect()
    }

    fn assert_well_formed(question: &Question) {
        let matches = question
            .options
            .iter()
            .filter(|o| **o == question.correct)
            .count();
        assert_eq!(matches, 1, "exactly one correct option in {question:?}");
        let unique: HashSet<_> = question.options.iter().collect();
        assert_eq!(unique.len(), question.options.len(), "duplicate options in {question:?}");
    }

    #[test]
    fn clamps_count_to_pool_and_uses_four_options() {
        let mut rng = StdRng::seed_from_u64(42);
        let quiz = generate(&pool(5), ExerciseKind::Definition, 10, &mut rng).unwrap();

        assert_eq!(quiz.len(), 5);
        for question in &quiz {
            assert_eq!(question.options.len(), 4);
            assert_eq!(question.kind, ExerciseKind::Definition);
            assert_well_formed(question);
        }
        let subjects: HashSet<_> = quiz.iter().map(|q| q.correct.clone()).collect();
        assert_eq!(subjects.len(), 5);
    }

    #[test]
    fn every_word_kind_yields_requested_count() {
        let words = pool(12);
        for kind in ExerciseKind::ALL.into_iter().filter(|k| k.is_word_exercise()) {
            let mut rng = StdRng::seed_from_u64(9);
            let quiz = generate(&words, kind, 10, &mut rng).unwrap();
            assert_eq!(quiz.len(), 10);
            quiz.iter().for_each(assert_well_formed);
            let subjects: HashSet<_> = quiz.iter().map(|q| q.correct.clone()).collect();
            assert_eq!(subjects.len(), 10, "repeated subject for {kind}");
        }
    }

    #[test]
    fn prompts_and_answers_follow_field_mapping() {
        let words = pool(6);
        let mut rng = StdRng::seed_from_u64(3);

        for q in generate(&words, ExerciseKind::Definition, 6, &mut rng).unwrap() {
            let subject = words.iter().find(|w| w.definition == q.correct).unwrap();
            assert_eq!(q.text, format!("What is the definition of \"{}\"?", subject.word));
        }
        for q in generate(&words, ExerciseKind::EngToUz, 6, &mut rng).unwrap() {
            let subject = words.iter().find(|w| w.translation == q.correct).unwrap();
            assert_eq!(q.text, format!("Translate \"{}\" to Uzbek:", subject.word));
            assert!(q.options.iter().all(|o| o.starts_with("tarjima")));
        }
        for q in generate(&words, ExerciseKind::UzToEng, 6, &mut rng).unwrap() {
            let subject = words.iter().find(|w| w.word == q.correct).unwrap();
            assert_eq!(
                q.text,
                format!("What is the English word for \"{}\"?", subject.translation)
            );
        }
        for q in generate(&words, ExerciseKind::Gapfill, 6, &mut rng).unwrap() {
            assert!(q.text.contains(BLANK));
            assert!(!q.text.contains(&q.correct));
            assert!(q.options.iter().all(|o| o.starts_with("word")));
        }
    }

    #[test]
    fn small_pool_degrades_option_count() {
        let mut rng = StdRng::seed_from_u64(1);
        let quiz = generate(&pool(2), ExerciseKind::UzToEng, 5, &mut rng).unwrap();
        assert_eq!(quiz.len(), 2);
        for question in &quiz {
            assert_eq!(question.options.len(), 2);
            assert_well_formed(question);
        }

        let single = generate(&pool(1), ExerciseKind::EngToUz, 5, &mut rng).unwrap();
        assert_eq!(single[0].options, vec![single[0].correct.clone()]);

        assert!(generate(&[], ExerciseKind::Gapfill, 5, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn duplicate_words_are_asked_once() {
        let mut words = pool(4);
        words.push(words[0].clone());
        words.push(words[1].clone());
        let mut rng = StdRng::seed_from_u64(5);
        let quiz = generate(&words, ExerciseKind::UzToEng, 10, &mut rng).unwrap();
        assert_eq!(quiz.len(), 4);
    }

    #[test]
    fn shared_translations_never_duplicate_options() {
        let words = vec![
            Word::new("big", "large in size", "katta"),
            Word::new("large", "of great size", "katta"),
            Word::new("small", "little in size", "kichik"),
            Word::new("tiny", "very small", "mitti"),
            Word::new("huge", "extremely large", "ulkan"),
        ];
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            for question in generate(&words, ExerciseKind::EngToUz, 5, &mut rng).unwrap() {
                assert_well_formed(&question);
            }
        }
    }

    #[test]
    fn grammar_kind_is_rejected() {
        let err = generate(&pool(5), ExerciseKind::Grammar, 5, &mut rand::rng()).unwrap_err();
        assert_eq!(err, GeneratorError::NotAWordExercise(ExerciseKind::Grammar));
    }

    #[test]
    fn same_seed_gives_same_quiz() {
        let words = pool(8);
        let a = generate(&words, ExerciseKind::Definition, 5, &mut StdRng::seed_from_u64(11)).unwrap();
        let b = generate(&words, ExerciseKind::Definition, 5, &mut StdRng::seed_from_u64(11)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn grammar_uses_examples_in_order_and_caps_count() {
        let examples = vec![
            "She was at the park yesterday.".to_string(),
            "They were happy with the result.".to_string(),
            "   ".to_string(),
            "He was a teacher.".to_string(),
        ];
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let quiz = generate_grammar("Past Simple of to be", &examples, 5, &mut rng);
            assert_eq!(quiz.len(), 3);
            for (question, example) in quiz.iter().zip(["She was", "They were", "He was"]) {
                assert_eq!(question.kind, ExerciseKind::Grammar);
                assert_well_formed(question);
                if question.text.starts_with("Which sentence") {
                    assert!(question.correct.starts_with(example));
                    assert!(question.options.len() <= 4);
                } else {
                    assert!(question.text.contains(BLANK));
                    assert!(question.options.len() >= 4);
                }
            }
        }
    }

    #[test]
    fn grammar_without_examples_synthesizes_placeholders() {
        let quiz = generate_grammar("Present Perfect", &[], 5, &mut StdRng::seed_from_u64(2));
        assert_eq!(quiz.len(), 3);
        assert!(quiz.iter().all(|q| q.kind == ExerciseKind::Grammar));

        let none = generate_grammar("Present Perfect", &[], 0, &mut StdRng::seed_from_u64(2));
        assert!(none.is_empty());
    }

    #[test]
    fn fill_blank_removes_middle_word() {
        let question = fill_blank_question(
            "Past Simple",
            "They were happy with the result.",
            &mut StdRng::seed_from_u64(4),
        );
        assert_eq!(question.correct, "with");
        assert_eq!(question.text, "They were happy ______ the result.");
        assert_eq!(question.options.len(), 5);
        assert_well_formed(&question);

        let filler = fill_blank_question("Past", "It was cold", &mut StdRng::seed_from_u64(4));
        assert_eq!(filler.correct, "was");
        assert_eq!(filler.options.len(), 4);
        assert_well_formed(&filler);
    }

    #[test]
    fn corruptions_swap_tense_articles_and_order() {
        let variants = corruptions("She was at the park.");
        assert_eq!(variants[0], "She were at the park.");
        assert_eq!(variants[1], "She was at a park.");
        assert_eq!(variants[2], "park. the at was She");
    }

    #[test]
    fn pick_sentence_handles_sentences_without_swappable_words() {
        let question = pick_sentence_question("Imperative", "Go!", &mut StdRng::seed_from_u64(8));
        assert_eq!(question.options, vec!["Go!".to_string()]);

        let short = pick_sentence_question("Imperative", "Sit down", &mut StdRng::seed_from_u64(8));
        assert_well_formed(&short);
        assert!(short.options.len() >= 2);
    }
}
