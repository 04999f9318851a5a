mod helpers;

use helpers::{create_word, seeded_scheduler, test_fixture};

use drillbook::vocab::practice_log::today_key;
use drillbook::vocab::scheduler::{InputFeedback, PracticeSettings};
use drillbook::vocab::session::{Phase, REVEAL_THRESHOLD};
use drillbook::vocab::types::ItemKind;

#[tokio::test]
async fn accepted_prefixes_change_nothing() {
    let (repo, log) = test_fixture();
    let item = create_word(&repo, "hello").await;

    let mut scheduler = seeded_scheduler(
        repo.clone(),
        log,
        PracticeSettings::default(),
        ItemKind::Word,
    );
    scheduler.select_next().await.unwrap();

    for partial in ["h", "he", "hel"] {
        assert!(matches!(
            scheduler.handle_input(partial).await.unwrap(),
            InputFeedback::Accepted
        ));
    }

    let stored = repo.get_by_id(&item.id).await.unwrap().unwrap();
    assert_eq!(stored.proficiency, -100);
    assert_eq!(stored.stats.practice_count, 0);
}

#[tokio::test]
async fn first_divergence_costs_proficiency_but_not_stats() {
    let (repo, log) = test_fixture();
    let item = create_word(&repo, "hello").await;

    let mut scheduler = seeded_scheduler(
        repo.clone(),
        log,
        PracticeSettings::default(),
        ItemKind::Word,
    );
    scheduler.select_next().await.unwrap();

    let (consecutive_errors, revealed) = match scheduler.handle_input("hx").await.unwrap() {
        InputFeedback::MidEntryError {
            consecutive_errors,
            revealed,
        } => (consecutive_errors, revealed),
        other => panic!("expected mid-entry error, got {other:?}"),
    };
    assert_eq!(consecutive_errors, 1);
    assert!(!revealed);

    // Proficiency dropped immediately; stats wait for the attempt to end
    let stored = repo.get_by_id(&item.id).await.unwrap().unwrap();
    assert_eq!(stored.proficiency, -101);
    assert_eq!(stored.stats.practice_count, 0);
    assert_eq!(stored.stats.error_count, 0);
}

#[tokio::test]
async fn repeated_divergence_is_not_double_penalized() {
    let (repo, log) = test_fixture();
    let item = create_word(&repo, "hello").await;

    let mut scheduler = seeded_scheduler(
        repo.clone(),
        log,
        PracticeSettings::default(),
        ItemKind::Word,
    );
    scheduler.select_next().await.unwrap();

    // A held key produces a stream of change events for the same mistake
    scheduler.handle_input("hx").await.unwrap();
    scheduler.handle_input("hxx").await.unwrap();
    scheduler.handle_input("hxxx").await.unwrap();

    let stored = repo.get_by_id(&item.id).await.unwrap().unwrap();
    assert_eq!(stored.proficiency, -101);
    assert_eq!(scheduler.session().consecutive_errors(), 1);
}

#[tokio::test]
async fn clear_and_retry_commits_exactly_one_stats_increment() {
    let (repo, log) = test_fixture();
    let item = create_word(&repo, "hello").await;

    let mut scheduler = seeded_scheduler(
        repo.clone(),
        log.clone(),
        PracticeSettings::default(),
        ItemKind::Word,
    );
    scheduler.select_next().await.unwrap();

    scheduler.handle_input("hx").await.unwrap();
    scheduler.clear_and_retry().await.unwrap();

    let stored = repo.get_by_id(&item.id).await.unwrap().unwrap();
    assert_eq!(stored.stats.practice_count, 1);
    assert_eq!(stored.stats.error_count, 1);
    assert!(stored.stats.is_consistent());
    assert_eq!(scheduler.session().phase(), Phase::AwaitingInput);

    // The abandoned attempt landed in today's log as a wrong answer
    let days = log.days().await.unwrap();
    let day = &days[&today_key()];
    assert!(day.item_ids.contains(&item.id));
    assert_eq!(day.correct_count, 0);

    // A fresh attempt is penalized independently
    scheduler.handle_input("q").await.unwrap();
    let stored = repo.get_by_id(&item.id).await.unwrap().unwrap();
    assert_eq!(stored.proficiency, -102);
}

#[tokio::test]
async fn clear_without_divergence_commits_nothing() {
    let (repo, log) = test_fixture();
    let item = create_word(&repo, "hello").await;

    let mut scheduler = seeded_scheduler(
        repo.clone(),
        log,
        PracticeSettings::default(),
        ItemKind::Word,
    );
    scheduler.select_next().await.unwrap();

    scheduler.handle_input("he").await.unwrap();
    scheduler.clear_and_retry().await.unwrap();

    let stored = repo.get_by_id(&item.id).await.unwrap().unwrap();
    assert_eq!(stored.stats.practice_count, 0);
}

#[tokio::test]
async fn completing_the_word_finalizes_as_correct() {
    let (repo, log) = test_fixture();
    let item = create_word(&repo, "hello").await;

    let mut scheduler = seeded_scheduler(
        repo.clone(),
        log,
        PracticeSettings::default(),
        ItemKind::Word,
    );
    scheduler.select_next().await.unwrap();

    let outcome = match scheduler.handle_input("hello").await.unwrap() {
        InputFeedback::Finalized(outcome) => outcome,
        other => panic!("expected finalization, got {other:?}"),
    };
    assert!(outcome.is_correct);

    let stored = repo.get_by_id(&item.id).await.unwrap().unwrap();
    assert_eq!(stored.proficiency, -99);
    assert_eq!(stored.stats.correct_count, 1);
    assert!(stored.stats.is_consistent());
}

#[tokio::test]
async fn backspaced_recovery_drops_the_pending_error_commit() {
    let (repo, log) = test_fixture();
    let item = create_word(&repo, "hello").await;

    let mut scheduler = seeded_scheduler(
        repo.clone(),
        log,
        PracticeSettings::default(),
        ItemKind::Word,
    );
    scheduler.select_next().await.unwrap();

    // Diverge (one proficiency penalty), fix it, and finish the word
    scheduler.handle_input("hx").await.unwrap();
    let feedback = scheduler.handle_input("hello").await.unwrap();
    assert!(matches!(feedback, InputFeedback::Finalized(o) if o.is_correct));

    // One submission committed; the divergence never became a stats error
    let stored = repo.get_by_id(&item.id).await.unwrap().unwrap();
    assert_eq!(stored.stats.practice_count, 1);
    assert_eq!(stored.stats.correct_count, 1);
    assert_eq!(stored.stats.error_count, 0);
    assert_eq!(stored.proficiency, -100); // -1 penalty, +1 correct
}

#[tokio::test]
async fn keystroke_reveal_commits_once_and_locks_input() {
    let (repo, log) = test_fixture();
    let item = create_word(&repo, "hello").await;

    let mut scheduler = seeded_scheduler(
        repo.clone(),
        log,
        PracticeSettings::default(),
        ItemKind::Word,
    );
    scheduler.select_next().await.unwrap();

    // Four abandoned attempts
    for _ in 0..(REVEAL_THRESHOLD - 1) {
        scheduler.handle_input("zz").await.unwrap();
        scheduler.clear_and_retry().await.unwrap();
    }

    // The fifth divergence reveals
    let (consecutive_errors, revealed) = match scheduler.handle_input("zz").await.unwrap() {
        InputFeedback::MidEntryError {
            consecutive_errors,
            revealed,
        } => (consecutive_errors, revealed),
        other => panic!("expected mid-entry error, got {other:?}"),
    };
    assert!(revealed);
    assert_eq!(consecutive_errors, REVEAL_THRESHOLD);
    assert_eq!(scheduler.session().phase(), Phase::Revealed);
    assert_eq!(scheduler.session().consecutive_errors(), 0);

    // Five attempts, five paired increments, five proficiency penalties
    let stored = repo.get_by_id(&item.id).await.unwrap().unwrap();
    assert_eq!(stored.stats.practice_count, u64::from(REVEAL_THRESHOLD));
    assert_eq!(stored.stats.error_count, u64::from(REVEAL_THRESHOLD));
    assert_eq!(stored.proficiency, -100 - i64::from(REVEAL_THRESHOLD));
    assert!(stored.stats.is_consistent());

    // Locked until the collaborator advances
    assert!(matches!(
        scheduler.handle_input("hello").await.unwrap(),
        InputFeedback::Ignored
    ));

    scheduler.finish_drill();
    assert_eq!(scheduler.session().phase(), Phase::Idle);
}
