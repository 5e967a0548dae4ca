mod common;

use loars::error::AppError;
use loars::store::{assignments, outcomes};

#[tokio::test]
async fn replace_assigns_dense_order_numbers() {
    let db = common::test_db().await;
    outcomes::ensure_defaults(&db, "SOFT703").await.expect("defaults");

    let texts = vec![
        "  Build server-rendered web applications.  ".to_string(),
        "".to_string(),
        "   ".to_string(),
        "Deploy applications to a cloud platform.".to_string(),
    ];
    let los = outcomes::replace_for_course(&db, "SOFT703", &texts).await.expect("replace");

    let orders: Vec<i64> = los.iter().map(|lo| lo.order_number).collect();
    assert_eq!(orders, vec![1, 2]);
    assert_eq!(los[0].outcome_text, "Build server-rendered web applications.");
    assert_eq!(los[1].outcome_text, "Deploy applications to a cloud platform.");
    assert_eq!(
        common::count(&db, "SELECT COUNT(*) FROM learning_outcomes WHERE course_code = 'SOFT703'").await,
        2
    );
}

#[tokio::test]
async fn replace_only_touches_one_course() {
    let db = common::test_db().await;
    outcomes::ensure_defaults(&db, "SOFT703").await.expect("soft");
    outcomes::ensure_defaults(&db, "COMP720").await.expect("comp");
    outcomes::replace_for_course(&db, "SOFT703", &[]).await.expect("clear");

    assert!(outcomes::list_for_course(&db, "SOFT703").await.expect("list").is_empty());
    assert_eq!(outcomes::list_for_course(&db, "COMP720").await.expect("list").len(), 6);
}

#[tokio::test]
async fn defaults_are_seeded_once() {
    let db = common::test_db().await;
    let first = outcomes::ensure_defaults(&db, "COMP720").await.expect("first");
    let second = outcomes::ensure_defaults(&db, "COMP720").await.expect("second");
    assert_eq!(first, second);
    assert_eq!(first.len(), outcomes::DEFAULT_OUTCOMES.len());
    assert_eq!(first[4].outcome_text, "Produce all relevant documentation.");
}

#[tokio::test]
async fn assignment_context_is_created_once() {
    let db = common::test_db().await;
    let a = assignments::find_or_create(&db, "COMP720", "Assignment 1", 2026, 1)
        .await
        .expect("create");
    let again = assignments::find_or_create(&db, " COMP720 ", "Assignment 1", 2026, 1)
        .await
        .expect("find");
    assert_eq!(a.id, again.id);

    let next_term = assignments::find_or_create(&db, "COMP720", "Assignment 1", 2026, 2)
        .await
        .expect("other term");
    assert_ne!(a.id, next_term.id);

    let err = assignments::find_or_create(&db, "", "Assignment 1", 2026, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn file_versions_increase_per_assignment() {
    let db = common::test_db().await;
    let a = common::assignment(&db, "COMP720", "Assignment 1").await;
    let b = common::assignment(&db, "COMP720", "Assignment 2").await;

    for n in 0..3 {
        let f = assignments::add_file(&db, a.id, "brief.pdf", &format!("a{}.pdf", n), "/uploads/assignments/x.pdf")
            .await
            .expect("add");
        assert_eq!(f.version_number, n + 1);
    }
    let fb = assignments::add_file(&db, b.id, "brief.pdf", "b.pdf", "/uploads/assignments/b.pdf")
        .await
        .expect("add b");
    assert_eq!(fb.version_number, 1);

    let files = assignments::list_files(&db, a.id).await.expect("list");
    let versions: Vec<i64> = files.iter().map(|f| f.version_number).collect();
    assert_eq!(versions, vec![3, 2, 1]);
}

#[tokio::test]
async fn missing_assignment_is_not_found() {
    let db = common::test_db().await;
    assert!(matches!(
        assignments::get(&db, 77).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}
