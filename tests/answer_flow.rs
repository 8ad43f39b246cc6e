/// Answering through the router and logging to the store.
use std::sync::Arc;

use askd::config::{DEFAULT_MODEL_ID, DEFAULT_MODEL_NAME};
use askd::{
    AnswerRecord, AnswerRouter, AnswerStore, ExtractiveEngine, ModelRegistry, ModelSpec,
    ServiceError,
};

fn router() -> AnswerRouter {
    let registry = ModelRegistry::initialize(
        Arc::new(ExtractiveEngine::new()),
        ModelSpec::new(DEFAULT_MODEL_NAME, DEFAULT_MODEL_ID, DEFAULT_MODEL_ID),
    )
    .unwrap();
    AnswerRouter::new(Arc::new(registry))
}

#[tokio::test]
async fn default_model_answers_and_answer_is_queryable() {
    let router = router();
    let store = AnswerStore::in_memory().unwrap();

    let question = "Who wrote Hamlet?";
    let context = "Hamlet was written by Shakespeare.";
    let routed = router
        .answer(None, question.to_string(), context.to_string())
        .await
        .unwrap();

    assert_eq!(routed.model_name, DEFAULT_MODEL_NAME);
    assert!(routed.answer.contains("Shakespeare"));

    let record = AnswerRecord::now(question, context, routed.answer, routed.model_name);
    store.append(&record).unwrap();

    let found = store
        .query(Some(record.timestamp - 60), Some(record.timestamp + 60), None)
        .unwrap();
    assert_eq!(found, vec![record]);
}

#[tokio::test]
async fn answers_are_attributed_to_the_requested_model() {
    let router = router();
    router
        .registry()
        .add(ModelSpec::new("m2", "tok2", "mod2"))
        .unwrap();
    let store = AnswerStore::in_memory().unwrap();

    for model in [None, Some("m2"), Some("m2")] {
        let routed = router
            .answer(model, "q".to_string(), "Some context.".to_string())
            .await
            .unwrap();
        store
            .append(&AnswerRecord::now("q", "Some context.", routed.answer, routed.model_name))
            .unwrap();
    }

    let only_m2 = store.query(Some(0), Some(i64::MAX), Some("m2")).unwrap();
    assert_eq!(only_m2.len(), 2);
    let all = store.query(Some(0), Some(i64::MAX), None).unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn records_outlive_deleted_models() {
    let router = router();
    router
        .registry()
        .add(ModelSpec::new("m2", "tok2", "mod2"))
        .unwrap();
    let store = AnswerStore::in_memory().unwrap();

    let routed = router
        .answer(Some("m2"), "q".to_string(), "c.".to_string())
        .await
        .unwrap();
    store
        .append(&AnswerRecord::now("q", "c.", routed.answer, routed.model_name))
        .unwrap();
    router.registry().delete("m2").unwrap();

    assert_eq!(store.query(Some(0), Some(i64::MAX), Some("m2")).unwrap().len(), 1);
    assert!(matches!(
        router.answer(Some("m2"), "q".to_string(), "c.".to_string()).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[test]
fn query_without_start_is_validation_error() {
    let store = AnswerStore::in_memory().unwrap();
    let result = store.query(None, Some(1_700_000_000), None);
    assert!(matches!(result, Err(ServiceError::Validation(_))));
}

#[test]
fn query_returns_exactly_the_records_in_range() {
    let store = AnswerStore::in_memory().unwrap();
    let stamps = [5_i64, 10, 10, 15, 20, 25];
    for (i, ts) in stamps.iter().enumerate() {
        let model = if i % 2 == 0 { "even" } else { "odd" };
        store
            .append(&AnswerRecord {
                question: format!("q{i}"),
                context: "c".to_string(),
                answer: "a".to_string(),
                model_name: model.to_string(),
                timestamp: *ts,
            })
            .unwrap();
    }

    for (s, e) in [(0, 100), (10, 10), (11, 19), (10, 20), (26, 30)] {
        let expected = stamps.iter().filter(|t| s <= **t && **t <= e).count();
        let found = store.query(Some(s), Some(e), None).unwrap();
        assert_eq!(found.len(), expected, "range [{s}, {e}]");
        assert!(found.iter().all(|r| s <= r.timestamp && r.timestamp <= e));

        let even = store.query(Some(s), Some(e), Some("even")).unwrap();
        assert!(even.iter().all(|r| r.model_name == "even"));
        assert_eq!(
            even.len(),
            found.iter().filter(|r| r.model_name == "even").count()
        );
    }
}
