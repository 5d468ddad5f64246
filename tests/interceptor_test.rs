mod support;

use shadow_explain::{
    Executor, ExplainError, ExplainInterceptor, Parameter, Row, RowBounds, ShadowPolicy,
    SimpleExecutor, StatementType, Value,
};
use support::{statement, CaptureLog, MockTransaction, Outcome, Recorder, Script};

fn users_script() -> Script {
    Script {
        primary: Outcome::rows(
            &["id", "name"],
            vec![
                vec![Value::Integer(1), Value::Text("Alice".into())],
                vec![Value::Integer(2), Value::Text("Bob".into())],
            ],
        ),
        explain: Outcome::rows(
            &["id", "detail"],
            vec![vec![Value::Integer(2), Value::Text("SCAN users".into())]],
        ),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_query_result_is_unchanged() {
    let log = CaptureLog::enabled();
    let ms = statement("SELECT id, name FROM users", None, StatementType::Prepared, &log);

    let (tx, _) = MockTransaction::new(users_script());
    let mut plain = SimpleExecutor::new(tx);
    let expected = plain
        .query(&ms, &Parameter::None, RowBounds::DEFAULT, None)
        .await
        .unwrap();

    let (tx, recorder) = MockTransaction::new(users_script());
    let mut wrapped = ExplainInterceptor::new(SimpleExecutor::new(tx));
    let actual = wrapped
        .query(&ms, &Parameter::None, RowBounds::DEFAULT, None)
        .await
        .unwrap();

    assert_eq!(actual, expected);
    assert_eq!(
        recorder.prepared(),
        vec!["SELECT id, name FROM users", "EXPLAIN SELECT id, name FROM users"]
    );
    assert!(log
        .plan_lines()
        .contains(&"<== ExplainPlan: id=2, detail=SCAN users".to_string()));
}

#[tokio::test]
async fn test_primary_failure_is_propagated_and_still_shadowed() {
    let mut script = users_script();
    script.primary.fail_execute = Some("no such table: users".into());
    let log = CaptureLog::enabled();
    let ms = statement("SELECT id, name FROM users", None, StatementType::Prepared, &log);
    let (tx, _) = MockTransaction::new(script);
    let mut wrapped = ExplainInterceptor::new(SimpleExecutor::new(tx));

    let err = wrapped
        .query(&ms, &Parameter::None, RowBounds::DEFAULT, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ExplainError::Execution(ref m) if m == "no such table: users"));
    assert_eq!(
        log.plan_lines(),
        vec!["<== ExplainPlan: id=2, detail=SCAN users"]
    );
}

#[tokio::test]
async fn test_on_success_policy_skips_failed_primary() {
    let mut script = users_script();
    script.primary.fail_execute = Some("boom".into());
    let log = CaptureLog::enabled();
    let ms = statement("SELECT id, name FROM users", None, StatementType::Prepared, &log);
    let (tx, recorder) = MockTransaction::new(script);
    let mut wrapped =
        ExplainInterceptor::new(SimpleExecutor::new(tx)).with_policy(ShadowPolicy::OnSuccess);
    assert_eq!(wrapped.policy(), ShadowPolicy::OnSuccess);

    assert!(wrapped
        .query(&ms, &Parameter::None, RowBounds::DEFAULT, None)
        .await
        .is_err());
    assert!(log.plan_lines().is_empty());
    assert_eq!(recorder.prepared(), vec!["SELECT id, name FROM users"]);
}

#[tokio::test]
async fn test_shadow_failure_is_invisible_to_caller() {
    let mut script = users_script();
    script.explain.fail_execute = Some("EXPLAIN not permitted".into());
    let log = CaptureLog::enabled();
    let ms = statement("SELECT id, name FROM users", None, StatementType::Prepared, &log);
    let (tx, _) = MockTransaction::new(script);
    let mut wrapped = ExplainInterceptor::new(SimpleExecutor::new(tx));

    let rows = wrapped
        .query(&ms, &Parameter::None, RowBounds::DEFAULT, None)
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(
        log.plan_lines(),
        vec!["<== ExplainPlan: Failed to execute EXPLAIN: EXPLAIN not permitted"]
    );
}

#[tokio::test]
async fn test_update_is_shadowed_with_same_parameters() {
    let mut script = users_script();
    script.primary.update_count = 3;
    let log = CaptureLog::enabled();
    let ms = statement(
        "UPDATE users SET name = #{name} WHERE id = #{id}",
        Some("oracle"),
        StatementType::Prepared,
        &log,
    );
    let parameter = Parameter::from_pairs([
        ("name", Value::Text("Carol".into())),
        ("id", Value::Integer(1)),
    ]);
    let (tx, recorder) = MockTransaction::new(script);
    let mut wrapped = ExplainInterceptor::new(SimpleExecutor::new(tx));

    assert_eq!(wrapped.update(&ms, &parameter).await.unwrap(), 3);
    assert_eq!(
        recorder.prepared()[1],
        "EXPLAIN PLAN FOR UPDATE users SET name = ? WHERE id = ?"
    );
    let bound = recorder.bound();
    assert_eq!(bound[0], bound[1]);
}

#[tokio::test]
async fn test_debug_disabled_adds_no_lines_or_statements() {
    let log = CaptureLog::disabled();
    let ms = statement("SELECT id, name FROM users", None, StatementType::Prepared, &log);
    let (tx, recorder) = MockTransaction::new(users_script());
    let mut wrapped = ExplainInterceptor::new(SimpleExecutor::new(tx));

    wrapped
        .query(&ms, &Parameter::None, RowBounds::DEFAULT, None)
        .await
        .unwrap();

    assert!(log.lines().is_empty());
    assert_eq!(recorder.prepared().len(), 1);
}

#[tokio::test]
async fn test_callable_is_not_shadowed() {
    let log = CaptureLog::enabled();
    let ms = statement("CALL refresh_users()", None, StatementType::Callable, &log);
    let (tx, recorder) = MockTransaction::new(users_script());
    let mut wrapped = ExplainInterceptor::new(SimpleExecutor::new(tx));

    wrapped.update(&ms, &Parameter::None).await.unwrap();

    assert!(log.plan_lines().is_empty());
    assert_eq!(recorder.prepared(), vec!["CALL refresh_users()"]);
}

#[tokio::test]
async fn test_query_with_cache_key_uses_given_bound_sql() {
    let log = CaptureLog::enabled();
    let ms = statement(
        "SELECT id, name FROM users WHERE id = #{id}",
        None,
        StatementType::Prepared,
        &log,
    );
    let parameter = Parameter::from(1);
    let (tx, recorder) = MockTransaction::new(users_script());
    let mut wrapped = ExplainInterceptor::new(SimpleExecutor::new(tx));

    let key = wrapped
        .create_cache_key(&ms, &parameter, RowBounds::DEFAULT, ms.bound_sql())
        .unwrap();
    let rows = wrapped
        .query_with_cache_key(&ms, &parameter, RowBounds::DEFAULT, None, &key, ms.bound_sql())
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(
        recorder.prepared(),
        vec![
            "SELECT id, name FROM users WHERE id = ?",
            "EXPLAIN SELECT id, name FROM users WHERE id = ?",
        ]
    );
}

#[tokio::test]
async fn test_result_handler_receives_rows() {
    let log = CaptureLog::enabled();
    let ms = statement("SELECT id, name FROM users", None, StatementType::Prepared, &log);
    let (tx, _) = MockTransaction::new(users_script());
    let mut wrapped = ExplainInterceptor::new(SimpleExecutor::new(tx));

    let mut names = Vec::new();
    let mut handler = |row: Row| {
        if let Some(Value::Text(name)) = row.get("name") {
            names.push(name.clone());
        }
    };
    let returned = wrapped
        .query(&ms, &Parameter::None, RowBounds::new(1, 10), Some(&mut handler))
        .await
        .unwrap();

    assert!(returned.is_empty());
    assert_eq!(names, vec!["Bob".to_string()]);
    assert_eq!(log.plan_lines().len(), 1);
}

#[tokio::test]
async fn test_commit_and_rollback_delegate_without_shadowing() {
    let log = CaptureLog::enabled();
    let (tx, recorder) = MockTransaction::new(users_script());
    let mut wrapped = ExplainInterceptor::new(SimpleExecutor::new(tx));

    wrapped.commit().await.unwrap();
    wrapped.rollback().await.unwrap();

    assert_eq!(Recorder::count(&recorder.commits), 1);
    assert_eq!(Recorder::count(&recorder.rollbacks), 1);
    assert!(recorder.prepared().is_empty());
    assert!(log.lines().is_empty());
}
