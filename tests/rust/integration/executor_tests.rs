//! Execution adapter tests over a mocked connection

use async_trait::async_trait;
use mockall::mock;
use rowbatch::batch::{batch_delete, batch_update, compile_delete, BatchError, BatchRequest};
use rowbatch::catalog::{EntityCatalog, SqlValue};
use rowbatch::dialect::EngineKind;
use rowbatch::executor::{
    execute_cancellable, execute_with_timeout, BatchConnection, BatchOperation, EngineError,
    ExecuteError,
};
use rowbatch::expr::{Expr, UpdateSpec};
use rowbatch::sql_generator::{BoundParam, SqlGeneratorError};
use tokio::sync::oneshot;
use tokio::time::Duration;

mock! {
    pub Conn {}

    #[async_trait]
    impl BatchConnection for Conn {
        fn engine(&self) -> EngineKind;
        async fn execute(
            &self,
            sql: &str,
            params: &[BoundParam],
        ) -> Result<u64, EngineError>;
    }
}

/// A connection whose execute never completes, for cancellation tests.
struct HangingConn(EngineKind);

#[async_trait]
impl BatchConnection for HangingConn {
    fn engine(&self) -> EngineKind {
        self.0
    }

    async fn execute(&self, _sql: &str, _params: &[BoundParam]) -> Result<u64, EngineError> {
        std::future::pending().await
    }
}

const ITEM_YAML: &str = r#"
- entity: Item
  table: Item
  columns:
    - property: ItemId
      column: ItemId
      sql_type: INTEGER
      primary_key: true
      nullable: false
    - property: Description
      column: Description
      sql_type: TEXT
"#;

fn item_catalog() -> EntityCatalog {
    let catalog = EntityCatalog::new();
    catalog.load_yaml(ITEM_YAML).unwrap();
    catalog
}

#[tokio::test]
async fn test_batch_update_returns_engine_reported_count() {
    let catalog = item_catalog();
    let request = BatchRequest::new("Item").filter(Expr::le(Expr::prop("ItemId"), Expr::lit(500)));
    let update = UpdateSpec::instance(vec![("Description", SqlValue::Text("Updated".into()))]);

    let mut conn = MockConn::new();
    conn.expect_engine().return_const(EngineKind::Sqlite);
    conn.expect_execute()
        .withf(|sql, params| {
            sql == "UPDATE \"Item\" AS \"i\" SET \"Description\" = ?1 WHERE \"i\".\"ItemId\" <= ?2"
                && params.len() == 2
                && params[0].value == SqlValue::Text("Updated".into())
                && params[1].value == SqlValue::Integer(500)
        })
        .times(1)
        .returning(|_, _| Ok(500));

    let affected = batch_update(&conn, &catalog, &request, &update).await.unwrap();
    assert_eq!(affected, 500);
}

#[tokio::test]
async fn test_batch_delete_over_yaml_loaded_catalog() {
    let catalog = item_catalog();
    let request = BatchRequest::new("Item").filter(Expr::gt(Expr::prop("ItemId"), Expr::lit(500)));

    let mut conn = MockConn::new();
    conn.expect_engine().return_const(EngineKind::MySql);
    conn.expect_execute()
        .withf(|sql, _| sql == "DELETE FROM `Item` AS i WHERE i.`ItemId` > ?")
        .times(1)
        .returning(|_, _| Ok(1));

    let affected = batch_delete(&conn, &catalog, &request).await.unwrap();
    assert_eq!(affected, 1);
}

#[tokio::test]
async fn test_engine_failure_propagates_with_context() {
    let catalog = item_catalog();
    let request = BatchRequest::new("Item").filter(Expr::le(Expr::prop("ItemId"), Expr::lit(500)));
    let update = UpdateSpec::instance(vec![("Description", SqlValue::Text("Updated".into()))]);

    let mut conn = MockConn::new();
    conn.expect_engine().return_const(EngineKind::Sqlite);
    conn.expect_execute()
        .returning(|_, _| Err(EngineError("UNIQUE constraint failed: Item.Description".into())));

    let err = batch_update(&conn, &catalog, &request, &update).await.unwrap_err();
    match err {
        BatchError::Execute(ExecuteError::BatchExecution {
            entity,
            operation,
            source,
        }) => {
            assert_eq!(entity, "Item");
            assert_eq!(operation, BatchOperation::Update);
            assert!(source.0.contains("UNIQUE constraint failed"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_translation_failure_never_reaches_the_connection() {
    let catalog = item_catalog();
    // Row limit is not available on this engine; compilation must fail
    // before any SQL is sent.
    let request = BatchRequest::new("Item")
        .filter(Expr::gt(Expr::prop("ItemId"), Expr::lit(500)))
        .take(1);

    let mut conn = MockConn::new();
    conn.expect_engine().return_const(EngineKind::Sqlite);
    conn.expect_execute().never();

    let err = batch_delete(&conn, &catalog, &request).await.unwrap_err();
    assert!(matches!(
        err,
        BatchError::Generator(SqlGeneratorError::UnsupportedLimitCombination(_))
    ));
}

#[tokio::test]
async fn test_cancellation_surfaces_cancelled_error() {
    let catalog = item_catalog();
    let statement =
        compile_delete(&catalog, &BatchRequest::new("Item"), EngineKind::Sqlite).unwrap();

    let conn = HangingConn(EngineKind::Sqlite);
    let (tx, rx) = oneshot::channel();
    tx.send(()).unwrap();

    let err = execute_cancellable(&conn, &statement, "Item", BatchOperation::Delete, rx)
        .await
        .unwrap_err();
    assert!(matches!(err, ExecuteError::Cancelled { .. }));
}

#[tokio::test]
async fn test_dropped_cancel_handle_lets_execution_finish() {
    let catalog = item_catalog();
    let statement =
        compile_delete(&catalog, &BatchRequest::new("Item"), EngineKind::Sqlite).unwrap();

    let mut conn = MockConn::new();
    conn.expect_execute().returning(|_, _| Ok(3));

    let (tx, rx) = oneshot::channel::<()>();
    drop(tx);

    let affected = execute_cancellable(&conn, &statement, "Item", BatchOperation::Delete, rx)
        .await
        .unwrap();
    assert_eq!(affected, 3);
}

#[tokio::test]
async fn test_timeout_surfaces_cancelled_error() {
    let catalog = item_catalog();
    let statement =
        compile_delete(&catalog, &BatchRequest::new("Item"), EngineKind::Sqlite).unwrap();

    let conn = HangingConn(EngineKind::Sqlite);
    let err = execute_with_timeout(
        &conn,
        &statement,
        "Item",
        BatchOperation::Delete,
        Duration::from_millis(20),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ExecuteError::Cancelled { .. }));
}
