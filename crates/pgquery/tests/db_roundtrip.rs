use pgquery::{Db, DbConfig, Operator, OrmError, OrmResult, Queries, Record, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Default, Clone, PartialEq, Record)]
#[sql(table = "pgquery_test_manager")]
struct Manager {
    #[sql(key)]
    id: Uuid,
    #[sql(index, type = "varchar(60)")]
    name: String,
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
#[sql(table = "pgquery_test_employee")]
struct Employee {
    #[sql(key)]
    id: Uuid,
    name: String,
    age: i32,
    #[sql(foreign = "id")]
    manager: Option<Manager>,
}

// The tests share two tables.
static TABLES: Mutex<()> = Mutex::const_new(());

async fn lock_tables() -> MutexGuard<'static, ()> {
    TABLES.lock().await
}

fn connect(test: &str) -> OrmResult<Option<Db>> {
    dotenvy::dotenv().ok();
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL is not set; skipping {test}");
        return Ok(None);
    }
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let config = DbConfig::from_env()?
        .max_size(2)
        .application_name(format!("pgquery_test_{}_{nanos}", std::process::id()));
    Ok(Some(Db::connect(&config)?))
}

async fn reset(db: &Db) -> OrmResult<()> {
    db.execute("DROP TABLE IF EXISTS pgquery_test_employee", &[]).await?;
    db.execute("DROP TABLE IF EXISTS pgquery_test_manager", &[]).await?;
    db.create_table::<Manager>().await?;
    db.create_table::<Employee>().await?;
    Ok(())
}

#[tokio::test]
async fn records_roundtrip() -> OrmResult<()> {
    let Some(db) = connect("records_roundtrip")? else {
        return Ok(());
    };
    let _tables = lock_tables().await;
    db.ping().await?;
    reset(&db).await?;

    let boss = Manager {
        id: Uuid::new_v4(),
        name: "Doe".into(),
    };
    db.insert(&boss).await?;

    let employee = Employee {
        id: Uuid::new_v4(),
        name: "Smith".into(),
        age: 32,
        manager: Some(boss.clone()),
    };
    db.insert(&employee).await?;
    db.insert(&Employee {
        id: Uuid::new_v4(),
        name: "Jones".into(),
        age: 17,
        manager: None,
    })
    .await?;

    // Loaded references carry only their key.
    let found: Employee = db
        .find(&Queries::new().add("id", [employee.id.to_string()]))
        .await?;
    assert_eq!(found.name, "Smith");
    assert_eq!(found.manager.as_ref().map(|m| m.id), Some(boss.id));
    assert_eq!(found.manager.as_ref().map(|m| m.name.as_str()), Some(""));

    let adults: Vec<Employee> = db
        .find_all(&Queries::new().add_with("age", Operator::GreaterOrEqual, ["18"]))
        .await?;
    assert_eq!(adults.len(), 1);

    let everyone: Vec<Employee> = db.find_all(&Queries::new()).await?;
    assert_eq!(everyone.len(), 2);

    let updated = db
        .update_all::<Employee>(&Queries::new().add("name", ["Jones"]).set("age", 18))
        .await?;
    assert_eq!(updated, 1);

    let mut smith = found.clone();
    smith.age = 33;
    assert_eq!(db.update(&smith).await?, 1);
    let reloaded: Employee = db
        .find(&Queries::new().add("id", [Value::Uuid(smith.id)]))
        .await?;
    assert_eq!(reloaded.age, 33);

    let err = db
        .update_all::<Employee>(&Queries::new().set("age", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, OrmError::EmptyStatement("UPDATE")));

    let deleted = db
        .delete_all::<Employee>(&Queries::new().add_with("age", Operator::Between, [18, 40]))
        .await?;
    assert_eq!(deleted, 2);

    let err = db
        .find::<Employee>(&Queries::new().add("name", ["Smith"]))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    db.drop_table::<Employee>().await?;
    db.drop_table::<Manager>().await?;
    db.close();
    Ok(())
}

#[tokio::test]
async fn constraint_errors_are_classified() -> OrmResult<()> {
    let Some(db) = connect("constraint_errors_are_classified")? else {
        return Ok(());
    };
    let _tables = lock_tables().await;
    reset(&db).await?;

    let boss = Manager {
        id: Uuid::new_v4(),
        name: "Doe".into(),
    };
    db.insert(&boss).await?;
    let err = db.insert(&boss).await.unwrap_err();
    assert!(err.is_unique_violation());

    let stray = Employee {
        id: Uuid::new_v4(),
        name: "Nobody".into(),
        age: 40,
        manager: Some(Manager {
            id: Uuid::new_v4(),
            name: String::new(),
        }),
    };
    let err = db.insert(&stray).await.unwrap_err();
    assert!(matches!(err, OrmError::ForeignKeyViolation(_)));

    db.drop_table::<Employee>().await?;
    db.drop_table::<Manager>().await?;
    Ok(())
}

#[tokio::test]
async fn url_filters_coerce_to_column_types() -> OrmResult<()> {
    let Some(db) = connect("url_filters_coerce_to_column_types")? else {
        return Ok(());
    };
    let _tables = lock_tables().await;
    reset(&db).await?;

    let id = Uuid::new_v4();
    db.insert(&Employee {
        id,
        name: "Doe".into(),
        age: 21,
        manager: None,
    })
    .await?;

    let url = pgquery::url::Url::parse(&format!("http://localhost/employees?id={id}&age=21"))
        .map_err(|e| OrmError::Other(e.to_string()))?;
    let found: Employee = db.find(&Queries::from_url(&url)).await?;
    assert_eq!(found.id, id);

    db.drop_table::<Employee>().await?;
    db.drop_table::<Manager>().await?;
    Ok(())
}
