//! Example building statements from predicate sets, without a database.
//!
//! Run with:
//!   cargo run --example statements -p pgquery

use pgquery::{
    DeleteStatement, InsertStatement, Operator, OrmResult, Queries, SelectStatement, Statement,
    UpdateStatement, Value,
};

fn show(label: &str, (sql, params): (String, Vec<Value>)) {
    let params: Vec<String> = params.iter().map(ToString::to_string).collect();
    println!("{label:>8}: {sql}");
    println!("{:>8}  [{}]", "", params.join(", "));
}

fn main() -> OrmResult<()> {
    let columns = ["id", "name", "age"];

    // ?id=abcd1235&name=Doe&name=Smith
    let from_request = Queries::from_query_str("?id=abcd1235&name=Doe&name=Smith");
    show(
        "select",
        SelectStatement::default().build("person", &columns, &from_request),
    );

    let adults = Queries::new()
        .add_with("age", Operator::Between, [18, 65])
        .add_with("name", Operator::Like, ["D%"]);
    adults.validate()?;
    show("select", SelectStatement::default().build("person", &[], &adults));

    let insert = Queries::new()
        .set("id", "abcd1235")
        .set("name", "Doe")
        .set("age", 18);
    show("insert", InsertStatement::default().build("person", &[], &insert));

    let update = Queries::new().add("id", ["abcd1235"]).set("age", 19);
    show("update", UpdateStatement::default().build("person", &[], &update));

    // Without a filter UPDATE refuses to build.
    let unfiltered = Queries::new().set("age", 0);
    let (sql, _) = UpdateStatement::default().build("person", &[], &unfiltered);
    println!("{:>8}: {:?}", "refused", sql);

    let delete = Queries::new().add("id", ["abcd1235", "efgh5678"]);
    show("delete", DeleteStatement::default().build("person", &[], &delete));

    // An operator with the wrong operand count is reported by validate().
    let malformed = Queries::new().add_with("age", Operator::Between, [18]);
    if let Err(e) = malformed.validate() {
        println!("{:>8}: {e}", "invalid");
    }

    Ok(())
}
