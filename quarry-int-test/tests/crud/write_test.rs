use quarry::common::{Document, Value};
use quarry::driver::ReturnDocument;
use quarry::filter::{all, by_id, field};
use quarry::update::Update;
use quarry::{doc, record};
use quarry_int_test::test_util::{
    cleanup, create_configured_test_context, create_test_context, insert_test_people, run_test, Order, Person,
};

#[test]
fn test_insert_one_and_many() {
    run_test(
        create_test_context,
        |ctx| async move {
            let orders = ctx.bindings().collection::<Order>()?;

            let inserted = orders
                .insert_one(record! { _id: "o-1", item: "lamp", qty: 2 })
                .execute()
                .await?;
            assert_eq!(inserted.inserted_id, Value::from("o-1"));

            let generated = orders.insert_one(record! { item: "desk", qty: 1 }).execute().await?;
            assert!(matches!(generated.inserted_id, Value::ObjectId(_)));

            let many = orders
                .insert_many([record! { item: "chair", qty: 4 }, record! { item: "rug", qty: 1 }])
                .ordered(true)
                .execute()
                .await?;
            assert_eq!(many.inserted_ids.len(), 2);

            assert_eq!(ctx.driver().documents("orders").len(), 4);
            assert_eq!(orders.count_documents(field("qty").eq(1)).execute().await?, 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_replace_one_keeps_the_id() {
    run_test(
        create_test_context,
        |ctx| async move {
            insert_test_people(&ctx);
            let people = ctx.bindings().collection::<Person>()?;

            let result = people
                .replace_one(field("name").eq("grace"), record! { name: "grace hopper", age: 46 })
                .execute()
                .await?;
            assert_eq!(result.matched_count, 1);
            assert_eq!(result.upserted_id, None);

            let stored = people.find_one(by_id(2)).execute().await?;
            assert_eq!(stored, Some(doc! { _id: 2, name: "grace hopper", age: 46 }));

            let upserted = people
                .replace_one(field("name").eq("linus"), record! { _id: 9, name: "linus" })
                .upsert(true)
                .execute()
                .await?;
            assert_eq!(upserted.matched_count, 0);
            assert_eq!(upserted.upserted_id, Some(Value::from(9)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_one_with_upsert() {
    run_test(
        create_test_context,
        |ctx| async move {
            let people = ctx.bindings().collection::<Person>()?;

            let result = people
                .update_one(field("name").eq("barbara"), Update::new().set("age", 50))
                .upsert(true)
                .execute()
                .await?;
            assert_eq!(result.matched_count, 0);
            assert!(result.upserted_id.is_some());

            let stored = ctx.driver().documents("people");
            assert_eq!(stored.len(), 1);
            assert_eq!(stored[0].get("name"), Some(&Value::from("barbara")));
            assert_eq!(stored[0].get("age"), Some(&Value::from(50)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_one_and_many() {
    run_test(
        create_test_context,
        |ctx| async move {
            insert_test_people(&ctx);
            let people = ctx.bindings().collection::<Person>()?;

            let one = people.delete_one(field("address.city").eq("London")).execute().await?;
            assert_eq!(one.deleted_count, 1);
            assert_eq!(people.count_documents(all()).execute().await?, 2);

            let rest = people.delete_many(all()).execute().await?;
            assert_eq!(rest.deleted_count, 2);
            assert!(ctx.driver().documents("people").is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_one_and_update_returns_requested_version() {
    run_test(
        create_test_context,
        |ctx| async move {
            insert_test_people(&ctx);
            let people = ctx.bindings().collection::<Person>()?;

            let before = people
                .find_one_and_update(field("name").eq("alan"), Update::new().inc("age", 1))
                .execute()
                .await?;
            assert_eq!(before.and_then(|doc| doc.get("age").cloned()), Some(Value::from(41)));

            let after = people
                .find_one_and_update(field("name").eq("alan"), Update::new().inc("age", 1))
                .return_document(ReturnDocument::After)
                .execute()
                .await?;
            assert_eq!(after.and_then(|doc| doc.get("age").cloned()), Some(Value::from(43)));

            let youngest_londoner = people
                .find_one_and_update(field("address.city").eq("London"), Update::new().set("flag", true))
                .sort(record! { age: 1 })
                .return_document(ReturnDocument::After)
                .execute()
                .await?;
            assert_eq!(
                youngest_londoner.and_then(|doc| doc.get("name").cloned()),
                Some(Value::from("ada"))
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_one_and_replace_and_delete() {
    run_test(
        create_test_context,
        |ctx| async move {
            insert_test_people(&ctx);
            let people = ctx.bindings().collection::<Person>()?;

            let replaced = people
                .find_one_and_replace(by_id(3), record! { name: "turing" })
                .return_document(ReturnDocument::After)
                .execute()
                .await?;
            assert_eq!(replaced, Some(doc! { _id: 3, name: "turing" }));

            let removed = people
                .find_one_and_delete(field("age").gt(40))
                .sort(record! { age: (-1) })
                .execute()
                .await?;
            assert_eq!(removed.and_then(|doc| doc.get("name").cloned()), Some(Value::from("grace")));

            let missing = people.find_one_and_delete(by_id(2)).execute().await?;
            assert_eq!(missing, None);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_write_defaults_and_failures() {
    run_test(
        create_configured_test_context,
        |ctx| async move {
            let people = ctx.bindings().collection::<Person>()?;

            people.update_many(all(), Update::new().set("seen", true)).execute().await?;
            people.insert_one(Document::new()).comment("seed").execute().await?;

            let calls = ctx.driver().calls();
            assert_eq!(calls[0].comment, Some(Value::from("int-test")));
            assert_eq!(calls[0].max_time_ms, None);
            assert_eq!(calls[1].comment, Some(Value::from("seed")));

            ctx.driver().fail_next("duplicate key");
            let err = match people.insert_one(record! { _id: 1 }).execute().await {
                Ok(_) => anyhow::bail!("the injected failure was swallowed"),
                Err(err) => err,
            };
            assert_eq!(err.to_string(), "duplicate key");
            Ok(())
        },
        cleanup,
    )
}
