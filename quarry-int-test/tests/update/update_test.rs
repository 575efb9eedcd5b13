use quarry::common::Value;
use quarry::doc;
use quarry::filter::field;
use quarry::operator::multiply;
use quarry::expression::Expr;
use quarry::record;
use quarry::update::{ArrayFilters, Modifier, Update, UpdateStage, WireUpdate};
use quarry_int_test::test_util::{cleanup, create_test_context, insert_test_people, run_test, Person};

#[test]
fn test_pipeline_update_sets_undeclared_field() {
    run_test(
        create_test_context,
        |ctx| async move {
            insert_test_people(&ctx);
            let people = ctx.bindings().collection::<Person>()?;

            let update = people.update_one(
                field("name").eq("ada"),
                vec![UpdateStage::set(record! {
                    "doubleAge": (multiply([Expr::from("$age"), Expr::from(2)])),
                    "brandNew": "as-is"
                })],
            );
            assert!(update.update().is_pipeline());
            let result = update.execute().await?;
            assert_eq!(result.matched_count, 1);

            let stored = ctx.driver().documents("people");
            let ada = stored
                .iter()
                .find(|doc| doc.get("name") == Some(&Value::from("ada")))
                .cloned()
                .unwrap_or_default();
            assert_eq!(ada.get("brandNew"), Some(&Value::from("as-is")));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_traditional_update_with_modifiers() {
    run_test(
        create_test_context,
        |ctx| async move {
            insert_test_people(&ctx);
            let people = ctx.bindings().collection::<Person>()?;

            let update = Update::new()
                .set("address.city", "Cambridge")
                .inc("age", 1)
                .unset("tags");
            people.update_many(field("address.city").eq("London"), update).execute().await?;

            let londoners = people.count_documents(field("address.city").eq("London")).execute().await?;
            assert_eq!(londoners, 0);

            let ada = people.find_one(field("_id").eq(1)).execute().await?.unwrap_or_default();
            assert_eq!(ada, doc! { _id: 1, name: "ada", age: 37i64, address: { city: "Cambridge" } });
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_array_filters_are_forwarded_or_dropped() {
    run_test(
        create_test_context,
        |ctx| async move {
            let people = ctx.bindings().collection::<Person>()?;
            let filters = ArrayFilters::new().identifier("t", record! { "$eq": "math" });

            people
                .update_many((), Update::new().set("tags.$[t]", "mathematics"))
                .array_filters(&filters)
                .execute()
                .await?;
            people
                .update_many((), vec![UpdateStage::unset(["tags"])])
                .array_filters(&filters)
                .execute()
                .await?;

            let calls = ctx.driver().calls();
            assert_eq!(calls[0].array_filters, Some(vec![doc! { t: { "$eq": "math" } }]));
            assert_eq!(calls[1].array_filters, None);
            assert_eq!(
                calls[1].update,
                Some(WireUpdate::Pipeline(vec![doc! { "$unset": ["tags"] }]))
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_push_modifier_wire_shape() {
    let update = Update::new().push(
        "scores",
        Modifier::each([89, 92]).position(0).slice(-5).sort(record! { score: (-1) }),
    );
    assert_eq!(
        Expr::from(update).resolve(),
        Value::from(doc! {
            "$push": {
                scores: { "$each": [89, 92], "$position": 0, "$sort": { score: (-1) }, "$slice": (-5) }
            }
        })
    );
}
