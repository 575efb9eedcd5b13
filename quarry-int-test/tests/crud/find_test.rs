use quarry::common::{SortFields, SortOrder, Value};
use quarry::expression::Expr;
use quarry::filter::{all, field, or};
use quarry::pipeline::{limit, match_, sort};
use quarry::{doc, record};
use quarry_int_test::test_util::{
    cleanup, create_configured_test_context, create_test_context, insert_test_people, run_test, Person,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_filter_callback_runs_once_per_descriptor() {
    run_test(
        create_test_context,
        |ctx| async move {
            insert_test_people(&ctx);
            let people = ctx.bindings().collection::<Person>()?;

            let calls = Arc::new(AtomicUsize::new(0));
            let counter = calls.clone();
            let find = people.find(Expr::callback(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                record! { "address.city": "London" }
            }));
            assert_eq!(calls.load(Ordering::SeqCst), 1);

            let first = find.to_list().await?;
            let second = find.to_list().await?;
            assert_eq!(first.len(), 2);
            assert_eq!(first, second);
            assert_eq!(calls.load(Ordering::SeqCst), 1);
            assert_eq!(ctx.driver().calls().len(), 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_with_options() {
    run_test(
        create_test_context,
        |ctx| async move {
            insert_test_people(&ctx);
            let people = ctx.bindings().collection::<Person>()?;

            let oldest = people
                .find(field("age").gt(30))
                .sort(SortFields::new().by("age", SortOrder::Descending))
                .limit(2)
                .projection(record! { _id: 0, name: 1 })
                .to_list()
                .await?;
            assert_eq!(oldest, vec![doc! { name: "grace" }, doc! { name: "alan" }]);

            let first = people.find(all()).sort(record! { age: 1 }).to_one().await?;
            assert_eq!(first.and_then(|doc| doc.get("name").cloned()), Some(Value::from("ada")));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_one_count_and_distinct() {
    run_test(
        create_test_context,
        |ctx| async move {
            insert_test_people(&ctx);
            let people = ctx.bindings().collection::<Person>()?;

            let missing = people.find_one(field("name").eq("linus"));
            assert_eq!(missing.execute().await?, None);
            assert!(missing.to_list().await?.is_empty());

            let grace = people.find_one(field("name").eq("grace")).to_list().await?;
            assert_eq!(grace.len(), 1);

            let either = or(vec![field("name").eq("ada"), field("name").eq("alan")]);
            assert_eq!(people.count_documents(either).execute().await?, 2);

            let tags = people.distinct("tags", field("address.city").eq("London")).execute().await?;
            assert_eq!(tags, vec![Value::from("math"), Value::from("engines")]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_aggregate_runs_against_the_collection() {
    run_test(
        create_test_context,
        |ctx| async move {
            insert_test_people(&ctx);
            let people = ctx.bindings().collection::<Person>()?;

            let stages = people.pipeline().pipe_all([
                match_(field("age").gte(40)),
                sort(record! { age: 1 }),
                limit(1),
            ]);
            let aggregate = people.aggregate(&stages).allow_disk_use(true);
            assert_eq!(aggregate.pipeline().len(), 3);

            let rows = aggregate.to_list().await?;
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].get("name"), Some(&Value::from("alan")));

            let call = &ctx.driver().calls()[0];
            assert_eq!(call.method, "aggregate");
            assert_eq!(call.collection, "people");
            assert_eq!(call.pipeline.as_ref().map(Vec::len), Some(3));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_config_defaults_and_overrides() {
    run_test(
        create_configured_test_context,
        |ctx| async move {
            let people = ctx.bindings().collection::<Person>()?;
            people.find(()).to_list().await?;
            people.find(()).max_time_ms(20).comment("override").to_list().await?;

            let calls = ctx.driver().calls();
            assert_eq!(calls[0].max_time_ms, Some(1_500));
            assert_eq!(calls[0].comment, Some(Value::from("int-test")));
            assert_eq!(calls[1].max_time_ms, Some(20));
            assert_eq!(calls[1].comment, Some(Value::from("override")));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_driver_errors_surface_unchanged() {
    run_test(
        create_test_context,
        |ctx| async move {
            let people = ctx.bindings().collection::<Person>()?;
            ctx.driver().fail_next("socket closed");

            let err = match people.find(()).to_list().await {
                Ok(_) => anyhow::bail!("the injected failure was swallowed"),
                Err(err) => err,
            };
            assert_eq!(err.to_string(), "socket closed");

            // the failure was consumed by the first call
            assert!(people.find(()).to_list().await.is_ok());
            Ok(())
        },
        cleanup,
    )
}
