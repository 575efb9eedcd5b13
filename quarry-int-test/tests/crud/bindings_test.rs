use quarry::bindings::{bind, BindingsBuilder};
use quarry::common::Document;
use quarry::errors::ErrorKind;
use quarry::filter::all;
use quarry_int_test::test_util::{
    bind_untyped, cleanup, create_configured_test_context, create_test_context, insert_test_people, run_test,
    MemoryDriver, Order, Person,
};
use std::sync::Arc;

#[test]
fn test_typed_and_untyped_lookups() {
    run_test(
        create_test_context,
        |ctx| async move {
            insert_test_people(&ctx);
            let bindings = ctx.bindings();
            assert_eq!(bindings.collection_names(), vec!["people", "orders", "events"]);
            assert!(bindings.contains("orders"));
            assert!(!bindings.contains("invoices"));

            assert_eq!(bindings.collection::<Person>()?.name(), "people");
            assert_eq!(bindings.collection::<Order>()?.name(), "orders");
            assert_eq!(bindings.collection::<Document>()?.name(), "events");

            // an untyped view reads the same documents as the typed handle
            let view = bindings.collection_named::<Document>("people")?;
            assert_eq!(view.count_documents(all()).execute().await?, 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_lookup_errors() {
    run_test(
        create_test_context,
        |ctx| async move {
            let bindings = ctx.bindings();

            let err = bindings.collection_named::<Person>("invoices").err();
            assert_eq!(err.map(|e| e.kind().clone()), Some(ErrorKind::CollectionNotFound));

            let err = bindings.collection_named::<Order>("people").err();
            assert_eq!(err.map(|e| e.kind().clone()), Some(ErrorKind::SchemaMismatch));

            let untyped = bind_untyped("audit")?;
            let err = untyped.collection::<Person>().err();
            assert_eq!(err.map(|e| e.kind().clone()), Some(ErrorKind::CollectionNotFound));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_invalid_bindings_fail_at_build() {
    let driver = Arc::new(MemoryDriver::new());

    let blank = BindingsBuilder::new(driver.clone()).collection::<Person>("  ").build();
    assert_eq!(blank.err().map(|e| e.kind().clone()), Some(ErrorKind::InvalidCollectionName));

    let same_name = BindingsBuilder::new(driver.clone())
        .collection::<Person>("people")
        .collection::<Order>("people")
        .build();
    assert_eq!(same_name.err().map(|e| e.kind().clone()), Some(ErrorKind::DuplicateCollection));

    let same_schema = BindingsBuilder::new(driver.clone())
        .collection::<Person>("people")
        .collection::<Person>("staff")
        .build();
    assert_eq!(same_schema.err().map(|e| e.kind().clone()), Some(ErrorKind::DuplicateCollection));

    // the first error wins
    let first = BindingsBuilder::new(driver)
        .collection::<Person>("")
        .collection::<Person>("people")
        .collection::<Person>("people")
        .build();
    assert_eq!(first.err().map(|e| e.kind().clone()), Some(ErrorKind::InvalidCollectionName));
}

#[test]
fn test_untyped_schema_binds_many_collections() {
    let bindings = bind(MemoryDriver::new())
        .collection::<Document>("logs")
        .collection::<Document>("metrics")
        .build();
    let bindings = match bindings {
        Ok(bindings) => bindings,
        Err(err) => panic!("untyped bindings were rejected: {}", err),
    };

    assert!(bindings.collection_named::<Document>("metrics").is_ok());
    let ambiguous = bindings.collection::<Document>().err();
    assert_eq!(ambiguous.map(|e| e.kind().clone()), Some(ErrorKind::DuplicateCollection));
}

#[test]
fn test_handles_share_configuration() {
    run_test(
        create_configured_test_context,
        |ctx| async move {
            let people = ctx.bindings().collection::<Person>()?;
            assert_eq!(people.config().max_time_ms(), Some(1_500));
            assert_eq!(people.config().comment(), Some("int-test"));
            assert_eq!(ctx.bindings().config().allow_disk_use(), None);

            let copy = people.clone();
            assert_eq!(copy.name(), people.name());
            assert!(Arc::ptr_eq(ctx.bindings().client(), &ctx.driver()));
            Ok(())
        },
        cleanup,
    )
}
