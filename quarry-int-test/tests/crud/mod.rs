mod bindings_test;
mod find_test;
mod write_test;
