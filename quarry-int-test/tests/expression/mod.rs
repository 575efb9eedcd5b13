mod operator_test;
mod resolver_test;
