mod update_test;
