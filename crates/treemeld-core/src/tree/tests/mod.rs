mod merge_tests;
mod select_tests;
mod table_tests;
