mod combinatorics_tests;
mod encode_tests;
mod reduce_tests;
