// End-to-end cases: YAML config -> manager -> refresher -> cache lookups.

mod cases_refresh_cycle_test;
