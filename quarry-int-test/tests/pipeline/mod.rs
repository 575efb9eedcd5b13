mod pipeline_test;
mod stage_test;
