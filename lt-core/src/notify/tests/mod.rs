
use clockabilly::mock::MockUtcClock;
use lt_testutils::*;
use rstest::*;
use tracing_test::traced_test;

use super::*;

const RETRY_DELAY: i64 = 5;
const START_TS: i64 = 1000;
