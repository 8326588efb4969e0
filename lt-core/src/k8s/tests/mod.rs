
use lt_testutils::*;
use rstest::*;

use super::*;
