mod main_test;

use rstest::*;

use super::*;
