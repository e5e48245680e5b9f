mod test_failure_reporting;
