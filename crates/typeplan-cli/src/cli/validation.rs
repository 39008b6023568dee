/// Parse a `--jobs` value: a whole number of at least one.
pub fn parse_jobs(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("Job count must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("Job count must be a positive number: '{s}'")),
    }
}
