pub mod http;
pub mod report;

#[cfg(test)]
pub mod test_utils;
