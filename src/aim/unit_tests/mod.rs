#[cfg(test)]
mod request_tests;
#[cfg(test)]
mod taxonomy_tests;
