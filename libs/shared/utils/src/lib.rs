pub mod jwt;
pub mod extractor;
pub mod policy;
pub mod test_utils;
