pub mod constants;
pub mod links;
pub mod query;
#[cfg(test)]
pub mod test_helpers;
pub mod types;
pub mod validation;
